//! Configuration for the filament simulation.
//!
//! Simulation-level parameters load from JSON; kinetic event definitions
//! use the token-ordered, whitespace-separated control-file form so
//! existing run scripts stay loadable.

pub mod control;
mod parameters;

pub use control::{load_control_file, parse_control_text, ControlError, EventLine, TokenCursor};
pub use parameters::{
    DynamicsParameters, ForceParameters, GridParameters, Parameters, PopulationParameters,
};

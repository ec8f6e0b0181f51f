//! Spatial geometry for the simulation box.

mod simbox;

pub use simbox::SimulationBox;

//! Filament Kinetics - event-driven simulator of filament self-assembly.
//!
//! This library implements an Active Cell Network: a population of
//! monomer-scale "active bonds" diffusing through a uniform spatial grid,
//! stochastically nucleating into two-bond "active polymers" and growing
//! at their ends through a catalog of kinetic binding events. Each event
//! claims a nearby free bond, pulls it into bonding position with a
//! strength-ramping transient spring over a fixed number of steps, and
//! either commits it into the chain or releases it back to the free pool.
//!
//! The surrounding force-field engine is consumed through a narrow
//! interface (bead positions, force accumulators, box geometry); a
//! minimal Brownian integrator is included as a stand-in host for
//! headless runs.

pub mod config;
pub mod export;
pub mod grid;
pub mod kinetics;
pub mod network;
pub mod space;
pub mod state;

pub use config::{ControlError, Parameters};
pub use grid::{Cell, CellGrid, CellId, RepulsionParams, SweepStats};
pub use kinetics::{
    BindingParams, ConeParams, EventRegistry, EventStatus, EventTarget, GrowthEnd, KineticEvent,
    ParamError, SpringRamp, TransientSpring,
};
pub use network::{ActiveCellNetwork, NetworkMetrics, NetworkState};
pub use space::SimulationBox;
pub use state::{
    ActiveBond, ActivePolymer, BeadId, BeadStore, BondArena, BondId, BrownianSettings,
    PolymerArena, PolymerId,
};

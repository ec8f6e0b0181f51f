//! Kinetic event library for filament self-assembly.
//!
//! Each event is a per-growth-site stochastic state machine advanced once
//! per simulation step: it searches the spatial grid for a binding
//! candidate, claims it, ramps a transient spring to pull it into bonding
//! position over a fixed number of steps, and finally either commits it
//! into the polymer or releases it back to the free pool. Variants differ
//! in binding geometry (plain, sequential two-corner, forward-cone) and
//! in their spring ramp strategy.
//!
//! Events are instantiated through the string-keyed [`EventRegistry`] so
//! existing control files keep working.

pub mod binding;
pub mod cone;
pub mod nucleation;
mod params;
mod registry;
pub mod sequential;
mod spring;

pub use binding::BondBindsToPolymer;
pub use cone::BondBindsForwardConeToPolymer;
pub use nucleation::PolymerFormsBondTriple;
pub use params::{BindingParams, ConeParams, ParamError};
pub use registry::{EventRegistry, EventTarget};
pub use sequential::BondBindsABSequentiallyToPolymer;
pub use spring::{SpringRamp, TransientSpring};

use crate::network::NetworkState;
use crate::state::PolymerId;

/// Which polymer end a growth event tends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthEnd {
    Head,
    Tail,
}

/// Whether an event stays live after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// Keep stepping this event
    Active,
    /// Permanently done (one-shot events after success); the network
    /// drops it
    Retired,
}

/// A kinetic rule advanced once per simulation step.
///
/// Growth events persist for the polymer's lifetime, cycling
/// idle ↔ capturing; nucleation events retire on success.
pub trait KineticEvent {
    /// The registry type key of this event
    fn kind(&self) -> &'static str;

    /// Advance the state machine by one simulation step
    fn step(&mut self, net: &mut NetworkState) -> EventStatus;

    /// Release any claimed candidate without committing it; called when
    /// the event is removed mid-capture (e.g. its polymer dissolves)
    fn abort(&mut self, net: &mut NetworkState);

    /// Polymer this event tends, if any (None for nucleation events)
    fn target_polymer(&self) -> Option<PolymerId>;

    /// True while a candidate is claimed and the spring is ramping
    fn is_capturing(&self) -> bool;

    /// Committed captures so far
    fn successes(&self) -> u64;

    /// Timed-out captures so far
    fn failures(&self) -> u64;

    /// Configuration in the token-ordered control-file form
    fn params_tokens(&self) -> String;
}

//! State management for the filament simulation.
//!
//! Contains the arena-backed data structures for the bead population, the
//! active bonds (monomer units) and the active polymers (filament chains).
//! All cross-references are stable integer indices into these arenas.

mod bead;
mod bond;
mod polymer;

pub use bead::{BeadId, BeadStore, BrownianSettings};
pub use bond::{ActiveBond, BondArena, BondId};
pub use polymer::{ActivePolymer, PolymerArena, PolymerId};

//! Transient Hookean springs used to pull captured candidates into place.
//!
//! A transient spring starts at zero strength when a candidate is captured
//! and is ramped toward its final constant over the attempt duration. The
//! two ramp formulas observed in the original kinetics are preserved as
//! distinct named strategies rather than unified:
//!
//! - `PerRemainingStep`: strength = final / remaining_steps; slow start,
//!   sharp pull in the last steps (plain binding events);
//! - `LinearElapsed`: strength = final * completed / duration; uniform
//!   stiffening (sequential and cone events, nucleation).
//!
//! Springs are privately owned by their event and never visible outside it.

use glam::Vec3;

use crate::space::SimulationBox;
use crate::state::{BeadId, BeadStore};

/// Strength ramp strategy over a capture attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpringRamp {
    /// strength = final / (duration − completed + 1)
    PerRemainingStep,
    /// strength = final × completed / duration
    LinearElapsed,
}

impl SpringRamp {
    /// Spring constant after `completed` capture steps (1 ..= duration)
    pub fn strength_at(&self, completed: u32, duration: u32, final_constant: f32) -> f32 {
        debug_assert!(completed >= 1 && completed <= duration);
        match self {
            SpringRamp::PerRemainingStep => {
                final_constant / (duration - completed + 1) as f32
            }
            SpringRamp::LinearElapsed => {
                final_constant * completed as f32 / duration as f32
            }
        }
    }
}

/// A strength-ramping spring between two beads
#[derive(Debug, Clone)]
pub struct TransientSpring {
    pub bead_a: BeadId,
    pub bead_b: BeadId,
    /// Undamped constant reached at the end of the ramp
    pub final_constant: f32,
    /// Rest length of the spring (length units)
    pub rest_length: f32,
    pub ramp: SpringRamp,
    strength: f32,
}

impl TransientSpring {
    /// Create a zero-strength spring between the two beads
    pub fn new(
        bead_a: BeadId,
        bead_b: BeadId,
        final_constant: f32,
        rest_length: f32,
        ramp: SpringRamp,
    ) -> Self {
        Self {
            bead_a,
            bead_b,
            final_constant,
            rest_length,
            ramp,
            strength: 0.0,
        }
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Set the strength directly; used by events that ramp their springs
    /// over sub-windows of the attempt
    pub fn set_strength(&mut self, strength: f32) {
        self.strength = strength;
    }

    /// Ramp the strength for the given completed step count
    pub fn ramp_to(&mut self, completed: u32, duration: u32) {
        self.strength = self
            .ramp
            .strength_at(completed, duration, self.final_constant);
    }

    /// Current minimum-image separation of the two ends
    pub fn separation(&self, beads: &BeadStore, simbox: &SimulationBox) -> f32 {
        simbox
            .separation(beads.position(self.bead_b), beads.position(self.bead_a))
            .length()
    }

    /// Apply the spring force at its current strength, equal and opposite
    /// on both ends. Positive extension pulls the ends together.
    pub fn apply(&self, beads: &mut BeadStore, simbox: &SimulationBox) {
        if self.strength == 0.0 {
            return;
        }
        let dr = simbox.separation(beads.position(self.bead_b), beads.position(self.bead_a));
        let r = dr.length();
        if r < 1e-10 {
            return;
        }
        let magnitude = self.strength * (r - self.rest_length);
        let force = dr * (magnitude / r);

        beads.add_force(self.bead_a, force);
        beads.add_force(self.bead_b, -force);
    }
}

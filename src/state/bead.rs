//! Bead position and force storage.
//!
//! Beads are the physical particles owned by the host force-field engine;
//! the kinetic layer only reads positions and accumulates forces onto them.
//! `BeadStore` is the narrow interface to that engine, plus a small
//! overdamped Brownian integrator used as a stand-in host when running the
//! crate headless (diagnostics binary, integration tests). The stand-in is
//! not a reimplementation of the excluded MD engine.
//!
//! Reference (Brownian step): Ermak & McCammon, J Chem Phys 1978

use glam::Vec3;
use rand::prelude::*;
use rand_distr::StandardNormal;

use crate::space::SimulationBox;

/// Stable index of a bead in the store
pub type BeadId = u32;

/// Settings for the stand-in Brownian integrator
#[derive(Debug, Clone, Copy)]
pub struct BrownianSettings {
    /// Timestep (time units)
    pub dt: f32,
    /// Mobility 1/γ (length²/(energy·time))
    pub mobility: f32,
    /// Thermal energy k_B·T (energy units); zero disables noise
    pub kbt: f32,
}

impl Default for BrownianSettings {
    fn default() -> Self {
        Self {
            dt: 0.02,
            mobility: 1.0,
            kbt: 1.0,
        }
    }
}

/// Positions and force accumulators for the bead population
#[derive(Debug, Clone, Default)]
pub struct BeadStore {
    positions: Vec<Vec3>,
    forces: Vec<Vec3>,
}

impl BeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bead and return its id
    pub fn push(&mut self, position: Vec3) -> BeadId {
        let id = self.positions.len() as BeadId;
        self.positions.push(position);
        self.forces.push(Vec3::ZERO);
        id
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, id: BeadId) -> Vec3 {
        self.positions[id as usize]
    }

    pub fn set_position(&mut self, id: BeadId, position: Vec3) {
        self.positions[id as usize] = position;
    }

    /// Add a force contribution to the bead's accumulator
    pub fn add_force(&mut self, id: BeadId, force: Vec3) {
        self.forces[id as usize] += force;
    }

    pub fn force(&self, id: BeadId) -> Vec3 {
        self.forces[id as usize]
    }

    /// Zero every force accumulator
    pub fn clear_forces(&mut self) {
        for f in &mut self.forces {
            *f = Vec3::ZERO;
        }
    }

    /// Advance every bead by one overdamped Brownian step and clear the
    /// consumed force accumulators.
    ///
    /// dx = μ·F·dt + √(2·μ·k_B·T·dt)·ξ, with ξ a unit Gaussian per axis.
    /// Positions are folded back into the box afterwards.
    pub fn integrate_brownian(
        &mut self,
        simbox: &SimulationBox,
        settings: &BrownianSettings,
        rng: &mut StdRng,
    ) {
        let drift = settings.mobility * settings.dt;
        let noise_amp = (2.0 * settings.mobility * settings.kbt * settings.dt).sqrt();

        for (pos, force) in self.positions.iter_mut().zip(self.forces.iter_mut()) {
            let mut dx = *force * drift;
            if settings.kbt > 0.0 {
                let xi = Vec3::new(
                    rng.sample::<f32, _>(StandardNormal),
                    rng.sample::<f32, _>(StandardNormal),
                    rng.sample::<f32, _>(StandardNormal),
                );
                dx += xi * noise_amp;
            }
            *pos = simbox.wrap_position(*pos + dx);
            *force = Vec3::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_accumulation() {
        let mut beads = BeadStore::new();
        let id = beads.push(Vec3::ZERO);

        beads.add_force(id, Vec3::new(1.0, 0.0, 0.0));
        beads.add_force(id, Vec3::new(0.5, 2.0, 0.0));

        let f = beads.force(id);
        assert!((f.x - 1.5).abs() < 1e-6);
        assert!((f.y - 2.0).abs() < 1e-6);

        beads.clear_forces();
        assert_eq!(beads.force(id), Vec3::ZERO);
    }

    #[test]
    fn test_brownian_drift_without_noise() {
        let simbox = SimulationBox::new(Vec3::splat(10.0), [true; 3]);
        let mut beads = BeadStore::new();
        let id = beads.push(Vec3::new(5.0, 5.0, 5.0));
        beads.add_force(id, Vec3::new(1.0, 0.0, 0.0));

        let settings = BrownianSettings {
            dt: 0.1,
            mobility: 1.0,
            kbt: 0.0, // deterministic
        };
        let mut rng = StdRng::seed_from_u64(1);
        beads.integrate_brownian(&simbox, &settings, &mut rng);

        // dx = μ·F·dt = 0.1 along x
        let p = beads.position(id);
        assert!((p.x - 5.1).abs() < 1e-5, "expected drift 0.1, got {}", p.x - 5.0);
        // Consumed forces are cleared
        assert_eq!(beads.force(id), Vec3::ZERO);
    }

    #[test]
    fn test_brownian_step_stays_in_box() {
        let simbox = SimulationBox::new(Vec3::splat(4.0), [true; 3]);
        let mut beads = BeadStore::new();
        for i in 0..32 {
            beads.push(Vec3::splat(i as f32 * 0.1));
        }

        let settings = BrownianSettings::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            beads.integrate_brownian(&simbox, &settings, &mut rng);
        }

        for i in 0..beads.len() {
            let p = beads.position(i as BeadId);
            for axis in 0..3 {
                assert!(
                    p[axis] >= 0.0 && p[axis] <= 4.0,
                    "bead {} left the box: {:?}",
                    i,
                    p
                );
            }
        }
    }
}

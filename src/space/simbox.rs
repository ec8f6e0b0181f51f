//! Simulation box geometry and minimum-image arithmetic.
//!
//! All displacement-dependent quantities (pair forces, capture distances,
//! cone angles, spring extensions) go through the minimum-image correction
//! so that interactions wrap correctly across periodic faces. Axes may be
//! individually non-periodic, in which case the raw displacement is kept
//! along that axis.
//!
//! Reference: Allen & Tildesley, Computer Simulation of Liquids, 1987

use glam::Vec3;

/// Axis-aligned simulation box with per-axis periodicity.
#[derive(Debug, Clone)]
pub struct SimulationBox {
    /// Full box side lengths (length units)
    side_lengths: Vec3,
    /// Cached half lengths, used by the minimum-image test
    half_lengths: Vec3,
    /// Periodic wrap flags per axis (x, y, z)
    periodic: [bool; 3],
}

impl SimulationBox {
    /// Create a box with the given side lengths and periodicity flags.
    ///
    /// Panics if any side length is not strictly positive; a degenerate box
    /// is a construction bug, not a runtime condition.
    pub fn new(side_lengths: Vec3, periodic: [bool; 3]) -> Self {
        assert!(
            side_lengths.x > 0.0 && side_lengths.y > 0.0 && side_lengths.z > 0.0,
            "simulation box sides must be positive, got {:?}",
            side_lengths
        );
        Self {
            side_lengths,
            half_lengths: side_lengths * 0.5,
            periodic,
        }
    }

    /// Full side lengths
    pub fn side_lengths(&self) -> Vec3 {
        self.side_lengths
    }

    /// Half side lengths (cached for minimum-image math)
    pub fn half_lengths(&self) -> Vec3 {
        self.half_lengths
    }

    /// Whether the given axis (0 = x, 1 = y, 2 = z) wraps periodically
    pub fn is_periodic(&self, axis: usize) -> bool {
        self.periodic[axis]
    }

    /// Apply the minimum-image correction to a displacement vector.
    ///
    /// Along each periodic axis the component is folded into
    /// `[-L/2, +L/2]`; non-periodic axes pass through unchanged.
    pub fn minimum_image(&self, mut dr: Vec3) -> Vec3 {
        for axis in 0..3 {
            if !self.periodic[axis] {
                continue;
            }
            let l = self.side_lengths[axis];
            let half = self.half_lengths[axis];
            let mut d = dr[axis];
            if d > half {
                d -= l * (d / l + 0.5).floor();
            } else if d < -half {
                d -= l * (d / l - 0.5).ceil();
            }
            dr[axis] = d;
        }
        dr
    }

    /// Minimum-image displacement from `b` to `a`.
    pub fn separation(&self, a: Vec3, b: Vec3) -> Vec3 {
        self.minimum_image(a - b)
    }

    /// Fold a position back into the primary box along periodic axes.
    ///
    /// Non-periodic axes are clamped to the box instead, matching the
    /// hard-wall behavior of the host engine at closed faces.
    pub fn wrap_position(&self, mut p: Vec3) -> Vec3 {
        for axis in 0..3 {
            let l = self.side_lengths[axis];
            if self.periodic[axis] {
                p[axis] = p[axis].rem_euclid(l);
            } else {
                p[axis] = p[axis].clamp(0.0, l);
            }
        }
        p
    }
}

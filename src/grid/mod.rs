//! Uniform spatial grid for neighbor search and short-range forces.
//!
//! The grid partitions the simulation box into fixed-width cells, tracks
//! which cell owns each free bond, accumulates the short-range repulsion
//! between free bonds, and provides the two candidate-search primitives
//! used by the kinetic events (nucleation and polymerisation search).
//!
//! Pair enumeration uses the classic cell-list scheme: all unordered pairs
//! inside one cell, plus each cell against its forward half-shell of
//! neighbors, which visits every cross-cell pair exactly once per sweep.
//!
//! Reference: Allen & Tildesley, Computer Simulation of Liquids, 1987

mod cell;

pub use cell::{Cell, CellId};

use glam::Vec3;
use rand::prelude::*;

use crate::space::SimulationBox;
use crate::state::{ActiveBond, BeadStore, BondArena, BondId};

/// Parameters of the pairwise short-range repulsion
#[derive(Debug, Clone, Copy)]
pub struct RepulsionParams {
    /// Force coefficient `a` in F = a·(1/r − 1/r_c)
    pub coefficient: f32,
    /// Cutoff radius r_c (length units); must not exceed the cell width
    pub cutoff: f32,
}

impl Default for RepulsionParams {
    fn default() -> Self {
        Self {
            coefficient: 25.0,
            cutoff: 2.0,
        }
    }
}

/// Counters produced by one full force sweep
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepStats {
    /// Unordered pairs examined
    pub pairs_tested: u64,
    /// Pairs found within the cutoff (force applied)
    pub pairs_in_range: u64,
}

/// The full cell grid
#[derive(Debug, Clone)]
pub struct CellGrid {
    /// Cells per axis; a z-extent of 1 makes the grid two-dimensional
    dims: [u32; 3],
    /// Fixed cell width (length units)
    cell_width: f32,
    cells: Vec<Cell>,
    /// Owning cell per bond id; None for bound (or not yet inserted) bonds
    bond_cell: Vec<Option<CellId>>,
}

impl CellGrid {
    /// Build the grid and resolve all neighbor wiring.
    ///
    /// Periodic axes must have at least three cells, so that a cell never
    /// wraps onto itself or sees the same neighbor twice (which would
    /// double-count pairs in the forward sweep).
    pub fn new(dims: [u32; 3], cell_width: f32, periodic: [bool; 3]) -> Self {
        assert!(cell_width > 0.0, "cell width must be positive");
        for axis in 0..3 {
            assert!(dims[axis] >= 1, "grid must have at least one cell per axis");
            assert!(
                !(periodic[axis] && dims[axis] < 3),
                "periodic axis {} needs >= 3 cells for exact-once pair wrapping",
                axis
            );
        }

        let two_d = dims[2] == 1;
        let cell_count = (dims[0] * dims[1] * dims[2]) as usize;
        let mut cells = Vec::with_capacity(cell_count);

        for z in 0..dims[2] {
            for y in 0..dims[1] {
                for x in 0..dims[0] {
                    let id = Self::index(dims, [x, y, z]);
                    let lower = Vec3::new(
                        x as f32 * cell_width,
                        y as f32 * cell_width,
                        z as f32 * cell_width,
                    );
                    let upper = lower + Vec3::splat(cell_width);
                    cells.push(Cell::new(id, [x, y, z], lower, upper));
                }
            }
        }

        let mut grid = Self {
            dims,
            cell_width,
            cells,
            bond_cell: Vec::new(),
        };
        grid.wire_neighbours(periodic, two_d);

        log::info!(
            "cell grid built: {}x{}x{} cells, width {}, {}",
            dims[0],
            dims[1],
            dims[2],
            cell_width,
            if two_d { "2D wiring" } else { "3D wiring" }
        );
        grid
    }

    fn index(dims: [u32; 3], coords: [u32; 3]) -> CellId {
        coords[0] + dims[0] * (coords[1] + dims[1] * coords[2])
    }

    /// Resolve full and forward neighbor lists for every cell.
    ///
    /// The forward half-shell keeps exactly one offset of each ± pair:
    /// dz > 0, or dz == 0 and dy > 0, or dz == dy == 0 and dx > 0.
    fn wire_neighbours(&mut self, periodic: [bool; 3], two_d: bool) {
        let dims = self.dims;
        let z_range: &[i32] = if two_d { &[0] } else { &[-1, 0, 1] };

        for idx in 0..self.cells.len() {
            let coords = self.cells[idx].coords;
            let mut neighbours = Vec::new();
            let mut forward = Vec::new();

            for &dz in z_range {
                for dy in -1..=1i32 {
                    for dx in -1..=1i32 {
                        if dx == 0 && dy == 0 && dz == 0 {
                            continue;
                        }
                        let Some(target) =
                            Self::offset_cell(dims, periodic, coords, [dx, dy, dz])
                        else {
                            continue;
                        };
                        neighbours.push(target);
                        let is_forward =
                            dz > 0 || (dz == 0 && (dy > 0 || (dy == 0 && dx > 0)));
                        if is_forward {
                            forward.push(target);
                        }
                    }
                }
            }

            self.cells[idx].set_wiring(neighbours, forward);
        }
    }

    /// Resolve an integer offset from a cell, honoring periodic wrap.
    /// Returns None when the offset leaves the grid along a closed axis.
    fn offset_cell(
        dims: [u32; 3],
        periodic: [bool; 3],
        coords: [u32; 3],
        offset: [i32; 3],
    ) -> Option<CellId> {
        let mut target = [0u32; 3];
        for axis in 0..3 {
            let n = dims[axis] as i32;
            let c = coords[axis] as i32 + offset[axis];
            if c < 0 || c >= n {
                if !periodic[axis] || n == 1 {
                    return None;
                }
                target[axis] = c.rem_euclid(n) as u32;
            } else {
                target[axis] = c as u32;
            }
        }
        Some(Self::index(dims, target))
    }

    pub fn dims(&self) -> [u32; 3] {
        self.dims
    }

    pub fn cell_width(&self) -> f32 {
        self.cell_width
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id as usize]
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Cell containing the given position (assumed inside the box)
    pub fn cell_index_for(&self, position: Vec3) -> CellId {
        let mut coords = [0u32; 3];
        for axis in 0..3 {
            let n = self.dims[axis];
            let c = (position[axis] / self.cell_width).floor() as i64;
            coords[axis] = c.clamp(0, n as i64 - 1) as u32;
        }
        Self::index(self.dims, coords)
    }

    /// Owning cell of a free bond; None for bound bonds
    pub fn cell_of_bond(&self, bond: BondId) -> Option<CellId> {
        self.bond_cell.get(bond as usize).copied().flatten()
    }

    /// Put a free bond into the pool of the cell containing `position`
    pub fn insert_free_bond(&mut self, bond: BondId, position: Vec3) {
        let cell = self.cell_index_for(position);
        if self.bond_cell.len() <= bond as usize {
            self.bond_cell.resize(bond as usize + 1, None);
        }
        assert!(
            self.bond_cell[bond as usize].is_none(),
            "bond {} is already pooled",
            bond
        );
        self.cells[cell as usize].add_bond(bond);
        self.bond_cell[bond as usize] = Some(cell);
    }

    /// Remove a free bond from its pool (capture or teardown).
    /// Panics if the bond is not pooled: that is a double-claim.
    pub fn remove_free_bond(&mut self, bond: BondId) {
        let cell = self.bond_cell[bond as usize]
            .take()
            .unwrap_or_else(|| panic!("bond {} is not in any cell pool", bond));
        self.cells[cell as usize].remove_bond(bond);
    }

    /// Re-home every pooled bond whose bead has drifted into another cell
    pub fn update_membership(&mut self, bonds: &BondArena, beads: &BeadStore) {
        for bond_idx in 0..self.bond_cell.len() {
            let Some(current) = self.bond_cell[bond_idx] else {
                continue;
            };
            let bond = bond_idx as BondId;
            let target = self.cell_index_for(bonds.get(bond).position(beads));
            if target != current {
                self.cells[current as usize].remove_bond(bond);
                self.cells[target as usize].add_bond(bond);
                self.bond_cell[bond_idx] = Some(target);
            }
        }
    }

    /// One full short-range repulsion sweep over every cell.
    ///
    /// Applies F = a·(1/r − 1/r_c) along the separation unit vector,
    /// repulsive and equal-and-opposite on the two bonds' head beads.
    /// Intra-cell pairs use the raw displacement (a cell never spans a
    /// periodic image); cross-cell pairs use the minimum image so boundary
    /// cells interact across periodic faces.
    pub fn accumulate_repulsions(
        &self,
        bonds: &BondArena,
        beads: &mut BeadStore,
        simbox: &SimulationBox,
        params: &RepulsionParams,
    ) -> SweepStats {
        let mut stats = SweepStats::default();
        let cutoff_sq = params.cutoff * params.cutoff;

        for cell in &self.cells {
            let pool = cell.pool();

            // All unordered pairs within this cell, once
            for i in 0..pool.len() {
                for j in (i + 1)..pool.len() {
                    let dr = bonds.get(pool[i]).position(beads)
                        - bonds.get(pool[j]).position(beads);
                    stats.pairs_tested += 1;
                    Self::apply_pair_force(
                        bonds, beads, params, cutoff_sq, pool[i], pool[j], dr, &mut stats,
                    );
                }
            }

            // Forward neighbors only: each cross-cell pair exactly once
            for &fwd in cell.forward_neighbours() {
                let other = self.cells[fwd as usize].pool();
                for &a in pool {
                    for &b in other {
                        let dr = simbox.separation(
                            bonds.get(a).position(beads),
                            bonds.get(b).position(beads),
                        );
                        stats.pairs_tested += 1;
                        Self::apply_pair_force(
                            bonds, beads, params, cutoff_sq, a, b, dr, &mut stats,
                        );
                    }
                }
            }
        }

        stats
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_pair_force(
        bonds: &BondArena,
        beads: &mut BeadStore,
        params: &RepulsionParams,
        cutoff_sq: f32,
        a: BondId,
        b: BondId,
        dr: Vec3,
        stats: &mut SweepStats,
    ) {
        let r_sq = dr.length_squared();
        if r_sq >= cutoff_sq || r_sq < 1e-12 {
            return;
        }
        stats.pairs_in_range += 1;

        let r = r_sq.sqrt();
        let magnitude = params.coefficient * (1.0 / r - 1.0 / params.cutoff);
        let force = dr * (magnitude / r);

        beads.add_force(bonds.get(a).head_bead, force);
        beads.add_force(bonds.get(b).head_bead, -force);
    }

    /// Nucleation search: scan only the seed bond's own pool, in pool
    /// order, for another free, non-polymerized, non-phantom bond passing
    /// the caller's activation predicate. Does not mutate bond state.
    pub fn find_nucleation_candidate<F>(
        &self,
        seed: BondId,
        bonds: &BondArena,
        mut accept: F,
    ) -> Option<BondId>
    where
        F: FnMut(&ActiveBond) -> bool,
    {
        let cell = self.cell_of_bond(seed)?;
        for &candidate in self.cells[cell as usize].pool() {
            if candidate == seed {
                continue;
            }
            let bond = bonds.get(candidate);
            if !bond.is_free() || bond.phantom {
                continue;
            }
            if accept(bond) {
                return Some(candidate);
            }
        }
        None
    }

    /// Polymerisation search: gather every free bond of `origin` and its
    /// full neighbor set into one scratch list, shuffle it uniformly, then
    /// return the first bond passing the predicate. The shuffle removes the
    /// systematic bias toward bonds enumerated first in any one pool.
    /// Does not mutate bond state.
    ///
    /// Capture ranges larger than one cell width can miss candidates; size
    /// the grid so the cell width covers the largest event range.
    pub fn find_polymerisation_candidate<F>(
        &self,
        origin: CellId,
        bonds: &BondArena,
        rng: &mut StdRng,
        mut accept: F,
    ) -> Option<BondId>
    where
        F: FnMut(&ActiveBond) -> bool,
    {
        let origin_cell = &self.cells[origin as usize];
        let mut scratch: Vec<BondId> = origin_cell.pool().to_vec();
        for &n in origin_cell.neighbours() {
            scratch.extend_from_slice(self.cells[n as usize].pool());
        }

        scratch.shuffle(rng);

        for candidate in scratch {
            let bond = bonds.get(candidate);
            if !bond.is_free() || bond.phantom {
                continue;
            }
            if accept(bond) {
                return Some(candidate);
            }
        }
        None
    }
}

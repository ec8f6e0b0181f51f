//! A single cell of the spatial grid.
//!
//! Each cell is a fixed axis-aligned box owning the pool of currently-free
//! active bonds whose representative bead lies inside it, plus the resolved
//! indices of its geometric neighbors. The neighbor lists are sized for the
//! grid's dimensionality at construction (26 full / 13 forward in 3D,
//! 8 / 4 in 2D) and never change afterwards. At non-periodic boundaries the
//! lists are genuinely shorter; a missing neighbor is absent from the list,
//! never a null slot.

use glam::Vec3;

use crate::state::BondId;

/// Stable index of a cell in the grid
pub type CellId = u32;

/// One fixed partition of the simulation box
#[derive(Debug, Clone)]
pub struct Cell {
    /// Grid index of this cell
    pub id: CellId,
    /// Integer grid coordinates (x, y, z)
    pub coords: [u32; 3],
    /// Lower spatial corner
    pub lower: Vec3,
    /// Upper spatial corner
    pub upper: Vec3,
    /// Free bonds currently inside this cell
    pool: Vec<BondId>,
    /// All geometric neighbors (full set, self excluded)
    neighbours: Vec<CellId>,
    /// Forward subset used for cross-cell pair sweeps without double
    /// counting
    forward: Vec<CellId>,
}

impl Cell {
    pub(crate) fn new(id: CellId, coords: [u32; 3], lower: Vec3, upper: Vec3) -> Self {
        Self {
            id,
            coords,
            lower,
            upper,
            pool: Vec::new(),
            neighbours: Vec::new(),
            forward: Vec::new(),
        }
    }

    pub(crate) fn set_wiring(&mut self, neighbours: Vec<CellId>, forward: Vec<CellId>) {
        self.neighbours = neighbours;
        self.forward = forward;
    }

    /// The free bonds currently owned by this cell, in pool order
    pub fn pool(&self) -> &[BondId] {
        &self.pool
    }

    /// Full neighbor set
    pub fn neighbours(&self) -> &[CellId] {
        &self.neighbours
    }

    /// De-duplicated forward neighbor subset
    pub fn forward_neighbours(&self) -> &[CellId] {
        &self.forward
    }

    pub fn contains_bond(&self, bond: BondId) -> bool {
        self.pool.contains(&bond)
    }

    pub(crate) fn add_bond(&mut self, bond: BondId) {
        debug_assert!(
            !self.pool.contains(&bond),
            "bond {} already in cell {} pool",
            bond,
            self.id
        );
        self.pool.push(bond);
    }

    /// Remove a bond from the pool. Panics if it is not there: a removal of
    /// an absent bond means two owners believed they held it.
    pub(crate) fn remove_bond(&mut self, bond: BondId) {
        let idx = self
            .pool
            .iter()
            .position(|&b| b == bond)
            .unwrap_or_else(|| panic!("bond {} is not in cell {} pool", bond, self.id));
        self.pool.swap_remove(idx);
    }
}

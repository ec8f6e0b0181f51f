//! Active bonds: the monomer-scale units of filament assembly.
//!
//! An active bond wraps two physical beads (head and tail) and carries the
//! chain-adjacency links that make up a polymer. A bond is either free
//! (sitting in exactly one spatial cell's pool, available for capture) or
//! bound into exactly one polymer; never both. Phantom bonds are
//! bookkeeping placeholders that keep the free-monomer density constant
//! and are skipped by every binding search.

use glam::Vec3;

use super::bead::{BeadId, BeadStore};

/// Stable index of an active bond in the arena
pub type BondId = u32;

/// One monomer-scale unit
#[derive(Debug, Clone)]
pub struct ActiveBond {
    /// Arena index of this bond
    pub id: BondId,
    /// True once the bond is part of a chain (or claimed by a capture)
    pub polymerized: bool,
    /// Placeholder flag; phantom bonds never participate in binding
    pub phantom: bool,
    /// Adjacent bond toward the polymer head, if bound
    pub head_link: Option<BondId>,
    /// Adjacent bond toward the polymer tail, if bound
    pub tail_link: Option<BondId>,
    /// Leading bead; its position is the bond's representative position
    pub head_bead: BeadId,
    /// Trailing bead
    pub tail_bead: BeadId,
}

impl ActiveBond {
    fn new(id: BondId, head_bead: BeadId, tail_bead: BeadId) -> Self {
        Self {
            id,
            polymerized: false,
            phantom: false,
            head_link: None,
            tail_link: None,
            head_bead,
            tail_bead,
        }
    }

    /// A bond is free when it is not part of (or claimed by) a chain
    pub fn is_free(&self) -> bool {
        !self.polymerized
    }

    /// Representative position used for cell membership and searches
    pub fn position(&self, beads: &BeadStore) -> Vec3 {
        beads.position(self.head_bead)
    }

    /// Local axis of the bond, from tail bead to head bead (not normalized)
    pub fn axis(&self, beads: &BeadStore) -> Vec3 {
        beads.position(self.head_bead) - beads.position(self.tail_bead)
    }
}

/// Arena holding every active bond for the lifetime of the simulation
#[derive(Debug, Clone, Default)]
pub struct BondArena {
    bonds: Vec<ActiveBond>,
}

impl BondArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bond over the given bead pair and return its id
    pub fn create(&mut self, head_bead: BeadId, tail_bead: BeadId) -> BondId {
        let id = self.bonds.len() as BondId;
        self.bonds.push(ActiveBond::new(id, head_bead, tail_bead));
        id
    }

    pub fn len(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty()
    }

    pub fn get(&self, id: BondId) -> &ActiveBond {
        &self.bonds[id as usize]
    }

    pub fn get_mut(&mut self, id: BondId) -> &mut ActiveBond {
        &mut self.bonds[id as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveBond> {
        self.bonds.iter()
    }

    /// Number of bonds currently free (and not phantom-parked)
    pub fn free_count(&self) -> usize {
        self.bonds.iter().filter(|b| b.is_free() && !b.phantom).count()
    }
}

//! Active polymers: ordered chains of active bonds.
//!
//! A polymer is created by nucleation from exactly two free bonds and
//! afterwards grows or shrinks only at its ends. The chain itself lives in
//! the bonds' adjacency links; the polymer records the two end bonds and
//! walks the links for everything else. Chain mutations check their
//! preconditions loudly: a violated link invariant is a scheduling bug,
//! never a physical outcome.

use super::bond::{BondArena, BondId};

/// Stable index of a polymer in the arena
pub type PolymerId = u32;

/// An ordered chain of active bonds with a head end and a tail end
#[derive(Debug, Clone)]
pub struct ActivePolymer {
    /// Arena index of this polymer
    pub id: PolymerId,
    /// Bond at the growing head end
    pub head: BondId,
    /// Bond at the tail end
    pub tail: BondId,
    /// Mutual-exclusion flag set by cone-restricted growth events while a
    /// capture is in flight, so the contra-end event defers
    pub capture_guard: bool,
}

impl ActivePolymer {
    /// Walk the chain from tail to head, collecting bond ids in order
    pub fn chain<'a>(&self, bonds: &'a BondArena) -> Vec<BondId> {
        let mut out = Vec::new();
        let mut current = Some(self.tail);
        while let Some(id) = current {
            out.push(id);
            if id == self.head {
                return out;
            }
            current = bonds.get(id).head_link;
            assert!(
                out.len() <= bonds.len(),
                "polymer {} chain does not terminate at its head (cycle?)",
                self.id
            );
        }
        panic!(
            "polymer {} chain broke before reaching head bond {}",
            self.id, self.head
        );
    }

    /// Number of bonds in the chain
    pub fn length(&self, bonds: &BondArena) -> usize {
        self.chain(bonds).len()
    }

    pub fn contains(&self, bonds: &BondArena, bond: BondId) -> bool {
        self.chain(bonds).contains(&bond)
    }

    /// Attach a captured bond as the new head.
    ///
    /// The bond must already be marked polymerized (claimed at capture
    /// time) and carry no links.
    pub fn attach_head(&mut self, bonds: &mut BondArena, bond: BondId) {
        {
            let b = bonds.get(bond);
            assert!(
                b.polymerized && b.head_link.is_none() && b.tail_link.is_none(),
                "bond {} is not a claimed, unlinked candidate",
                bond
            );
        }
        let old_head = self.head;
        assert!(
            bonds.get(old_head).head_link.is_none(),
            "head bond {} of polymer {} already has a head link",
            old_head,
            self.id
        );
        bonds.get_mut(old_head).head_link = Some(bond);
        bonds.get_mut(bond).tail_link = Some(old_head);
        self.head = bond;
    }

    /// Attach a captured bond as the new tail.
    pub fn attach_tail(&mut self, bonds: &mut BondArena, bond: BondId) {
        {
            let b = bonds.get(bond);
            assert!(
                b.polymerized && b.head_link.is_none() && b.tail_link.is_none(),
                "bond {} is not a claimed, unlinked candidate",
                bond
            );
        }
        let old_tail = self.tail;
        assert!(
            bonds.get(old_tail).tail_link.is_none(),
            "tail bond {} of polymer {} already has a tail link",
            old_tail,
            self.id
        );
        bonds.get_mut(old_tail).tail_link = Some(bond);
        bonds.get_mut(bond).head_link = Some(old_tail);
        self.tail = bond;
    }

    /// The interior neighbor of the given end bond, used for the local
    /// filament axis of cone-restricted growth
    pub fn interior_neighbour(&self, bonds: &BondArena, end: BondId) -> BondId {
        if end == self.head {
            bonds
                .get(end)
                .tail_link
                .expect("head bond of a polymer must have a tail link")
        } else if end == self.tail {
            bonds
                .get(end)
                .head_link
                .expect("tail bond of a polymer must have a head link")
        } else {
            panic!("bond {} is not an end of polymer {}", end, self.id)
        }
    }
}

/// Arena of live polymers; dissolved slots are reused
#[derive(Debug, Clone, Default)]
pub struct PolymerArena {
    slots: Vec<Option<ActivePolymer>>,
}

impl PolymerArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a polymer from two already-linked bonds (tail, head)
    pub fn create(&mut self, bonds: &BondArena, tail: BondId, head: BondId) -> PolymerId {
        assert_eq!(
            bonds.get(tail).head_link,
            Some(head),
            "nucleation pair {}→{} is not linked tail-to-head",
            tail,
            head
        );
        assert_eq!(bonds.get(head).tail_link, Some(tail));

        let polymer = |id| ActivePolymer {
            id,
            head,
            tail,
            capture_guard: false,
        };

        if let Some(idx) = self.slots.iter().position(Option::is_none) {
            let id = idx as PolymerId;
            self.slots[idx] = Some(polymer(id));
            id
        } else {
            let id = self.slots.len() as PolymerId;
            self.slots.push(Some(polymer(id)));
            id
        }
    }

    /// Remove a polymer, returning it for chain teardown.
    ///
    /// Panics if the polymer was already dissolved.
    pub fn remove(&mut self, id: PolymerId) -> ActivePolymer {
        self.slots[id as usize]
            .take()
            .unwrap_or_else(|| panic!("polymer {} was already dissolved", id))
    }

    pub fn get(&self, id: PolymerId) -> &ActivePolymer {
        self.slots[id as usize]
            .as_ref()
            .unwrap_or_else(|| panic!("polymer {} is dissolved", id))
    }

    pub fn get_mut(&mut self, id: PolymerId) -> &mut ActivePolymer {
        self.slots[id as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("polymer {} is dissolved", id))
    }

    pub fn is_live(&self, id: PolymerId) -> bool {
        self.slots
            .get(id as usize)
            .map_or(false, Option::is_some)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivePolymer> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Number of live polymers
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Link two fresh bonds tail→head and return (arena, tail, head)
    fn nucleated_pair() -> (BondArena, BondId, BondId) {
        let mut bonds = BondArena::new();
        let tail = bonds.create(0, 1);
        let head = bonds.create(2, 3);
        bonds.get_mut(tail).polymerized = true;
        bonds.get_mut(head).polymerized = true;
        bonds.get_mut(tail).head_link = Some(head);
        bonds.get_mut(head).tail_link = Some(tail);
        (bonds, tail, head)
    }

    #[test]
    fn test_create_two_bond_polymer() {
        let (bonds, tail, head) = nucleated_pair();
        let mut polymers = PolymerArena::new();
        let id = polymers.create(&bonds, tail, head);

        let p = polymers.get(id);
        assert_eq!(p.length(&bonds), 2);
        assert_eq!(p.chain(&bonds), vec![tail, head]);
    }

    #[test]
    fn test_attach_head_extends_chain() {
        let (mut bonds, tail, head) = nucleated_pair();
        let mut polymers = PolymerArena::new();
        let id = polymers.create(&bonds, tail, head);

        let cand = bonds.create(4, 5);
        bonds.get_mut(cand).polymerized = true;

        polymers.get_mut(id).attach_head(&mut bonds, cand);

        let p = polymers.get(id);
        assert_eq!(p.head, cand);
        assert_eq!(p.length(&bonds), 3);
        assert_eq!(bonds.get(head).head_link, Some(cand));
        assert_eq!(bonds.get(cand).tail_link, Some(head));
    }

    #[test]
    fn test_attach_tail_extends_chain() {
        let (mut bonds, tail, head) = nucleated_pair();
        let mut polymers = PolymerArena::new();
        let id = polymers.create(&bonds, tail, head);

        let cand = bonds.create(4, 5);
        bonds.get_mut(cand).polymerized = true;

        polymers.get_mut(id).attach_tail(&mut bonds, cand);

        let p = polymers.get(id);
        assert_eq!(p.tail, cand);
        assert_eq!(p.chain(&bonds), vec![cand, tail, head]);
    }

    #[test]
    #[should_panic]
    fn test_attach_unclaimed_bond_panics() {
        let (mut bonds, tail, head) = nucleated_pair();
        let mut polymers = PolymerArena::new();
        let id = polymers.create(&bonds, tail, head);

        // Candidate was never marked polymerized: scheduling bug
        let cand = bonds.create(4, 5);
        polymers.get_mut(id).attach_head(&mut bonds, cand);
    }

    #[test]
    fn test_interior_neighbour() {
        let (mut bonds, tail, head) = nucleated_pair();
        let mut polymers = PolymerArena::new();
        let id = polymers.create(&bonds, tail, head);

        assert_eq!(polymers.get(id).interior_neighbour(&bonds, head), tail);
        assert_eq!(polymers.get(id).interior_neighbour(&bonds, tail), head);

        let cand = bonds.create(4, 5);
        bonds.get_mut(cand).polymerized = true;
        polymers.get_mut(id).attach_head(&mut bonds, cand);
        assert_eq!(polymers.get(id).interior_neighbour(&bonds, cand), head);
    }

    #[test]
    fn test_slot_reuse_after_dissolve() {
        let (bonds, tail, head) = nucleated_pair();
        let mut polymers = PolymerArena::new();
        let first = polymers.create(&bonds, tail, head);
        polymers.remove(first);
        assert!(!polymers.is_live(first));

        let second = polymers.create(&bonds, tail, head);
        assert_eq!(second, first, "dissolved slot should be reused");
        assert_eq!(polymers.len(), 1);
    }
}

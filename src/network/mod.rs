//! The Active Cell Network: orchestration of grid, arenas and events.
//!
//! `NetworkState` owns the simulation box, the cell grid, the bead/bond/
//! polymer arenas and the RNG, and provides the accessors the kinetic
//! events use (bond→cell lookup, pool add/remove, polymer creation).
//! `ActiveCellNetwork` wraps the state together with the live events and
//! drives one simulation step: membership refresh, one repulsion sweep
//! over every cell, then one advancement of every live event.
//!
//! Scheduling is single-threaded and step-synchronous. Correctness under
//! overlapping candidate pools rests on pool removal at capture time, not
//! on event ordering: once an event claims a bond it is gone from every
//! pool, so later searches in the same step cannot re-select it.

use glam::Vec3;
use rand::prelude::*;
use rand_distr::UnitSphere;
use serde::Serialize;

use crate::config::Parameters;
use crate::grid::{CellGrid, RepulsionParams, SweepStats};
use crate::kinetics::{EventStatus, GrowthEnd, KineticEvent, ParamError};
use crate::space::SimulationBox;
use crate::state::{BeadStore, BondArena, BondId, PolymerArena, PolymerId};

/// Everything the network owns apart from the events themselves.
///
/// Events receive `&mut NetworkState` each step; keeping the event list
/// outside lets an event mutate the state it is embedded in.
#[derive(Debug)]
pub struct NetworkState {
    pub simbox: SimulationBox,
    pub grid: CellGrid,
    pub beads: BeadStore,
    pub bonds: BondArena,
    pub polymers: PolymerArena,
    pub rng: StdRng,
    pub repulsion: RepulsionParams,
    /// Steps completed
    pub step_count: u64,
    /// Pair counters from the most recent force sweep
    pub last_sweep: SweepStats,
    /// Growth captures committed into a polymer
    pub commit_count: u64,
    /// Growth captures released after timeout
    pub release_count: u64,
    /// Polymers created by nucleation
    pub nucleation_count: u64,
}

impl NetworkState {
    fn from_parameters(params: &Parameters) -> Result<Self, ParamError> {
        params.validate()?;

        let dims = params.grid.cells_per_axis;
        let width = params.grid.cell_width;
        let side_lengths = Vec3::new(
            dims[0] as f32 * width,
            dims[1] as f32 * width,
            dims[2] as f32 * width,
        );
        let simbox = SimulationBox::new(side_lengths, params.grid.periodic);
        let grid = CellGrid::new(dims, width, params.grid.periodic);

        let mut rng = StdRng::seed_from_u64(params.population.seed);
        let mut placements = Vec::with_capacity(params.population.bond_count as usize);
        for _ in 0..params.population.bond_count {
            let head = Vec3::new(
                rng.gen::<f32>() * side_lengths.x,
                rng.gen::<f32>() * side_lengths.y,
                rng.gen::<f32>() * side_lengths.z,
            );
            let dir: [f32; 3] = UnitSphere.sample(&mut rng);
            let tail = head - Vec3::from_array(dir) * params.population.bond_extent;
            placements.push((head, tail));
        }

        let mut state = Self {
            simbox,
            grid,
            beads: BeadStore::new(),
            bonds: BondArena::new(),
            polymers: PolymerArena::new(),
            rng,
            repulsion: RepulsionParams {
                coefficient: params.forces.repulsion_coefficient,
                cutoff: params.forces.repulsion_cutoff,
            },
            step_count: 0,
            last_sweep: SweepStats::default(),
            commit_count: 0,
            release_count: 0,
            nucleation_count: 0,
        };

        for (head, tail) in placements {
            state.spawn_free_bond(head, tail);
        }

        log::info!(
            "network populated: {} free bonds over {} cells",
            state.bonds.len(),
            state.grid.cell_count()
        );
        Ok(state)
    }

    /// Create a free bond from a new bead pair and pool it
    pub fn spawn_free_bond(&mut self, head_pos: Vec3, tail_pos: Vec3) -> BondId {
        let head_pos = self.simbox.wrap_position(head_pos);
        let tail_pos = self.simbox.wrap_position(tail_pos);
        let head_bead = self.beads.push(head_pos);
        let tail_bead = self.beads.push(tail_pos);
        let bond = self.bonds.create(head_bead, tail_bead);
        self.grid.insert_free_bond(bond, head_pos);
        bond
    }

    /// Representative position of a bond (its head bead)
    pub fn bond_position(&self, bond: BondId) -> Vec3 {
        self.bonds.get(bond).position(&self.beads)
    }

    /// Claim a candidate: mark it polymerized and remove it from its pool.
    ///
    /// Panics if the bond is not a free, pooled, non-phantom bond: that
    /// means two events claimed it in the same step, a scheduling bug.
    pub fn capture_candidate(&mut self, bond: BondId) {
        {
            let b = self.bonds.get(bond);
            assert!(
                b.is_free() && !b.phantom,
                "bond {} is not capturable (polymerized={}, phantom={})",
                bond,
                b.polymerized,
                b.phantom
            );
        }
        self.grid.remove_free_bond(bond);
        self.bonds.get_mut(bond).polymerized = true;
    }

    /// Undo a claim: clear the polymerized flag and pool the bond again at
    /// its current position. The bond must be unlinked.
    pub fn release_candidate(&mut self, bond: BondId) {
        {
            let b = self.bonds.get(bond);
            assert!(
                b.polymerized && b.head_link.is_none() && b.tail_link.is_none(),
                "bond {} is not a releasable claimed candidate",
                bond
            );
        }
        self.bonds.get_mut(bond).polymerized = false;
        let pos = self.bond_position(bond);
        self.grid.insert_free_bond(bond, pos);
        self.release_count += 1;
    }

    /// Commit a claimed candidate onto the given polymer end
    pub fn attach_to_polymer(&mut self, polymer: PolymerId, end: GrowthEnd, bond: BondId) {
        let Self {
            ref mut polymers,
            ref mut bonds,
            ..
        } = *self;
        let p = polymers.get_mut(polymer);
        match end {
            GrowthEnd::Head => p.attach_head(bonds, bond),
            GrowthEnd::Tail => p.attach_tail(bonds, bond),
        }
        self.commit_count += 1;
        log::debug!("bond {} committed to polymer {} {:?}", bond, polymer, end);
    }

    /// Register a freshly nucleated two-bond chain as a polymer
    pub fn create_polymer(&mut self, tail: BondId, head: BondId) -> PolymerId {
        let id = self.polymers.create(&self.bonds, tail, head);
        self.nucleation_count += 1;
        log::debug!("polymer {} nucleated from bonds {} and {}", id, tail, head);
        id
    }

    /// Depolymerization boundary: tear a polymer down and return every
    /// bond to the free pools.
    ///
    /// Any event still tending this polymer must be aborted first; use
    /// [`ActiveCellNetwork::dissolve_polymer`] for that.
    pub fn dissolve_polymer_state(&mut self, polymer: PolymerId) {
        let p = self.polymers.remove(polymer);
        let chain = p.chain(&self.bonds);
        for bond in chain {
            {
                let b = self.bonds.get_mut(bond);
                b.head_link = None;
                b.tail_link = None;
                b.polymerized = false;
            }
            let pos = self.bond_position(bond);
            self.grid.insert_free_bond(bond, pos);
        }
        log::debug!("polymer {} dissolved", polymer);
    }

    /// Park or unpark a bond as a phantom placeholder. Phantom bonds stay
    /// pooled for density bookkeeping but are skipped by every search.
    pub fn set_phantom(&mut self, bond: BondId, phantom: bool) {
        assert!(
            self.bonds.get(bond).is_free(),
            "only free bonds can change phantom state"
        );
        self.bonds.get_mut(bond).phantom = phantom;
    }

    /// Advance the stand-in Brownian integrator by one step, consuming
    /// the accumulated forces
    pub fn integrate_brownian(&mut self, settings: &crate::state::BrownianSettings) {
        let Self {
            ref mut beads,
            ref simbox,
            ref mut rng,
            ..
        } = *self;
        beads.integrate_brownian(simbox, settings, rng);
    }

    /// Re-home pooled bonds whose beads drifted across cell faces
    pub fn refresh_membership(&mut self) {
        let Self {
            ref mut grid,
            ref bonds,
            ref beads,
            ..
        } = *self;
        grid.update_membership(bonds, beads);
    }

    /// One repulsion sweep over every cell
    pub fn accumulate_forces(&mut self) -> SweepStats {
        let Self {
            ref grid,
            ref bonds,
            ref mut beads,
            ref simbox,
            ref repulsion,
            ..
        } = *self;
        grid.accumulate_repulsions(bonds, beads, simbox, repulsion)
    }

    /// Free (non-phantom) bonds available for capture
    pub fn free_bond_count(&self) -> usize {
        self.bonds.free_count()
    }

    /// Mean chain length over live polymers
    pub fn mean_polymer_length(&self) -> f32 {
        let mut total = 0usize;
        let mut count = 0usize;
        for p in self.polymers.iter() {
            total += p.length(&self.bonds);
            count += 1;
        }
        if count == 0 {
            0.0
        } else {
            total as f32 / count as f32
        }
    }

    /// Longest live chain
    pub fn longest_polymer(&self) -> usize {
        self.polymers
            .iter()
            .map(|p| p.length(&self.bonds))
            .max()
            .unwrap_or(0)
    }
}

/// Snapshot of network observables for logging and export
#[derive(Debug, Clone, Serialize)]
pub struct NetworkMetrics {
    pub step: u64,
    pub free_bonds: usize,
    pub phantom_bonds: usize,
    pub polymer_count: usize,
    pub mean_polymer_length: f32,
    pub longest_polymer: usize,
    pub live_events: usize,
    pub captures_in_flight: usize,
    pub commits: u64,
    pub releases: u64,
    pub nucleations: u64,
    pub pairs_tested: u64,
    pub pairs_in_range: u64,
}

/// The complete Active Cell Network: state plus live kinetic events
pub struct ActiveCellNetwork {
    pub state: NetworkState,
    events: Vec<Box<dyn KineticEvent>>,
}

impl ActiveCellNetwork {
    /// Build the grid and bead/bond population from validated parameters
    pub fn new(params: &Parameters) -> Result<Self, ParamError> {
        Ok(Self {
            state: NetworkState::from_parameters(params)?,
            events: Vec::new(),
        })
    }

    pub fn add_event(&mut self, event: Box<dyn KineticEvent>) {
        self.events.push(event);
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn events(&self) -> impl Iterator<Item = &dyn KineticEvent> {
        self.events.iter().map(|e| &**e)
    }

    /// One simulation step: refresh cell membership, accumulate pairwise
    /// repulsions, then advance every live event once. Events returning
    /// [`EventStatus::Retired`] are dropped.
    pub fn step(&mut self) {
        self.state.refresh_membership();
        self.state.last_sweep = self.state.accumulate_forces();

        let state = &mut self.state;
        self.events
            .retain_mut(|event| matches!(event.step(state), EventStatus::Active));

        self.state.step_count += 1;
    }

    /// Dissolve a polymer, aborting any events still tending it so their
    /// claimed candidates return to the pools
    pub fn dissolve_polymer(&mut self, polymer: PolymerId) {
        let state = &mut self.state;
        self.events.retain_mut(|event| {
            if event.target_polymer() == Some(polymer) {
                event.abort(state);
                false
            } else {
                true
            }
        });
        self.state.dissolve_polymer_state(polymer);
    }

    /// Current observables snapshot
    pub fn metrics(&self) -> NetworkMetrics {
        let s = &self.state;
        NetworkMetrics {
            step: s.step_count,
            free_bonds: s.free_bond_count(),
            phantom_bonds: s.bonds.iter().filter(|b| b.phantom).count(),
            polymer_count: s.polymers.len(),
            mean_polymer_length: s.mean_polymer_length(),
            longest_polymer: s.longest_polymer(),
            live_events: self.events.len(),
            captures_in_flight: self.events.iter().filter(|e| e.is_capturing()).count(),
            commits: s.commit_count,
            releases: s.release_count,
            nucleations: s.nucleation_count,
            pairs_tested: s.last_sweep.pairs_tested,
            pairs_in_range: s.last_sweep.pairs_in_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Parameters;

    fn small_params() -> Parameters {
        let mut params = Parameters::default();
        params.grid.cells_per_axis = [4, 4, 4];
        params.population.bond_count = 20;
        params.dynamics.kbt = 0.0;
        params
    }

    #[test]
    fn test_network_construction_pools_every_bond() {
        let net = ActiveCellNetwork::new(&small_params()).unwrap();

        assert_eq!(net.state.bonds.len(), 20);
        assert_eq!(net.state.beads.len(), 40);
        for bond in net.state.bonds.iter() {
            let cell = net.state.grid.cell_of_bond(bond.id);
            assert!(cell.is_some(), "bond {} is not pooled", bond.id);
        }
    }

    #[test]
    fn test_capture_and_release_round_trip() {
        let mut net = ActiveCellNetwork::new(&small_params()).unwrap();
        let bond = 3;

        net.state.capture_candidate(bond);
        assert!(net.state.bonds.get(bond).polymerized);
        assert!(net.state.grid.cell_of_bond(bond).is_none());

        net.state.release_candidate(bond);
        assert!(net.state.bonds.get(bond).is_free());
        assert!(net.state.grid.cell_of_bond(bond).is_some());
    }

    #[test]
    #[should_panic]
    fn test_double_capture_panics() {
        let mut net = ActiveCellNetwork::new(&small_params()).unwrap();
        net.state.capture_candidate(5);
        net.state.capture_candidate(5);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let mut params = small_params();
        params.forces.repulsion_cutoff = 10.0;
        assert!(ActiveCellNetwork::new(&params).is_err());
    }

    #[test]
    fn test_phantom_requires_free_bond() {
        let mut net = ActiveCellNetwork::new(&small_params()).unwrap();
        net.state.set_phantom(2, true);
        assert!(net.state.bonds.get(2).phantom);
        assert_eq!(net.state.free_bond_count(), 19);
    }
}

//! Forward-cone-restricted binding events.
//!
//! `BondBindsForwardConeToPolymerHead` / `...Tail`: growth kinetics that
//! only accept candidates lying inside a cone around the filament's local
//! axis at the growing end. The axis is defined by the end bond and its
//! interior neighbour; a candidate's direction from the end must fall
//! within the configured half-angle or it is rejected and the search
//! continues.
//!
//! Head- and tail-cone events on the same polymer exclude each other
//! through the polymer's capture guard: while one end has a capture in
//! flight, the contra event stays idle instead of starting its own.
//!
//! Two springs (position and orientation) are active together for the
//! whole attempt, both on the `LinearElapsed` ramp.

use crate::kinetics::{
    ConeParams, EventStatus, GrowthEnd, KineticEvent, SpringRamp, TransientSpring,
};
use crate::network::NetworkState;
use crate::state::{BondId, PolymerId};

struct ConeCapture {
    candidate: BondId,
    position_spring: TransientSpring,
    orientation_spring: TransientSpring,
    countdown: u32,
}

/// Persistent cone-restricted growth event for one polymer end
pub struct BondBindsForwardConeToPolymer {
    end: GrowthEnd,
    polymer: PolymerId,
    params: ConeParams,
    capture: Option<ConeCapture>,
    successes: u64,
    failures: u64,
}

impl BondBindsForwardConeToPolymer {
    pub fn head(polymer: PolymerId, params: ConeParams) -> Self {
        Self::new(GrowthEnd::Head, polymer, params)
    }

    pub fn tail(polymer: PolymerId, params: ConeParams) -> Self {
        Self::new(GrowthEnd::Tail, polymer, params)
    }

    fn new(end: GrowthEnd, polymer: PolymerId, params: ConeParams) -> Self {
        Self {
            end,
            polymer,
            params,
            capture: None,
            successes: 0,
            failures: 0,
        }
    }

    pub fn params(&self) -> &ConeParams {
        &self.params
    }

    fn end_bond(&self, net: &NetworkState) -> BondId {
        let p = net.polymers.get(self.polymer);
        match self.end {
            GrowthEnd::Head => p.head,
            GrowthEnd::Tail => p.tail,
        }
    }

    /// Search restricted to candidates inside the forward cone
    fn search(&self, net: &mut NetworkState) -> Option<BondId> {
        let end_bond = self.end_bond(net);
        let end_pos = net.bond_position(end_bond);
        let interior = net
            .polymers
            .get(self.polymer)
            .interior_neighbour(&net.bonds, end_bond);
        let interior_pos = net.bond_position(interior);

        // Local filament axis, pointing outward from the growth end
        let axis = net.simbox.separation(end_pos, interior_pos);
        let axis_len_sq = axis.length_squared();
        if axis_len_sq < 1e-12 {
            // Degenerate axis this step; no direction to test against
            return None;
        }
        let axis_hat = axis / axis_len_sq.sqrt();

        let binding = self.params.binding();
        let range_sq = binding.capture_range() * binding.capture_range();
        let cos_limit = self.params.cos_half_angle();
        let origin = net.grid.cell_index_for(end_pos);

        let NetworkState {
            ref grid,
            ref bonds,
            ref beads,
            ref simbox,
            ref mut rng,
            ..
        } = *net;
        grid.find_polymerisation_candidate(origin, bonds, rng, |b| {
            let dr = simbox.separation(b.position(beads), end_pos);
            let r_sq = dr.length_squared();
            if r_sq >= range_sq || r_sq < 1e-12 {
                return false;
            }
            dr.dot(axis_hat) >= cos_limit * r_sq.sqrt()
        })
    }

    fn build_springs(
        &self,
        net: &NetworkState,
        candidate: BondId,
    ) -> (TransientSpring, TransientSpring) {
        let end = net.bonds.get(self.end_bond(net));
        let cand = net.bonds.get(candidate);
        let (anchor, inner, outer) = match self.end {
            GrowthEnd::Head => (end.head_bead, cand.tail_bead, cand.head_bead),
            GrowthEnd::Tail => (end.tail_bead, cand.head_bead, cand.tail_bead),
        };
        let binding = self.params.binding();
        let k = binding.spring_constant();
        let rest = binding.rest_length();
        (
            TransientSpring::new(anchor, inner, k, rest, SpringRamp::LinearElapsed),
            TransientSpring::new(anchor, outer, k, 2.0 * rest, SpringRamp::LinearElapsed),
        )
    }
}

impl KineticEvent for BondBindsForwardConeToPolymer {
    fn kind(&self) -> &'static str {
        match self.end {
            GrowthEnd::Head => "BondBindsForwardConeToPolymerHead",
            GrowthEnd::Tail => "BondBindsForwardConeToPolymerTail",
        }
    }

    fn step(&mut self, net: &mut NetworkState) -> EventStatus {
        match self.capture.take() {
            None => {
                // The contra-end event has a capture in flight; defer
                if net.polymers.get(self.polymer).capture_guard {
                    return EventStatus::Active;
                }
                if let Some(candidate) = self.search(net) {
                    net.capture_candidate(candidate);
                    net.polymers.get_mut(self.polymer).capture_guard = true;
                    let (position_spring, orientation_spring) =
                        self.build_springs(net, candidate);
                    self.capture = Some(ConeCapture {
                        candidate,
                        position_spring,
                        orientation_spring,
                        countdown: self.params.binding().duration(),
                    });
                }
            }
            Some(mut cap) => {
                let duration = self.params.binding().duration();
                let completed = duration - cap.countdown + 1;
                cap.position_spring.ramp_to(completed, duration);
                cap.orientation_spring.ramp_to(completed, duration);
                cap.position_spring.apply(&mut net.beads, &net.simbox);
                cap.orientation_spring.apply(&mut net.beads, &net.simbox);
                cap.countdown -= 1;

                if cap.countdown > 0 {
                    self.capture = Some(cap);
                } else {
                    if cap.position_spring.separation(&net.beads, &net.simbox)
                        <= self.params.binding().rest_length()
                    {
                        net.attach_to_polymer(self.polymer, self.end, cap.candidate);
                        self.successes += 1;
                    } else {
                        net.release_candidate(cap.candidate);
                        self.failures += 1;
                    }
                    net.polymers.get_mut(self.polymer).capture_guard = false;
                }
            }
        }
        EventStatus::Active
    }

    fn abort(&mut self, net: &mut NetworkState) {
        if let Some(cap) = self.capture.take() {
            net.release_candidate(cap.candidate);
            net.polymers.get_mut(self.polymer).capture_guard = false;
        }
    }

    fn target_polymer(&self) -> Option<PolymerId> {
        Some(self.polymer)
    }

    fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    fn successes(&self) -> u64 {
        self.successes
    }

    fn failures(&self) -> u64 {
        self.failures
    }

    fn params_tokens(&self) -> String {
        self.params.to_tokens()
    }
}

//! Plain end-binding growth events.
//!
//! `BondBindsToPolymerHead` / `BondBindsToPolymerTail`: the simplest
//! growth kinetics. Each step while idle, the event runs the
//! polymerisation search around its polymer end; a candidate within the
//! capture range is claimed and pulled in by a single transient spring
//! between the end bond's outer bead and the candidate's inner bead. The
//! spring uses the `PerRemainingStep` ramp: weak at first, full strength
//! on the last step of the attempt.

use crate::kinetics::{
    BindingParams, EventStatus, GrowthEnd, KineticEvent, SpringRamp, TransientSpring,
};
use crate::network::NetworkState;
use crate::state::{BondId, PolymerId};

/// Per-attempt capture state
struct Capture {
    candidate: BondId,
    spring: TransientSpring,
    countdown: u32,
}

/// Persistent growth event for one polymer end
pub struct BondBindsToPolymer {
    end: GrowthEnd,
    polymer: PolymerId,
    params: BindingParams,
    capture: Option<Capture>,
    successes: u64,
    failures: u64,
}

impl BondBindsToPolymer {
    pub fn head(polymer: PolymerId, params: BindingParams) -> Self {
        Self::new(GrowthEnd::Head, polymer, params)
    }

    pub fn tail(polymer: PolymerId, params: BindingParams) -> Self {
        Self::new(GrowthEnd::Tail, polymer, params)
    }

    fn new(end: GrowthEnd, polymer: PolymerId, params: BindingParams) -> Self {
        Self {
            end,
            polymer,
            params,
            capture: None,
            successes: 0,
            failures: 0,
        }
    }

    pub fn params(&self) -> &BindingParams {
        &self.params
    }

    fn end_bond(&self, net: &NetworkState) -> BondId {
        let p = net.polymers.get(self.polymer);
        match self.end {
            GrowthEnd::Head => p.head,
            GrowthEnd::Tail => p.tail,
        }
    }

    fn search(&self, net: &mut NetworkState) -> Option<BondId> {
        let end_pos = net.bond_position(self.end_bond(net));
        let origin = net.grid.cell_index_for(end_pos);
        let range_sq = self.params.capture_range() * self.params.capture_range();

        let NetworkState {
            ref grid,
            ref bonds,
            ref beads,
            ref simbox,
            ref mut rng,
            ..
        } = *net;
        grid.find_polymerisation_candidate(origin, bonds, rng, |b| {
            simbox.separation(b.position(beads), end_pos).length_squared() < range_sq
        })
    }

    fn build_spring(&self, net: &NetworkState, candidate: BondId) -> TransientSpring {
        let end = net.bonds.get(self.end_bond(net));
        let cand = net.bonds.get(candidate);
        let (a, b) = match self.end {
            GrowthEnd::Head => (end.head_bead, cand.tail_bead),
            GrowthEnd::Tail => (end.tail_bead, cand.head_bead),
        };
        TransientSpring::new(
            a,
            b,
            self.params.spring_constant(),
            self.params.rest_length(),
            SpringRamp::PerRemainingStep,
        )
    }
}

impl KineticEvent for BondBindsToPolymer {
    fn kind(&self) -> &'static str {
        match self.end {
            GrowthEnd::Head => "BondBindsToPolymerHead",
            GrowthEnd::Tail => "BondBindsToPolymerTail",
        }
    }

    fn step(&mut self, net: &mut NetworkState) -> EventStatus {
        match self.capture.take() {
            None => {
                // Idle: search around the tended end
                if let Some(candidate) = self.search(net) {
                    net.capture_candidate(candidate);
                    let spring = self.build_spring(net, candidate);
                    self.capture = Some(Capture {
                        candidate,
                        spring,
                        countdown: self.params.duration(),
                    });
                }
            }
            Some(mut cap) => {
                let duration = self.params.duration();
                let completed = duration - cap.countdown + 1;
                cap.spring.ramp_to(completed, duration);
                cap.spring.apply(&mut net.beads, &net.simbox);
                cap.countdown -= 1;

                if cap.countdown > 0 {
                    self.capture = Some(cap);
                } else if cap.spring.separation(&net.beads, &net.simbox)
                    <= self.params.rest_length()
                {
                    net.attach_to_polymer(self.polymer, self.end, cap.candidate);
                    self.successes += 1;
                } else {
                    net.release_candidate(cap.candidate);
                    self.failures += 1;
                }
            }
        }
        EventStatus::Active
    }

    fn abort(&mut self, net: &mut NetworkState) {
        if let Some(cap) = self.capture.take() {
            net.release_candidate(cap.candidate);
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

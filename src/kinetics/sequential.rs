//! Sequential two-corner binding events.
//!
//! `BondBindsABSequentiallyToPolymerHead` / `...Tail`: growth kinetics
//! that control both the candidate's position and its orientation, one
//! after the other. Two transient springs are built at capture:
//!
//! - a *position* spring from the end bond's outer bead to the candidate's
//!   inner bead (rest length = configured rest length);
//! - an *orientation* spring from the same outer bead to the candidate's
//!   far bead (rest length = twice the configured rest length), which
//!   lines the candidate up with the chain once it is close.
//!
//! The position spring ramps over the first half of the attempt and then
//! holds; the orientation spring ramps over the second half. Both follow
//! the `LinearElapsed` formula within their window. Commitment is judged
//! on the position spring alone.

use crate::kinetics::{
    BindingParams, EventStatus, GrowthEnd, KineticEvent, SpringRamp, TransientSpring,
};
use crate::network::NetworkState;
use crate::state::{BondId, PolymerId};

struct SeqCapture {
    candidate: BondId,
    position_spring: TransientSpring,
    orientation_spring: TransientSpring,
    countdown: u32,
}

/// Persistent sequential-binding growth event for one polymer end
pub struct BondBindsABSequentiallyToPolymer {
    end: GrowthEnd,
    polymer: PolymerId,
    params: BindingParams,
    capture: Option<SeqCapture>,
    successes: u64,
    failures: u64,
}

impl BondBindsABSequentiallyToPolymer {
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
        let k = self.params.spring_constant();
        let rest = self.params.rest_length();
        (
            TransientSpring::new(anchor, inner, k, rest, SpringRamp::LinearElapsed),
            TransientSpring::new(anchor, outer, k, 2.0 * rest, SpringRamp::LinearElapsed),
        )
    }

    /// Windowed strengths: position over [1, h], orientation over (h, d]
    fn ramp_windows(cap: &mut SeqCapture, completed: u32, duration: u32) {
        let half = (duration + 1) / 2;
        let k_pos = cap.position_spring.final_constant;
        let k_ori = cap.orientation_spring.final_constant;

        if completed <= half {
            cap.position_spring
                .set_strength(k_pos * completed as f32 / half as f32);
            cap.orientation_spring.set_strength(0.0);
        } else {
            cap.position_spring.set_strength(k_pos);
            let window = (duration - half).max(1);
            cap.orientation_spring
                .set_strength(k_ori * (completed - half) as f32 / window as f32);
        }
    }
}

impl KineticEvent for BondBindsABSequentiallyToPolymer {
    fn kind(&self) -> &'static str {
        match self.end {
            GrowthEnd::Head => "BondBindsABSequentiallyToPolymerHead",
            GrowthEnd::Tail => "BondBindsABSequentiallyToPolymerTail",
        }
    }

    fn step(&mut self, net: &mut NetworkState) -> EventStatus {
        match self.capture.take() {
            None => {
                if let Some(candidate) = self.search(net) {
                    net.capture_candidate(candidate);
                    let (position_spring, orientation_spring) =
                        self.build_springs(net, candidate);
                    self.capture = Some(SeqCapture {
                        candidate,
                        position_spring,
                        orientation_spring,
                        countdown: self.params.duration(),
                    });
                }
            }
            Some(mut cap) => {
                let duration = self.params.duration();
                let completed = duration - cap.countdown + 1;
                Self::ramp_windows(&mut cap, completed, duration);
                cap.position_spring.apply(&mut net.beads, &net.simbox);
                cap.orientation_spring.apply(&mut net.beads, &net.simbox);
                cap.countdown -= 1;

                if cap.countdown > 0 {
                    self.capture = Some(cap);
                } else if cap.position_spring.separation(&net.beads, &net.simbox)
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

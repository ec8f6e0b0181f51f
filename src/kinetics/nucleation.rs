//! Nucleation: `PolymerFormsBondTriple`.
//!
//! A one-shot event seeded on a single free bond. Its precondition check
//! runs the nucleation search over the seed's own cell pool; when a
//! partner is found, both bonds are claimed and their adjacency pointers
//! linked immediately, so neither can be taken by any other event. The
//! execute loop then ramps a single transient spring between them; on
//! success a new two-bond polymer (seed as tail, partner as head) is
//! handed to the network's free-polymer collection and the event retires
//! permanently. A timed-out attempt undoes the links, returns both bonds
//! to their pools, and goes back to the precondition search.
//!
//! If the seed has meanwhile been claimed by a growth event, there is
//! nothing left to nucleate from and the event retires quietly.

use crate::kinetics::{BindingParams, EventStatus, KineticEvent, SpringRamp, TransientSpring};
use crate::network::NetworkState;
use crate::state::{BondId, PolymerId};

struct Attempt {
    partner: BondId,
    spring: TransientSpring,
    countdown: u32,
}

/// One-shot nucleation event seeded on a free bond
pub struct PolymerFormsBondTriple {
    seed: BondId,
    params: BindingParams,
    attempt: Option<Attempt>,
    successes: u64,
    failures: u64,
}

impl PolymerFormsBondTriple {
    pub fn new(seed: BondId, params: BindingParams) -> Self {
        Self {
            seed,
            params,
            attempt: None,
            successes: 0,
            failures: 0,
        }
    }

    pub fn params(&self) -> &BindingParams {
        &self.params
    }

    pub fn seed(&self) -> BondId {
        self.seed
    }

    fn search(&self, net: &NetworkState) -> Option<BondId> {
        let seed_pos = net.bond_position(self.seed);
        let range_sq = self.params.capture_range() * self.params.capture_range();

        let NetworkState {
            ref grid,
            ref bonds,
            ref beads,
            ref simbox,
            ..
        } = *net;
        grid.find_nucleation_candidate(self.seed, bonds, |b| {
            simbox.separation(b.position(beads), seed_pos).length_squared() < range_sq
        })
    }

    fn unlink_pair(&self, net: &mut NetworkState, partner: BondId) {
        net.bonds.get_mut(self.seed).head_link = None;
        net.bonds.get_mut(partner).tail_link = None;
    }
}

impl KineticEvent for PolymerFormsBondTriple {
    fn kind(&self) -> &'static str {
        "PolymerFormsBondTriple"
    }

    fn step(&mut self, net: &mut NetworkState) -> EventStatus {
        match self.attempt.take() {
            None => {
                // Precondition: the seed must still be available
                {
                    let seed = net.bonds.get(self.seed);
                    if seed.polymerized || seed.phantom {
                        log::debug!(
                            "nucleation seed {} no longer available, retiring",
                            self.seed
                        );
                        return EventStatus::Retired;
                    }
                }
                if let Some(partner) = self.search(net) {
                    // Claim both and link the pair at once so neither can
                    // be taken elsewhere before the attempt resolves
                    net.capture_candidate(self.seed);
                    net.capture_candidate(partner);
                    net.bonds.get_mut(self.seed).head_link = Some(partner);
                    net.bonds.get_mut(partner).tail_link = Some(self.seed);

                    let spring = TransientSpring::new(
                        net.bonds.get(self.seed).head_bead,
                        net.bonds.get(partner).tail_bead,
                        self.params.spring_constant(),
                        self.params.rest_length(),
                        SpringRamp::LinearElapsed,
                    );
                    self.attempt = Some(Attempt {
                        partner,
                        spring,
                        countdown: self.params.duration(),
                    });
                }
            }
            Some(mut att) => {
                let duration = self.params.duration();
                let completed = duration - att.countdown + 1;
                att.spring.ramp_to(completed, duration);
                att.spring.apply(&mut net.beads, &net.simbox);
                att.countdown -= 1;

                if att.countdown > 0 {
                    self.attempt = Some(att);
                } else if att.spring.separation(&net.beads, &net.simbox)
                    <= self.params.rest_length()
                {
                    net.create_polymer(self.seed, att.partner);
                    self.successes += 1;
                    return EventStatus::Retired;
                } else {
                    self.unlink_pair(net, att.partner);
                    net.release_candidate(att.partner);
                    net.release_candidate(self.seed);
                    self.failures += 1;
                }
            }
        }
        EventStatus::Active
    }

    fn abort(&mut self, net: &mut NetworkState) {
        if let Some(att) = self.attempt.take() {
            self.unlink_pair(net, att.partner);
            net.release_candidate(att.partner);
            net.release_candidate(self.seed);
        }
    }

    fn target_polymer(&self) -> Option<PolymerId> {
        None
    }

    fn is_capturing(&self) -> bool {
        self.attempt.is_some()
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

//! Candidate-set reduction: the collaborator a [`super::RoutingAlgorithm`]
//! hands its full minimal/non-minimal candidate set to, which narrows it
//! down to the (small) set the allocator actually arbitrates over.
//!
//! Grounded on `examples/original_source/src/routing/Reduction.h`/`.cc`: a
//! `Reduction` is reset on the first `add()` after a `reduce()`, tracks the
//! current minimal hop count, promotes the previous minimal set to
//! non-minimal the moment a lower hop count is seen, and — after the
//! strategy-specific `process()` step — randomly downsamples to
//! `max_outputs` using the *shared* simulation PRNG (never a
//! reduction-local one), which is what keeps a fixed-seed run bit-exact
//! reproducible (spec §5).

use super::Candidate;
use rand::RngCore;

#[derive(Debug, Clone, Copy)]
struct Scored {
    candidate: Candidate,
    hops: u32,
    congestion: f64,
}

/// Strategy-specific narrowing of a `Reduction`'s tracked candidate sets.
pub trait ReductionStrategy: std::fmt::Debug {
    /// Returns the narrowed candidate set and whether every candidate in it
    /// is a minimal-hop-count route.
    fn process(&self, min_hops: u32, minimal: &[Scored], non_minimal: &[Scored]) -> (Vec<Candidate>, bool);
}

/// Picks the minimal-hop-count candidate(s) with lowest congestion,
/// ignoring non-minimal routes entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastCongestedMinimal;

impl ReductionStrategy for LeastCongestedMinimal {
    fn process(&self, _min_hops: u32, minimal: &[Scored], _non_minimal: &[Scored]) -> (Vec<Candidate>, bool) {
        let mut best = f64::MAX;
        let mut out = Vec::new();
        for s in minimal {
            if s.congestion < best - f64::EPSILON {
                best = s.congestion;
                out.clear();
                out.push(s.candidate);
            } else if (s.congestion - best).abs() <= f64::EPSILON {
                out.push(s.candidate);
            }
        }
        (out, true)
    }
}

/// The five UGAL-style non-minimal weighting functions. Each computes the
/// weight assigned to a non-minimal candidate given the minimal set's best
/// congestion, for comparison against the minimal set's own
/// `congestion * min_hops` weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonMinimalWeightFunc {
    Regular,
    Bimodal,
    Differential,
    Proportional,
    ProportionalDifferential,
}

impl NonMinimalWeightFunc {
    fn weight(
        self,
        min_hops: u32,
        candidate_hops: u32,
        min_congestion: f64,
        candidate_congestion: f64,
        congestion_bias: f64,
        independent_bias: f64,
    ) -> f64 {
        let base = candidate_congestion * candidate_hops as f64;
        match self {
            NonMinimalWeightFunc::Regular => base * congestion_bias + independent_bias,
            NonMinimalWeightFunc::Bimodal => {
                if candidate_congestion > min_congestion {
                    base * congestion_bias + independent_bias
                } else {
                    base
                }
            }
            NonMinimalWeightFunc::Differential => {
                base + (candidate_congestion - min_congestion) * congestion_bias + independent_bias
            }
            NonMinimalWeightFunc::Proportional => {
                base * (candidate_hops as f64 / min_hops.max(1) as f64) * congestion_bias + independent_bias
            }
            NonMinimalWeightFunc::ProportionalDifferential => {
                let proportional = base * (candidate_hops as f64 / min_hops.max(1) as f64);
                proportional + (candidate_congestion - min_congestion) * congestion_bias + independent_bias
            }
        }
    }
}

/// Weighs minimal candidates by `congestion * min_hops` against non-minimal
/// candidates scored by a [`NonMinimalWeightFunc`], picking the lowest
/// overall weight (UGAL-style global vs. local routing tradeoff).
#[derive(Debug, Clone, Copy)]
pub struct Weighted {
    pub congestion_bias: f64,
    pub independent_bias: f64,
    pub non_minimal_weight_func: NonMinimalWeightFunc,
}

impl ReductionStrategy for Weighted {
    fn process(&self, min_hops: u32, minimal: &[Scored], non_minimal: &[Scored]) -> (Vec<Candidate>, bool) {
        let mut min_weight = f64::MAX;
        let mut out = Vec::new();
        let mut min_congestion = f64::MAX;

        for s in minimal {
            let weight = s.congestion * min_hops as f64;
            if weight < min_weight - f64::EPSILON {
                min_congestion = s.congestion;
                min_weight = weight;
                out.clear();
                out.push(s.candidate);
            } else if (weight - min_weight).abs() <= f64::EPSILON {
                out.push(s.candidate);
            }
        }

        let mut all_minimal = true;
        for s in non_minimal {
            let weight = self.non_minimal_weight_func.weight(
                min_hops,
                s.hops,
                min_congestion,
                s.congestion,
                self.congestion_bias,
                self.independent_bias,
            );
            if weight < min_weight - f64::EPSILON {
                all_minimal = false;
                min_weight = weight;
                out.clear();
                out.push(s.candidate);
            } else if (weight - min_weight).abs() <= f64::EPSILON && !all_minimal {
                out.push(s.candidate);
            }
        }

        (out, all_minimal)
    }
}

/// Accumulates candidates hop-by-hop via [`Reduction::add`], then narrows
/// them via [`Reduction::reduce`].
#[derive(Debug)]
pub struct Reduction {
    max_outputs: usize,
    start: bool,
    min_hops: u32,
    minimal: Vec<Scored>,
    non_minimal: Vec<Scored>,
}

impl Reduction {
    pub fn new(max_outputs: usize) -> Self {
        assert!(max_outputs > 0);
        Reduction {
            max_outputs,
            start: true,
            min_hops: u32::MAX,
            minimal: Vec::new(),
            non_minimal: Vec::new(),
        }
    }

    /// Register one candidate output discovered so far. `hops` is the total
    /// path length through this candidate; `congestion` its 0..1 status.
    pub fn add(&mut self, candidate: Candidate, hops: u32, congestion: f64) {
        if self.start {
            self.minimal.clear();
            self.non_minimal.clear();
            self.min_hops = hops;
            self.start = false;
        }

        let scored = Scored { candidate, hops, congestion };
        if hops < self.min_hops {
            self.non_minimal.append(&mut self.minimal);
            self.min_hops = hops;
            self.minimal.push(scored);
        } else if hops == self.min_hops {
            self.minimal.push(scored);
        } else {
            self.non_minimal.push(scored);
        }
    }

    /// Narrow the accumulated candidates via `strategy`, then randomly
    /// downsample to at most `max_outputs` using the shared simulation RNG.
    /// Returns `(candidates, all_minimal)`. Panics if `add` was never
    /// called since the last `reduce` — mirrors the original's
    /// assertion-guarded precondition.
    pub fn reduce(
        &mut self,
        strategy: &dyn ReductionStrategy,
        rng: &mut dyn RngCore,
    ) -> (Vec<Candidate>, bool) {
        assert!(!self.start, "reduce() called without a preceding add()");
        assert!(!self.minimal.is_empty(), "no minimal candidates to reduce");

        let (mut intermediate, all_minimal) = strategy.process(self.min_hops, &self.minimal, &self.non_minimal);
        assert!(!intermediate.is_empty(), "reduction strategy produced no outputs");

        while intermediate.len() > self.max_outputs {
            let idx = (rng.next_u64() as usize) % intermediate.len();
            intermediate.remove(idx);
        }

        self.start = true;
        (intermediate, all_minimal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn c(port: u32, vc: u32) -> Candidate {
        Candidate { port, vc }
    }

    #[test]
    fn promotes_old_minimal_to_non_minimal_on_lower_hop_count() {
        let mut r = Reduction::new(8);
        r.add(c(0, 0), 3, 0.1);
        r.add(c(1, 0), 3, 0.2);
        r.add(c(2, 0), 2, 0.3); // new minimum, demotes the two above
        let mut rng = StdRng::seed_from_u64(1);
        let (out, all_min) = r.reduce(&LeastCongestedMinimal, &mut rng);
        assert_eq!(out, vec![c(2, 0)]);
        assert!(all_min);
    }

    #[test]
    fn least_congested_minimal_breaks_ties_by_congestion() {
        let mut r = Reduction::new(8);
        r.add(c(0, 0), 2, 0.5);
        r.add(c(1, 0), 2, 0.1);
        let mut rng = StdRng::seed_from_u64(2);
        let (out, _) = r.reduce(&LeastCongestedMinimal, &mut rng);
        assert_eq!(out, vec![c(1, 0)]);
    }

    #[test]
    fn downsamples_to_max_outputs() {
        let mut r = Reduction::new(1);
        r.add(c(0, 0), 1, 0.5);
        r.add(c(1, 0), 1, 0.5);
        r.add(c(2, 0), 1, 0.5);
        let mut rng = StdRng::seed_from_u64(42);
        let (out, _) = r.reduce(&LeastCongestedMinimal, &mut rng);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn restarts_after_reduce() {
        let mut r = Reduction::new(8);
        r.add(c(0, 0), 1, 0.0);
        let mut rng = StdRng::seed_from_u64(3);
        r.reduce(&LeastCongestedMinimal, &mut rng);
        r.add(c(5, 0), 4, 0.9);
        let (out, _) = r.reduce(&LeastCongestedMinimal, &mut rng);
        assert_eq!(out, vec![c(5, 0)]);
    }

    #[test]
    fn weighted_prefers_non_minimal_when_far_less_congested() {
        let mut r = Reduction::new(8);
        r.add(c(0, 0), 2, 0.9); // minimal, very congested
        r.add(c(1, 0), 4, 0.01); // non-minimal, nearly idle
        let strategy = Weighted {
            congestion_bias: 1.0,
            independent_bias: 0.0,
            non_minimal_weight_func: NonMinimalWeightFunc::Regular,
        };
        let mut rng = StdRng::seed_from_u64(4);
        let (out, all_min) = r.reduce(&strategy, &mut rng);
        assert_eq!(out, vec![c(1, 0)]);
        assert!(!all_min);
    }
}

//! Large Neighborhood Search (§4.3): repeated destroy/repair/validate/accept
//! cycles, gated by the feasibility validator and decided by Late
//! Acceptance Hill Climbing. Owns the LAHC history and the six observable
//! counters named in §4.3 for the duration of one `run()` call.

mod destroy;
mod lahc;
mod repair;

use crate::config::{Deadline, SolverConfig};
use crate::instance::Instance;
use crate::local_search;
use crate::rng::Rng;
use crate::solution::{validator, Solution};
use lahc::LahcHistory;
use rand::Rng as _;
use std::time::Duration;
use tracing::debug;

/// Per-call cap on a polish pass triggered from inside the LNS loop (§4.4:
/// "default 2-5s in the LNS loop"), so one polish can never eat the whole
/// remaining wall-clock budget before the next `deadline.should_stop()` poll.
const LOCAL_SEARCH_BUDGET: Duration = Duration::from_secs(3);

/// One LNS sub-run's final counters, reported to the progress callback as
/// `SolveEvent::LnsStats` (§9's structured-events design note).
#[derive(Debug, Clone, Copy, Default)]
pub struct LnsStats {
    pub iterations: usize,
    pub improvements: usize,
    pub rejected_infeasible: usize,
    pub rejected_lahc: usize,
    pub accepted_worse: usize,
    pub repair_failures: usize,
}

pub struct Lns<'a> {
    instance: &'a Instance,
    destroy_min: usize,
    destroy_max: usize,
    local_search_every: usize,
    lahc_len: usize,
    pub stats: LnsStats,
}

impl<'a> Lns<'a> {
    pub fn new(instance: &'a Instance, config: &SolverConfig) -> Self {
        Self {
            instance,
            destroy_min: config.destroy_min.max(1),
            destroy_max: config.destroy_max.max(config.destroy_min.max(1)),
            local_search_every: config.local_search_every.max(1),
            lahc_len: config.lahc_history.max(1),
            stats: LnsStats::default(),
        }
    }

    /// Runs destroy/repair/accept cycles from `current`, for up to
    /// `max_iterations` rounds or until `deadline` fires, and returns the
    /// best feasible solution seen during this run (`S*` in §4.3).
    pub fn run(&mut self, current: Solution, rng: &mut Rng, deadline: &Deadline, max_iterations: usize) -> Solution {
        self.stats = LnsStats::default();

        let mut current = current;
        let mut current_cost = current.lex_cost(self.instance);
        let mut history = LahcHistory::new(self.lahc_len, current_cost);
        let mut best = current.clone();
        let mut best_cost = current_cost;

        let mut use_shaw = false;
        let mut use_regret = false;

        let mut t = 0usize;
        while t < max_iterations && !deadline.should_stop() {
            self.stats.iterations += 1;

            let k = rng.random_range(self.destroy_min..=self.destroy_max);
            let mut candidate = current.clone();
            let removed = if use_shaw {
                destroy::shaw_removal(&mut candidate, self.instance, k, rng)
            } else {
                destroy::random_pair_removal(&mut candidate, self.instance, k, rng)
            };
            use_shaw = !use_shaw;

            let failures = if use_regret {
                repair::regret_insertion(&mut candidate, self.instance, removed)
            } else {
                repair::greedy_insertion(&mut candidate, self.instance, removed)
            };
            use_regret = !use_regret;

            if !failures.is_empty() {
                self.stats.repair_failures += failures.len();
                t += 1;
                continue;
            }

            if validator::validate(self.instance, &mut candidate).is_err() {
                self.stats.rejected_infeasible += 1;
                t += 1;
                continue;
            }

            let mut candidate_cost = candidate.lex_cost(self.instance);
            let is_improving = candidate_cost < best_cost;

            if t % self.local_search_every == 0 || is_improving {
                local_search::polish(&mut candidate, self.instance, Some(deadline), Some(LOCAL_SEARCH_BUDGET));
                candidate_cost = candidate.lex_cost(self.instance);
            }

            if history.accepts(t, candidate_cost, current_cost) {
                if candidate_cost > current_cost {
                    self.stats.accepted_worse += 1;
                }
                history.set(t, current_cost);
                current = candidate;
                current_cost = candidate_cost;

                if current_cost < best_cost {
                    best = current.clone();
                    best_cost = current_cost;
                    self.stats.improvements += 1;
                    debug!(iteration = t, vehicles = best_cost.vehicles, distance = best_cost.distance, "lns found new best");
                }
            } else {
                self.stats.rejected_lahc += 1;
            }

            t += 1;
        }

        debug!(
            iterations = self.stats.iterations,
            improvements = self.stats.improvements,
            rejected_infeasible = self.stats.rejected_infeasible,
            rejected_lahc = self.stats.rejected_lahc,
            "lns run finished"
        );
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::construct;
    use crate::instance::{InstanceBuilder, RawNode};
    use crate::rng::seeded;
    use std::time::Duration;

    fn eight_pair_instance() -> Instance {
        let node = |x: f64, demand, ready, due| RawNode {
            coord: Some((x, 0.0)),
            demand,
            ready,
            due,
            service: 0,
        };
        let mut b = InstanceBuilder::new("t", 3).push_node(node(0.0, 0, 0, 100_000));
        for i in 0..8 {
            let base = i as f64 * 7.0;
            b = b
                .push_node(node(base + 1.0, 1, 0, 100_000))
                .push_node(node(base + 2.0, -1, 0, 100_000));
        }
        for i in 0..8 {
            b = b.with_pair(1 + 2 * i, 2 + 2 * i);
        }
        b.build().unwrap()
    }

    #[test]
    fn lns_run_never_worsens_the_best_found() {
        let inst = eight_pair_instance();
        let initial = construct(&inst).unwrap();
        let config = SolverConfig {
            destroy_min: 2,
            destroy_max: 4,
            lahc_history: 10,
            local_search_every: 3,
            ..SolverConfig::default()
        };
        let mut lns = Lns::new(&inst, &config);
        let mut rng = seeded(11);
        let deadline = Deadline::new(Duration::from_secs(5));

        let mut initial_for_cost = initial.clone();
        let initial_cost = initial_for_cost.lex_cost(&inst);

        let result = lns.run(initial, &mut rng, &deadline, 50);
        let mut result_check = result.clone();
        assert!(validator::validate(&inst, &mut result_check).is_ok());
        assert!(result_check.lex_cost(&inst) <= initial_cost);
        assert!(lns.stats.iterations > 0);
    }

    #[test]
    fn lns_run_is_deterministic_given_a_seed() {
        let inst = eight_pair_instance();
        let initial = construct(&inst).unwrap();
        let config = SolverConfig {
            destroy_min: 2,
            destroy_max: 4,
            lahc_history: 10,
            local_search_every: 5,
            ..SolverConfig::default()
        };
        let deadline = Deadline::new(Duration::from_secs(5));

        let mut lns_a = Lns::new(&inst, &config);
        let mut rng_a = seeded(42);
        let mut result_a = lns_a.run(initial.clone(), &mut rng_a, &deadline, 30);

        let mut lns_b = Lns::new(&inst, &config);
        let mut rng_b = seeded(42);
        let mut result_b = lns_b.run(initial, &mut rng_b, &deadline, 30);

        assert_eq!(result_a.lex_cost(&inst), result_b.lex_cost(&inst));
        assert_eq!(lns_a.stats.iterations, lns_b.stats.iterations);
    }
}

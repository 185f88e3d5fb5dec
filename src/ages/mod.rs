//! AGES, the vehicle-reduction loop (§4.5): repeatedly pick the smallest
//! route, try to redistribute all of its pairs into the remaining routes,
//! and keep the elimination only if every pair found a feasible new home.
//! Never commits a state the validator would reject; a failed attempt
//! leaves the solution exactly as it found it.

use crate::config::Deadline;
use crate::insertion::cheapest_insertion;
use crate::instance::Instance;
use crate::rng::Rng;
use crate::solution::{validator, Solution};
use crate::types::{Distance, RequestId};
use rand::Rng as _;
use tracing::debug;

/// Cap on eliminations per call (§4.5).
const MAX_ELIMINATIONS: usize = 100;
/// Stop after this many consecutive failed attempts (§4.5).
const MAX_CONSECUTIVE_FAILURES: usize = 20;

/// Attempts to shrink `solution`'s vehicle count without ever admitting an
/// infeasible intermediate state. Returns the (possibly unchanged)
/// solution; on total failure the input comes back byte-for-byte
/// equivalent.
pub fn reduce(mut solution: Solution, instance: &Instance, rng: &mut Rng, deadline: &Deadline) -> Solution {
    let starting_vehicles = solution.vehicle_count();
    let mut eliminations = 0;
    let mut consecutive_failures = 0;

    while eliminations < MAX_ELIMINATIONS && consecutive_failures < MAX_CONSECUTIVE_FAILURES && !deadline.should_stop() {
        if solution.vehicle_count() <= 1 {
            break;
        }

        let victim = smallest_route(&mut solution, instance);
        let eliminated = match victim {
            Some(idx) => try_eliminate_route(&mut solution, instance, idx),
            None => false,
        };

        if eliminated {
            eliminations += 1;
            consecutive_failures = 0;
            continue;
        }

        // Escape hatch (§4.5): a systematic dead-end on the smallest route
        // doesn't mean every route is stuck, so also probe a random one.
        if solution.routes().len() >= 2 {
            let idx = rng.random_range(0..solution.routes().len());
            if try_eliminate_route(&mut solution, instance, idx) {
                eliminations += 1;
                consecutive_failures = 0;
                continue;
            }
        }

        consecutive_failures += 1;
    }

    debug!(
        eliminations,
        vehicles_before = starting_vehicles,
        vehicles_after = solution.vehicle_count(),
        "ages reduction finished"
    );
    solution
}

/// The non-empty route with the fewest customer stops, ties broken by
/// shortest simulated distance (§4.5).
fn smallest_route(solution: &mut Solution, instance: &Instance) -> Option<usize> {
    solution.ensure_simulated(instance);
    solution
        .routes()
        .iter()
        .enumerate()
        .filter(|(_, route)| !route.is_empty())
        .min_by_key(|(_, route)| {
            let distance = route.last_simulation().map(|s| s.distance).unwrap_or(Distance::MAX);
            (route.len(), distance)
        })
        .map(|(idx, _)| idx)
}

/// Tries to eliminate route `route_idx` by reinserting every pair it
/// carries into one of the *other* routes (never opening a fresh one,
/// since that would defeat the point). Reverts to `solution`'s prior state
/// and returns `false` on the first pair with no feasible home.
fn try_eliminate_route(solution: &mut Solution, instance: &Instance, route_idx: usize) -> bool {
    let requests: Vec<RequestId> = (0..instance.n_requests() as RequestId)
        .filter(|&r| solution.route_of(r) == Some(route_idx))
        .collect();
    if requests.is_empty() {
        return false;
    }

    let backup = solution.clone();

    for &r in &requests {
        let (pickup, delivery) = instance.request(r);
        solution.remove_request(r, pickup, delivery);
    }
    solution.prune_empty_routes();

    for &r in &requests {
        let (pickup, delivery) = instance.request(r);
        match cheapest_insertion(solution, instance, pickup, delivery) {
            Some(c) => solution.insert_into_route(c.route_idx, r, pickup, delivery, c.pickup_pos, c.delivery_pos),
            None => {
                *solution = backup;
                return false;
            }
        }
    }

    if validator::validate(instance, solution).is_err() {
        *solution = backup;
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{InstanceBuilder, RawNode};
    use crate::rng::seeded;
    use std::time::Duration;

    fn mergeable_instance() -> Instance {
        // Four pairs clustered so a single vehicle could serve them all,
        // but each starts on its own tiny route.
        let node = |x: f64, demand, ready, due| RawNode {
            coord: Some((x, 0.0)),
            demand,
            ready,
            due,
            service: 0,
        };
        let mut b = InstanceBuilder::new("t", 10).push_node(node(0.0, 0, 0, 100_000));
        for i in 0..4 {
            let base = i as f64 * 2.0;
            b = b
                .push_node(node(base + 1.0, 1, 0, 100_000))
                .push_node(node(base + 1.5, -1, 0, 100_000));
        }
        for i in 0..4 {
            b = b.with_pair(1 + 2 * i, 2 + 2 * i);
        }
        b.build().unwrap()
    }

    #[test]
    fn ages_reduces_vehicle_count_when_possible() {
        let inst = mergeable_instance();
        let mut sol = Solution::new(inst.n_requests());
        for (r, &(p, d)) in inst.requests().iter().enumerate() {
            sol.push_new_route(p, d, r as RequestId);
        }
        assert_eq!(sol.vehicle_count(), 4);

        let mut rng = seeded(5);
        let deadline = Deadline::new(Duration::from_secs(5));
        let mut reduced = reduce(sol, &inst, &mut rng, &deadline);

        assert!(reduced.vehicle_count() < 4);
        assert!(validator::validate(&inst, &mut reduced).is_ok());
    }

    #[test]
    fn ages_never_worsens_request_coverage() {
        let inst = mergeable_instance();
        let mut sol = Solution::new(inst.n_requests());
        for (r, &(p, d)) in inst.requests().iter().enumerate() {
            sol.push_new_route(p, d, r as RequestId);
        }
        let mut rng = seeded(9);
        let deadline = Deadline::new(Duration::from_secs(5));
        let reduced = reduce(sol, &inst, &mut rng, &deadline);
        assert!(reduced.unassigned_requests().is_empty());
    }

    #[test]
    fn ages_leaves_single_route_untouched() {
        let node = |x: f64, demand, ready, due| RawNode {
            coord: Some((x, 0.0)),
            demand,
            ready,
            due,
            service: 0,
        };
        let inst = InstanceBuilder::new("t", 1)
            .push_node(node(0.0, 0, 0, 1000))
            .push_node(node(10.0, 1, 0, 500))
            .push_node(node(20.0, -1, 0, 1000))
            .with_pair(1, 2)
            .build()
            .unwrap();
        let mut sol = Solution::new(1);
        sol.push_new_route(1, 2, 0);
        let mut rng = seeded(1);
        let deadline = Deadline::new(Duration::from_secs(1));
        let reduced = reduce(sol, &inst, &mut rng, &deadline);
        assert_eq!(reduced.vehicle_count(), 1);
    }
}

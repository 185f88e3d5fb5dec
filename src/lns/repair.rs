//! Repair operators (§4.3): reinsert a batch of removed pairs. Both
//! operators place a pair wherever it fits the cheapest, falling back to a
//! brand-new route only when no existing route admits it at all — the same
//! fallback the constructor uses (§4.2), since an unplaceable pair here
//! would have made the initial construction itself infeasible.

use crate::insertion::{cheapest_insertion, ranked_insertions};
use crate::instance::Instance;
use crate::solution::{Route, Solution};
use crate::types::{Distance, RequestId};

/// Regret-k default from §4.3.
const DEFAULT_REGRET_K: usize = 2;

/// Greedy insertion repair: repeatedly inserts the remaining pair whose
/// cheapest feasible position is globally cheapest; opens a new route for
/// any pair left with no feasible position in an existing route. Returns
/// the requests that could not even open their own route (pathological;
/// counted by the caller as `repair_failures`).
pub fn greedy_insertion(solution: &mut Solution, instance: &Instance, mut pending: Vec<RequestId>) -> Vec<RequestId> {
    let mut failures = Vec::new();

    while !pending.is_empty() {
        let mut best: Option<(usize, usize, usize, usize, Distance)> = None; // (pending_idx, route, p_pos, d_pos, delta)

        for (idx, &r) in pending.iter().enumerate() {
            let (pickup, delivery) = instance.request(r);
            if let Some(c) = cheapest_insertion(solution, instance, pickup, delivery) {
                if best.as_ref().is_none_or(|&(_, _, _, _, best_delta)| c.delta < best_delta) {
                    best = Some((idx, c.route_idx, c.pickup_pos, c.delivery_pos, c.delta));
                }
            }
        }

        match best {
            Some((idx, route_idx, pickup_pos, delivery_pos, _)) => {
                let r = pending.remove(idx);
                let (pickup, delivery) = instance.request(r);
                solution.insert_into_route(route_idx, r, pickup, delivery, pickup_pos, delivery_pos);
            }
            None => {
                let r = pending.remove(0);
                open_new_route_or_fail(solution, instance, r, &mut failures);
            }
        }
    }

    failures
}

/// Regret-k insertion repair (§4.3, default k=2): for each remaining pair,
/// the regret value is the gap between its best and k-th best feasible
/// insertion cost; the pair with the largest regret is placed first, since
/// it has the fewest good alternatives left if deferred.
pub fn regret_insertion(solution: &mut Solution, instance: &Instance, pending: Vec<RequestId>) -> Vec<RequestId> {
    regret_insertion_k(solution, instance, pending, DEFAULT_REGRET_K)
}

fn regret_insertion_k(solution: &mut Solution, instance: &Instance, mut pending: Vec<RequestId>, k: usize) -> Vec<RequestId> {
    let mut failures = Vec::new();

    while !pending.is_empty() {
        let mut best_idx = None;
        let mut best_regret = Distance::MIN;
        let mut best_candidate: Option<(usize, usize, usize)> = None; // (route, p_pos, d_pos)

        for (idx, &r) in pending.iter().enumerate() {
            let (pickup, delivery) = instance.request(r);
            let ranked = ranked_insertions(solution, instance, pickup, delivery);
            if ranked.is_empty() {
                continue;
            }
            let top = &ranked[..ranked.len().min(k)];
            let regret = if top.len() >= 2 {
                top[top.len() - 1].delta - top[0].delta
            } else {
                // Fewer than k alternatives exist: treat as maximally
                // urgent so it is not starved while richer pairs wait.
                Distance::MAX / 2
            };

            if regret > best_regret || best_idx.is_none() {
                best_regret = regret;
                best_idx = Some(idx);
                best_candidate = Some((top[0].route_idx, top[0].pickup_pos, top[0].delivery_pos));
            }
        }

        match (best_idx, best_candidate) {
            (Some(idx), Some((route_idx, pickup_pos, delivery_pos))) => {
                let r = pending.remove(idx);
                let (pickup, delivery) = instance.request(r);
                solution.insert_into_route(route_idx, r, pickup, delivery, pickup_pos, delivery_pos);
            }
            _ => {
                let r = pending.remove(0);
                open_new_route_or_fail(solution, instance, r, &mut failures);
            }
        }
    }

    failures
}

fn open_new_route_or_fail(solution: &mut Solution, instance: &Instance, r: RequestId, failures: &mut Vec<RequestId>) {
    let (pickup, delivery) = instance.request(r);
    let mut candidate = Route::with_pair(pickup, delivery);
    if candidate.simulate(instance) {
        solution.push_new_route(pickup, delivery, r);
    } else {
        failures.push(r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{InstanceBuilder, RawNode};

    fn four_pair_instance() -> Instance {
        let node = |x: f64, demand, ready, due| RawNode {
            coord: Some((x, 0.0)),
            demand,
            ready,
            due,
            service: 0,
        };
        let mut b = InstanceBuilder::new("t", 5).push_node(node(0.0, 0, 0, 10_000));
        for i in 0..4 {
            let base = i as f64 * 10.0;
            b = b
                .push_node(node(base + 1.0, 1, 0, 10_000))
                .push_node(node(base + 2.0, -1, 0, 10_000));
        }
        for i in 0..4 {
            b = b.with_pair(1 + 2 * i, 2 + 2 * i);
        }
        b.build().unwrap()
    }

    #[test]
    fn greedy_repair_places_every_pending_pair() {
        let inst = four_pair_instance();
        let mut sol = Solution::new(inst.n_requests());
        sol.push_new_route(1, 2, 0);
        let failures = greedy_insertion(&mut sol, &inst, vec![1, 2, 3]);
        assert!(failures.is_empty());
        assert!(sol.unassigned_requests().is_empty());
        assert!(crate::solution::validator::validate(&inst, &mut sol).is_ok());
    }

    #[test]
    fn regret_repair_places_every_pending_pair() {
        let inst = four_pair_instance();
        let mut sol = Solution::new(inst.n_requests());
        sol.push_new_route(1, 2, 0);
        let failures = regret_insertion(&mut sol, &inst, vec![1, 2, 3]);
        assert!(failures.is_empty());
        assert!(sol.unassigned_requests().is_empty());
        assert!(crate::solution::validator::validate(&inst, &mut sol).is_ok());
    }
}

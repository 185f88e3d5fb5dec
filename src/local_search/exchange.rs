//! Pair exchange: swap two whole `(pickup, delivery)` pairs between two
//! routes, or two pairs within the same route, each reinserted at its own
//! best feasible spot in the other's former position. First-improvement
//! per §4.4, matching `two_opt.rs`'s search order.

use crate::instance::Instance;
use crate::local_search::evaluate_sequence;
use crate::solution::Solution;
use crate::types::{Distance, NodeId, RequestId};

struct Swap {
    request_a: RequestId,
    request_b: RequestId,
    route_a: usize,
    route_b: usize,
    customers_a: Vec<NodeId>,
    customers_b: Vec<NodeId>,
}

/// Repeatedly applies the first improving pair exchange found until a full
/// sweep turns up none. Returns whether anything changed.
pub fn exchange_pairs(solution: &mut Solution, instance: &Instance) -> bool {
    let mut any_improved = false;

    loop {
        match find_first_improving_swap(solution, instance) {
            Some(sw) => {
                apply_swap(solution, instance, sw);
                any_improved = true;
            }
            None => break,
        }
    }

    any_improved
}

/// Removes `(pickup, delivery)` from `customers` and returns the remainder.
fn without_pair(customers: &[NodeId], pickup: NodeId, delivery: NodeId) -> Vec<NodeId> {
    customers
        .iter()
        .copied()
        .filter(|&n| n != pickup && n != delivery)
        .collect()
}

/// Cheapest feasible reinsertion of `(pickup, delivery)` into `base`,
/// returning the resulting sequence and its distance.
fn best_reinsertion(
    base: &[NodeId],
    pickup: NodeId,
    delivery: NodeId,
    instance: &Instance,
) -> Option<(Vec<NodeId>, Distance)> {
    let mut best: Option<(Vec<NodeId>, Distance)> = None;
    let n = base.len();
    for pickup_pos in 0..=n {
        let mut with_pickup = base.to_vec();
        with_pickup.insert(pickup_pos, pickup);
        for delivery_pos in pickup_pos + 1..=with_pickup.len() {
            let mut candidate = with_pickup.clone();
            candidate.insert(delivery_pos, delivery);
            let Some(distance) = evaluate_sequence(&candidate, instance) else {
                continue;
            };
            if best.as_ref().is_none_or(|(_, d)| distance < *d) {
                best = Some((candidate, distance));
            }
        }
    }
    best
}

/// Scans request pairs in a fixed order and returns the first exchange
/// with a negative combined delta, rather than searching for the cheapest
/// one. Same-route pairs are tried too (§4.4: exchange is "intra- and
/// inter-route"), reinserting both pairs back into the one route they
/// shared.
fn find_first_improving_swap(solution: &Solution, instance: &Instance) -> Option<Swap> {
    let n_requests = instance.n_requests() as RequestId;

    for request_a in 0..n_requests {
        let Some(route_a) = solution.route_of(request_a) else {
            continue;
        };
        let (pickup_a, delivery_a) = instance.request(request_a);

        for request_b in (request_a + 1)..n_requests {
            let Some(route_b) = solution.route_of(request_b) else {
                continue;
            };
            let (pickup_b, delivery_b) = instance.request(request_b);

            if route_a == route_b {
                let original = solution.routes()[route_a].customers().to_vec();
                let Some(before) = evaluate_sequence(&original, instance) else {
                    continue;
                };
                let base = without_pair(&without_pair(&original, pickup_a, delivery_a), pickup_b, delivery_b);

                let Some((with_b, _)) = best_reinsertion(&base, pickup_b, delivery_b, instance) else {
                    continue;
                };
                let Some((with_both, after)) = best_reinsertion(&with_b, pickup_a, delivery_a, instance) else {
                    continue;
                };
                if with_both == original {
                    continue;
                }

                let delta = after - before;
                if delta < 0 {
                    return Some(Swap {
                        request_a,
                        request_b,
                        route_a,
                        route_b,
                        customers_a: with_both.clone(),
                        customers_b: with_both,
                    });
                }
                continue;
            }

            let original_a = solution.routes()[route_a].customers().to_vec();
            let original_b = solution.routes()[route_b].customers().to_vec();
            let Some(before_a) = evaluate_sequence(&original_a, instance) else {
                continue;
            };
            let Some(before_b) = evaluate_sequence(&original_b, instance) else {
                continue;
            };

            let base_a = without_pair(&original_a, pickup_a, delivery_a);
            let base_b = without_pair(&original_b, pickup_b, delivery_b);

            let Some((candidate_a, distance_a)) = best_reinsertion(&base_a, pickup_b, delivery_b, instance)
            else {
                continue;
            };
            let Some((candidate_b, distance_b)) = best_reinsertion(&base_b, pickup_a, delivery_a, instance)
            else {
                continue;
            };

            let delta = (distance_a + distance_b) - (before_a + before_b);
            if delta < 0 {
                return Some(Swap {
                    request_a,
                    request_b,
                    route_a,
                    route_b,
                    customers_a: candidate_a,
                    customers_b: candidate_b,
                });
            }
        }
    }

    None
}

fn apply_swap(solution: &mut Solution, instance: &Instance, sw: Swap) {
    if sw.route_a == sw.route_b {
        solution.routes_mut()[sw.route_a].set_customers(sw.customers_a);
        solution.routes_mut()[sw.route_a].simulate(instance);
        return;
    }
    solution.routes_mut()[sw.route_a].set_customers(sw.customers_a);
    solution.routes_mut()[sw.route_a].simulate(instance);
    solution.routes_mut()[sw.route_b].set_customers(sw.customers_b);
    solution.routes_mut()[sw.route_b].simulate(instance);
    solution.reassign_request(sw.request_a, sw.route_b);
    solution.reassign_request(sw.request_b, sw.route_a);
}

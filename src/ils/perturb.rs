//! Perturbation (§4.6 step 5): a small number of random, pair-aware moves
//! applied to the incumbent to diversify the search before the next ILS
//! iteration. Unlike local search, these moves are not required to
//! improve anything — only to stay feasible; the caller validates the
//! result and reverts on failure.

use crate::instance::Instance;
use crate::local_search::evaluate_sequence;
use crate::rng::Rng;
use crate::solution::Solution;
use crate::types::{NodeId, RequestId};
use rand::Rng as _;

/// How many random positions to probe before giving up on a single move
/// attempt and leaving the solution untouched for that attempt.
const MAX_ATTEMPTS: usize = 10;

/// Applies a random number (2-4, per §4.6) of random pair-aware moves to a
/// clone of `solution`. The result may be infeasible in principle but in
/// practice always passes since every move checks feasibility before
/// committing; callers still validate defensively (§4.1 integration rule).
pub fn perturb(solution: &Solution, instance: &Instance, rng: &mut Rng) -> Solution {
    let mut candidate = solution.clone();
    let n_moves = rng.random_range(2..=4);

    for _ in 0..n_moves {
        match rng.random_range(0..3) {
            0 => random_pair_relocate(&mut candidate, instance, rng),
            1 => random_pair_swap(&mut candidate, instance, rng),
            _ => random_subsegment_shuffle(&mut candidate, instance, rng),
        }
    }

    candidate
}

/// Moves one randomly chosen pair to a random feasible position, possibly
/// in a different route. A no-op if no feasible target turns up within
/// [`MAX_ATTEMPTS`] tries.
fn random_pair_relocate(solution: &mut Solution, instance: &Instance, rng: &mut Rng) {
    let assigned: Vec<RequestId> = (0..instance.n_requests() as RequestId)
        .filter(|&r| solution.is_assigned(r))
        .collect();
    if assigned.is_empty() {
        return;
    }
    let request = assigned[rng.random_range(0..assigned.len())];
    let (pickup, delivery) = instance.request(request);
    let from_route = solution.route_of(request).expect("request is assigned");

    let mut from_customers = solution.routes()[from_route].customers().to_vec();
    from_customers.retain(|&n| n != pickup && n != delivery);

    let n_routes = solution.routes().len();

    for _ in 0..MAX_ATTEMPTS {
        let to_route = rng.random_range(0..n_routes);
        let base = if to_route == from_route {
            from_customers.clone()
        } else {
            solution.routes()[to_route].customers().to_vec()
        };

        let n = base.len();
        let pickup_pos = rng.random_range(0..=n);
        let mut with_pickup = base.clone();
        with_pickup.insert(pickup_pos, pickup);
        let delivery_pos = rng.random_range(pickup_pos..=with_pickup.len() - 1);
        let mut candidate = with_pickup.clone();
        candidate.insert(delivery_pos + 1, delivery);

        if evaluate_sequence(&candidate, instance).is_none() {
            continue;
        }

        if to_route == from_route {
            solution.routes_mut()[from_route].set_customers(candidate);
            solution.routes_mut()[from_route].simulate(instance);
        } else {
            solution.routes_mut()[from_route].set_customers(from_customers);
            solution.routes_mut()[from_route].simulate(instance);
            solution.routes_mut()[to_route].set_customers(candidate);
            solution.routes_mut()[to_route].simulate(instance);
            solution.reassign_request(request, to_route);
        }
        solution.prune_empty_routes();
        return;
    }
}

/// Swaps two randomly chosen pairs living on two different routes, each
/// reinserted at a random feasible position in the other's former route.
/// A no-op if no jointly feasible swap turns up within [`MAX_ATTEMPTS`].
fn random_pair_swap(solution: &mut Solution, instance: &Instance, rng: &mut Rng) {
    let n_routes = solution.routes().len();
    if n_routes < 2 {
        return;
    }

    for _ in 0..MAX_ATTEMPTS {
        let route_a = rng.random_range(0..n_routes);
        let route_b = rng.random_range(0..n_routes);
        if route_a == route_b {
            continue;
        }
        let Some(request_a) = pick_request_in_route(solution, instance, route_a, rng) else {
            continue;
        };
        let Some(request_b) = pick_request_in_route(solution, instance, route_b, rng) else {
            continue;
        };

        let (pickup_a, delivery_a) = instance.request(request_a);
        let (pickup_b, delivery_b) = instance.request(request_b);

        let base_a: Vec<NodeId> = solution.routes()[route_a]
            .customers()
            .iter()
            .copied()
            .filter(|&n| n != pickup_a && n != delivery_a)
            .collect();
        let base_b: Vec<NodeId> = solution.routes()[route_b]
            .customers()
            .iter()
            .copied()
            .filter(|&n| n != pickup_b && n != delivery_b)
            .collect();

        let Some(candidate_a) = random_insertion(&base_a, pickup_b, delivery_b, instance, rng) else {
            continue;
        };
        let Some(candidate_b) = random_insertion(&base_b, pickup_a, delivery_a, instance, rng) else {
            continue;
        };

        solution.routes_mut()[route_a].set_customers(candidate_a);
        solution.routes_mut()[route_a].simulate(instance);
        solution.routes_mut()[route_b].set_customers(candidate_b);
        solution.routes_mut()[route_b].simulate(instance);
        solution.reassign_request(request_a, route_b);
        solution.reassign_request(request_b, route_a);
        return;
    }
}

fn pick_request_in_route(solution: &Solution, instance: &Instance, route_idx: usize, rng: &mut Rng) -> Option<RequestId> {
    let requests: Vec<RequestId> = (0..instance.n_requests() as RequestId)
        .filter(|&r| solution.route_of(r) == Some(route_idx))
        .collect();
    if requests.is_empty() {
        return None;
    }
    Some(requests[rng.random_range(0..requests.len())])
}

/// Inserts `(pickup, delivery)` into `base` at a uniformly random ordered
/// position pair, returning `None` if that specific random slot isn't
/// feasible (the caller retries with a fresh slot rather than falling back
/// to a deterministic search — this is perturbation, not optimization).
fn random_insertion(base: &[NodeId], pickup: NodeId, delivery: NodeId, instance: &Instance, rng: &mut Rng) -> Option<Vec<NodeId>> {
    let n = base.len();
    let pickup_pos = rng.random_range(0..=n);
    let mut with_pickup = base.to_vec();
    with_pickup.insert(pickup_pos, pickup);
    let delivery_pos = rng.random_range(pickup_pos..=with_pickup.len() - 1);
    let mut candidate = with_pickup;
    candidate.insert(delivery_pos + 1, delivery);
    evaluate_sequence(&candidate, instance).map(|_| candidate)
}

/// Shuffles the order of a random contiguous sub-segment (length >= 2) of
/// a random route's customer stops, keeping the move only if the shuffled
/// sequence is still feasible and every pair still has its pickup before
/// its delivery. A no-op if no route is long enough or no shuffle within
/// [`MAX_ATTEMPTS`] stays feasible.
fn random_subsegment_shuffle(solution: &mut Solution, instance: &Instance, rng: &mut Rng) {
    let candidate_routes: Vec<usize> = solution
        .routes()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.len() >= 2)
        .map(|(idx, _)| idx)
        .collect();
    if candidate_routes.is_empty() {
        return;
    }
    let route_idx = candidate_routes[rng.random_range(0..candidate_routes.len())];

    let customers = solution.routes()[route_idx].customers().to_vec();
    let n = customers.len();
    let seg_len = rng.random_range(2..=n);
    let start = rng.random_range(0..=n - seg_len);

    for _ in 0..MAX_ATTEMPTS {
        let mut candidate = customers.clone();
        shuffle_in_place(&mut candidate[start..start + seg_len], rng);
        if evaluate_sequence(&candidate, instance).is_some() {
            solution.routes_mut()[route_idx].set_customers(candidate);
            solution.routes_mut()[route_idx].simulate(instance);
            return;
        }
    }
}

fn shuffle_in_place(slice: &mut [NodeId], rng: &mut Rng) {
    for i in (1..slice.len()).rev() {
        let j = rng.random_range(0..=i);
        slice.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{InstanceBuilder, RawNode};
    use crate::rng::seeded;
    use crate::solution::validator;

    fn four_pair_instance() -> Instance {
        let node = |x: f64, demand, ready, due| RawNode {
            coord: Some((x, 0.0)),
            demand,
            ready,
            due,
            service: 0,
        };
        let mut b = InstanceBuilder::new("t", 5).push_node(node(0.0, 0, 0, 100_000));
        for i in 0..4 {
            let base = i as f64 * 10.0;
            b = b
                .push_node(node(base + 1.0, 1, 0, 100_000))
                .push_node(node(base + 2.0, -1, 0, 100_000));
        }
        for i in 0..4 {
            b = b.with_pair(1 + 2 * i, 2 + 2 * i);
        }
        b.build().unwrap()
    }

    #[test]
    fn perturb_preserves_request_coverage_and_feasibility() {
        let inst = four_pair_instance();
        let mut sol = Solution::new(inst.n_requests());
        for (r, &(p, d)) in inst.requests().iter().enumerate() {
            sol.push_new_route(p, d, r as RequestId);
        }
        let mut rng = seeded(17);
        let mut perturbed = perturb(&sol, &inst, &mut rng);
        assert!(perturbed.unassigned_requests().is_empty());
        assert!(validator::validate(&inst, &mut perturbed).is_ok());
    }

    #[test]
    fn perturb_is_deterministic_given_a_seed() {
        let inst = four_pair_instance();
        let mut sol = Solution::new(inst.n_requests());
        for (r, &(p, d)) in inst.requests().iter().enumerate() {
            sol.push_new_route(p, d, r as RequestId);
        }

        let mut rng_a = seeded(3);
        let mut a = perturb(&sol, &inst, &mut rng_a);
        let mut rng_b = seeded(3);
        let mut b = perturb(&sol, &inst, &mut rng_b);

        assert_eq!(a.lex_cost(&inst), b.lex_cost(&inst));
    }
}

//! Destroy operators (§4.3): pick `k` pairs to tear out of the solution,
//! leaving the rest of the routes intact. Both operators draw exclusively
//! from the explicit [`Rng`](crate::rng::Rng) handle passed in — never
//! `rand::rng()`/`thread_rng()` — so a fixed seed reproduces the exact same
//! destruction sequence (§5, §9).

use crate::instance::Instance;
use crate::rng::Rng;
use crate::solution::Solution;
use crate::types::{RequestId, Time};
use rand::seq::index::sample;
use rand::Rng as _;

/// Weights for Shaw relatedness: distance, time-window-centre, same-route.
/// Defaults from §4.3; kept as named constants rather than config fields
/// since the spec does not expose them for tuning.
const SHAW_WEIGHT_DISTANCE: f64 = 0.4;
const SHAW_WEIGHT_TIME: f64 = 0.4;
const SHAW_WEIGHT_ROUTE: f64 = 0.2;

/// Removes `k` distinct, uniformly-random assigned pairs. Returns the
/// removed requests' ids; the caller is responsible for re-simulating /
/// repairing afterwards.
pub fn random_pair_removal(solution: &mut Solution, instance: &Instance, k: usize, rng: &mut Rng) -> Vec<RequestId> {
    let assigned: Vec<RequestId> = (0..instance.n_requests() as RequestId)
        .filter(|&r| solution.is_assigned(r))
        .collect();
    let k = k.min(assigned.len());
    if k == 0 {
        return Vec::new();
    }

    let chosen = sample(rng, assigned.len(), k);
    let removed: Vec<RequestId> = chosen.iter().map(|i| assigned[i]).collect();
    remove_requests(solution, instance, &removed);
    removed
}

/// Removes `k` pairs by Shaw relatedness (§4.3): seeds with one random
/// pair, then repeatedly adds the still-assigned pair most related to the
/// set already chosen.
pub fn shaw_removal(solution: &mut Solution, instance: &Instance, k: usize, rng: &mut Rng) -> Vec<RequestId> {
    let mut remaining: Vec<RequestId> = (0..instance.n_requests() as RequestId)
        .filter(|&r| solution.is_assigned(r))
        .collect();
    let k = k.min(remaining.len());
    if k == 0 {
        return Vec::new();
    }

    let seed_idx = rng.random_range(0..remaining.len());
    let seed = remaining.swap_remove(seed_idx);
    let mut removed = vec![seed];

    while removed.len() < k && !remaining.is_empty() {
        let (best_idx, _) = remaining
            .iter()
            .enumerate()
            .map(|(idx, &candidate)| {
                let score = removed
                    .iter()
                    .map(|&r| relatedness(instance, solution, r, candidate))
                    .fold(f64::NEG_INFINITY, f64::max);
                (idx, score)
            })
            .fold((0usize, f64::NEG_INFINITY), |acc, cur| if cur.1 > acc.1 { cur } else { acc });

        removed.push(remaining.swap_remove(best_idx));
    }

    remove_requests(solution, instance, &removed);
    removed
}

fn window_centre(instance: &Instance, node: crate::types::NodeId) -> Time {
    (instance.ready(node) + instance.due(node)) / 2
}

/// Shaw relatedness (§4.3): weighted sum of normalized inverse
/// pickup-to-pickup/delivery-to-delivery distance, normalized inverse
/// time-window-centre difference, and whether the two pairs currently
/// share a route. Higher means "more related", i.e. more attractive to
/// remove together.
fn relatedness(instance: &Instance, solution: &Solution, a: RequestId, b: RequestId) -> f64 {
    let (pa, da) = instance.request(a);
    let (pb, db) = instance.request(b);

    let dist = (instance.dist(pa, pb) + instance.dist(da, db)) as f64;
    let inv_dist = 1.0 / (1.0 + dist);

    let time_diff = ((window_centre(instance, pa) - window_centre(instance, pb)).abs()
        + (window_centre(instance, da) - window_centre(instance, db)).abs()) as f64;
    let inv_time = 1.0 / (1.0 + time_diff);

    let same_route = match (solution.route_of(a), solution.route_of(b)) {
        (Some(ra), Some(rb)) if ra == rb => 1.0,
        _ => 0.0,
    };

    SHAW_WEIGHT_DISTANCE * inv_dist + SHAW_WEIGHT_TIME * inv_time + SHAW_WEIGHT_ROUTE * same_route
}

fn remove_requests(solution: &mut Solution, instance: &Instance, requests: &[RequestId]) {
    for &r in requests {
        let (pickup, delivery) = instance.request(r);
        solution.remove_request(r, pickup, delivery);
    }
    solution.prune_empty_routes();
}

//! Shared cheapest-feasible-insertion search (§4.2, §4.3, §4.5): given a
//! pair and a solution, find where to put it. The constructor, both LNS
//! repair operators, and AGES's reinsertion step all need exactly this
//! search, so it lives here once rather than three times.

use crate::instance::Instance;
use crate::solution::{Route, Solution};
use crate::types::{Distance, NodeId, DEPOT};

/// One feasible place to put a pair: which route, at which customer
/// positions, and how much distance it adds.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub route_idx: usize,
    pub pickup_pos: usize,
    pub delivery_pos: usize,
    pub delta: Distance,
}

pub(crate) fn full_nodes(customers: &[NodeId]) -> Vec<NodeId> {
    let mut nodes = Vec::with_capacity(customers.len() + 2);
    nodes.push(DEPOT);
    nodes.extend_from_slice(customers);
    nodes.push(DEPOT);
    nodes
}

/// Cheapest feasible `(pickup_pos, delivery_pos)` to insert `(pickup,
/// delivery)` into a single route's customer sequence, or `None` if no
/// ordered position pair is feasible.
pub fn best_in_sequence(customers: &[NodeId], pickup: NodeId, delivery: NodeId, instance: &Instance) -> Option<(usize, usize, Distance)> {
    let base_distance = Route::simulate_sequence(&full_nodes(customers), instance).distance;
    let n = customers.len();
    let mut best: Option<(usize, usize, Distance)> = None;

    for pickup_pos in 0..=n {
        let mut with_pickup = customers.to_vec();
        with_pickup.insert(pickup_pos, pickup);
        for delivery_pos in pickup_pos..=with_pickup.len() - 1 {
            let mut candidate = with_pickup.clone();
            candidate.insert(delivery_pos + 1, delivery);

            let sim = Route::simulate_sequence(&full_nodes(&candidate), instance);
            if !sim.feasible {
                continue;
            }
            let delta = sim.distance - base_distance;
            if best.is_none_or(|(_, _, best_delta)| delta < best_delta) {
                best = Some((pickup_pos, delivery_pos, delta));
            }
        }
    }

    best
}

/// Every route's cheapest feasible insertion of `(pickup, delivery)`,
/// sorted ascending by `delta`. One entry per route that admits at least
/// one feasible position; routes with none are simply absent.
pub fn ranked_insertions(solution: &Solution, instance: &Instance, pickup: NodeId, delivery: NodeId) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = solution
        .routes()
        .iter()
        .enumerate()
        .filter_map(|(route_idx, route)| {
            best_in_sequence(route.customers(), pickup, delivery, instance).map(|(pickup_pos, delivery_pos, delta)| {
                Candidate {
                    route_idx,
                    pickup_pos,
                    delivery_pos,
                    delta,
                }
            })
        })
        .collect();
    candidates.sort_by_key(|c| c.delta);
    candidates
}

/// The single cheapest feasible insertion across all existing routes, or
/// `None` if every route rejects the pair.
pub fn cheapest_insertion(solution: &Solution, instance: &Instance, pickup: NodeId, delivery: NodeId) -> Option<Candidate> {
    ranked_insertions(solution, instance, pickup, delivery).into_iter().next()
}

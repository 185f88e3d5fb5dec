//! Clarke-Wright-style savings fallback (§4.2), grounded on the classic
//! route-merge heuristic: start with one route per pair, then merge whole
//! routes end-to-end in decreasing order of savings. Unlike depot-centered
//! CW, the mergeable unit here is a pair-route (two customers, already
//! precedence-correct) rather than a single customer, and merges are never
//! reversed — reversing a route's interior would break pickup-before-delivery.

use crate::error::SolveError;
use crate::instance::Instance;
use crate::solution::{Route, Solution};
use crate::types::{Distance, NodeId, DEPOT};
use tracing::{debug, warn};

/// A candidate merge: concatenate route `i`'s current tail onto route `j`'s
/// current head. `tail`/`head` pin down the exact nodes the saving was
/// computed for, so a stale merge (one side already extended elsewhere)
/// is rejected rather than silently applied to the wrong nodes.
struct Saving {
    i: usize,
    j: usize,
    tail: NodeId,
    head: NodeId,
    value: Distance,
}

/// Builds an initial solution by pairwise route merging. Returns
/// [`SolveError::ConstructionInfeasible`] only if some single pair cannot
/// even occupy a route by itself (no merge can fix that).
pub fn construct_savings(instance: &Instance) -> Result<Solution, SolveError> {
    let requests = instance.requests();
    let n = requests.len();
    if n == 0 {
        return Ok(Solution::new(0));
    }

    let mut members: Vec<Vec<NodeId>> = Vec::with_capacity(n);
    for &(pickup, delivery) in requests {
        let mut route = Route::with_pair(pickup, delivery);
        if !route.simulate(instance) {
            warn!(pickup, delivery, "savings construction: pair cannot occupy a route by itself");
            return Err(SolveError::ConstructionInfeasible);
        }
        members.push(vec![pickup, delivery]);
    }

    let mut savings = Vec::new();
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let tail = *members[i].last().unwrap();
            let head = members[j][0];
            let value = instance.dist(tail, DEPOT) + instance.dist(DEPOT, head) - instance.dist(tail, head);
            if value > 0 {
                savings.push(Saving { i, j, tail, head, value });
            }
        }
    }
    savings.sort_by(|a, b| b.value.cmp(&a.value));

    let mut route_of: Vec<usize> = (0..n).collect();
    let mut alive: Vec<bool> = vec![true; n];

    for saving in &savings {
        let ri = route_of[saving.i];
        let rj = route_of[saving.j];
        if ri == rj || !alive[ri] || !alive[rj] {
            continue;
        }
        if members[ri].last() != Some(&saving.tail) || members[rj].first() != Some(&saving.head) {
            continue; // one side moved since this saving was computed
        }

        let mut candidate = members[ri].clone();
        candidate.extend(members[rj].iter().copied());
        let load: i32 = total_demand(instance, &candidate);
        if load != 0 {
            continue; // every feasible PDPTW route nets to zero load at the depot
        }
        let sim = Route::simulate_sequence(&full_nodes(&candidate), instance);
        if !sim.feasible {
            continue;
        }

        members[ri] = candidate;
        members[rj].clear();
        alive[rj] = false;
        for slot in route_of.iter_mut() {
            if *slot == rj {
                *slot = ri;
            }
        }
    }

    let routes: Vec<Route> = members
        .into_iter()
        .zip(alive)
        .filter(|(_, keep)| *keep)
        .map(|(customers, _)| Route::from_customers(customers))
        .collect();

    debug!(pairs = n, vehicles = routes.len(), "savings construction merged routes");
    Ok(Solution::from_routes(routes, instance))
}

fn total_demand(instance: &Instance, customers: &[NodeId]) -> i32 {
    customers.iter().map(|&n| instance.demand(n)).sum()
}

fn full_nodes(customers: &[NodeId]) -> Vec<NodeId> {
    let mut nodes = Vec::with_capacity(customers.len() + 2);
    nodes.push(DEPOT);
    nodes.extend_from_slice(customers);
    nodes.push(DEPOT);
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{InstanceBuilder, RawNode};

    fn two_pair_instance() -> Instance {
        let node = |x: f64, demand, ready, due| RawNode {
            coord: Some((x, 0.0)),
            demand,
            ready,
            due,
            service: 0,
        };
        InstanceBuilder::new("t", 2)
            .push_node(node(0.0, 0, 0, 1000))
            .push_node(node(1.0, 1, 0, 1000))
            .push_node(node(2.0, -1, 0, 1000))
            .push_node(node(3.0, 1, 0, 1000))
            .push_node(node(4.0, -1, 0, 1000))
            .with_pair(1, 2)
            .with_pair(3, 4)
            .build()
            .unwrap()
    }

    #[test]
    fn savings_places_every_request() {
        let inst = two_pair_instance();
        let mut sol = construct_savings(&inst).unwrap();
        assert!(sol.unassigned_requests().is_empty());
        assert!(crate::solution::validator::validate(&inst, &mut sol).is_ok());
    }

    #[test]
    fn savings_merges_colinear_pairs_into_one_route() {
        let inst = two_pair_instance();
        let sol = construct_savings(&inst).unwrap();
        assert_eq!(sol.vehicle_count(), 1);
    }
}

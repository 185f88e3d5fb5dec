//! Pair-level greedy insertion construction (§4.2).
//!
//! Requests are ordered by urgency — tightest pickup deadline first, ties
//! broken by narrower time window — then each is inserted at the cheapest
//! feasible `(pickup_pos, delivery_pos)` across every open route. A request
//! that fits nowhere opens a fresh route; a request that can't even start
//! its own route (demand exceeds capacity, or its own window is
//! unreachable from the depot) makes the whole instance infeasible.

use crate::error::SolveError;
use crate::insertion::cheapest_insertion;
use crate::instance::Instance;
use crate::solution::{Route, Solution};
use crate::types::RequestId;
use tracing::{debug, warn};

/// Builds an initial solution by greedy cheapest-insertion, opening new
/// routes as needed. Never fails to place a structurally valid request
/// into *some* route — it only reports [`SolveError::ConstructionInfeasible`]
/// when a request cannot be served by any route, including a fresh one.
pub fn construct(instance: &Instance) -> Result<Solution, SolveError> {
    let mut order: Vec<RequestId> = (0..instance.n_requests() as RequestId).collect();
    order.sort_by_key(|&r| {
        let (pickup, _) = instance.request(r);
        (instance.due(pickup), instance.due(pickup) - instance.ready(pickup))
    });

    let mut solution = Solution::new(instance.n_requests());

    for r in order {
        let (pickup, delivery) = instance.request(r);
        match cheapest_insertion(&solution, instance, pickup, delivery) {
            Some(c) => {
                solution.insert_into_route(c.route_idx, r, pickup, delivery, c.pickup_pos, c.delivery_pos);
            }
            None => {
                let mut candidate = Route::with_pair(pickup, delivery);
                if !candidate.simulate(instance) {
                    warn!(request = r, "greedy construction cannot serve request on any route, not even a fresh one");
                    return Err(SolveError::ConstructionInfeasible);
                }
                solution.push_new_route(pickup, delivery, r);
            }
        }
    }

    debug!(
        requests = instance.n_requests(),
        vehicles = solution.vehicle_count(),
        "greedy construction finished"
    );
    Ok(solution)
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
            .push_node(node(10.0, 1, 0, 1000))
            .push_node(node(20.0, -1, 0, 1000))
            .push_node(node(11.0, 1, 0, 1000))
            .push_node(node(21.0, -1, 0, 1000))
            .with_pair(1, 2)
            .with_pair(3, 4)
            .build()
            .unwrap()
    }

    #[test]
    fn greedy_places_every_request() {
        let inst = two_pair_instance();
        let mut sol = construct(&inst).unwrap();
        assert!(sol.unassigned_requests().is_empty());
        assert!(crate::solution::validator::validate(&inst, &mut sol).is_ok());
    }

    #[test]
    fn greedy_reports_infeasible_when_capacity_too_small() {
        let node = |x: f64, demand, ready, due| RawNode {
            coord: Some((x, 0.0)),
            demand,
            ready,
            due,
            service: 0,
        };
        let inst = InstanceBuilder::new("t", 0)
            .push_node(node(0.0, 0, 0, 1000))
            .push_node(node(10.0, 1, 0, 1000))
            .push_node(node(20.0, -1, 0, 1000))
            .with_pair(1, 2)
            .build()
            .unwrap();
        assert!(matches!(construct(&inst), Err(SolveError::ConstructionInfeasible)));
    }
}

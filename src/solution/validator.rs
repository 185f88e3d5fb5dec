//! The feasibility validator (§4.1) — the single source of truth every
//! mutating operator consults before publishing a candidate solution.
//! Deterministic, never mutates its input beyond populating the route
//! simulation cache, and runs in `O(total_nodes)`.

use crate::instance::Instance;
use crate::solution::Solution;
use crate::types::{NodeId, RequestId, Time};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    UnpairedDelivery(NodeId),
    DeliveryBeforePickup(RequestId),
    MissingRequest(RequestId),
    DuplicateVisit(NodeId),
    CapacityOverflow { route: usize, position: usize },
    TimeWindowViolation { route: usize, position: usize, arrival: Time, due: Time },
    DepotReturnLate { route: usize, arrival: Time, due: Time },
}

/// Validates `solution` against `instance`. Never mutates the logical
/// state of `solution`; it only (re)populates each route's cached schedule
/// so callers can read distances/loads afterwards without resimulating.
pub fn validate(instance: &Instance, solution: &mut Solution) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    // Single pass: node -> (route, position among customer stops), and
    // duplicate-visit detection, both in one O(total_nodes) sweep.
    let mut position_of: HashMap<NodeId, (usize, usize)> = HashMap::new();
    for (route_idx, route) in solution.routes().iter().enumerate() {
        for (pos, &node) in route.customers().iter().enumerate() {
            if position_of.insert(node, (route_idx, pos)).is_some() {
                violations.push(Violation::DuplicateVisit(node));
            }
        }
    }

    for (r, &(pickup, delivery)) in instance.requests().iter().enumerate() {
        let r = r as RequestId;
        match (position_of.get(&pickup), position_of.get(&delivery)) {
            (None, None) | (Some(_), None) => violations.push(Violation::MissingRequest(r)),
            (None, Some(_)) => violations.push(Violation::UnpairedDelivery(delivery)),
            (Some(&(rp, ip)), Some(&(rd, id))) => {
                if rp != rd {
                    violations.push(Violation::UnpairedDelivery(delivery));
                } else if ip >= id {
                    violations.push(Violation::DeliveryBeforePickup(r));
                }
            }
        }
    }

    for (route_idx, route) in solution.routes_mut().iter_mut().enumerate() {
        if route.is_empty() {
            continue;
        }
        route.simulate(instance);
        let sim = route.last_simulation().expect("just simulated");
        let last = sim.loads.len() - 1;
        for pos in 0..sim.loads.len() {
            if sim.loads[pos] < 0 || sim.loads[pos] > instance.capacity() {
                violations.push(Violation::CapacityOverflow {
                    route: route_idx,
                    position: pos,
                });
            }
            let node = route.nodes()[pos];
            let due = instance.due(node);
            if sim.times[pos] > due {
                if pos == last {
                    violations.push(Violation::DepotReturnLate {
                        route: route_idx,
                        arrival: sim.times[pos],
                        due,
                    });
                } else {
                    violations.push(Violation::TimeWindowViolation {
                        route: route_idx,
                        position: pos,
                        arrival: sim.times[pos],
                        due,
                    });
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{InstanceBuilder, RawNode};
    use crate::solution::Solution;

    fn tiny_instance(capacity: crate::types::Demand) -> Instance {
        let node = |x: f64, demand, ready, due| RawNode {
            coord: Some((x, 0.0)),
            demand,
            ready,
            due,
            service: 0,
        };
        InstanceBuilder::new("t", capacity)
            .push_node(node(0.0, 0, 0, 1000))
            .push_node(node(10.0, 1, 0, 500))
            .push_node(node(20.0, -1, 0, 1000))
            .with_pair(1, 2)
            .build()
            .unwrap()
    }

    #[test]
    fn single_pair_route_is_feasible() {
        let inst = tiny_instance(1);
        let mut sol = Solution::new(1);
        sol.push_new_route(1, 2, 0);
        assert!(validate(&inst, &mut sol).is_ok());
    }

    #[test]
    fn missing_request_is_reported() {
        let inst = tiny_instance(1);
        let mut sol = Solution::new(1);
        let violations = validate(&inst, &mut sol).unwrap_err();
        assert!(violations.contains(&Violation::MissingRequest(0)));
    }

    #[test]
    fn capacity_overflow_is_reported() {
        let inst = tiny_instance(0);
        let mut sol = Solution::new(1);
        sol.push_new_route(1, 2, 0);
        let violations = validate(&inst, &mut sol).unwrap_err();
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::CapacityOverflow { .. })));
    }
}

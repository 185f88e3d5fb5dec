//! The mutable candidate solution (§3, §4): a dynamically-sized fleet of
//! [`Route`]s plus the request -> route assignment bookkeeping every
//! destroy/repair operator needs to stay O(1) on lookup.

use crate::instance::Instance;
use crate::solution::route::Route;
use crate::types::{Distance, LexCost, NodeId, RequestId};
use std::collections::HashMap;

/// A full candidate solution. Unlike the teacher's fixed heterogeneous
/// fleet, routes are pushed on demand and never pre-allocated empty —
/// the vehicle count is simply `routes.len()` after [`Solution::prune_empty_routes`].
#[derive(Debug, Clone)]
pub struct Solution {
    routes: Vec<Route>,
    /// `assignment[r]` is the route currently carrying request `r`, or
    /// `None` while `r` sits unassigned mid-destroy/repair.
    assignment: Vec<Option<usize>>,
}

impl Solution {
    /// An empty solution with no routes, sized for `n_requests` requests.
    pub fn new(n_requests: usize) -> Self {
        Self {
            routes: Vec::new(),
            assignment: vec![None; n_requests],
        }
    }

    pub fn n_requests(&self) -> usize {
        self.assignment.len()
    }

    /// Builds a solution from already-assembled routes, deriving the
    /// assignment table by matching each request's pickup node to the route
    /// that carries it. Used by constructors that build whole routes
    /// directly (e.g. the savings merge) rather than incrementally.
    pub fn from_routes(routes: Vec<Route>, instance: &Instance) -> Self {
        let mut node_route = HashMap::new();
        for (idx, route) in routes.iter().enumerate() {
            for &node in route.customers() {
                node_route.insert(node, idx);
            }
        }
        let mut assignment = vec![None; instance.n_requests()];
        for (r, &(pickup, _)) in instance.requests().iter().enumerate() {
            assignment[r] = node_route.get(&pickup).copied();
        }
        Self { routes, assignment }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn routes_mut(&mut self) -> &mut [Route] {
        &mut self.routes
    }

    pub fn assignment(&self) -> &[Option<usize>] {
        &self.assignment
    }

    pub fn route_of(&self, request: RequestId) -> Option<usize> {
        self.assignment[request as usize]
    }

    pub fn is_assigned(&self, request: RequestId) -> bool {
        self.assignment[request as usize].is_some()
    }

    /// All requests with no current route, in ascending `RequestId` order.
    pub fn unassigned_requests(&self) -> Vec<RequestId> {
        self.assignment
            .iter()
            .enumerate()
            .filter_map(|(r, slot)| slot.is_none().then_some(r as RequestId))
            .collect()
    }

    /// Opens a brand-new route carrying a single pair and assigns `request` to it.
    /// Returns the new route's index.
    pub fn push_new_route(&mut self, pickup: NodeId, delivery: NodeId, request: RequestId) -> usize {
        let idx = self.routes.len();
        self.routes.push(Route::with_pair(pickup, delivery));
        self.assignment[request as usize] = Some(idx);
        idx
    }

    /// Inserts a pair into an existing route at the given customer positions
    /// (see [`Route::insert_pair`]) and records the assignment.
    pub fn insert_into_route(
        &mut self,
        route_idx: usize,
        request: RequestId,
        pickup: NodeId,
        delivery: NodeId,
        pickup_pos: usize,
        delivery_pos: usize,
    ) {
        self.routes[route_idx].insert_pair(pickup, delivery, pickup_pos, delivery_pos);
        self.assignment[request as usize] = Some(route_idx);
    }

    /// Directly rewrites the assignment table for `request` to point at
    /// `route_idx`. Used by local search moves that already relocated the
    /// pair's nodes via [`Route::set_customers`] and only need the
    /// bookkeeping table to catch up — unlike [`Solution::insert_into_route`],
    /// it does not touch any route's node sequence.
    pub(crate) fn reassign_request(&mut self, request: RequestId, route_idx: usize) {
        self.assignment[request as usize] = Some(route_idx);
    }

    /// Removes a request's pair from its current route, marking it
    /// unassigned. Panics if the request was not assigned — callers (destroy
    /// operators) are expected to only ever remove assigned requests.
    pub fn remove_request(&mut self, request: RequestId, pickup: NodeId, delivery: NodeId) -> usize {
        let idx = self.assignment[request as usize].expect("remove_request: request not assigned");
        self.routes[idx].remove_pair(pickup, delivery);
        self.assignment[request as usize] = None;
        idx
    }

    /// Drops every route left empty by prior removals and renumbers the
    /// assignment table to match. Must be called before the solution is
    /// published (validated, compared, or returned) — spec.md §3 invariant 5
    /// forbids empty routes in a committed solution, but destroy/repair
    /// operators are free to leave routes transiently empty mid-iteration.
    pub fn prune_empty_routes(&mut self) {
        let mut remap = vec![None; self.routes.len()];
        let mut kept = Vec::with_capacity(self.routes.len());
        for (old_idx, route) in self.routes.drain(..).enumerate() {
            if !route.is_empty() {
                remap[old_idx] = Some(kept.len());
                kept.push(route);
            }
        }
        self.routes = kept;
        for slot in self.assignment.iter_mut() {
            if let Some(old_idx) = *slot {
                *slot = remap[old_idx];
            }
        }
    }

    /// Number of non-empty routes — the primary (lexicographically first)
    /// objective component.
    pub fn vehicle_count(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    /// Simulates every route whose cache is stale and returns whether the
    /// whole solution is schedule-and-capacity feasible. Does not check
    /// pairing/precedence/duplicate invariants — use
    /// [`crate::solution::validator::validate`] for the full check.
    pub fn ensure_simulated(&mut self, instance: &Instance) -> bool {
        let mut all_feasible = true;
        for route in self.routes.iter_mut() {
            if route.is_empty() {
                continue;
            }
            let feasible = match route.last_simulation() {
                Some(sim) => sim.feasible,
                None => route.simulate(instance),
            };
            all_feasible &= feasible;
        }
        all_feasible
    }

    /// Total distance across all (simulated) routes.
    pub fn total_distance(&mut self, instance: &Instance) -> Distance {
        self.ensure_simulated(instance);
        self.routes
            .iter()
            .filter_map(|r| r.last_simulation())
            .map(|sim| sim.distance)
            .sum()
    }

    /// The lexicographic `(vehicle_count, total_distance)` objective.
    pub fn lex_cost(&mut self, instance: &Instance) -> LexCost {
        let distance = self.total_distance(instance);
        LexCost::new(self.vehicle_count(), distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{InstanceBuilder, RawNode};

    fn pair_instance() -> Instance {
        let node = |x: f64, demand, ready, due| RawNode {
            coord: Some((x, 0.0)),
            demand,
            ready,
            due,
            service: 0,
        };
        InstanceBuilder::new("t", 1)
            .push_node(node(0.0, 0, 0, 1000))
            .push_node(node(10.0, 1, 0, 1000))
            .push_node(node(20.0, -1, 0, 1000))
            .push_node(node(30.0, 1, 0, 1000))
            .push_node(node(40.0, -1, 0, 1000))
            .with_pair(1, 2)
            .with_pair(3, 4)
            .build()
            .unwrap()
    }

    #[test]
    fn vehicle_count_and_distance_track_routes() {
        let inst = pair_instance();
        let mut sol = Solution::new(2);
        sol.push_new_route(1, 2, 0);
        sol.push_new_route(3, 4, 1);
        assert_eq!(sol.vehicle_count(), 2);
        assert_eq!(sol.lex_cost(&inst), LexCost::new(2, 40));
    }

    #[test]
    fn prune_empty_routes_renumbers_assignment() {
        let inst = pair_instance();
        let mut sol = Solution::new(2);
        sol.push_new_route(1, 2, 0);
        sol.push_new_route(3, 4, 1);
        sol.remove_request(0, 1, 2);
        assert_eq!(sol.vehicle_count(), 1);
        sol.prune_empty_routes();
        assert_eq!(sol.routes().len(), 1);
        assert_eq!(sol.route_of(1), Some(0));
        assert_eq!(sol.route_of(0), None);
        sol.ensure_simulated(&inst);
    }

    #[test]
    fn unassigned_requests_lists_removed_ones() {
        let mut sol = Solution::new(2);
        sol.push_new_route(1, 2, 0);
        sol.push_new_route(3, 4, 1);
        sol.remove_request(0, 1, 2);
        assert_eq!(sol.unassigned_requests(), vec![0]);
    }
}

//! A single vehicle route and its feasibility schedule (§3, invariant 3-4).

use crate::instance::Instance;
use crate::types::{Demand, Distance, NodeId, Time, DEPOT};

/// The simulated schedule of a route: arrival time, slack, and cumulative
/// load at every stop, plus whether the route is feasible as a whole.
/// Cached on [`Route`] and invalidated by any mutation.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Arrival time at each node in `Route::nodes`, including both depot
    /// visits (`times[0] == 0`).
    pub times: Vec<Time>,
    /// Remaining slack at each node: `due(node) - times[i]`. Negative means
    /// infeasible at that stop.
    pub slack: Vec<Time>,
    /// Minimum slack from this position to the end of the route — the
    /// quantity an insertion must not exceed to stay feasible (mirrors the
    /// reverse-pass `min_slack` used by insertion feasibility checks).
    pub min_slack: Vec<Time>,
    /// Cumulative load at each node.
    pub loads: Vec<Demand>,
    pub distance: Distance,
    pub feasible: bool,
}

/// A single vehicle route: `[depot, v1, .., vk, depot]`. Never stored empty
/// (spec.md §3 invariant 5); the solution simply omits vehicles with no
/// assigned pairs.
#[derive(Debug, Clone)]
pub struct Route {
    nodes: Vec<NodeId>,
    simulation: Option<SimulationResult>,
}

impl Route {
    /// A fresh route carrying a single pair: `[depot, p, d, depot]`.
    pub fn with_pair(pickup: NodeId, delivery: NodeId) -> Self {
        Self {
            nodes: vec![DEPOT, pickup, delivery, DEPOT],
            simulation: None,
        }
    }

    /// The full node sequence, including the leading and trailing depot.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Customer stops only (excludes both depot visits).
    pub fn customers(&self) -> &[NodeId] {
        &self.nodes[1..self.nodes.len() - 1]
    }

    /// Number of customer stops (not counting either depot visit).
    pub fn len(&self) -> usize {
        self.nodes.len() - 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts a pair at the given *customer* positions (0-indexed, counted
    /// among customer stops only); `pickup_pos <= delivery_pos`. Invalidates
    /// the cached simulation.
    pub fn insert_pair(&mut self, pickup: NodeId, delivery: NodeId, pickup_pos: usize, delivery_pos: usize) {
        debug_assert!(pickup_pos <= delivery_pos);
        self.nodes.insert(1 + delivery_pos, delivery);
        self.nodes.insert(1 + pickup_pos, pickup);
        self.simulation = None;
    }

    /// Removes both legs of a pair from this route, returning their
    /// customer-position indices before removal (pickup, delivery).
    pub fn remove_pair(&mut self, pickup: NodeId, delivery: NodeId) -> (usize, usize) {
        let pickup_pos = self.nodes.iter().position(|&n| n == pickup).expect("pickup present");
        self.nodes.remove(pickup_pos);
        let delivery_pos = self.nodes.iter().position(|&n| n == delivery).expect("delivery present");
        self.nodes.remove(delivery_pos);
        self.simulation = None;
        (pickup_pos - 1, delivery_pos - 1)
    }

    /// Builds a route directly from a customer sequence (used by the
    /// savings-merge constructor, which assembles routes outside the
    /// single-pair constructor).
    pub fn from_customers(customers: Vec<NodeId>) -> Self {
        let mut nodes = Vec::with_capacity(customers.len() + 2);
        nodes.push(DEPOT);
        nodes.extend(customers);
        nodes.push(DEPOT);
        Self {
            nodes,
            simulation: None,
        }
    }

    /// Replaces the customer sequence wholesale (used by local search moves
    /// and the savings-merge constructor). Invalidates the cached simulation.
    pub fn set_customers(&mut self, customers: Vec<NodeId>) {
        let mut nodes = Vec::with_capacity(customers.len() + 2);
        nodes.push(DEPOT);
        nodes.extend(customers);
        nodes.push(DEPOT);
        self.nodes = nodes;
        self.simulation = None;
    }

    pub fn last_simulation(&self) -> Option<&SimulationResult> {
        self.simulation.as_ref()
    }

    /// Runs the schedule simulation (§3 invariant 3-4) and caches the
    /// result, returning whether the route is feasible.
    pub fn simulate(&mut self, instance: &Instance) -> bool {
        let sim = simulate_nodes(&self.nodes, instance);
        let feasible = sim.feasible;
        self.simulation = Some(sim);
        feasible
    }

    /// Simulates a hypothetical node sequence without mutating the route;
    /// used by operators probing a candidate move before committing to it.
    pub fn simulate_sequence(nodes: &[NodeId], instance: &Instance) -> SimulationResult {
        simulate_nodes(nodes, instance)
    }
}

fn simulate_nodes(nodes: &[NodeId], instance: &Instance) -> SimulationResult {
    let n = nodes.len();
    let mut times = vec![0; n];
    let mut slack = vec![0; n];
    let mut loads = vec![0; n];
    let mut distance: Distance = 0;
    let mut feasible = true;

    loads[0] = instance.demand(nodes[0]);
    slack[0] = instance.due(nodes[0]) - times[0];
    if times[0] > instance.due(nodes[0]) {
        feasible = false;
    }

    for i in 1..n {
        let prev = nodes[i - 1];
        let cur = nodes[i];
        distance += instance.dist(prev, cur);
        let arrival = times[i - 1] + instance.service(prev) + instance.travel_time(prev, cur);
        let arrival = arrival.max(instance.ready(cur));
        times[i] = arrival;
        slack[i] = instance.due(cur) - arrival;
        if arrival > instance.due(cur) {
            feasible = false;
        }
        loads[i] = loads[i - 1] + instance.demand(cur);
        if loads[i] < 0 || loads[i] > instance.capacity() {
            feasible = false;
        }
    }

    let mut min_slack = vec![0; n];
    if n > 0 {
        min_slack[n - 1] = slack[n - 1];
        for i in (0..n - 1).rev() {
            min_slack[i] = slack[i].min(min_slack[i + 1]);
        }
    }

    SimulationResult {
        times,
        slack,
        min_slack,
        loads,
        distance,
        feasible,
    }
}

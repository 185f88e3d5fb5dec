//! The immutable problem instance (§3): nodes, time windows, demands,
//! distance matrix, pickup-delivery pairing. Shared read-only by every
//! component once built.

use crate::error::SolveError;
use crate::instance::matrix::Matrix2;
use crate::types::{Demand, Distance, NodeId, RequestId, Time, Window, DEPOT};

/// A single node: either the depot (index 0) or a pickup/delivery stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeData {
    pub coord: Option<(f64, f64)>,
    pub demand: Demand,
    pub ready: Time,
    pub due: Time,
    pub service: Time,
}

/// Immutable PDPTW instance. Build through [`InstanceBuilder`], which
/// validates every invariant spec.md §3 requires before handing back an
/// `Instance` — a successfully built instance is always internally
/// consistent.
#[derive(Debug, Clone)]
pub struct Instance {
    pub(crate) name: String,
    pub(crate) capacity: Demand,
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) dist: Matrix2<Distance>,
    pub(crate) travel_time: Matrix2<Time>,
    /// Indexed by pickup node id; `None` for non-pickup nodes and the depot.
    pub(crate) delivery_of: Vec<Option<NodeId>>,
    /// Indexed by delivery node id; `None` for non-delivery nodes and the depot.
    pub(crate) pickup_of: Vec<Option<NodeId>>,
    pub(crate) requests: Vec<(NodeId, NodeId)>,
}

impl Instance {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_requests(&self) -> usize {
        self.requests.len()
    }

    pub fn capacity(&self) -> Demand {
        self.capacity
    }

    pub fn node(&self, n: NodeId) -> &NodeData {
        &self.nodes[n as usize]
    }

    pub fn demand(&self, n: NodeId) -> Demand {
        self.nodes[n as usize].demand
    }

    pub fn ready(&self, n: NodeId) -> Time {
        self.nodes[n as usize].ready
    }

    pub fn due(&self, n: NodeId) -> Time {
        self.nodes[n as usize].due
    }

    pub fn window(&self, n: NodeId) -> Window {
        self.ready(n)..=self.due(n)
    }

    pub fn service(&self, n: NodeId) -> Time {
        self.nodes[n as usize].service
    }

    #[inline(always)]
    pub fn dist(&self, a: NodeId, b: NodeId) -> Distance {
        *self.dist.get(a as usize, b as usize)
    }

    #[inline(always)]
    pub fn travel_time(&self, a: NodeId, b: NodeId) -> Time {
        *self.travel_time.get(a as usize, b as usize)
    }

    /// Delivery node paired with pickup node `n`, or `None` if `n` is not a pickup.
    pub fn delivery_of(&self, n: NodeId) -> Option<NodeId> {
        self.delivery_of[n as usize]
    }

    /// Pickup node paired with delivery node `n`, or `None` if `n` is not a delivery.
    pub fn pickup_of(&self, n: NodeId) -> Option<NodeId> {
        self.pickup_of[n as usize]
    }

    pub fn is_pickup(&self, n: NodeId) -> bool {
        n != DEPOT && self.delivery_of[n as usize].is_some()
    }

    pub fn is_delivery(&self, n: NodeId) -> bool {
        n != DEPOT && self.pickup_of[n as usize].is_some()
    }

    /// Every request as `(pickup_node, delivery_node)`, ordered by `RequestId`.
    pub fn requests(&self) -> &[(NodeId, NodeId)] {
        &self.requests
    }

    pub fn request(&self, r: RequestId) -> (NodeId, NodeId) {
        self.requests[r as usize]
    }
}

/// Raw, unvalidated node input accepted by the builder; separate from
/// [`NodeData`] so the parser can hand over coordinates without having
/// already resolved distances.
#[derive(Debug, Clone, Copy)]
pub struct RawNode {
    pub coord: Option<(f64, f64)>,
    pub demand: Demand,
    pub ready: Time,
    pub due: Time,
    pub service: Time,
}

pub struct InstanceBuilder {
    name: String,
    capacity: Demand,
    nodes: Vec<RawNode>,
    dist: Option<Matrix2<Distance>>,
    speed: f64,
    pairs: Vec<(NodeId, NodeId)>,
}

impl InstanceBuilder {
    pub fn new(name: impl Into<String>, capacity: Demand) -> Self {
        Self {
            name: name.into(),
            capacity,
            nodes: Vec::new(),
            dist: None,
            speed: 1.0,
            pairs: Vec::new(),
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn push_node(mut self, node: RawNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Supplies an explicit distance matrix (Format-A). Mutually exclusive
    /// with relying on Euclidean coordinates.
    pub fn with_distance_matrix(mut self, dist: Matrix2<Distance>) -> Self {
        self.dist = Some(dist);
        self
    }

    /// Registers a pickup-delivery pair by node id. The depot must never
    /// appear here.
    pub fn with_pair(mut self, pickup: NodeId, delivery: NodeId) -> Self {
        self.pairs.push((pickup, delivery));
        self
    }

    /// Validates every invariant in spec.md §3 and builds the `Instance`,
    /// or reports `SolveError::InvalidInstance` describing the first
    /// violation found.
    pub fn build(self) -> Result<Instance, SolveError> {
        let n = self.nodes.len();
        if n == 0 {
            return Err(SolveError::InvalidInstance("instance has no nodes".into()));
        }
        if self.capacity < 0 {
            return Err(SolveError::InvalidInstance("negative capacity".into()));
        }

        for (i, raw) in self.nodes.iter().enumerate() {
            if raw.ready > raw.due {
                return Err(SolveError::InvalidInstance(format!(
                    "node {i}: ready ({}) > due ({})",
                    raw.ready, raw.due
                )));
            }
            if raw.service < 0 {
                return Err(SolveError::InvalidInstance(format!(
                    "node {i}: negative service duration"
                )));
            }
        }
        if self.nodes[0].demand != 0 {
            return Err(SolveError::InvalidInstance("depot must have zero demand".into()));
        }

        let dist = match self.dist {
            Some(d) => {
                if d.rows() != n || d.cols() != n {
                    return Err(SolveError::InvalidInstance(
                        "distance matrix size does not match node count".into(),
                    ));
                }
                for i in 0..n {
                    for j in 0..n {
                        let dij = *d.get(i, j);
                        let dji = *d.get(j, i);
                        if dij < 0 {
                            return Err(SolveError::InvalidInstance(format!(
                                "negative distance ({i}, {j})"
                            )));
                        }
                        if dij != dji {
                            return Err(SolveError::InvalidInstance(format!(
                                "asymmetric distance between {i} and {j}: {dij} != {dji}"
                            )));
                        }
                    }
                }
                d
            }
            None => build_euclidean_matrix(&self.nodes)?,
        };

        let travel_time = if (self.speed - 1.0).abs() < f64::EPSILON {
            Matrix2::from_rows(
                (0..n)
                    .map(|i| (0..n).map(|j| *dist.get(i, j)).collect())
                    .collect(),
            )
        } else {
            if self.speed <= 0.0 {
                return Err(SolveError::InvalidInstance("speed must be positive".into()));
            }
            Matrix2::from_rows(
                (0..n)
                    .map(|i| {
                        (0..n)
                            .map(|j| ((*dist.get(i, j) as f64) / self.speed).round() as Time)
                            .collect()
                    })
                    .collect(),
            )
        };

        let mut delivery_of: Vec<Option<NodeId>> = vec![None; n];
        let mut pickup_of: Vec<Option<NodeId>> = vec![None; n];
        let mut requests = Vec::with_capacity(self.pairs.len());

        for &(p, d) in &self.pairs {
            if p as usize >= n || d as usize >= n {
                return Err(SolveError::InvalidInstance(format!(
                    "pair ({p}, {d}) references a node outside [0, {n})"
                )));
            }
            if p == DEPOT || d == DEPOT {
                return Err(SolveError::InvalidInstance(
                    "the depot cannot be part of a pickup-delivery pair".into(),
                ));
            }
            if delivery_of[p as usize].is_some() || pickup_of[p as usize].is_some() {
                return Err(SolveError::InvalidInstance(format!(
                    "node {p} is used in more than one pair"
                )));
            }
            if delivery_of[d as usize].is_some() || pickup_of[d as usize].is_some() {
                return Err(SolveError::InvalidInstance(format!(
                    "node {d} is used in more than one pair"
                )));
            }
            let pickup_demand = self.nodes[p as usize].demand;
            let delivery_demand = self.nodes[d as usize].demand;
            if pickup_demand <= 0 {
                return Err(SolveError::InvalidInstance(format!(
                    "pickup node {p} must have positive demand"
                )));
            }
            if delivery_demand != -pickup_demand {
                return Err(SolveError::InvalidInstance(format!(
                    "pair ({p}, {d}) demand mismatch: pickup {pickup_demand}, delivery {delivery_demand}"
                )));
            }
            delivery_of[p as usize] = Some(d);
            pickup_of[d as usize] = Some(p);
            requests.push((p, d));
        }

        if 2 * requests.len() + 1 != n {
            return Err(SolveError::InvalidInstance(format!(
                "{} nodes given but {} pairs cover only {} of them",
                n,
                requests.len(),
                2 * requests.len()
            )));
        }

        let nodes = self
            .nodes
            .into_iter()
            .map(|raw| NodeData {
                coord: raw.coord,
                demand: raw.demand,
                ready: raw.ready,
                due: raw.due,
                service: raw.service,
            })
            .collect();

        requests.sort_by_key(|&(p, _)| p);

        Ok(Instance {
            name: self.name,
            capacity: self.capacity,
            nodes,
            dist,
            travel_time,
            delivery_of,
            pickup_of,
            requests,
        })
    }
}

fn build_euclidean_matrix(nodes: &[RawNode]) -> Result<Matrix2<Distance>, SolveError> {
    let n = nodes.len();
    let mut rows = Vec::with_capacity(n);
    for i in 0..n {
        let (xi, yi) = nodes[i].coord.ok_or_else(|| {
            SolveError::InvalidInstance(format!(
                "node {i} has no coordinates and no distance matrix was supplied"
            ))
        })?;
        let mut row = Vec::with_capacity(n);
        for j in 0..n {
            let (xj, yj) = nodes[j]
                .coord
                .expect("checked above for all nodes sharing this builder");
            let d = ((xi - xj).powi(2) + (yi - yj).powi(2)).sqrt();
            row.push(d.round() as Distance);
        }
        rows.push(row);
    }
    Ok(Matrix2::from_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(x: f64, y: f64, demand: Demand, ready: Time, due: Time, service: Time) -> RawNode {
        RawNode {
            coord: Some((x, y)),
            demand,
            ready,
            due,
            service,
        }
    }

    #[test]
    fn builds_degenerate_one_pair_instance() {
        let inst = InstanceBuilder::new("degenerate", 1)
            .push_node(node(0.0, 0.0, 0, 0, 1000, 0))
            .push_node(node(10.0, 0.0, 1, 0, 500, 0))
            .push_node(node(20.0, 0.0, -1, 0, 1000, 0))
            .with_pair(1, 2)
            .build()
            .unwrap();

        assert_eq!(inst.n_requests(), 1);
        assert_eq!(inst.dist(0, 1), 10);
        assert_eq!(inst.dist(1, 2), 10);
        assert_eq!(inst.delivery_of(1), Some(2));
        assert_eq!(inst.pickup_of(2), Some(1));
    }

    #[test]
    fn rejects_ready_after_due() {
        let result = InstanceBuilder::new("bad", 1)
            .push_node(node(0.0, 0.0, 0, 0, 1000, 0))
            .push_node(node(10.0, 0.0, 1, 500, 100, 0))
            .push_node(node(20.0, 0.0, -1, 0, 1000, 0))
            .with_pair(1, 2)
            .build();
        assert!(matches!(result, Err(SolveError::InvalidInstance(_))));
    }

    #[test]
    fn rejects_unmatched_demand() {
        let result = InstanceBuilder::new("bad", 1)
            .push_node(node(0.0, 0.0, 0, 0, 1000, 0))
            .push_node(node(10.0, 0.0, 1, 0, 1000, 0))
            .push_node(node(20.0, 0.0, -2, 0, 1000, 0))
            .with_pair(1, 2)
            .build();
        assert!(matches!(result, Err(SolveError::InvalidInstance(_))));
    }

    #[test]
    fn zero_capacity_with_demand_is_invalid_instance_not_panic() {
        // Capacity itself is a legal (if useless) value; infeasibility with
        // positive demand surfaces later as `construction_infeasible`, not
        // here — the builder only rejects structurally inconsistent data.
        let inst = InstanceBuilder::new("zero-cap", 0)
            .push_node(node(0.0, 0.0, 0, 0, 1000, 0))
            .push_node(node(10.0, 0.0, 1, 0, 1000, 0))
            .push_node(node(20.0, 0.0, -1, 0, 1000, 0))
            .with_pair(1, 2)
            .build()
            .unwrap();
        assert_eq!(inst.capacity(), 0);
    }
}

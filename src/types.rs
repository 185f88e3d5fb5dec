//! Primitive numeric and identifier types shared by every module.

use std::ops::RangeInclusive;

/// Node index into the instance's node table. Node `0` is always the depot.
pub type NodeId = u32;

/// Index of a pickup-delivery pair ("request"). Zero-indexed.
pub type RequestId = u32;

/// Time, in whatever unit the instance uses (minutes in the classic Li & Lim
/// benchmarks). Signed so arithmetic on slack/waiting never needs saturation
/// tricks beyond overflow guards.
pub type Time = i64;

/// Signed demand: positive at a pickup, negative at its delivery.
pub type Demand = i32;

/// Travel distance between two nodes.
pub type Distance = i64;

/// Monetary/optimization cost; distinct type from `Distance` even though the
/// CORE objective is distance-based, so a future cost model (e.g. per-vehicle
/// fixed cost) doesn't require touching every call site.
pub type Cost = i64;

/// A closed time window `[ready, due]`.
pub type Window = RangeInclusive<Time>;

/// Lexicographic objective: `(vehicle_count, total_distance)`, compared
/// left-to-right. Fewer vehicles always wins regardless of distance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LexCost {
    pub vehicles: usize,
    pub distance: Distance,
}

impl LexCost {
    pub fn new(vehicles: usize, distance: Distance) -> Self {
        Self { vehicles, distance }
    }
}

impl std::fmt::Display for LexCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} vehicles / {} distance", self.vehicles, self.distance)
    }
}

/// The depot is always node 0.
pub const DEPOT: NodeId = 0;

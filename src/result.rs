//! `solve()`'s public return value (§9 Design Notes: "replace the
//! dynamic-typed result dictionary with a small tagged result value").

use crate::solution::Solution;
use crate::types::{Distance, LexCost};

/// How `solve()` finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Ran to the iteration cap or the deadline with a feasible incumbent.
    Completed,
    /// Stopped early by the caller's cancellation token; the incumbent is
    /// still the best feasible solution seen before the signal arrived.
    Cancelled,
}

/// Aggregate counters across the whole `solve()` call, summed over every
/// LNS sub-run and AGES call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveMetrics {
    pub vehicles: usize,
    pub distance: Distance,
    pub runtime_s: f64,
    pub ils_iterations: usize,
    pub lns_iterations: usize,
    pub lns_improvements: usize,
    pub rejected_infeasible: usize,
    pub rejected_lahc: usize,
    pub accepted_worse: usize,
    pub repair_failures: usize,
}

/// The full outcome of a `solve()` call: the incumbent solution, its
/// metadata, and whether the run completed normally or was cancelled.
#[derive(Debug, Clone)]
pub struct SolveResult {
    pub solution: Solution,
    pub metrics: SolveMetrics,
    pub status: SolveStatus,
}

impl SolveResult {
    pub fn lex_cost(&self) -> LexCost {
        LexCost::new(self.metrics.vehicles, self.metrics.distance)
    }
}

//! Structured progress events, replacing the "global printing for progress"
//! pattern flagged in spec.md §9. The core never formats output for a
//! human; it emits typed events through a narrow callback and leaves
//! presentation to the caller.

use crate::types::LexCost;

#[derive(Debug, Clone)]
pub enum SolveEvent {
    /// One ILS outer iteration completed.
    IterationDone {
        iteration: usize,
        incumbent: LexCost,
    },
    /// The incumbent-best solution improved.
    ImprovementFound {
        iteration: usize,
        previous: LexCost,
        new: LexCost,
    },
    /// A batch of LNS statistics, emitted once per LNS sub-run.
    LnsStats {
        iterations: usize,
        improvements: usize,
        rejected_infeasible: usize,
        rejected_lahc: usize,
        accepted_worse: usize,
        repair_failures: usize,
    },
}

/// Callback invoked with each [`SolveEvent`]. The default no-op
/// implementation means callers who don't care about progress pay nothing.
pub trait ProgressCallback {
    fn on_event(&mut self, event: SolveEvent);
}

pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn on_event(&mut self, _event: SolveEvent) {}
}

impl<F: FnMut(SolveEvent)> ProgressCallback for F {
    fn on_event(&mut self, event: SolveEvent) {
        self(event)
    }
}

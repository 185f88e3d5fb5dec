//! Error boundary for the solver. Internally every operator either returns a
//! feasible `Solution` or leaves its input untouched (§7); `SolveError` is
//! only surfaced at the public API.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// The parsed instance is self-inconsistent: a pairing mismatch,
    /// a negative time-window width, an asymmetric distance where symmetry
    /// is required, or similar.
    InvalidInstance(String),
    /// The constructor could not produce any feasible solution.
    ConstructionInfeasible,
    /// The solver terminated with no feasible incumbent at all (only
    /// reachable if construction also failed).
    NoFeasibleSolutionFound,
    /// The deadline elapsed or the caller's cancellation token fired.
    Cancelled,
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::InvalidInstance(msg) => write!(f, "invalid instance: {msg}"),
            SolveError::ConstructionInfeasible => {
                write!(f, "constructor could not find any feasible solution")
            }
            SolveError::NoFeasibleSolutionFound => {
                write!(f, "no feasible solution found")
            }
            SolveError::Cancelled => write!(f, "solve cancelled"),
        }
    }
}

impl std::error::Error for SolveError {}

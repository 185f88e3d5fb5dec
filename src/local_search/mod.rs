//! Local search operators for polishing a feasible solution (§4.4).
//!
//! - [`two_opt_route()`] — intra-route edge reversal
//! - [`relocate_pairs()`] — inter/intra-route pair relocation
//! - [`exchange_pairs()`] — inter- and intra-route pair swap
//! - [`polish()`] — repeats all three until a full pass finds nothing, or
//!   until the deadline/time budget given to this invocation runs out

mod exchange;
mod relocate;
mod two_opt;

pub use exchange::exchange_pairs;
pub use relocate::relocate_pairs;
pub use two_opt::two_opt_route;

use crate::config::Deadline;
use crate::instance::Instance;
use crate::solution::{Route, Solution};
use crate::types::{Distance, NodeId, DEPOT};
use std::time::{Duration, Instant};

/// Checks that every pair fully contained in `customers` has its pickup
/// strictly before its delivery. A candidate sequence produced by any
/// reversal/relocation/exchange must pass this before being accepted —
/// schedule simulation alone does not guarantee it (see module docs in
/// `solution::validator`).
pub(crate) fn respects_precedence(customers: &[NodeId], instance: &Instance) -> bool {
    let mut seen_pickup = vec![false; instance.n_nodes()];
    for &node in customers {
        if instance.is_delivery(node) {
            let pickup = instance.pickup_of(node).expect("delivery has a pickup");
            if !seen_pickup[pickup as usize] {
                return false;
            }
        }
        if instance.is_pickup(node) {
            seen_pickup[node as usize] = true;
        }
    }
    true
}

pub(crate) fn full_nodes(customers: &[NodeId]) -> Vec<NodeId> {
    let mut nodes = Vec::with_capacity(customers.len() + 2);
    nodes.push(DEPOT);
    nodes.extend_from_slice(customers);
    nodes.push(DEPOT);
    nodes
}

/// Feasibility + distance of a candidate customer sequence, or `None` if it
/// violates precedence, time windows, or capacity.
pub(crate) fn evaluate_sequence(customers: &[NodeId], instance: &Instance) -> Option<Distance> {
    if !respects_precedence(customers, instance) {
        return None;
    }
    let sim = Route::simulate_sequence(&full_nodes(customers), instance);
    sim.feasible.then_some(sim.distance)
}

/// Runs 2-opt, pair relocation, and pair exchange to a fixed point: repeats
/// the three passes until one full round makes no improving move, the
/// caller's `deadline` fires, or `budget` (time spent in this call alone)
/// elapses — whichever comes first. Never leaves the solution infeasible
/// or with a worse lexicographic cost; a cutoff simply stops short of the
/// fixed point rather than undoing anything already applied.
///
/// §4.4: "Each invocation is time-bounded (default 2–5s in the LNS loop,
/// unbounded in a final polish pass)." Pass `deadline: None, budget: None`
/// for that unbounded final pass; pass both for a bounded in-loop call so
/// a single polish can never consume the whole remaining wall-clock
/// budget before the next deadline check (§5).
pub fn polish(solution: &mut Solution, instance: &Instance, deadline: Option<&Deadline>, budget: Option<Duration>) -> bool {
    let start = Instant::now();
    let expired = || -> bool {
        deadline.is_some_and(Deadline::should_stop) || budget.is_some_and(|b| start.elapsed() >= b)
    };

    let mut any_improved = false;
    loop {
        if expired() {
            break;
        }
        let mut improved = two_opt_route(solution, instance);
        if !expired() {
            improved |= relocate_pairs(solution, instance);
        }
        if !expired() {
            improved |= exchange_pairs(solution, instance);
        }
        any_improved |= improved;
        if !improved {
            break;
        }
    }
    any_improved
}

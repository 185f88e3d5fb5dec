//! Intra-route 2-opt: reverse a segment of a single route when doing so
//! shortens it, rejecting any reversal that breaks pickup-before-delivery
//! for a pair split across the reversed boundary.

use crate::instance::Instance;
use crate::local_search::evaluate_sequence;
use crate::solution::Solution;

/// Applies 2-opt within every route until a full pass over all routes finds
/// no improving, feasible reversal. Returns whether anything changed.
pub fn two_opt_route(solution: &mut Solution, instance: &Instance) -> bool {
    let mut any_improved = false;

    for route in solution.routes_mut() {
        let mut improved = true;
        while improved {
            improved = false;
            let customers = route.customers().to_vec();
            let n = customers.len();
            if n < 2 {
                break;
            }
            let current_distance = match evaluate_sequence(&customers, instance) {
                Some(d) => d,
                None => break,
            };

            'search: for i in 0..n - 1 {
                for j in i + 1..n {
                    let mut candidate = customers.clone();
                    candidate[i..=j].reverse();
                    if let Some(new_distance) = evaluate_sequence(&candidate, instance) {
                        if new_distance < current_distance {
                            route.set_customers(candidate);
                            route.simulate(instance);
                            improved = true;
                            any_improved = true;
                            break 'search;
                        }
                    }
                }
            }
        }
    }

    any_improved
}

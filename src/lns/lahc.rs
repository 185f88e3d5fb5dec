//! Late Acceptance Hill Climbing history (§4.3, §8): a fixed-length
//! circular buffer of past lexicographic costs, consulted (never mutated)
//! by the acceptance rule before a write.

use crate::types::LexCost;

#[derive(Debug, Clone)]
pub struct LahcHistory {
    buffer: Vec<LexCost>,
}

impl LahcHistory {
    /// A history of length `len`, every slot initialized to `initial_cost`
    /// (§4.3: "initialized with `cost(S)`").
    pub fn new(len: usize, initial_cost: LexCost) -> Self {
        Self {
            buffer: vec![initial_cost; len.max(1)],
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// The cost recorded `len` iterations ago, at slot `t mod len`.
    pub fn at(&self, t: usize) -> LexCost {
        self.buffer[t % self.buffer.len()]
    }

    pub fn set(&mut self, t: usize, cost: LexCost) {
        let len = self.buffer.len();
        self.buffer[t % len] = cost;
    }

    /// The LAHC acceptance test (§4.3): a candidate is accepted iff it is
    /// no worse than the cost recorded `L` iterations ago, or no worse than
    /// the current cost.
    pub fn accepts(&self, t: usize, candidate_cost: LexCost, current_cost: LexCost) -> bool {
        candidate_cost <= self.at(t) || candidate_cost <= current_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_candidate_no_worse_than_window() {
        let history = LahcHistory::new(3, LexCost::new(1, 100));
        assert!(history.accepts(0, LexCost::new(1, 100), LexCost::new(1, 50)));
        assert!(!history.accepts(0, LexCost::new(1, 150), LexCost::new(1, 50)));
    }

    #[test]
    fn accepts_candidate_no_worse_than_current_even_if_worse_than_window() {
        let mut history = LahcHistory::new(2, LexCost::new(1, 10));
        history.set(0, LexCost::new(1, 10));
        // window says 10, current is 40: a candidate of 30 is worse than
        // the window but still an improvement over current, so it passes.
        assert!(history.accepts(0, LexCost::new(1, 30), LexCost::new(1, 40)));
    }

    #[test]
    fn set_then_at_round_trips_through_wraparound() {
        let mut history = LahcHistory::new(2, LexCost::new(0, 0));
        history.set(5, LexCost::new(2, 7));
        assert_eq!(history.at(5), LexCost::new(2, 7));
        assert_eq!(history.at(7), LexCost::new(2, 7));
    }
}

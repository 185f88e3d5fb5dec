//! Explicit, seedable RNG handle threaded through every operator.
//!
//! spec.md §9 flags "random-number state as module global" as a pattern
//! that must be re-architected: determinism (§5, §8) requires that the
//! *same* generator, seeded once from [`crate::config::SolverConfig::seed`],
//! drives destroy, repair, AGES, and perturbation — never `rand::rng()` /
//! `thread_rng()` ad hoc in each operator.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Type alias so the rest of the crate names one concrete generator without
/// repeating `Xoshiro256PlusPlus` everywhere.
pub type Rng = Xoshiro256PlusPlus;

pub fn seeded(seed: u64) -> Rng {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

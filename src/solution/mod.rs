mod route;
mod solution;
pub mod validator;

pub use route::{Route, SimulationResult};
pub use solution::Solution;
pub use validator::Violation;

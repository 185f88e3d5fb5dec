mod matrix;
mod model;
pub mod parser;

pub use matrix::Matrix2;
pub use model::{Instance, InstanceBuilder, NodeData, RawNode};

//! Graph domain model

pub mod graph;
pub mod node;
pub mod value_numbering;

pub use graph::StructuredGraph;
pub use node::{BinaryOp, CompareOp, Constant, Node, NodeCategory, NodeKind};
pub use value_numbering::{DataKey, ValueNumberStats, ValueNumberTable};

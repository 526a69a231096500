//! Graph analyses and export
//!
//! - `cfg_export`: petgraph projection of control edges
//! - `verifier`: structural and dominance checks (`StructuredGraph::verify`)
//! - `snapshot`: serde dump (`StructuredGraph::snapshot`)

pub mod cfg_export;
pub mod snapshot;
pub mod verifier;

pub use cfg_export::{ControlEdge, ControlFlowView};
pub use snapshot::{GraphSnapshot, NodeSnapshot};

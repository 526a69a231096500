//! Graph Store
//!
//! Arena-backed IR graph of one stub body, with uniquing of pure data nodes,
//! control-link bookkeeping, verification and debug export.

pub mod domain;
pub mod infrastructure;

pub use domain::*;
pub use infrastructure::{ControlEdge, ControlFlowView, GraphSnapshot, NodeSnapshot};

//! Shared models
//!
//! - `NodeId`: stable arena index of a graph node
//! - `ValueKind` / `Stamp`: value categories of data nodes
//! - `TypeRef` / `MethodRef` / `Signature`: resolved metadata handed in by collaborators
//! - `SourcePosition`: bytecode position attached to nodes

pub mod meta;
pub mod node_id;
pub mod position;
pub mod stamp;

pub use meta::{InvokeKind, MethodRef, Signature, TypeRef};
pub use node_id::NodeId;
pub use position::{SourcePosition, UNKNOWN_BCI};
pub use stamp::{Stamp, ValueKind};

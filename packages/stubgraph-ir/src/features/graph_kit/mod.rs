//! Graph Kit
//!
//! Hand assembly of stub bodies: a single insertion cursor, a stack of
//! structured branch / exception-edge contexts, and call construction with
//! frame-state bookkeeping.

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{BranchState, ExceptionEdgeState, Structure};
pub use infrastructure::{GraphKit, MetaAccess, NamedWordTypes, NodeHandle};
pub use ports::{DeclaredTypeStamps, MethodResolver, Providers, StampProvider, WordTypes};

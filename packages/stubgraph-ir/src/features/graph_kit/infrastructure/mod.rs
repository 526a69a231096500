//! GraphKit and default collaborator adapters
//!
//! `GraphKit` itself is split by concern: `kit` (cursor, append, helpers),
//! `branch`, `exception_edge`, `merge` and `invoke` each add an `impl` block.

pub mod branch;
pub mod exception_edge;
pub mod invoke;
pub mod kit;
pub mod merge;
pub mod meta_access;
pub mod word_types;

pub use kit::{GraphKit, NodeHandle};
pub use meta_access::MetaAccess;
pub use word_types::NamedWordTypes;

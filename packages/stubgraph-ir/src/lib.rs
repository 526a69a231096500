/*
 * stubgraph-ir - hand-built IR graphs for runtime stubs
 *
 * Feature-First Architecture:
 * - shared/      : Common models (NodeId, Stamp, TypeRef, MethodRef)
 * - features/    : graph_store (arena + uniquing), frame_state, graph_kit
 * - config/      : KitConfig (YAML)
 * - errors.rs    : GraphKitError
 *
 * One `GraphKit` builds one graph on one thread; every failure is a
 * `GraphKitError` that aborts the stub being built.
 */

pub mod config;
pub mod errors;
pub mod features;
pub mod shared;

pub use config::{ConfigError, KitConfig};
pub use errors::{GraphKitError, Result};
pub use features::frame_state::FrameStateBuilder;
pub use features::graph_kit::{
    GraphKit, MetaAccess, MethodResolver, NamedWordTypes, NodeHandle, Providers, StampProvider,
    WordTypes,
};
pub use features::graph_store::{
    BinaryOp, CompareOp, Constant, ControlFlowView, GraphSnapshot, Node, NodeKind,
    StructuredGraph,
};
pub use shared::models::{
    InvokeKind, MethodRef, NodeId, Signature, SourcePosition, Stamp, TypeRef, ValueKind,
    UNKNOWN_BCI,
};

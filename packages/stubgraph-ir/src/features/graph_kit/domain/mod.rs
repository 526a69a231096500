//! Graph kit domain: structured-control contexts

pub mod structure;

pub use structure::{
    BranchState, BranchStructure, ExceptionEdgeState, Structure, StructureStack,
    WithExceptionStructure,
};

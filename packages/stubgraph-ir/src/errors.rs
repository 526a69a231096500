//! Error types for stubgraph-ir
//!
//! Every error is fatal for the stub body being built: the caller propagates it
//! with `?` and discards the partial graph. Two classes exist:
//! - contract violations (a bug in the code generator driving the kit)
//! - lookup failures (the method resolver has no matching target)

use thiserror::Error;

use crate::config::ConfigError;
use crate::shared::models::NodeId;

/// Main error type for graph construction
#[derive(Debug, Error)]
pub enum GraphKitError {
    /// Operation issued in the wrong state of the top structured context
    #[error("{graph}: structure state violation: {message}")]
    StructureState { graph: String, message: String },

    /// A control node was appended while the current path had already ended
    #[error("{graph}: cannot append {node} with an absent cursor")]
    AbsentCursor { graph: String, node: String },

    /// A node already has an incoming control link, or a successor slot is taken
    #[error("{graph}: {node} is already linked: {message}")]
    AlreadyLinked {
        graph: String,
        node: NodeId,
        message: String,
    },

    /// Wrong number of arguments for a call
    #[error("{graph}: wrong number of arguments to {method}: expected {expected}, got {actual}")]
    ArgumentCount {
        graph: String,
        method: String,
        expected: usize,
        actual: usize,
    },

    /// Argument value category does not match the declared parameter
    #[error("{graph}: wrong kind of value for {position} of call to {method} [{actual} != {expected}]")]
    ArgumentKind {
        graph: String,
        method: String,
        position: String,
        expected: String,
        actual: String,
    },

    /// Invoke kind disagrees with the static-ness of the callee
    #[error("{graph}: invoke kind {kind} does not match {method} (static={is_static})")]
    InvokeKindMismatch {
        graph: String,
        method: String,
        kind: String,
        is_static: bool,
    },

    /// More than one declared method matched a lookup
    #[error("found more than one method in {declaring} named {name}")]
    AmbiguousMethod { declaring: String, name: String },

    /// Structured contexts left open (or over-closed) when the build finished
    #[error("{graph}: {open} structured context(s) still open at finish")]
    UnbalancedStructures { graph: String, open: usize },

    /// Unknown node id, or node of the wrong category for the operation
    #[error("{graph}: invalid node {node}: {message}")]
    InvalidNode {
        graph: String,
        node: NodeId,
        message: String,
    },

    /// `unique` was handed a control node
    #[error("{graph}: {node} is not a data node")]
    NotDataNode { graph: String, node: String },

    /// Frame-state operand model misuse (pop from an empty stack, kind mismatch)
    #[error("{method}: frame state: {message}")]
    FrameState { method: String, message: String },

    /// Graph invariant broken, reported by the verifier
    #[error("{graph}: verification failed: {message}")]
    Verification { graph: String, message: String },

    /// Method resolver returned no match
    #[error("Could not find {declaring}.{name} ({detail})")]
    MethodNotFound {
        declaring: String,
        name: String,
        detail: String,
    },

    /// Type resolver returned no match
    #[error("Could not find type {0}")]
    TypeNotFound(String),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GraphKitError {
    /// Create a structure state violation
    pub fn structure_state(graph: impl Into<String>, message: impl Into<String>) -> Self {
        GraphKitError::StructureState {
            graph: graph.into(),
            message: message.into(),
        }
    }

    /// Create an invalid node error
    pub fn invalid_node(graph: impl Into<String>, node: NodeId, message: impl Into<String>) -> Self {
        GraphKitError::InvalidNode {
            graph: graph.into(),
            node,
            message: message.into(),
        }
    }

    /// Create a verification error
    pub fn verification(graph: impl Into<String>, message: impl Into<String>) -> Self {
        GraphKitError::Verification {
            graph: graph.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by the calling code generator
    pub fn is_contract_violation(&self) -> bool {
        !matches!(
            self,
            GraphKitError::MethodNotFound { .. }
                | GraphKitError::TypeNotFound(_)
                | GraphKitError::Config(_)
        )
    }

    /// True for resolver failures
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            GraphKitError::MethodNotFound { .. } | GraphKitError::TypeNotFound(_)
        )
    }
}

/// Result type alias for graph construction
pub type Result<T> = std::result::Result<T, GraphKitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = GraphKitError::structure_state("stub", "elsePart in CLOSED");
        assert!(err.is_contract_violation());
        assert!(!err.is_lookup_failure());

        let err = GraphKitError::MethodNotFound {
            declaring: "Stubs".to_string(),
            name: "regionEquals".to_string(),
            detail: "static".to_string(),
        };
        assert!(err.is_lookup_failure());
        assert!(!err.is_contract_violation());
    }

    #[test]
    fn test_lookup_message_carries_context() {
        let err = GraphKitError::MethodNotFound {
            declaring: "Stubs".to_string(),
            name: "regionEquals".to_string(),
            detail: "non-static".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Stubs.regionEquals"));
        assert!(msg.contains("non-static"));
    }
}

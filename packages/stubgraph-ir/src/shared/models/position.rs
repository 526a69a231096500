//! Source positions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Bytecode index used when a node has no meaningful position
pub const UNKNOWN_BCI: i32 = -5;

/// Position of a node relative to the stub method it was synthesized for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub method: Arc<str>,
    pub bci: i32,
}

impl SourcePosition {
    /// Position standing for "anything built as a substitution of `method`"
    pub fn substitution(method: impl Into<Arc<str>>) -> Self {
        Self {
            method: method.into(),
            bci: UNKNOWN_BCI,
        }
    }

    pub fn at(method: impl Into<Arc<str>>, bci: i32) -> Self {
        Self {
            method: method.into(),
            bci,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bci == UNKNOWN_BCI {
            write!(f, "{}@?", self.method)
        } else {
            write!(f, "{}@{}", self.method, self.bci)
        }
    }
}

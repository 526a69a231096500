//! Common test utilities for stubgraph-ir
//!
//! Shared fixtures (resolver contents, kits) and graph assertions.

#![allow(dead_code)]

mod assertions;
mod fixtures;

pub use assertions::*;
pub use fixtures::*;

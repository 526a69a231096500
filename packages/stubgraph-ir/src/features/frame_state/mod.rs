//! Frame-state bookkeeping for calls and exception edges

pub mod domain;

pub use domain::FrameStateBuilder;

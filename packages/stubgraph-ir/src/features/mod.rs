//! Feature modules (vertical slices)
//!
//! graph_store -> frame_state -> graph_kit

pub mod frame_state;
pub mod graph_kit;
pub mod graph_store;

pub mod frame_state_builder;

pub use frame_state_builder::FrameStateBuilder;

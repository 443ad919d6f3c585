//! frame/mod.rs
//! Frame discipline for nested lists, maps and composite records.

pub mod types;
pub mod stack;

pub use types::{Frame, FrameKind, FrameState};
pub use stack::FrameStack;

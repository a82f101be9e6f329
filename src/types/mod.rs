//! Core types for agentkit.

pub mod event;
pub mod generation;
pub mod message;
pub mod usage;

pub use event::*;
pub use generation::*;
pub use message::*;
pub use usage::*;

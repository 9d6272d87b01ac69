//! Event collection module for keytempo.
//!
//! This module provides the input-event types, the channel-based ingestion
//! boundary between host surfaces and the engine loop, and replay of
//! recorded input traces.

pub mod channel;
pub mod replay;
pub mod types;

// Re-export commonly used types
pub use channel::{ChannelCollector, InputHandle};
pub use replay::{Trace, TraceError, TraceEvent};
pub use types::{InputEvent, InputEventKind};

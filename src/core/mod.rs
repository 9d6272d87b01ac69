//! Core functionality for keytempo.
//!
//! This module contains:
//! - The session/metrics engine producing per-poll snapshots
//! - Typing-rate calculators and the playback-speed mapping

pub mod engine;
pub mod metrics;

// Re-export commonly used types
pub use engine::{EngineConfig, MetricSnapshot, SessionCounters, SessionEngine};
pub use metrics::{
    compute_rate, playback_speed, Calculation, SpeedCaps, TypingMetric, CHARS_PER_WORD,
    REFERENCE_BPM,
};

//! Keytempo - typing-intensity sensor for tempo-matched playback.
//!
//! This library derives a live typing-intensity signal from a stream of
//! keystroke and deletion events and converts it into a bounded
//! playback-speed value, alongside a rolling historical average and a
//! deletion back-ratio metric.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          keytempo                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌───────────────┐   ┌─────────────┐     │
//! │  │  Collector  │──▶│ SessionEngine │──▶│  Presenter  │     │
//! │  │  (channel)  │   │  (tick loop)  │   │ (snapshots) │     │
//! │  └─────────────┘   └───────┬───────┘   └─────────────┘     │
//! │                            │                               │
//! │                 ┌──────────┴──────────┐                    │
//! │                 ▼                     ▼                    │
//! │          ┌────────────┐        ┌──────────────┐            │
//! │          │  Settings  │        │ AverageStore │            │
//! │          └────────────┘        └──────────────┘            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events flow one way: host surfaces push them through a channel, a single
//! consumer owns the engine, and the engine's per-poll snapshots go to
//! whichever presenters the host composed. The engine holds exactly one
//! session at a time and cycles between closed and open for the life of the
//! process.
//!
//! # Example
//!
//! ```no_run
//! use keytempo::{AverageStore, EngineConfig, SessionEngine};
//!
//! let mut engine = SessionEngine::new(EngineConfig::default(), AverageStore::new());
//! engine.chars_entered("a");
//! engine.chars_entered("b");
//!
//! let snapshot = engine.tick();
//! println!("{}: {} -> {:.2}x", snapshot.metric.kind, snapshot.metric.value, snapshot.video_speed);
//! ```

pub mod averages;
pub mod collector;
pub mod core;
pub mod presenter;
pub mod settings;

// Re-export key types at crate root for convenience
pub use averages::AverageStore;
pub use collector::{ChannelCollector, InputEvent, InputEventKind, InputHandle, Trace, TraceEvent};
pub use core::{
    Calculation, EngineConfig, MetricSnapshot, SessionEngine, SpeedCaps, TypingMetric,
    REFERENCE_BPM,
};
pub use presenter::{ConsolePresenter, JsonlPresenter, Presenter};
pub use settings::{Settings, SettingsError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

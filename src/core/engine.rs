//! Session detection and the per-poll metrics snapshot.
//!
//! The engine owns all mutable session state. Input events arrive through
//! [`SessionEngine::chars_entered`] and [`SessionEngine::chars_deleted`];
//! the host polls [`SessionEngine::tick`] on a fixed cadence and receives a
//! [`MetricSnapshot`] per poll. A session opens on the first qualifying
//! keystroke and closes on the first poll where the engine has been idle
//! past the configured threshold.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::averages::AverageStore;
use crate::core::metrics::{self, Calculation, SpeedCaps, TypingMetric};

/// Back-dating applied to the session start when a session opens, so the
/// first interval never divides by a near-zero elapsed time.
const GRACE_PERIOD_MS: i64 = 500;

/// Engine configuration, resolved from the settings store at composition
/// time. The engine never re-reads settings mid-session.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Which typing-rate metric to report
    pub calculation: Calculation,
    /// Whether snapshots carry the deletion back ratio
    pub show_back_ratio: bool,
    /// Idle duration after which an open session ends
    pub idle_threshold: Duration,
    /// Per-metric playback-speed ceilings
    pub speed_caps: SpeedCaps,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            calculation: Calculation::Wpm,
            show_back_ratio: false,
            idle_threshold: Duration::milliseconds(2000),
            speed_caps: SpeedCaps::default(),
        }
    }
}

/// Counters accumulated since the last session reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounters {
    /// Qualifying single keystrokes
    pub typed_chars: u64,
    /// Characters removed by deletion events
    pub deleted_chars: u64,
    /// Number of deletion events (one per call, regardless of size)
    pub delete_events: u64,
    /// All characters that entered the buffer, pasted text included
    pub total_chars: u64,
}

/// One poll's worth of engine output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Deletion events relative to total characters, as a percentage.
    /// `None` when the back-ratio display is disabled; `Some(0.0)` is a
    /// legitimate "no deletions yet" reading and is distinct from disabled.
    pub back_ratio: Option<f64>,
    /// The configured metric: instantaneous value plus historical average
    pub metric: TypingMetric,
    /// Bounded playback-speed output derived from the metric value
    pub video_speed: f64,
    /// True iff no session is currently open
    pub paused: bool,
}

/// Stateful session/metrics engine.
///
/// Single-owner by design: all event ingestion and polling must happen from
/// one consumer (see the collector channel). There is no internal locking.
pub struct SessionEngine {
    config: EngineConfig,
    averages: AverageStore,
    session_start: Option<DateTime<Utc>>,
    counters: SessionCounters,
    idle: bool,
}

impl SessionEngine {
    pub fn new(config: EngineConfig, averages: AverageStore) -> Self {
        Self {
            config,
            averages,
            session_start: None,
            counters: SessionCounters::default(),
            idle: true,
        }
    }

    /// Report entered text.
    ///
    /// A single character counts as a keystroke unless it is structural
    /// whitespace (newline, tab, space). Multi-character input is treated as
    /// a paste: it feeds the back-ratio denominator but not the typed rate.
    /// Any non-empty input clears the idle flag.
    pub fn chars_entered(&mut self, text: &str) {
        let count = text.chars().count() as u64;
        if count == 0 {
            return;
        }

        if count == 1 {
            if let Some(first) = text.chars().next() {
                if !matches!(first, '\n' | '\t' | ' ') {
                    self.counters.typed_chars += 1;
                    self.counters.total_chars += 1;
                }
            }
        } else {
            self.counters.total_chars += count;
        }

        self.idle = false;
    }

    /// Report a deletion removing `count` characters.
    ///
    /// A count of 0 leaves the character counters alone but still registers
    /// a deletion event and clears the idle flag.
    pub fn chars_deleted(&mut self, count: u64) {
        self.counters.deleted_chars += count;
        self.counters.delete_events += 1;
        self.idle = false;
    }

    /// Poll the engine, producing the snapshot for this instant.
    pub fn tick(&mut self) -> MetricSnapshot {
        self.tick_at(Utc::now())
    }

    /// Poll with an explicit clock, for deterministic tests.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> MetricSnapshot {
        let ending = match self.session_start {
            None => {
                if self.counters.typed_chars > 0 {
                    self.session_start = Some(now - Duration::milliseconds(GRACE_PERIOD_MS));
                    tracing::debug!("session opened");
                }
                false
            }
            Some(start) => self.idle && now - start > self.config.idle_threshold,
        };

        let snapshot = self.snapshot(now);

        // Ready to detect the next gap; any event before the next poll
        // clears this again.
        self.idle = true;

        if ending {
            tracing::debug!(
                "session ended: {} typed, {} deleted over {} events",
                self.counters.typed_chars,
                self.counters.deleted_chars,
                self.counters.delete_events
            );
            self.reset();
        }

        snapshot
    }

    /// Force a final snapshot and reset all session state, for clean
    /// shutdown. The final value still contributes to the stored average.
    pub fn shutdown(&mut self) -> MetricSnapshot {
        let snapshot = self.snapshot(Utc::now());
        self.reset();
        self.idle = true;
        snapshot
    }

    /// Whether a session is currently open.
    pub fn is_open(&self) -> bool {
        self.session_start.is_some()
    }

    /// The historical averages backing this engine.
    pub fn averages(&self) -> &AverageStore {
        &self.averages
    }

    fn reset(&mut self) {
        self.session_start = None;
        self.counters = SessionCounters::default();
    }

    fn snapshot(&mut self, now: DateTime<Utc>) -> MetricSnapshot {
        let kind = self.config.calculation;

        match self.session_start {
            Some(start) => {
                let elapsed_minutes = (now - start).num_milliseconds() as f64 / 60_000.0;
                let value = metrics::compute_rate(kind, &self.counters, elapsed_minutes);
                tracing::debug!(
                    "{} sample: {} ({} typed over {:.3} min)",
                    kind,
                    value,
                    self.counters.typed_chars,
                    elapsed_minutes
                );

                let average = self.averages.record(kind, value);

                MetricSnapshot {
                    back_ratio: self.back_ratio(),
                    metric: TypingMetric { kind, value, average },
                    video_speed: metrics::playback_speed(value, kind, &self.config.speed_caps),
                    paused: false,
                }
            }
            None => MetricSnapshot {
                back_ratio: self.back_ratio(),
                metric: TypingMetric {
                    kind,
                    value: 0.0,
                    average: self.averages.get(kind).unwrap_or(0.0),
                },
                video_speed: 0.0,
                paused: true,
            },
        }
    }

    fn back_ratio(&self) -> Option<f64> {
        if !self.config.show_back_ratio {
            return None;
        }
        if self.counters.delete_events == 0 || self.counters.total_chars == 0 {
            return Some(0.0);
        }
        Some(self.counters.delete_events as f64 / self.counters.total_chars as f64 * 100.0)
    }
}

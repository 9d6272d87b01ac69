//! Typing-rate metrics and the playback-speed mapping.
//!
//! All rates are computed over the open session's elapsed time. The
//! playback-speed mapping scales a rate against a fixed reference tempo and
//! clamps the result to a per-kind ceiling.

use crate::core::engine::SessionCounters;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters-per-word approximation used by the WPM calculation.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Reference tempo (BPM) the playback speed is normalized against. A metric
/// value equal to this tempo maps to 1.0x playback.
pub const REFERENCE_BPM: f64 = 102.85;

/// Which typing-rate metric the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Calculation {
    /// Words per minute: typed characters divided by five, penalized by
    /// deletion events.
    Wpm,
    /// Keystrokes per minute.
    Kpm,
    /// Net character speed: KPM scaled down by the deletion error rate.
    Ncs,
}

impl Calculation {
    /// All metric kinds, in display order.
    pub const ALL: [Calculation; 3] = [Calculation::Wpm, Calculation::Kpm, Calculation::Ncs];

    /// Lowercase identifier used in settings files and snapshot JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Calculation::Wpm => "wpm",
            Calculation::Kpm => "kpm",
            Calculation::Ncs => "ncs",
        }
    }

    /// Parse a metric kind leniently. Unrecognized input is a configuration
    /// error: it is logged and falls back to WPM rather than failing.
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "wpm" => Calculation::Wpm,
            "kpm" => Calculation::Kpm,
            "ncs" => Calculation::Ncs,
            other => {
                tracing::warn!("unknown calculation type {:?}, falling back to wpm", other);
                Calculation::Wpm
            }
        }
    }
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Calculation::Wpm => write!(f, "WPM"),
            Calculation::Kpm => write!(f, "KPM"),
            Calculation::Ncs => write!(f, "NCS"),
        }
    }
}

/// Instantaneous value of one metric plus its running historical average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypingMetric {
    pub kind: Calculation,
    pub value: f64,
    pub average: f64,
}

/// Per-kind playback-speed ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedCaps {
    pub wpm: f64,
    pub kpm: f64,
    pub ncs: f64,
}

impl Default for SpeedCaps {
    fn default() -> Self {
        Self {
            wpm: 2.0,
            kpm: 10.0,
            ncs: 10.0,
        }
    }
}

impl SpeedCaps {
    /// Ceiling for the given metric kind.
    pub fn cap(&self, kind: Calculation) -> f64 {
        match kind {
            Calculation::Wpm => self.wpm,
            Calculation::Kpm => self.kpm,
            Calculation::Ncs => self.ncs,
        }
    }
}

/// Compute the configured metric over the session counters.
///
/// `elapsed_minutes` must come from an open session; a non-positive value
/// resolves to 0 rather than dividing by zero. Negative rates (deletions
/// outrunning typed characters) clamp to 0 for every kind.
pub fn compute_rate(kind: Calculation, counters: &SessionCounters, elapsed_minutes: f64) -> f64 {
    if elapsed_minutes <= 0.0 {
        return 0.0;
    }

    match kind {
        Calculation::Wpm => {
            let net = counters.typed_chars as f64 - counters.delete_events as f64;
            (net / CHARS_PER_WORD / elapsed_minutes).round().max(0.0)
        }
        Calculation::Kpm => (counters.typed_chars as f64 / elapsed_minutes).round().max(0.0),
        Calculation::Ncs => {
            let gross_kpm = (counters.typed_chars as f64 / elapsed_minutes).round();
            let error_rate = if counters.total_chars == 0 {
                0.0
            } else {
                counters.deleted_chars as f64 / counters.total_chars as f64
            };
            (gross_kpm * (1.0 - error_rate)).round().max(0.0)
        }
    }
}

/// Map a metric value onto the bounded playback-speed range.
///
/// A value of 0 maps to a speed of exactly 0, unconditionally.
pub fn playback_speed(value: f64, kind: Calculation, caps: &SpeedCaps) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    (value / REFERENCE_BPM).clamp(0.0, caps.cap(kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(typed: u64, deleted: u64, delete_events: u64, total: u64) -> SessionCounters {
        SessionCounters {
            typed_chars: typed,
            deleted_chars: deleted,
            delete_events,
            total_chars: total,
        }
    }

    #[test]
    fn test_wpm_basic() {
        // 25 characters over one minute: 25 / 5 / 1 = 5
        let value = compute_rate(Calculation::Wpm, &counters(25, 0, 0, 25), 1.0);
        assert_eq!(value, 5.0);
    }

    #[test]
    fn test_kpm_basic() {
        // 60 keystrokes over one minute
        let value = compute_rate(Calculation::Kpm, &counters(60, 0, 0, 60), 1.0);
        assert_eq!(value, 60.0);
    }

    #[test]
    fn test_wpm_clamps_at_zero() {
        // More deletion events than typed characters must not go negative
        let value = compute_rate(Calculation::Wpm, &counters(10, 15, 15, 10), 1.0);
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_ncs_error_rate() {
        // 60 keystrokes, half of them later deleted: gross 60 * (1 - 0.5) = 30
        let value = compute_rate(Calculation::Ncs, &counters(60, 30, 10, 60), 1.0);
        assert_eq!(value, 30.0);
    }

    #[test]
    fn test_ncs_clamps_when_deletions_exceed_total() {
        let value = compute_rate(Calculation::Ncs, &counters(10, 30, 5, 15), 1.0);
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_ncs_guards_empty_total() {
        let value = compute_rate(Calculation::Ncs, &counters(0, 5, 2, 0), 1.0);
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_zero_elapsed_resolves_to_zero() {
        for kind in Calculation::ALL {
            assert_eq!(compute_rate(kind, &counters(100, 0, 0, 100), 0.0), 0.0);
        }
    }

    #[test]
    fn test_playback_speed_zero_value() {
        assert_eq!(playback_speed(0.0, Calculation::Wpm, &SpeedCaps::default()), 0.0);
    }

    #[test]
    fn test_playback_speed_reference_tempo() {
        let speed = playback_speed(REFERENCE_BPM, Calculation::Kpm, &SpeedCaps::default());
        assert!((speed - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_playback_speed_caps() {
        let caps = SpeedCaps::default();
        assert_eq!(playback_speed(10_000.0, Calculation::Wpm, &caps), 2.0);
        assert_eq!(playback_speed(10_000.0, Calculation::Kpm, &caps), 10.0);
        assert_eq!(playback_speed(10_000.0, Calculation::Ncs, &caps), 10.0);
    }

    #[test]
    fn test_parse_lossy() {
        assert_eq!(Calculation::parse_lossy("kpm"), Calculation::Kpm);
        assert_eq!(Calculation::parse_lossy(" NCS "), Calculation::Ncs);
        assert_eq!(Calculation::parse_lossy("bogus"), Calculation::Wpm);
    }
}

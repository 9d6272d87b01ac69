//! Replay of recorded input traces.
//!
//! A trace is a JSONL file with one event per line, each carrying a
//! millisecond offset from trace start:
//!
//! ```text
//! {"at_ms":0,"chars_entered":"h"}
//! {"at_ms":140,"chars_entered":"i"}
//! {"at_ms":900,"chars_deleted":1}
//! ```
//!
//! Replay delivers each event through an [`InputHandle`] once its offset has
//! elapsed, optionally scaled by a speed factor.

use crate::collector::channel::InputHandle;
use crate::collector::types::InputEventKind;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// One line of a recorded input trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Offset from trace start, in milliseconds
    pub at_ms: u64,
    #[serde(flatten)]
    pub kind: InputEventKind,
}

/// Trace loading errors.
#[derive(Debug)]
pub enum TraceError {
    IoError(String),
    ParseError { line: usize, message: String },
}

impl std::fmt::Display for TraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceError::IoError(e) => write!(f, "IO error: {e}"),
            TraceError::ParseError { line, message } => {
                write!(f, "Parse error on line {line}: {message}")
            }
        }
    }
}

impl std::error::Error for TraceError {}

/// A recorded input trace.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    /// Build a trace from in-memory events (demos, tests).
    pub fn from_events(events: Vec<TraceEvent>) -> Self {
        Self { events }
    }

    /// Load a JSONL trace file. Blank lines are skipped.
    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let file = std::fs::File::open(path).map_err(|e| TraceError::IoError(e.to_string()))?;
        let reader = BufReader::new(file);

        let mut events = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| TraceError::IoError(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let event: TraceEvent =
                serde_json::from_str(&line).map_err(|e| TraceError::ParseError {
                    line: index + 1,
                    message: e.to_string(),
                })?;
            events.push(event);
        }

        Ok(Self { events })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Spawn a thread delivering the trace through `handle` in recorded
    /// time, divided by `speed` (2.0 replays twice as fast). The handle is
    /// dropped when the trace ends, so a loop holding the only other
    /// reference to the channel sees a disconnect at end-of-trace.
    pub fn spawn_replay(self, handle: InputHandle, speed: f64) -> thread::JoinHandle<()> {
        let speed = if speed > 0.0 { speed } else { 1.0 };

        thread::spawn(move || {
            let start = Instant::now();
            for event in self.events {
                let due = Duration::from_millis(event.at_ms).div_f64(speed);
                if let Some(wait) = due.checked_sub(start.elapsed()) {
                    thread::sleep(wait);
                }
                match event.kind {
                    InputEventKind::CharsEntered(text) => handle.chars_entered(text),
                    InputEventKind::CharsDeleted(count) => handle.chars_deleted(count),
                }
            }
        })
    }
}

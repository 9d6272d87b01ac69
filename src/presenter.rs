//! Snapshot consumers.
//!
//! A presenter turns each [`MetricSnapshot`] into a user-visible effect.
//! The engine never knows who is listening; the host loop fans snapshots
//! out to whichever presenters it composed.

use crate::core::engine::MetricSnapshot;
use chrono::Utc;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Anything that turns a metrics snapshot into user-visible effects.
pub trait Presenter {
    fn present(&mut self, snapshot: &MetricSnapshot);
}

/// Prints one human-readable line per snapshot.
#[derive(Debug, Default)]
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn present(&mut self, snapshot: &MetricSnapshot) {
        let stamp = Utc::now().format("%H:%M:%S");

        if snapshot.paused {
            println!(
                "[{}] paused | {} avg: {:.1}",
                stamp, snapshot.metric.kind, snapshot.metric.average
            );
            return;
        }

        let back = match snapshot.back_ratio {
            Some(ratio) => format!(" | back ratio: {ratio:.1}%"),
            None => String::new(),
        };

        println!(
            "[{}] {}: {:.0} (avg {:.1}) | speed: {:.2}x{}",
            stamp,
            snapshot.metric.kind,
            snapshot.metric.value,
            snapshot.metric.average,
            snapshot.video_speed,
            back
        );
    }
}

/// Appends one JSON document per snapshot to a file.
pub struct JsonlPresenter {
    writer: BufWriter<File>,
}

impl JsonlPresenter {
    /// Create (truncating) the export file, including parent directories.
    pub fn create(path: &Path) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Presenter for JsonlPresenter {
    fn present(&mut self, snapshot: &MetricSnapshot) {
        match serde_json::to_string(snapshot) {
            Ok(line) => {
                if let Err(e) = writeln!(self.writer, "{line}") {
                    tracing::warn!("could not write snapshot: {}", e);
                }
            }
            Err(e) => tracing::warn!("could not serialize snapshot: {}", e),
        }
    }
}

impl Drop for JsonlPresenter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

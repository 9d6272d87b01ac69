//! Historical per-metric averages.
//!
//! Each metric kind keeps a single smoothed value updated with a half-life
//! rule: every new sample carries 50% weight, heavily favoring recent typing
//! behavior over long-run history. The store persists to disk after each
//! contribution so averages survive session resets and process restarts.

use crate::core::metrics::Calculation;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Rolling historical average per metric kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AverageStore {
    wpm: Option<f64>,
    kpm: Option<f64>,
    ncs: Option<f64>,
    #[serde(skip)]
    persist_path: Option<PathBuf>,
}

impl AverageStore {
    /// Create an in-memory store with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store persisted at `path`, loading any previous values.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut store = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("could not parse stored averages: {}", e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        store.persist_path = Some(path);
        store
    }

    /// The stored average for `kind`, if any value has ever been recorded.
    pub fn get(&self, kind: Calculation) -> Option<f64> {
        match kind {
            Calculation::Wpm => self.wpm,
            Calculation::Kpm => self.kpm,
            Calculation::Ncs => self.ncs,
        }
    }

    /// Fold a new sample into the average for `kind` and return the updated
    /// average: `(previous-or-zero + value) / 2`. Persists immediately when
    /// a persistence path is configured; persistence failure is logged, not
    /// propagated.
    pub fn record(&mut self, kind: Calculation, value: f64) -> f64 {
        let updated = (self.get(kind).unwrap_or(0.0) + value) / 2.0;
        *self.slot_mut(kind) = Some(updated);

        if let Err(e) = self.save() {
            tracing::warn!("could not persist averages: {}", e);
        }

        updated
    }

    /// Write the averages to disk, if persistence is configured.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    fn slot_mut(&mut self, kind: Calculation) -> &mut Option<f64> {
        match kind {
            Calculation::Wpm => &mut self.wpm,
            Calculation::Kpm => &mut self.kpm,
            Calculation::Ncs => &mut self.ncs,
        }
    }
}

//! Settings for the keytempo engine and host loop.

use crate::core::metrics::{Calculation, SpeedCaps};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main settings for the engine and the host's poll loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Which typing-rate metric to report
    #[serde(deserialize_with = "calculation_lossy")]
    pub calculation: Calculation,

    /// Whether snapshots carry the deletion back ratio
    pub show_back_ratio: bool,

    /// Idle duration after which an open session ends
    #[serde(with = "millis_serde")]
    pub idle_threshold: Duration,

    /// Poll cadence for the host loop (the engine itself is cadence-agnostic)
    #[serde(with = "millis_serde")]
    pub update_interval: Duration,

    /// Per-metric playback-speed ceilings
    pub speed_caps: SpeedCaps,

    /// Path for storing historical averages
    pub data_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keytempo");

        Self {
            calculation: Calculation::Wpm,
            show_back_ratio: false,
            idle_threshold: Duration::from_millis(2000),
            update_interval: Duration::from_millis(1000),
            speed_caps: SpeedCaps::default(),
            data_path: data_dir,
        }
    }
}

impl Settings {
    /// Load settings from the default location.
    pub fn load() -> Result<Self, SettingsError> {
        let settings_path = Self::settings_path();

        if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .map_err(|e| SettingsError::IoError(e.to_string()))?;
            let settings: Settings = serde_json::from_str(&content)
                .map_err(|e| SettingsError::ParseError(e.to_string()))?;
            Ok(settings)
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to the default location.
    pub fn save(&self) -> Result<(), SettingsError> {
        let settings_path = Self::settings_path();

        // Ensure parent directory exists
        if let Some(parent) = settings_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| SettingsError::SerializeError(e.to_string()))?;

        std::fs::write(&settings_path, content)
            .map_err(|e| SettingsError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the settings file.
    pub fn settings_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keytempo")
            .join("settings.json")
    }

    /// Path of the persisted averages file under the data directory.
    pub fn averages_path(&self) -> PathBuf {
        self.data_path.join("averages.json")
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> Result<(), SettingsError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| SettingsError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Resolve the engine's configuration from these settings.
    pub fn engine_config(&self) -> crate::core::EngineConfig {
        crate::core::EngineConfig {
            calculation: self.calculation,
            show_back_ratio: self.show_back_ratio,
            idle_threshold: chrono::Duration::milliseconds(self.idle_threshold.as_millis() as i64),
            speed_caps: self.speed_caps,
        }
    }
}

/// Settings errors.
#[derive(Debug)]
pub enum SettingsError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::IoError(e) => write!(f, "IO error: {e}"),
            SettingsError::ParseError(e) => write!(f, "Parse error: {e}"),
            SettingsError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Lenient metric-kind parsing: unknown kinds log and fall back to WPM
/// instead of rejecting the whole settings file.
fn calculation_lossy<'de, D>(deserializer: D) -> Result<Calculation, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(Calculation::parse_lossy(&raw))
}

/// Serde support for millisecond durations.
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

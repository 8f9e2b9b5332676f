//! Configuration for the sensor analytics pipeline.

use crate::core::aggregate::Thresholds;
use crate::core::sax::DEFAULT_SAX_FRAGMENTS;
use crate::core::spectral::{DEFAULT_CHUNK_SIZE, DEFAULT_HOP_SIZE};
use crate::core::stats::DEFAULT_EMA_BETA;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Main configuration for the host binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Time between two sampling ticks
    #[serde(with = "duration_millis")]
    pub sample_interval: Duration,

    /// Analysis constants, fixed for the lifetime of a pipeline
    pub pipeline: PipelineConfig,

    /// Path for exporting session reports
    pub export_path: PathBuf,

    /// Path for storing the audit log
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sensor-analytics");

        Self {
            sample_interval: Duration::from_millis(500), // two readings per second
            pipeline: PipelineConfig::default(),
            export_path: data_dir.join("exports"),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::Parse(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sensor-analytics")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)?;
        std::fs::create_dir_all(&self.data_path)?;
        Ok(())
    }
}

/// Constants supplied to a [`crate::Pipeline`] at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Logical channel names, in tick order
    pub channels: Vec<String>,
    /// Samples retained per channel
    pub buffer_capacity: usize,
    /// Ticks between two reports
    pub report_every: usize,
    /// SAX word length
    pub sax_fragments: usize,
    /// Activity thresholds on the window deviation
    pub thresholds: Thresholds,
    /// STFT window length (power of two)
    pub chunk_size: usize,
    /// STFT stride
    pub hop_size: usize,
    /// EMA smoothing factor
    pub ema_beta: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channels: vec!["light".to_string(), "temperature".to_string()],
            buffer_capacity: 12,
            report_every: 12,
            sax_fragments: DEFAULT_SAX_FRAGMENTS,
            thresholds: Thresholds::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            hop_size: DEFAULT_HOP_SIZE,
            ema_beta: DEFAULT_EMA_BETA,
        }
    }
}

impl PipelineConfig {
    /// Parse channel names from a comma-separated string.
    pub fn channels_from_csv(s: &str) -> Vec<String> {
        s.split(',')
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect()
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
}

/// Serde support for Duration as whole milliseconds.
mod duration_millis {
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

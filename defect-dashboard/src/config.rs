//! Configuration module

use std::env;
use std::path::PathBuf;

use defect_core::constants::artifact_config_from_lookup;
use defect_core::{ArtifactConfig, ThresholdConfig};

/// Default location of the historical production dataset
pub const DEFAULT_DATASET_PATH: &str = "artifacts/manufacturing_defect_detection_dataset.csv";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Model card and optional scaler
    pub artifacts: ArtifactConfig,

    /// Production history CSV behind the data pages
    pub dataset_path: PathBuf,

    /// Threshold preselected in the form
    pub default_threshold: f32,

    /// Emit JSON log lines instead of human-readable ones
    pub log_json: bool,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let thresholds = ThresholdConfig::new(
            lookup("DEFAULT_THRESHOLD")
                .and_then(|t| t.parse().ok())
                .unwrap_or(ThresholdConfig::default().default_threshold),
        );

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8501),

            artifacts: artifact_config_from_lookup(&lookup),

            dataset_path: lookup("DATASET_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH)),

            default_threshold: thresholds.default_threshold,

            log_json: lookup("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),

            environment: lookup("ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),
        }
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        ThresholdConfig::new(self.default_threshold)
    }
}

//! Central Configuration Constants
//!
//! Defaults for artifact locations. Hosts override them through the
//! environment; see `artifact_config_from_env`.

use std::path::PathBuf;

use crate::artifact::ArtifactConfig;

/// Default model card location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "artifacts/model.json";

/// Environment variable overriding the model card location
pub const MODEL_PATH_ENV: &str = "MODEL_PATH";

/// Environment variable pointing at an optional fitted scaler
pub const SCALER_PATH_ENV: &str = "SCALER_PATH";

/// Library version
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Artifact locations from any key/value source; unset or blank
/// `SCALER_PATH` means no scaler.
pub fn artifact_config_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ArtifactConfig {
    ArtifactConfig {
        model_path: lookup(MODEL_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
        scaler_path: lookup(SCALER_PATH_ENV)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from),
    }
}

/// Artifact locations from the process environment
pub fn artifact_config_from_env() -> ArtifactConfig {
    artifact_config_from_lookup(|key| std::env::var(key).ok())
}

//! Manufacturing Defect Detection Dashboard
//!
//! Presentation layer over `defect-core`: renders the prediction form, runs
//! the classifier for each submission and shows the result card.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │             DEFECT DASHBOARD (Axum)          │
//! │  GET /          overview                     │
//! │  GET /data      dataset preview              │
//! │  GET /predict   form                         │
//! │  POST /predict  build → predict → classify   │
//! │  GET /high-risk defective runs               │
//! │  GET /health    liveness                     │
//! │  GET /api/model artifact status              │
//! └──────────┬───────────────────────┬───────────┘
//!            ▼                       ▼
//!   Arc<LoadedArtifacts>        Arc<Dataset>
//!        (both loaded once at start-up)
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod handlers;
pub mod views;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use defect_core::{InferenceError, LoadedArtifacts, ModelLoadError};

pub use config::Config;
pub use dataset::{Dataset, DatasetError};
pub use error::{AppError, AppResult};

/// Outcome of the start-up load. A failure disables predictions only.
pub type ModelHandle = Result<Arc<LoadedArtifacts>, Arc<ModelLoadError>>;

/// Outcome of reading the dataset. A failure disables the data pages only.
pub type DatasetHandle = Result<Arc<Dataset>, Arc<DatasetError>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: ModelHandle,
    pub dataset: DatasetHandle,
    pub config: Config,
}

impl AppState {
    pub fn new(model: ModelHandle, dataset: DatasetHandle, config: Config) -> Self {
        Self {
            model,
            dataset,
            config,
        }
    }

    /// Short-circuits to the load error when the model never loaded.
    pub fn artifacts(&self) -> AppResult<&Arc<LoadedArtifacts>> {
        self.model
            .as_ref()
            .map_err(|e| InferenceError::ModelUnavailable(e.clone()).into())
    }

    pub fn dataset(&self) -> AppResult<&Arc<Dataset>> {
        self.dataset
            .as_ref()
            .map_err(|e| AppError::DatasetUnavailable(e.to_string()))
    }
}

/// Load artifacts once; a failure is logged and kept, never raised.
pub fn load_model(config: &Config) -> ModelHandle {
    match LoadedArtifacts::load_with_thresholds(&config.artifacts, config.thresholds()) {
        Ok(artifacts) => {
            tracing::info!(
                "Model '{}' ready ({} features)",
                artifacts.info.name,
                artifacts.info.feature_names.len()
            );
            Ok(Arc::new(artifacts))
        }
        Err(e) => {
            tracing::error!("Failed to load model artifacts: {} - predictions disabled", e);
            Err(Arc::new(e))
        }
    }
}

/// Read the dataset once; a failure is logged and kept, never raised.
pub fn load_dataset(config: &Config) -> DatasetHandle {
    match Dataset::load(&config.dataset_path) {
        Ok(dataset) => {
            tracing::info!(
                "Dataset {} ready ({} rows, {} columns)",
                config.dataset_path.display(),
                dataset.len(),
                dataset.headers().len()
            );
            Ok(Arc::new(dataset))
        }
        Err(e) => {
            tracing::warn!("Failed to load dataset: {} - data pages disabled", e);
            Err(Arc::new(e))
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::pages::overview))
        .route("/data", get(handlers::data::preview))
        .route("/predict", get(handlers::predict::form).post(handlers::predict::submit))
        .route("/high-risk", get(handlers::data::high_risk))
        .route("/health", get(handlers::health::check))
        .route("/api/model", get(handlers::model::status))
        .fallback(handlers::pages::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

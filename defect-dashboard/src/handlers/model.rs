//! Model status handler

use axum::{extract::State, Json};
use serde::Serialize;

use defect_core::{InferenceStats, ModelInfo, ThresholdConfig};

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub degraded: bool,
    pub info: Option<ModelInfo>,
    pub stats: Option<InferenceStats>,
    pub thresholds: ThresholdConfig,
    pub error: Option<String>,
}

pub async fn status(State(state): State<AppState>) -> Json<ModelStatus> {
    let status = match &state.model {
        Ok(artifacts) => ModelStatus {
            loaded: true,
            degraded: artifacts.classifier.is_degraded(),
            info: Some(artifacts.info.clone()),
            stats: Some(artifacts.classifier.stats()),
            thresholds: artifacts.classifier.thresholds().clone(),
            error: None,
        },
        Err(e) => ModelStatus {
            loaded: false,
            degraded: false,
            info: None,
            stats: None,
            thresholds: state.config.thresholds(),
            error: Some(e.to_string()),
        },
    };

    Json(status)
}

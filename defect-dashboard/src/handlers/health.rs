//! Liveness probe

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    core_version: &'static str,
    model_loaded: bool,
    model: Option<String>,
    timestamp: i64,
}

/// Reports healthy even when the model failed to load; `model_loaded`
/// carries that instead.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = state.model.as_ref().ok().map(|artifacts| artifacts.info.name.clone());

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        core_version: defect_core::constants::CORE_VERSION,
        model_loaded: model.is_some(),
        model,
        timestamp: chrono::Utc::now().timestamp(),
    })
}

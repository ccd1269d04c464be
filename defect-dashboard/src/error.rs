//! Error handling
//!
//! Every failure renders as a page; internal details only go to the log.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use defect_core::{FeatureError, InferenceError};

use crate::dataset::DatasetError;
use crate::views;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("invalid input: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error(transparent)]
    Feature(FeatureError),

    #[error("prediction failed: {0}")]
    PredictionFailed(String),

    #[error("dataset unavailable: {0}")]
    DatasetUnavailable(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl From<DatasetError> for AppError {
    fn from(err: DatasetError) -> Self {
        AppError::DatasetUnavailable(err.to_string())
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::ModelUnavailable(e) => AppError::ModelUnavailable(e.to_string()),
            InferenceError::Feature(e) => AppError::Feature(e),
            InferenceError::InvalidThreshold(t) => {
                AppError::Validation(vec![format!("threshold {} is outside 0.50 - 0.90", t)])
            }
            InferenceError::Prediction(e) => AppError::PredictionFailed(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, title, message) = match &self {
            AppError::ModelUnavailable(msg) => {
                // already reported at start-up
                tracing::debug!("Model unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Model unavailable",
                    "The defect model could not be loaded. Predictions are disabled until the server is restarted with valid artifacts.".to_string(),
                )
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Invalid input",
                errors.join("; "),
            ),
            AppError::Feature(e) => {
                let message = match e {
                    FeatureError::Missing(name) => format!("Missing input: {}", name),
                    FeatureError::UnknownCategory { feature, value } => {
                        format!("Unknown {} '{}'", feature, value)
                    }
                    FeatureError::InvalidValue { feature, .. } => format!("Invalid value for {}", feature),
                };
                (StatusCode::UNPROCESSABLE_ENTITY, "Prediction Failed", message)
            }
            AppError::PredictionFailed(msg) => {
                tracing::error!("Prediction error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Prediction Failed",
                    "The model could not score this input.".to_string(),
                )
            }
            AppError::DatasetUnavailable(msg) => {
                tracing::debug!("Dataset unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Dataset unavailable",
                    "The production dataset could not be loaded. Predictions still work.".to_string(),
                )
            }
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, "Not found", what.clone()),
        };

        (status, Html(views::error_page(title, &message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defect_core::PredictionError;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::ModelUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Validation(vec!["bad".into()]), StatusCode::BAD_REQUEST),
            (AppError::Feature(FeatureError::Missing("Shift".into())), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::PredictionFailed("shape".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::DatasetUnavailable("csv".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::NotFound("page".into()), StatusCode::NOT_FOUND),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_from_inference_error() {
        let err: AppError = InferenceError::Prediction(PredictionError::InvalidLabel(3)).into();
        assert!(matches!(err, AppError::PredictionFailed(_)));

        let err: AppError = InferenceError::InvalidThreshold(0.2).into();
        assert!(matches!(err, AppError::Validation(_)));

        let err: AppError = DatasetError::MissingColumn("Defect".into()).into();
        assert!(matches!(err, AppError::DatasetUnavailable(ref m) if m.contains("Defect")));
    }
}

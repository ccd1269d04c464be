//! Defect prediction handlers

use axum::{
    extract::{rejection::FormRejection, State},
    response::Html,
    Form,
};
use serde::Deserialize;
use validator::Validate;

use defect_core::FeatureRecord;

use crate::{views, AppError, AppResult, AppState};

/// Submitted prediction form
#[derive(Debug, Deserialize, Validate)]
pub struct PredictForm {
    #[validate(range(min = 0.0))]
    pub temperature: f64,
    #[validate(range(min = 0.0))]
    pub pressure: f64,
    #[validate(range(min = 0.0))]
    pub humidity: f64,
    #[validate(range(min = 0.0))]
    pub machine_speed: f64,
    #[validate(range(min = 0.0))]
    pub operator_experience: f64,
    #[validate(range(min = 0.0))]
    pub production_time: f64,
    #[serde(default)]
    pub shift: Option<String>,
    #[serde(default)]
    pub material_type: Option<String>,
    #[validate(range(min = 0.5, max = 0.9))]
    pub threshold: f32,
}

impl PredictForm {
    /// Numeric input by form field name
    pub fn number(&self, field: &str) -> Option<f64> {
        match field {
            "temperature" => Some(self.temperature),
            "pressure" => Some(self.pressure),
            "humidity" => Some(self.humidity),
            "machine_speed" => Some(self.machine_speed),
            "operator_experience" => Some(self.operator_experience),
            "production_time" => Some(self.production_time),
            _ => None,
        }
    }

    /// Selected category by form field name; blank counts as not chosen.
    pub fn category(&self, field: &str) -> Option<&str> {
        let value = match field {
            "shift" => self.shift.as_deref(),
            "material_type" => self.material_type.as_deref(),
            _ => None,
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    /// Named by the feature names models are trained on.
    pub fn to_record(&self) -> FeatureRecord {
        let mut record = FeatureRecord::new();

        for (field, feature, _, _) in views::NUMERIC_FIELDS {
            if let Some(value) = self.number(field) {
                record.insert(feature, value);
            }
        }
        for (field, feature, _) in views::CATEGORY_FIELDS {
            if let Some(value) = self.category(field) {
                record.insert(feature, value);
            }
        }

        record
    }
}

/// Render the empty form
pub async fn form(State(state): State<AppState>) -> AppResult<Html<String>> {
    let artifacts = state.artifacts()?;
    Ok(Html(views::predict_page(
        artifacts.classifier.feature_order(),
        artifacts.classifier.thresholds(),
        state.dataset.as_deref().ok(),
        None,
        None,
    )))
}

/// Validate, predict, render the result card
pub async fn submit(
    State(state): State<AppState>,
    form: Result<Form<PredictForm>, FormRejection>,
) -> AppResult<Html<String>> {
    let artifacts = state.artifacts()?;

    let Form(form) = form.map_err(|rejection| AppError::Validation(vec![rejection.body_text()]))?;
    form.validate().map_err(|errors| {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| format!("{} is out of range", field))
            .collect();
        fields.sort();
        AppError::Validation(fields)
    })?;

    let prediction = artifacts.classifier.predict(&form.to_record(), form.threshold)?;

    tracing::info!(
        probability = prediction.probability,
        threshold = prediction.threshold,
        verdict = %prediction.verdict,
        degraded = prediction.degraded,
        "prediction served"
    );

    Ok(Html(views::predict_page(
        artifacts.classifier.feature_order(),
        artifacts.classifier.thresholds(),
        state.dataset.as_deref().ok(),
        Some(&form),
        Some(&prediction),
    )))
}

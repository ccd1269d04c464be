//! Dataset pages

use axum::{extract::State, response::Html};

use crate::dataset::PREVIEW_ROWS;
use crate::{views, AppResult, AppState};

/// First rows of the production history
pub async fn preview(State(state): State<AppState>) -> AppResult<Html<String>> {
    let dataset = state.dataset()?;
    Ok(Html(views::data_page(dataset, PREVIEW_ROWS)))
}

/// Every run that ended in a defect
pub async fn high_risk(State(state): State<AppState>) -> AppResult<Html<String>> {
    let dataset = state.dataset()?;
    let rows = dataset.high_risk()?;

    tracing::debug!("high-risk page: {} of {} runs", rows.len(), dataset.len());

    Ok(Html(views::high_risk_page(dataset.headers(), &rows, dataset.len())))
}

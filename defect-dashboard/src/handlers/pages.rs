//! Static pages

use axum::{extract::State, response::Html};

use crate::{views, AppError, AppState};

pub async fn overview(State(state): State<AppState>) -> Html<String> {
    let info = state.model.as_ref().ok().map(|artifacts| &artifacts.info);
    Html(views::overview_page(info, state.dataset.as_deref().ok()))
}

pub async fn not_found() -> AppError {
    AppError::NotFound("No such page".to_string())
}

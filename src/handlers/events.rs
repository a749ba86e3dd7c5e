use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// All events, or only those whose name contains `?search=`.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let store = state.store();
    let events = match query.search.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => store.search_events(term).await?,
        _ => store.list_events().await?,
    };

    let message = format!("{} event(s) found", events.len());
    Ok(success(events, message))
}

pub async fn event_detail(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Response, AppError> {
    let event = state
        .store()
        .find_event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found.".to_string()))?;

    Ok(success(event, "Event loaded"))
}

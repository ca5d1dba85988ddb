use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::error::{AppError, StoreResultExt};
use crate::routes::AppState;
use crate::store::HistoryEntry;
use crate::validation;

/// GET /history, newest first.
pub async fn list_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let history = state
        .storage
        .list_history()
        .or_fail("Failed to fetch history")?;
    Ok(Json(history))
}

/// POST /history
pub async fn add_history(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<HistoryEntry>), AppError> {
    let Json(payload) = payload.map_err(AppError::unreadable("Invalid history data"))?;
    let new = validation::new_history_entry(&payload)
        .map_err(AppError::validation("Invalid history data"))?;

    let entry = state
        .storage
        .add_history(new)
        .or_fail("Failed to add to history")?;

    tracing::debug!(id = %entry.id, url = %entry.url, "Recorded history entry");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /history
pub async fn clear_history(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state
        .storage
        .clear_history()
        .or_fail("Failed to clear history")?;

    tracing::info!("Cleared history");
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::error::{AppError, StoreResultExt};
use crate::routes::AppState;
use crate::store::{SavedRequest, StoreError};
use crate::validation::{self, ValidationIssue};

const INVALID_REQUEST_DATA: &str = "Invalid request data";

/// Like `or_fail`, but a `collectionId` naming no collection is a
/// validation failure of the payload.
fn write_failure(message: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |source| match source {
        StoreError::MissingCollection(id) => AppError::Validation {
            message: INVALID_REQUEST_DATA,
            errors: vec![ValidationIssue::new(
                &["collectionId"],
                format!("Collection {} does not exist", id),
            )],
        },
        source => AppError::Store { message, source },
    }
}

/// GET /collections/:id/requests
pub async fn list_requests_by_collection(
    State(state): State<AppState>,
    Path(collection_id): Path<String>,
) -> Result<Json<Vec<SavedRequest>>, AppError> {
    let requests = state
        .storage
        .list_requests_by_collection(&collection_id)
        .or_fail("Failed to fetch requests")?;
    Ok(Json(requests))
}

/// GET /requests/:id
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SavedRequest>, AppError> {
    state
        .storage
        .get_request(&id)
        .or_fail("Failed to fetch request")?
        .map(Json)
        .ok_or(AppError::NotFound("Request not found"))
}

/// POST /requests
pub async fn create_request(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SavedRequest>), AppError> {
    let Json(payload) = payload.map_err(AppError::unreadable(INVALID_REQUEST_DATA))?;
    let new = validation::new_request(&payload)
        .map_err(AppError::validation(INVALID_REQUEST_DATA))?;

    let request = state
        .storage
        .create_request(new)
        .map_err(write_failure("Failed to create request"))?;

    tracing::info!(
        id = %request.id,
        method = %request.method,
        url = %request.url,
        "Saved request"
    );
    Ok((StatusCode::CREATED, Json(request)))
}

/// PUT /requests/:id
///
/// Partial update. An unknown id is a failure of the update, reported as 500.
pub async fn update_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SavedRequest>, AppError> {
    let Json(payload) = payload.map_err(AppError::unreadable(INVALID_REQUEST_DATA))?;
    let patch = validation::request_patch(&payload)
        .map_err(AppError::validation(INVALID_REQUEST_DATA))?;

    let request = state
        .storage
        .update_request(&id, patch)
        .map_err(write_failure("Failed to update request"))?;

    tracing::info!(id = %request.id, "Updated request");
    Ok(Json(request))
}

/// DELETE /requests/:id
pub async fn delete_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .storage
        .delete_request(&id)
        .or_fail("Failed to delete request")?;

    tracing::info!(id = %id, "Deleted request");
    Ok(StatusCode::NO_CONTENT)
}

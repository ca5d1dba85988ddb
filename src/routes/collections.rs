use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::error::{AppError, StoreResultExt};
use crate::routes::AppState;
use crate::store::Collection;
use crate::validation;

/// GET /collections
pub async fn list_collections(
    State(state): State<AppState>,
) -> Result<Json<Vec<Collection>>, AppError> {
    let collections = state
        .storage
        .list_collections()
        .or_fail("Failed to fetch collections")?;
    Ok(Json(collections))
}

/// GET /collections/:id
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Collection>, AppError> {
    state
        .storage
        .get_collection(&id)
        .or_fail("Failed to fetch collection")?
        .map(Json)
        .ok_or(AppError::NotFound("Collection not found"))
}

/// POST /collections
pub async fn create_collection(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Collection>), AppError> {
    let Json(payload) = payload.map_err(AppError::unreadable("Invalid collection data"))?;
    let new = validation::new_collection(&payload)
        .map_err(AppError::validation("Invalid collection data"))?;

    let collection = state
        .storage
        .create_collection(new)
        .or_fail("Failed to create collection")?;

    tracing::info!(id = %collection.id, name = %collection.name, "Created collection");
    Ok((StatusCode::CREATED, Json(collection)))
}

/// DELETE /collections/:id
///
/// Removes the collection and every request filed under it.
pub async fn delete_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .storage
        .delete_collection(&id)
        .or_fail("Failed to delete collection")?;

    tracing::info!(id = %id, "Deleted collection");
    Ok(StatusCode::NO_CONTENT)
}

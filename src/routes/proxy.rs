use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::error::AppError;
use crate::proxy::{ProxyError, ProxyRequest, ResponseEnvelope};
use crate::routes::AppState;

/// POST /proxy
///
/// Forwards the described call and returns its envelope. Nothing is written
/// to history here; recording is the caller's decision.
pub async fn proxy_request(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ResponseEnvelope>, AppError> {
    let Json(payload) =
        payload.map_err(|rejection| ProxyError::InvalidRequest(rejection.body_text()))?;
    let request: ProxyRequest = serde_json::from_value(payload)
        .map_err(|e| ProxyError::InvalidRequest(e.to_string()))?;

    tracing::debug!(
        method = %request.method,
        url = %request.url,
        "Proxying request"
    );

    let response = state.proxy.execute(request).await?;

    tracing::debug!(status = response.status, time = %response.time, "Request succeeded");
    Ok(Json(response))
}

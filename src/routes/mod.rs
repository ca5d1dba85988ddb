//! HTTP surface: CRUD endpoints over the store, the proxy endpoint and the
//! embedded front end.

pub mod collections;
pub mod health;
pub mod history;
pub mod proxy;
pub mod requests;
pub mod static_files;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::proxy::ProxyService;
use crate::store::Storage;

/// Shared handler state. Both capabilities are injected so backends can be
/// substituted without touching the handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub proxy: Arc<dyn ProxyService>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, proxy: Arc<dyn ProxyService>) -> Self {
        Self { storage, proxy }
    }
}

/// Routes served under `/api`.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/collections",
            get(collections::list_collections).post(collections::create_collection),
        )
        .route(
            "/collections/:id",
            get(collections::get_collection).delete(collections::delete_collection),
        )
        .route(
            "/collections/:id/requests",
            get(requests::list_requests_by_collection),
        )
        .route("/requests", post(requests::create_request))
        .route(
            "/requests/:id",
            get(requests::get_request)
                .put(requests::update_request)
                .delete(requests::delete_request),
        )
        .route(
            "/history",
            get(history::list_history)
                .post(history::add_history)
                .delete(history::clear_history),
        )
        .route("/proxy", post(proxy::proxy_request))
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "Not found" })),
            )
        })
        .with_state(state)
}

/// The full application: API, front end, CORS and request tracing.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_routes(state))
        .fallback(static_files::serve_static)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

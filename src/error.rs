use crate::proxy::ProxyError;
use crate::store::StoreError;
use crate::validation::ValidationIssue;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: &'static str,
        errors: Vec<ValidationIssue>,
    },

    #[error("{message}: {source}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Request failed: {0}")]
    Proxy(#[from] ProxyError),
}

impl AppError {
    pub fn validation(message: &'static str) -> impl FnOnce(Vec<ValidationIssue>) -> Self {
        move |errors| AppError::Validation { message, errors }
    }

    /// A body that is not a JSON document at all, or was not sent as JSON.
    /// Reported as a single issue at the root path.
    pub fn unreadable(message: &'static str) -> impl FnOnce(JsonRejection) -> Self {
        move |rejection| AppError::Validation {
            message,
            errors: vec![ValidationIssue::new(&[], rejection.body_text())],
        }
    }
}

/// Attaches the endpoint's fixed failure message to a store error.
pub trait StoreResultExt<T> {
    fn or_fail(self, message: &'static str) -> Result<T, AppError>;
}

impl<T> StoreResultExt<T> for Result<T, StoreError> {
    fn or_fail(self, message: &'static str) -> Result<T, AppError> {
        self.map_err(|source| AppError::Store { message, source })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation { message, errors } => (
                StatusCode::BAD_REQUEST,
                json!({ "message": message, "errors": errors }),
            ),
            AppError::Store { message, source } => {
                tracing::error!(error = %source, "{}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": message }),
                )
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "message": message })),
            AppError::Proxy(e) => {
                tracing::warn!(error = %e, "Proxy request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Request failed", "error": e.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

//! Client-side access: direct calls that bypass the proxy, and a typed
//! client for the REST surface.

pub mod api;
pub mod direct;

pub use api::ApiClient;
pub use direct::{merge_query_params, send_direct, DirectRequest, DEFAULT_TIMEOUT_MS};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The call did not finish within the caller's timeout.
    #[error("Request timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The REST surface answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, ClientError>;

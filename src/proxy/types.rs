use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Description of the outbound call the proxy should make.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Structured JSON or raw text; see [`crate::proxy::encode_body`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Normalized result of any executed HTTP call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    /// Parsed JSON when the payload was valid JSON, otherwise the raw text.
    pub body: Value,
    /// Elapsed time, `"<N>ms"`.
    pub time: String,
    /// Raw response text length, `"<N> bytes"`.
    pub size: String,
}

impl ResponseEnvelope {
    pub fn is_json(&self) -> bool {
        !self.body.is_string()
    }
}

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Invalid proxy request: {0}")]
    InvalidRequest(String),

    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("{0}")]
    RequestFailed(#[from] reqwest::Error),
}

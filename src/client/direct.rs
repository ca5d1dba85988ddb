//! Direct calls from the client, bypassing the server proxy.
//!
//! Same response shaping as the proxy, plus a caller-supplied timeout and
//! separately supplied query parameters.

use super::{ClientError, Result};
use crate::proxy::response_builder::read_envelope;
use crate::proxy::{build_headers, encode_body, parse_method, ProxyError, ResponseEnvelope};
use crate::store::StringMap;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use url::Url;

/// Timeout applied when the caller does not supply one.
pub const DEFAULT_TIMEOUT_MS: u64 = 30000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Merged into the URL query; empty values are skipped.
    #[serde(default)]
    pub params: StringMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Milliseconds, [`DEFAULT_TIMEOUT_MS`] when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl DirectRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: HashMap::new(),
            params: StringMap::new(),
            body: None,
            timeout: None,
        }
    }
}

/// Sets each non-empty parameter on the URL query, replacing any existing
/// value for the same key.
pub fn merge_query_params(url: &str, params: &StringMap) -> Result<Url> {
    let mut parsed =
        Url::parse(url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", url, e)))?;

    let updates: Vec<(&String, &String)> =
        params.iter().filter(|(_, value)| !value.is_empty()).collect();
    if updates.is_empty() {
        return Ok(parsed);
    }

    let mut pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
    for (key, value) in updates {
        match pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                pairs[first].1 = value.clone();
                let mut index = 0;
                pairs.retain(|(k, _)| {
                    let keep = index <= first || k != key;
                    index += 1;
                    keep
                });
            }
            None => pairs.push((key.clone(), value.clone())),
        }
    }

    parsed.query_pairs_mut().clear().extend_pairs(&pairs);
    Ok(parsed)
}

fn from_proxy_error(error: ProxyError) -> ClientError {
    match error {
        ProxyError::InvalidMethod(m) => ClientError::InvalidMethod(m),
        ProxyError::InvalidUrl(u) => ClientError::InvalidUrl(u),
        ProxyError::InvalidHeader(h) => ClientError::InvalidHeader(h),
        ProxyError::InvalidRequest(r) => ClientError::InvalidUrl(r),
        ProxyError::RequestFailed(e) => ClientError::Request(e),
    }
}

/// Performs the call directly. Exceeding the timeout drops the in-flight
/// request and yields [`ClientError::Timeout`].
pub async fn send_direct(
    client: &reqwest::Client,
    request: DirectRequest,
) -> Result<ResponseEnvelope> {
    let method = parse_method(&request.method).map_err(from_proxy_error)?;
    let url = merge_query_params(&request.url, &request.params)?;

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in build_headers(&request.headers).map_err(from_proxy_error)? {
        if let Some(name) = name {
            headers.insert(name, value);
        }
    }

    let mut builder = client.request(method.clone(), url).headers(headers);
    if method != Method::GET {
        if let Some(body) = encode_body(request.body.as_ref()) {
            builder = builder.body(body);
        }
    }

    let timeout = Duration::from_millis(request.timeout.unwrap_or(DEFAULT_TIMEOUT_MS));
    let started = Instant::now();
    let call = async move {
        let response = builder.send().await?;
        read_envelope(response, started).await
    };

    match tokio::time::timeout(timeout, call).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            tracing::debug!(timeout_ms = timeout.as_millis() as u64, "Direct request timed out");
            Err(ClientError::Timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn params(pairs: &[(&str, &str)]) -> StringMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_skips_empty_values() {
        let url = merge_query_params(
            "https://api.example.com/search",
            &params(&[("q", "rust"), ("page", "")]),
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/search?q=rust");
    }

    #[test]
    fn test_merge_replaces_existing_key() {
        let url = merge_query_params(
            "https://api.example.com/search?q=old&lang=en&q=older",
            &params(&[("q", "new")]),
        )
        .unwrap();
        assert_eq!(url.query(), Some("q=new&lang=en"));
    }

    #[test]
    fn test_merge_without_params_keeps_url() {
        let url = merge_query_params("https://api.example.com/a", &StringMap::new()).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/a");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_merge_encodes_values() {
        let url = merge_query_params("https://x.test/", &params(&[("q", "a b&c")])).unwrap();
        assert_eq!(url.query(), Some("q=a+b%26c"));
    }

    #[test]
    fn test_invalid_url() {
        let err = merge_query_params("/relative", &StringMap::new()).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_a_distinct_error() {
        // Accepts connections but never answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mut request = DirectRequest::new("GET", format!("http://{}/slow", addr));
        request.timeout = Some(50);

        let err = send_direct(&reqwest::Client::new(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout));
        assert_eq!(err.to_string(), "Request timeout");
    }

    #[tokio::test]
    async fn test_get_never_sends_body() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let raw = String::from_utf8_lossy(&buf[..n]).to_string();
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok")
                .await
                .unwrap();
            raw
        });

        let mut request = DirectRequest::new("GET", format!("http://{}/", addr));
        request.body = Some(serde_json::json!({ "ignored": true }));
        let response = send_direct(&reqwest::Client::new(), request).await.unwrap();
        assert_eq!(response.body, serde_json::json!("ok"));
        assert_eq!(response.size, "2 bytes");

        let raw = server.await.unwrap().to_lowercase();
        assert!(raw.contains("content-type: application/json"));
        assert!(!raw.contains("ignored"));
    }
}

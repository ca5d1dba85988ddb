//! Outbound execution of a proxy request.
//!
//! One call, exactly as described: no retries and no timeout. Redirects are
//! whatever the reqwest client does by default.

use super::response_builder::read_envelope;
use super::types::*;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;

/// Parses an HTTP method name, case-insensitively.
pub fn parse_method(method: &str) -> Result<Method, ProxyError> {
    Method::from_bytes(method.to_uppercase().as_bytes())
        .map_err(|_| ProxyError::InvalidMethod(method.to_string()))
}

/// Converts a header mapping into a `HeaderMap`. Empty names are skipped.
pub fn build_headers(input: &HashMap<String, String>) -> Result<HeaderMap, ProxyError> {
    let mut headers = HeaderMap::new();

    for (key, value) in input {
        if key.is_empty() {
            continue;
        }

        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ProxyError::InvalidHeader(format!("`{}`: {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ProxyError::InvalidHeader(format!("value for `{}`: {}", key, e)))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

/// Wire form of a request body.
///
/// `null` and `""` mean no body. A JSON string is sent verbatim, any other
/// value as its JSON text.
pub fn encode_body(body: Option<&Value>) -> Option<String> {
    match body? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Executes `request` with `client` and shapes the outcome.
pub async fn execute_request(
    client: &reqwest::Client,
    request: ProxyRequest,
) -> Result<ResponseEnvelope, ProxyError> {
    let method = parse_method(&request.method)?;
    let url = url::Url::parse(&request.url)
        .map_err(|e| ProxyError::InvalidUrl(format!("{}: {}", request.url, e)))?;
    let headers = build_headers(&request.headers)?;

    let mut builder = client.request(method, url).headers(headers);
    if let Some(body) = encode_body(request.body.as_ref()) {
        builder = builder.body(body);
    }

    let started = Instant::now();
    let response = builder.send().await?;
    let envelope = read_envelope(response, started).await?;

    tracing::debug!(
        status = envelope.status,
        time = %envelope.time,
        size = %envelope.size,
        "Upstream responded"
    );

    Ok(envelope)
}

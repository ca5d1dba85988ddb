//! Response shaping shared by the proxy and the direct client.
//!
//! Turns a status line, headers and the raw body text into a
//! [`ResponseEnvelope`].

use super::types::ResponseEnvelope;
use crate::shared::{format_duration, format_size, status_text};
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Flattens response headers into a map. Repeated header names are joined
/// with `", "`.
pub fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut collected: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    collected
}

/// Parses the body as JSON, keeping the raw text when that fails.
pub fn parse_body(text: String) -> Value {
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => Value::String(text),
    }
}

/// Parameters for building a response envelope.
pub struct ResponseBuildParams {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub text: String,
    pub elapsed: Duration,
}

pub fn build_response(params: ResponseBuildParams) -> ResponseEnvelope {
    let ResponseBuildParams {
        status,
        headers,
        text,
        elapsed,
    } = params;

    let size = format_size(text.len());

    ResponseEnvelope {
        status,
        status_text: status_text(status),
        headers,
        body: parse_body(text),
        time: format_duration(elapsed),
        size,
    }
}

/// Reads the full body of `response` and shapes it. `started` is the
/// instant just before the request was sent.
pub(crate) async fn read_envelope(
    response: reqwest::Response,
    started: Instant,
) -> Result<ResponseEnvelope, reqwest::Error> {
    let status = response.status().as_u16();
    let headers = collect_headers(response.headers());
    let text = response.text().await?;

    Ok(build_response(ResponseBuildParams {
        status,
        headers,
        text,
        elapsed: started.elapsed(),
    }))
}

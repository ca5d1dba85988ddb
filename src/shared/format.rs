//! Formatting of response envelope fields.

use reqwest::StatusCode;
use std::time::Duration;

/// Elapsed time as `"<milliseconds>ms"`.
pub fn format_duration(elapsed: Duration) -> String {
    format!("{}ms", elapsed.as_millis())
}

/// Byte count as `"<N> bytes"`.
pub fn format_size(bytes: usize) -> String {
    format!("{} bytes", bytes)
}

/// Canonical reason phrase for a status code, empty when there is none.
pub fn status_text(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
        .to_string()
}

//! Presentation of a [`ResponseEnvelope`] in the response viewer.

use crate::proxy::ResponseEnvelope;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Pretty,
    Raw,
    Preview,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Pretty, ViewMode::Raw, ViewMode::Preview];

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Pretty => "Pretty",
            ViewMode::Raw => "Raw",
            ViewMode::Preview => "Preview",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Text,
}

impl BodyKind {
    pub fn label(&self) -> &'static str {
        match self {
            BodyKind::Json => "JSON",
            BodyKind::Text => "Text",
        }
    }
}

/// Colour class of the status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Warning,
    Error,
}

impl fmt::Display for StatusTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusTone::Success => "success",
            StatusTone::Warning => "warning",
            StatusTone::Error => "error",
        })
    }
}

/// 2xx is success, 4xx and 5xx are errors, anything else is a warning.
pub fn status_tone(status: u16) -> StatusTone {
    match status {
        200..=299 => StatusTone::Success,
        400.. => StatusTone::Error,
        _ => StatusTone::Warning,
    }
}

pub fn body_kind(response: &ResponseEnvelope) -> BodyKind {
    if response.is_json() {
        BodyKind::Json
    } else {
        BodyKind::Text
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Text bodies render verbatim in every mode. Structured bodies are
/// indented for Pretty and Preview, compact for Raw.
pub fn render_body(response: &ResponseEnvelope, mode: ViewMode) -> String {
    match (&response.body, mode) {
        (Value::String(text), _) => text.clone(),
        (value, ViewMode::Raw) => value.to_string(),
        (value, ViewMode::Pretty | ViewMode::Preview) => pretty(value),
    }
}

/// What the copy button places on the clipboard.
pub fn clipboard_text(response: &ResponseEnvelope) -> String {
    render_body(response, ViewMode::Pretty)
}

/// Response headers sorted by name for the headers tab.
pub fn header_rows(response: &ResponseEnvelope) -> Vec<(&str, &str)> {
    let mut rows: Vec<(&str, &str)> = response
        .headers
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    rows.sort_unstable();
    rows
}

pub fn summary_line(response: &ResponseEnvelope) -> String {
    format!(
        "{} {} | {} | {}",
        response.status, response.status_text, response.time, response.size
    )
}

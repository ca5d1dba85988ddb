//! The in-progress request being edited in the request builder.
//!
//! Params and headers are edited as rows. Only rows that are enabled and
//! have both a key and a value contribute to the outgoing request; the
//! description is never sent.

use crate::client::DirectRequest;
use crate::proxy::{ProxyRequest, ResponseEnvelope};
use crate::store::{HistoryEntry, HttpMethod, NewHistoryEntry, NewRequest, SavedRequest, StringMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum DraftError {
    #[error("Enter a request URL before sending")]
    MissingUrl,

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),
}

/// One editable param or header row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValueRow {
    pub id: String,
    pub enabled: bool,
    pub key: String,
    pub value: String,
    pub description: String,
}

impl KeyValueRow {
    fn blank(id: String) -> Self {
        Self {
            id,
            enabled: true,
            key: String::new(),
            value: String::new(),
            description: String::new(),
        }
    }

    /// Whether this row is part of the outgoing request.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.key.is_empty() && !self.value.is_empty()
    }
}

/// An edit to a single row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowEdit {
    Key(String),
    Value(String),
    Description(String),
    Enabled(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowList {
    rows: Vec<KeyValueRow>,
    next_id: u64,
}

impl RowList {
    /// A list holding one blank, enabled row.
    pub fn new() -> Self {
        let mut list = Self {
            rows: Vec::new(),
            next_id: 1,
        };
        list.add();
        list
    }

    /// Rows for each entry of `map`, followed by a blank row.
    pub fn from_map(map: &StringMap) -> Self {
        let mut list = Self {
            rows: Vec::new(),
            next_id: 1,
        };
        for (key, value) in map {
            list.push(key, value);
        }
        list.add();
        list
    }

    pub fn rows(&self) -> &[KeyValueRow] {
        &self.rows
    }

    /// Appends a blank row and returns its id.
    pub fn add(&mut self) -> String {
        let id = self.next_id.to_string();
        self.next_id += 1;
        self.rows.push(KeyValueRow::blank(id.clone()));
        id
    }

    /// Appends a filled-in row and returns its id.
    pub fn push(&mut self, key: &str, value: &str) -> String {
        let id = self.add();
        self.update(&id, RowEdit::Key(key.to_string()));
        self.update(&id, RowEdit::Value(value.to_string()));
        id
    }

    /// Returns `false` when no row has `id`.
    pub fn update(&mut self, id: &str, edit: RowEdit) -> bool {
        let Some(row) = self.rows.iter_mut().find(|row| row.id == id) else {
            return false;
        };
        match edit {
            RowEdit::Key(key) => row.key = key,
            RowEdit::Value(value) => row.value = value,
            RowEdit::Description(description) => row.description = description,
            RowEdit::Enabled(enabled) => row.enabled = enabled,
        }
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        self.rows.len() != before
    }

    /// Active rows folded into key/value pairs. A repeated key keeps its
    /// first position and takes the last value.
    pub fn active_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for row in self.rows.iter().filter(|row| row.is_active()) {
            match pairs.iter_mut().find(|(key, _)| *key == row.key) {
                Some(pair) => pair.1 = row.value.clone(),
                None => pairs.push((row.key.clone(), row.value.clone())),
            }
        }
        pairs
    }

    pub fn active_map(&self) -> StringMap {
        self.active_pairs().into_iter().collect()
    }
}

impl Default for RowList {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDraft {
    pub method: HttpMethod,
    pub url: String,
    pub params: RowList,
    pub headers: RowList,
    pub body: String,
}

impl Default for RequestDraft {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            url: String::new(),
            params: RowList::new(),
            headers: RowList::new(),
            body: String::new(),
        }
    }
}

impl RequestDraft {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn from_saved(request: &SavedRequest) -> Self {
        Self {
            method: request.method,
            url: request.url.clone(),
            params: RowList::from_map(&request.params),
            headers: RowList::from_map(&request.headers),
            body: request.body.clone().unwrap_or_default(),
        }
    }

    pub fn from_history(entry: &HistoryEntry) -> Result<Self, DraftError> {
        let method = entry
            .method
            .parse()
            .map_err(|_| DraftError::UnsupportedMethod(entry.method.clone()))?;
        Ok(Self {
            method,
            url: entry.url.clone(),
            params: RowList::from_map(&entry.params),
            headers: RowList::from_map(&entry.headers),
            body: entry.body.clone().unwrap_or_default(),
        })
    }

    pub fn can_send(&self) -> bool {
        !self.url.trim().is_empty()
    }

    pub fn active_params(&self) -> Vec<(String, String)> {
        self.params.active_pairs()
    }

    pub fn active_headers(&self) -> HashMap<String, String> {
        self.headers.active_pairs().into_iter().collect()
    }

    /// The URL with the active params appended as a form-encoded query.
    pub fn final_url(&self) -> String {
        let params = self.active_params();
        if params.is_empty() {
            return self.url.clone();
        }

        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, query)
    }

    /// Body to send: none for GET or an empty body, otherwise the parsed
    /// JSON, or the raw text when it is not JSON.
    pub fn outgoing_body(&self) -> Option<Value> {
        if self.method == HttpMethod::Get || self.body.is_empty() {
            return None;
        }
        Some(serde_json::from_str(&self.body).unwrap_or_else(|_| Value::String(self.body.clone())))
    }

    fn stored_body(&self) -> Option<String> {
        (!self.body.is_empty()).then(|| self.body.clone())
    }

    pub fn to_proxy_request(&self) -> Result<ProxyRequest, DraftError> {
        if !self.can_send() {
            return Err(DraftError::MissingUrl);
        }
        Ok(ProxyRequest {
            method: self.method.to_string(),
            url: self.final_url(),
            headers: self.active_headers(),
            body: self.outgoing_body(),
        })
    }

    /// Request for the direct client; params travel separately and are
    /// merged into the URL by the client.
    pub fn to_direct_request(&self, timeout_ms: Option<u64>) -> Result<DirectRequest, DraftError> {
        if !self.can_send() {
            return Err(DraftError::MissingUrl);
        }
        Ok(DirectRequest {
            method: self.method.to_string(),
            url: self.url.clone(),
            headers: self.active_headers(),
            params: self.params.active_map(),
            body: self.outgoing_body(),
            timeout: timeout_ms,
        })
    }

    pub fn to_new_request(&self, name: impl Into<String>, collection_id: Option<String>) -> NewRequest {
        NewRequest {
            collection_id,
            name: name.into(),
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.active_map(),
            params: self.params.active_map(),
            body: self.stored_body(),
        }
    }

    /// History entry for this draft and the response it produced. The URL
    /// is stored without the params, which are kept alongside.
    pub fn history_record(&self, response: &ResponseEnvelope) -> NewHistoryEntry {
        let response_body = match &response.body {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };

        NewHistoryEntry {
            method: self.method.to_string(),
            url: self.url.clone(),
            headers: self.headers.active_map(),
            params: self.params.active_map(),
            body: self.stored_body(),
            response_status: Some(response.status.to_string()),
            response_time: Some(response.time.clone()),
            response_size: Some(response.size.clone()),
            response_body: Some(response_body),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Header or query parameter mapping as stored on saved requests and history.
pub type StringMap = BTreeMap<String, String>;

/// Methods a saved request may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("Invalid method: {}", s))
    }
}

/// A named group of saved requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A persisted description of an HTTP call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRequest {
    pub id: String,
    pub collection_id: Option<String>,
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub headers: StringMap,
    pub params: StringMap,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Audit record of an executed call and whatever outcome was captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub method: String,
    pub url: String,
    pub headers: StringMap,
    pub params: StringMap,
    pub body: Option<String>,
    pub response_status: Option<String>,
    pub response_time: Option<String>,
    pub response_size: Option<String>,
    pub response_body: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollection {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    pub collection_id: Option<String>,
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub headers: StringMap,
    pub params: StringMap,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHistoryEntry {
    pub method: String,
    pub url: String,
    pub headers: StringMap,
    pub params: StringMap,
    pub body: Option<String>,
    pub response_status: Option<String>,
    pub response_time: Option<String>,
    pub response_size: Option<String>,
    pub response_body: Option<String>,
}

/// Partial update for a saved request.
///
/// `None` leaves a field untouched. For the nullable fields the inner
/// `Option` distinguishes "set to a value" from "clear".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestPatch {
    pub collection_id: Option<Option<String>>,
    pub name: Option<String>,
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    pub headers: Option<StringMap>,
    pub params: Option<StringMap>,
    pub body: Option<Option<String>>,
}

impl RequestPatch {
    pub fn is_empty(&self) -> bool {
        *self == RequestPatch::default()
    }

    /// Merges the present fields into `request`.
    pub fn apply(self, request: &mut SavedRequest) {
        if let Some(collection_id) = self.collection_id {
            request.collection_id = collection_id;
        }
        if let Some(name) = self.name {
            request.name = name;
        }
        if let Some(method) = self.method {
            request.method = method;
        }
        if let Some(url) = self.url {
            request.url = url;
        }
        if let Some(headers) = self.headers {
            request.headers = headers;
        }
        if let Some(params) = self.params {
            request.params = params;
        }
        if let Some(body) = self.body {
            request.body = body;
        }
    }
}

/// Serializes only the fields that are present, with `null` for cleared ones.
impl Serialize for RequestPatch {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        if let Some(collection_id) = &self.collection_id {
            map.serialize_entry("collectionId", collection_id)?;
        }
        if let Some(name) = &self.name {
            map.serialize_entry("name", name)?;
        }
        if let Some(method) = &self.method {
            map.serialize_entry("method", method)?;
        }
        if let Some(url) = &self.url {
            map.serialize_entry("url", url)?;
        }
        if let Some(headers) = &self.headers {
            map.serialize_entry("headers", headers)?;
        }
        if let Some(params) = &self.params {
            map.serialize_entry("params", params)?;
        }
        if let Some(body) = &self.body {
            map.serialize_entry("body", body)?;
        }
        map.end()
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Collection {
    pub(crate) fn from_new(new: NewCollection) -> Self {
        Self {
            id: new_id(),
            name: new.name,
            description: new.description,
            created_at: Utc::now(),
        }
    }
}

impl SavedRequest {
    pub(crate) fn from_new(new: NewRequest) -> Self {
        Self {
            id: new_id(),
            collection_id: new.collection_id,
            name: new.name,
            method: new.method,
            url: new.url,
            headers: new.headers,
            params: new.params,
            body: new.body,
            created_at: Utc::now(),
        }
    }
}

impl HistoryEntry {
    pub(crate) fn from_new(new: NewHistoryEntry) -> Self {
        Self {
            id: new_id(),
            method: new.method,
            url: new.url,
            headers: new.headers,
            params: new.params,
            body: new.body,
            response_status: new.response_status,
            response_time: new.response_time,
            response_size: new.response_size,
            response_body: new.response_body,
            created_at: Utc::now(),
        }
    }
}

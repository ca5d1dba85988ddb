//! Payload validation for the mutating endpoints.
//!
//! Payloads are checked on the raw JSON value so that every problem is
//! reported at once, with the path of the offending field, before anything
//! reaches the store.

use crate::store::{
    HttpMethod, NewCollection, NewHistoryEntry, NewRequest, RequestPatch, StringMap,
};
use serde::Serialize;
use serde_json::{Map, Value};

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub path: Vec<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: &[&str], message: impl Into<String>) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
            message: message.into(),
        }
    }
}

pub type Validated<T> = Result<T, Vec<ValidationIssue>>;

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Collects issues while reading fields off a JSON object.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    issues: Vec<ValidationIssue>,
}

impl<'a> Fields<'a> {
    fn of(value: &'a Value) -> Validated<Self> {
        match value {
            Value::Object(object) => Ok(Self {
                object,
                issues: Vec::new(),
            }),
            other => Err(vec![ValidationIssue::new(
                &[],
                format!("Expected object, received {}", type_name(other)),
            )]),
        }
    }

    /// `None` when the key is absent, `Some(None)` when it is explicitly null.
    fn raw(&self, name: &str) -> Option<Option<&'a Value>> {
        match self.object.get(name) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(value) => Some(Some(value)),
        }
    }

    fn string_value(&mut self, name: &str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                self.issues.push(ValidationIssue::new(
                    &[name],
                    format!("Expected string, received {}", type_name(other)),
                ));
                None
            }
        }
    }

    fn required_string(&mut self, name: &str) -> Option<String> {
        match self.raw(name).flatten() {
            Some(value) => self.string_value(name, value),
            None => {
                self.issues.push(ValidationIssue::new(&[name], "Required"));
                None
            }
        }
    }

    fn non_empty_string(&mut self, name: &str) -> Option<String> {
        let value = self.required_string(name)?;
        if value.trim().is_empty() {
            self.issues.push(ValidationIssue::new(
                &[name],
                "String must contain at least 1 character(s)",
            ));
            return None;
        }
        Some(value)
    }

    fn optional_string(&mut self, name: &str) -> Option<String> {
        self.raw(name)
            .flatten()
            .and_then(|value| self.string_value(name, value))
    }

    fn nullable_update(&mut self, name: &str) -> Option<Option<String>> {
        match self.raw(name)? {
            None => Some(None),
            Some(value) => self.string_value(name, value).map(Some),
        }
    }

    fn string_map_value(&mut self, name: &str, value: &Value) -> Option<StringMap> {
        let Value::Object(entries) = value else {
            self.issues.push(ValidationIssue::new(
                &[name],
                format!("Expected object, received {}", type_name(value)),
            ));
            return None;
        };

        let mut map = StringMap::new();
        let mut valid = true;
        for (key, entry) in entries {
            match entry {
                Value::String(s) => {
                    map.insert(key.clone(), s.clone());
                }
                other => {
                    valid = false;
                    self.issues.push(ValidationIssue::new(
                        &[name, key.as_str()],
                        format!("Expected string, received {}", type_name(other)),
                    ));
                }
            }
        }
        valid.then_some(map)
    }

    /// Absent or null maps default to empty.
    fn string_map(&mut self, name: &str) -> StringMap {
        match self.raw(name).flatten() {
            Some(value) => self.string_map_value(name, value).unwrap_or_default(),
            None => StringMap::new(),
        }
    }

    fn method_value(&mut self, name: &str, value: &Value) -> Option<HttpMethod> {
        let raw = self.string_value(name, value)?;
        match raw.parse() {
            Ok(method) => Some(method),
            Err(_) => {
                let expected: Vec<String> = HttpMethod::ALL
                    .iter()
                    .map(|m| format!("'{}'", m))
                    .collect();
                self.issues.push(ValidationIssue::new(
                    &[name],
                    format!(
                        "Invalid enum value. Expected {}, received '{}'",
                        expected.join(" | "),
                        raw
                    ),
                ));
                None
            }
        }
    }

    fn method(&mut self, name: &str) -> Option<HttpMethod> {
        match self.raw(name).flatten() {
            Some(value) => self.method_value(name, value),
            None => {
                self.issues.push(ValidationIssue::new(&[name], "Required"));
                None
            }
        }
    }

    fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Validated<T> {
        if !self.issues.is_empty() {
            return Err(self.issues);
        }
        build().ok_or_else(|| vec![ValidationIssue::new(&[], "Invalid payload")])
    }
}

pub fn new_collection(value: &Value) -> Validated<NewCollection> {
    let mut fields = Fields::of(value)?;
    let name = fields.non_empty_string("name");
    let description = fields.optional_string("description");

    fields.finish(|| Some(NewCollection { name: name?, description }))
}

pub fn new_request(value: &Value) -> Validated<NewRequest> {
    let mut fields = Fields::of(value)?;
    let collection_id = fields.optional_string("collectionId");
    let name = fields.non_empty_string("name");
    let method = fields.method("method");
    let url = fields.required_string("url");
    let headers = fields.string_map("headers");
    let params = fields.string_map("params");
    let body = fields.optional_string("body");

    fields.finish(|| {
        Some(NewRequest {
            collection_id,
            name: name?,
            method: method?,
            url: url?,
            headers,
            params,
            body,
        })
    })
}

/// Every field optional; present fields are held to the create rules.
pub fn request_patch(value: &Value) -> Validated<RequestPatch> {
    let mut fields = Fields::of(value)?;
    let mut patch = RequestPatch {
        collection_id: fields.nullable_update("collectionId"),
        body: fields.nullable_update("body"),
        ..Default::default()
    };

    if fields.raw("name").is_some() {
        patch.name = fields.non_empty_string("name");
    }
    if fields.raw("method").is_some() {
        patch.method = fields.method("method");
    }
    if fields.raw("url").is_some() {
        patch.url = fields.required_string("url");
    }
    if fields.raw("headers").is_some() {
        patch.headers = Some(fields.string_map("headers"));
    }
    if fields.raw("params").is_some() {
        patch.params = Some(fields.string_map("params"));
    }

    fields.finish(|| Some(patch))
}

pub fn new_history_entry(value: &Value) -> Validated<NewHistoryEntry> {
    let mut fields = Fields::of(value)?;
    let method = fields.non_empty_string("method");
    let url = fields.required_string("url");
    let headers = fields.string_map("headers");
    let params = fields.string_map("params");
    let body = fields.optional_string("body");
    let response_status = fields.optional_string("responseStatus");
    let response_time = fields.optional_string("responseTime");
    let response_size = fields.optional_string("responseSize");
    let response_body = fields.optional_string("responseBody");

    fields.finish(|| {
        Some(NewHistoryEntry {
            method: method?,
            url: url?,
            headers,
            params,
            body,
            response_status,
            response_time,
            response_size,
            response_body,
        })
    })
}

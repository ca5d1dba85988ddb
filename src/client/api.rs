//! Typed client for the REST surface.

use super::{ClientError, Result};
use crate::proxy::{ProxyRequest, ResponseEnvelope};
use crate::store::{
    Collection, HistoryEntry, NewCollection, NewHistoryEntry, NewRequest, RequestPatch,
    SavedRequest,
};
use reqwest::Response;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Client for the `/api` endpoints of a running server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// `base_url` includes the API prefix, e.g. `http://127.0.0.1:5000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turns a non-success response into [`ClientError::Api`] using the
    /// `message` (and `error`, when present) fields of its JSON body.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        let mut message = body["message"]
            .as_str()
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error"))
            .to_string();
        if let Some(cause) = body["error"].as_str() {
            message = format!("{}: {}", message, cause);
        }

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.http.get(self.url(path)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .http
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let response = self.http.delete(self.url(path)).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn health(&self) -> Result<Value> {
        self.get("/health").await
    }

    pub async fn list_collections(&self) -> Result<Vec<Collection>> {
        self.get("/collections").await
    }

    pub async fn get_collection(&self, id: &str) -> Result<Collection> {
        self.get(&format!("/collections/{}", id)).await
    }

    pub async fn create_collection(&self, collection: &NewCollection) -> Result<Collection> {
        self.send_json(reqwest::Method::POST, "/collections", collection)
            .await
    }

    pub async fn delete_collection(&self, id: &str) -> Result<()> {
        self.delete(&format!("/collections/{}", id)).await
    }

    pub async fn list_requests(&self, collection_id: &str) -> Result<Vec<SavedRequest>> {
        self.get(&format!("/collections/{}/requests", collection_id))
            .await
    }

    pub async fn get_request(&self, id: &str) -> Result<SavedRequest> {
        self.get(&format!("/requests/{}", id)).await
    }

    pub async fn create_request(&self, request: &NewRequest) -> Result<SavedRequest> {
        self.send_json(reqwest::Method::POST, "/requests", request)
            .await
    }

    pub async fn update_request(&self, id: &str, patch: &RequestPatch) -> Result<SavedRequest> {
        self.send_json(reqwest::Method::PUT, &format!("/requests/{}", id), patch)
            .await
    }

    pub async fn delete_request(&self, id: &str) -> Result<()> {
        self.delete(&format!("/requests/{}", id)).await
    }

    pub async fn list_history(&self) -> Result<Vec<HistoryEntry>> {
        self.get("/history").await
    }

    pub async fn add_history(&self, entry: &NewHistoryEntry) -> Result<HistoryEntry> {
        self.send_json(reqwest::Method::POST, "/history", entry).await
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.delete("/history").await
    }

    /// Executes a call through the server proxy.
    pub async fn proxy(&self, request: &ProxyRequest) -> Result<ResponseEnvelope> {
        self.send_json(reqwest::Method::POST, "/proxy", request).await
    }
}

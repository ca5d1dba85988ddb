//! Proxy service abstraction layer.
//!
//! The router holds a `dyn ProxyService` so tests can swap in a canned
//! implementation instead of reaching the network.

use super::executor::execute_request;
use super::types::{ProxyError, ProxyRequest, ResponseEnvelope};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type ProxyFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ResponseEnvelope, ProxyError>> + Send + 'a>>;

/// Trait for services that execute proxy requests.
pub trait ProxyService: Send + Sync {
    /// Performs the outbound call described by `request`.
    fn execute(&self, request: ProxyRequest) -> ProxyFuture<'_>;
}

/// Default implementation backed by a shared reqwest client.
#[derive(Default, Clone)]
pub struct HttpProxyService {
    client: reqwest::Client,
}

impl HttpProxyService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Creates a new `HttpProxyService` wrapped in an `Arc`.
    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl ProxyService for HttpProxyService {
    fn execute(&self, request: ProxyRequest) -> ProxyFuture<'_> {
        Box::pin(async move { execute_request(&self.client, request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    struct MockProxyService {
        response: ResponseEnvelope,
    }

    impl ProxyService for MockProxyService {
        fn execute(&self, _request: ProxyRequest) -> ProxyFuture<'_> {
            let response = self.response.clone();
            Box::pin(async move { Ok(response) })
        }
    }

    #[tokio::test]
    async fn test_mock_proxy_service() {
        let service: Arc<dyn ProxyService> = Arc::new(MockProxyService {
            response: ResponseEnvelope {
                status: 201,
                status_text: "Created".to_string(),
                headers: HashMap::new(),
                body: json!({ "id": 1 }),
                time: "3ms".to_string(),
                size: "8 bytes".to_string(),
            },
        });

        let request = ProxyRequest {
            method: "POST".to_string(),
            url: "https://example.com".to_string(),
            headers: HashMap::new(),
            body: Some(json!({ "name": "x" })),
        };

        let response = service.execute(request).await.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.body["id"], 1);
    }

    #[tokio::test]
    async fn test_http_service_reports_invalid_method() {
        let service = HttpProxyService::arc();
        let request = ProxyRequest {
            method: "NOT VALID".to_string(),
            url: "https://example.com".to_string(),
            headers: HashMap::new(),
            body: None,
        };
        let err = service.execute(request).await.unwrap_err();
        assert!(matches!(err, ProxyError::InvalidMethod(_)));
    }
}

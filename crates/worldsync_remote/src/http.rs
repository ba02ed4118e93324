//! HTTP client abstraction.
//!
//! The actual HTTP client is abstracted via a trait so the index and
//! fetch logic can be exercised against a mock without network access.

use crate::error::{RemoteError, RemoteResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// A raw HTTP response: status plus body bytes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
///
/// Transport-level failures (DNS, connect, mid-body disconnect) are
/// errors; a non-success status is a normal response and is left to the
/// caller to interpret.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a GET request and returns the response.
    async fn get(&self, url: &str) -> RemoteResult<HttpResponse>;
}

/// Production HTTP client backed by `reqwest`.
pub struct ReqwestClient {
    client: reqwest::Client,
    token: Option<String>,
}

impl ReqwestClient {
    /// Creates a client, optionally carrying a bearer credential.
    pub fn new(token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> RemoteResult<HttpResponse> {
        let mut request = self
            .client
            .get(url)
            .header("User-Agent", "worldsync")
            .header("Accept", "application/vnd.github+json");

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?
            .to_vec();

        Ok(HttpResponse { status, body })
    }
}

/// A mock HTTP client for testing.
///
/// Responses are keyed by exact URL; unknown URLs return 404. Requested
/// URLs are recorded in order.
#[derive(Default)]
pub struct MockHttpClient {
    responses: RwLock<HashMap<String, HttpResponse>>,
    requests: RwLock<Vec<String>>,
}

impl MockHttpClient {
    /// Creates a new mock client with no responses registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a 200 response for a URL.
    pub fn respond(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.respond_with_status(url, 200, body);
    }

    /// Registers a response with an explicit status for a URL.
    pub fn respond_with_status(
        &self,
        url: impl Into<String>,
        status: u16,
        body: impl Into<Vec<u8>>,
    ) {
        self.responses.write().insert(
            url.into(),
            HttpResponse {
                status,
                body: body.into(),
            },
        );
    }

    /// Returns the URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.read().clone()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str) -> RemoteResult<HttpResponse> {
        self.requests.write().push(url.to_string());
        Ok(self
            .responses
            .read()
            .get(url)
            .cloned()
            .unwrap_or(HttpResponse {
                status: 404,
                body: Vec::new(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_registered_response() {
        let client = MockHttpClient::new();
        client.respond("https://example.test/a", b"hello".to_vec());

        let response = client.get("https://example.test/a").await.unwrap();
        assert!(response.is_success());
        assert_eq!(response.body, b"hello");
    }

    #[tokio::test]
    async fn mock_unknown_url_is_404() {
        let client = MockHttpClient::new();
        let response = client.get("https://example.test/missing").await.unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn mock_records_request_order() {
        let client = MockHttpClient::new();
        client.respond("https://example.test/1", Vec::new());

        let _ = client.get("https://example.test/1").await;
        let _ = client.get("https://example.test/2").await;

        assert_eq!(
            client.requests(),
            vec!["https://example.test/1", "https://example.test/2"]
        );
    }
}

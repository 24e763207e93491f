//! Transport layer
//!
//! The client core never talks HTTP directly. It goes through the
//! [`Transport`] trait, which issues a verb against an API-relative path and
//! hands back the status code with the raw body. [`HttpTransport`] is the
//! reqwest implementation used by the CLI.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::error::{ClientError, Result};

/// HTTP verb of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Status code and undecoded body of a response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    ///
    /// Returns `None` for an empty body so that bodiless success responses
    /// (204) are not treated as decode failures.
    pub fn decode<T: DeserializeOwned>(&self, action: &str) -> Result<Option<T>> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&self.body)
            .map(Some)
            .map_err(|e| ClientError::decode(action, e))
    }
}

/// Verb-level access to the hub API
///
/// Paths are relative to the API root, e.g. `hub/api/v1/instances/42`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request
    async fn get(&self, path: &str) -> Result<RawResponse>;

    /// Issue a POST request, with an optional JSON body
    async fn post(&self, path: &str, body: Option<Vec<u8>>) -> Result<RawResponse>;

    /// Issue a PATCH request with a JSON body
    async fn patch(&self, path: &str, body: Vec<u8>) -> Result<RawResponse>;

    /// Issue a DELETE request
    async fn delete(&self, path: &str) -> Result<RawResponse>;
}

/// reqwest implementation of [`Transport`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Base URL of the API (e.g., "https://api.example.com")
    base_url: String,
    /// Bearer token sent with every request
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl HttpTransport {
    /// Create a transport with default client settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a transport with a request timeout
    ///
    /// The timeout is the only deadline applied to API calls.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a transport with a custom HTTP client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        }
    }

    /// Authenticate requests with a bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<RawResponse> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut request = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!("{} {} -> {} ({} bytes)", method, url, status, body.len());

        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<RawResponse> {
        self.send(Method::Get, path, None).await
    }

    async fn post(&self, path: &str, body: Option<Vec<u8>>) -> Result<RawResponse> {
        self.send(Method::Post, path, body).await
    }

    async fn patch(&self, path: &str, body: Vec<u8>) -> Result<RawResponse> {
        self.send(Method::Patch, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<RawResponse> {
        self.send(Method::Delete, path, None).await
    }
}

//! Hub HTTP Client
//!
//! Client-side logic for the stack instance resource of the hub API:
//! selector resolution, patch construction, lifecycle commands and secret
//! lookup. All HTTP goes through the [`Transport`] trait so the logic can be
//! driven by the reqwest [`HttpTransport`] or by a scripted transport in
//! tests.
//!
//! # Example
//!
//! ```no_run
//! use hubctl_client::{HubClient, InstanceCache};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = HubClient::new("https://api.example.com");
//!     let mut cache = InstanceCache::new();
//!
//!     let instance = client.resolve(&mut cache, "app.dev.example.com").await?;
//!     println!("{} [{}]", instance.domain, instance.id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod lifecycle;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod patch;
pub mod paths;
mod resolver;
mod secrets;
pub mod transport;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use lifecycle::{CommandOutcome, DeleteOutcome, Kubeconfig, LifecycleVerb};
pub use patch::{InstancePatch, PatchMode};
pub use resolver::{InstanceCache, Selector};
pub use secrets::SecretResolver;
pub use transport::{HttpTransport, Method, RawResponse, Transport};

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Status code together with the decoded body, if there was one
#[derive(Debug)]
pub struct Reply<T> {
    pub status: u16,
    pub body: Option<T>,
}

/// Client for the stack instance resource of the hub API
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Clone)]
pub struct HubClient {
    transport: Arc<dyn Transport>,
}

impl HubClient {
    /// Create a client talking HTTP to the given API base URL
    ///
    /// # Example
    /// ```
    /// use hubctl_client::HubClient;
    ///
    /// let client = HubClient::new("https://api.example.com");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new(base_url)))
    }

    /// Create a client on top of any transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    // =============================================================================
    // Verb helpers
    // =============================================================================

    /// GET and decode the body of a successful response
    pub async fn get<T: DeserializeOwned>(&self, path: &str, action: &str) -> Result<Reply<T>> {
        let response = self.transport.get(path).await?;
        decode_reply(response, action)
    }

    /// GET and return the raw body
    pub async fn get2(&self, path: &str) -> Result<RawResponse> {
        self.transport.get(path).await
    }

    /// POST a raw body and decode the response
    pub async fn post2<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<Vec<u8>>,
        action: &str,
    ) -> Result<Reply<T>> {
        let response = self.transport.post(path, body).await?;
        decode_reply(response, action)
    }

    /// PATCH a typed body and decode the response
    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        action: &str,
    ) -> Result<Reply<T>> {
        let body = serde_json::to_vec(body)
            .map_err(|e| ClientError::InvalidPayload(format!("unable to encode patch: {}", e)))?;
        self.patch2(path, body, action).await
    }

    /// PATCH a raw body and decode the response
    pub async fn patch2<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Vec<u8>,
        action: &str,
    ) -> Result<Reply<T>> {
        let response = self.transport.patch(path, body).await?;
        decode_reply(response, action)
    }

    /// DELETE and return the status code
    pub async fn delete(&self, path: &str) -> Result<u16> {
        let response = self.transport.delete(path).await?;
        Ok(response.status)
    }
}

/// Decode the body only when the API reports success
///
/// Error bodies are free-form text and are not worth a decode failure.
fn decode_reply<T: DeserializeOwned>(response: RawResponse, action: &str) -> Result<Reply<T>> {
    let body = if response.is_success() {
        response.decode(action)?
    } else {
        None
    };
    Ok(Reply {
        status: response.status,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_skips_decoding_error_bodies() {
        let mock = MockTransport::new();
        mock.on_text(Method::Get, "hub/api/v1/instances/1", 500, "internal error");
        let client = HubClient::with_transport(mock.clone());

        let reply: Reply<serde_json::Value> = client
            .get("hub/api/v1/instances/1", "querying")
            .await
            .unwrap();

        assert_eq!(reply.status, 500);
        assert!(reply.body.is_none());
    }

    #[tokio::test]
    async fn test_patch_encodes_typed_body() {
        let mock = MockTransport::new();
        mock.on_json(Method::Patch, "p", 200, json!({"ok": true}));
        let client = HubClient::with_transport(mock.clone());

        let reply: Reply<serde_json::Value> = client
            .patch("p", &json!({"tags": ["a"]}), "patching")
            .await
            .unwrap();

        assert_eq!(reply.body, Some(json!({"ok": true})));
        assert_eq!(mock.requests()[0].json_body(), Some(json!({"tags": ["a"]})));
    }
}

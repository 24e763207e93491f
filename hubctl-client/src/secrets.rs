//! Secret lookup
//!
//! Secret parameters and outputs only carry a reference. The plaintext is
//! fetched on demand from the secrets sub-resource of whatever owns the value.

use async_trait::async_trait;
use hubctl_core::dto::secret::SecretPayload;

use crate::HubClient;
use crate::error::{ClientError, Result};
use crate::paths;

/// Recovers the plaintext behind a secret reference
#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Fetch the plaintext of `value_ref`, scoped by `resource_path`
    /// (e.g. `hub/api/v1/instances/42`)
    async fn resolve_secret(&self, resource_path: &str, value_ref: &str) -> Result<String>;
}

#[async_trait]
impl SecretResolver for HubClient {
    async fn resolve_secret(&self, resource_path: &str, value_ref: &str) -> Result<String> {
        let action = format!("fetching secret `{}`", value_ref);

        let reply = self
            .get::<SecretPayload>(&paths::secret(resource_path, value_ref), &action)
            .await?;
        if reply.status != 200 {
            return Err(ClientError::unexpected_status(action, reply.status, &[200]));
        }
        let payload = reply.body.ok_or(ClientError::EmptyBody(action))?;

        payload
            .plaintext()
            .map(str::to_string)
            .ok_or_else(|| ClientError::SecretUnreadable(value_ref.to_string()))
    }
}

//! Selector resolution
//!
//! Users address an instance either by its numeric id or by its domain. A
//! selector made only of decimal digits is always an id; anything else is a
//! domain. Resolution must end on exactly one instance: a domain that the
//! hub reports more than once is refused rather than guessed.

use hubctl_core::domain::instance::StackInstance;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::HubClient;
use crate::error::{ClientError, Result};
use crate::paths;

const QUERY_ACTION: &str = "querying Stack Instances";

/// User-supplied instance identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Server-assigned numeric id
    Id(String),
    /// Globally unique domain name
    Domain(String),
}

impl Selector {
    /// Classify a selector string
    pub fn parse(input: &str) -> Self {
        if Self::is_id(input) {
            Selector::Id(input.to_string())
        } else {
            Selector::Domain(input.to_string())
        }
    }

    /// Whether the string is an unsigned integer literal
    pub fn is_id(input: &str) -> bool {
        !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selector::Id(id) => id,
            Selector::Domain(domain) => domain,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        Selector::parse(s)
    }
}

/// Instances already resolved during this run, keyed by the literal selector
///
/// Never invalidated: after a patch, use the instance returned by the patch
/// call rather than a fresh lookup through the cache.
#[derive(Debug, Default)]
pub struct InstanceCache {
    entries: HashMap<String, StackInstance>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, selector: &str) -> Option<&StackInstance> {
        self.entries.get(selector)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HubClient {
    /// Resolve a selector to exactly one instance, consulting the cache first
    ///
    /// # Errors
    /// - `NotFound` if nothing matches
    /// - `Ambiguous` if a domain matches more than one instance
    /// - `UnexpectedStatus` / `Decode` if the API misbehaves
    pub async fn resolve(&self, cache: &mut InstanceCache, selector: &str) -> Result<StackInstance> {
        if let Some(instance) = cache.get(selector) {
            debug!("Stack Instance `{}` served from cache", selector);
            return Ok(instance.clone());
        }

        let instance = self.instance_by(selector).await?;
        cache
            .entries
            .insert(selector.to_string(), instance.clone());
        Ok(instance)
    }

    /// Resolve a selector to exactly one instance without caching
    ///
    /// An empty selector never resolves; listing everything is left to
    /// [`HubClient::instances_by`].
    pub async fn instance_by(&self, selector: &str) -> Result<StackInstance> {
        if selector.is_empty() {
            return Err(ClientError::NotFound(String::new()));
        }
        match Selector::parse(selector) {
            Selector::Id(id) => self
                .instance_by_id(&id)
                .await?
                .ok_or_else(|| ClientError::NotFound(id)),
            Selector::Domain(domain) => {
                let mut instances = self.instances_by_domain(&domain).await?;
                match instances.len() {
                    0 => Err(ClientError::NotFound(domain)),
                    1 => Ok(instances.remove(0)),
                    count => Err(ClientError::Ambiguous {
                        selector: domain,
                        count,
                    }),
                }
            }
        }
    }

    /// All instances matching a selector
    ///
    /// An id yields at most one instance, a domain every instance the hub
    /// returns for it, and an empty selector the whole collection.
    pub async fn instances_by(&self, selector: &str) -> Result<Vec<StackInstance>> {
        match Selector::parse(selector) {
            Selector::Id(id) => Ok(self.instance_by_id(&id).await?.into_iter().collect()),
            Selector::Domain(domain) => self.instances_by_domain(&domain).await,
        }
    }

    async fn instance_by_id(&self, id: &str) -> Result<Option<StackInstance>> {
        let reply = self.get(&paths::instance(id), QUERY_ACTION).await?;
        match reply.status {
            404 => Ok(None),
            200 => reply
                .body
                .map(Some)
                .ok_or_else(|| ClientError::EmptyBody(QUERY_ACTION.to_string())),
            status => Err(ClientError::unexpected_status(QUERY_ACTION, status, &[200])),
        }
    }

    async fn instances_by_domain(&self, domain: &str) -> Result<Vec<StackInstance>> {
        let reply = self.get(&paths::by_domain(domain), QUERY_ACTION).await?;
        match reply.status {
            404 => Ok(Vec::new()),
            200 => Ok(reply.body.unwrap_or_default()),
            status => Err(ClientError::unexpected_status(QUERY_ACTION, status, &[200])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use crate::transport::Method;
    use serde_json::json;

    fn client(mock: &std::sync::Arc<MockTransport>) -> HubClient {
        HubClient::with_transport(mock.clone())
    }

    #[test]
    fn test_selector_grammar() {
        assert_eq!(Selector::parse("42"), Selector::Id("42".to_string()));
        assert_eq!(Selector::parse("007"), Selector::Id("007".to_string()));
        assert!(matches!(Selector::parse("+42"), Selector::Domain(_)));
        assert!(matches!(Selector::parse("-1"), Selector::Domain(_)));
        assert!(matches!(Selector::parse("4.2"), Selector::Domain(_)));
        assert!(matches!(Selector::parse("my.app.com"), Selector::Domain(_)));
        assert!(matches!(Selector::parse(""), Selector::Domain(_)));
    }

    #[tokio::test]
    async fn test_numeric_selector_fetches_by_id() {
        let mock = MockTransport::new();
        mock.on_json(
            Method::Get,
            "hub/api/v1/instances/42",
            200,
            json!({"id": "42", "name": "app", "domain": "app.example.com"}),
        );

        let instance = client(&mock).instance_by("42").await.unwrap();

        assert_eq!(instance.id, "42");
        assert_eq!(mock.paths(Method::Get), vec!["hub/api/v1/instances/42"]);
    }

    #[tokio::test]
    async fn test_numeric_selector_404_is_not_found() {
        let mock = MockTransport::new();
        mock.on_text(Method::Get, "hub/api/v1/instances/42", 404, "not found");

        let err = client(&mock).instance_by("42").await.unwrap_err();

        assert!(err.is_not_found());
        assert!(!err.is_protocol());
        assert_eq!(mock.requests().len(), 1);
        assert!(mock.paths(Method::Get).iter().all(|p| !p.contains("domain=")));
    }

    #[tokio::test]
    async fn test_domain_without_matches_is_not_found() {
        let mock = MockTransport::new();
        mock.on_json(Method::Get, "hub/api/v1/instances?domain=my.app.com", 200, json!([]));

        let err = client(&mock).instance_by("my.app.com").await.unwrap_err();

        assert_eq!(err.to_string(), r#"No Stack Instance "my.app.com" found"#);
    }

    #[tokio::test]
    async fn test_domain_with_two_matches_is_ambiguous() {
        let mock = MockTransport::new();
        mock.on_json(
            Method::Get,
            "hub/api/v1/instances?domain=my.app.com",
            200,
            json!([
                {"id": "1", "domain": "my.app.com"},
                {"id": "2", "domain": "my.app.com"}
            ]),
        );

        let err = client(&mock).instance_by("my.app.com").await.unwrap_err();

        assert!(matches!(err, ClientError::Ambiguous { count: 2, .. }));
    }

    #[tokio::test]
    async fn test_unexpected_status_is_protocol_error() {
        let mock = MockTransport::new();
        mock.on_text(Method::Get, "hub/api/v1/instances/5", 500, "boom");

        let err = client(&mock).instance_by("5").await.unwrap_err();

        assert!(matches!(err, ClientError::UnexpectedStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_decode_error() {
        let mock = MockTransport::new();
        mock.on_json(Method::Get, "hub/api/v1/instances/5", 200, json!({"id": 5}));

        let err = client(&mock).instance_by("5").await.unwrap_err();

        assert!(err.is_decode());
    }

    #[tokio::test]
    async fn test_cache_is_keyed_by_literal_selector() {
        let mock = MockTransport::new();
        mock.on_json(
            Method::Get,
            "hub/api/v1/instances/42",
            200,
            json!({"id": "42", "domain": "app.example.com"}),
        );
        mock.on_json(
            Method::Get,
            "hub/api/v1/instances?domain=app.example.com",
            200,
            json!([{"id": "42", "domain": "app.example.com"}]),
        );
        let client = client(&mock);
        let mut cache = InstanceCache::new();

        client.resolve(&mut cache, "42").await.unwrap();
        client.resolve(&mut cache, "42").await.unwrap();
        client.resolve(&mut cache, "app.example.com").await.unwrap();

        assert_eq!(mock.requests().len(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let mock = MockTransport::new();
        mock.on_text(Method::Get, "hub/api/v1/instances/9", 404, "");
        let client = client(&mock);
        let mut cache = InstanceCache::new();

        assert!(client.resolve(&mut cache, "9").await.is_err());
        assert!(client.resolve(&mut cache, "9").await.is_err());

        assert!(cache.is_empty());
        assert_eq!(mock.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_selector_never_resolves() {
        let mock = MockTransport::new();
        mock.on_json(Method::Get, "hub/api/v1/instances", 200, json!([{"id": "1"}]));
        let client = client(&mock);
        let mut cache = InstanceCache::new();

        let err = client.resolve(&mut cache, "").await.unwrap_err();

        assert!(err.is_not_found());
        assert!(mock.requests().is_empty());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_instances_by_lists_all_matches() {
        let mock = MockTransport::new();
        mock.on_json(
            Method::Get,
            "hub/api/v1/instances",
            200,
            json!([{"id": "1"}, {"id": "2"}, {"id": "3"}]),
        );
        mock.on_text(Method::Get, "hub/api/v1/instances/8", 404, "");

        let client = client(&mock);

        assert_eq!(client.instances_by("").await.unwrap().len(), 3);
        assert!(client.instances_by("8").await.unwrap().is_empty());
    }
}

//! Secret DTOs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Secret as returned by the hub secrets endpoint
///
/// The plaintext lives in a field named after the secret kind, for example
/// `{"name": "db", "kind": "password", "password": "..."}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretPayload {
    pub name: String,
    pub kind: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, serde_json::Value>,
}

impl SecretPayload {
    /// Plaintext of the secret, if the payload carries one
    pub fn plaintext(&self) -> Option<&str> {
        if let Some(value) = self.values.get(&self.kind).and_then(|v| v.as_str()) {
            return Some(value);
        }
        let mut strings = self.values.values().filter_map(|v| v.as_str());
        match (strings.next(), strings.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }
}

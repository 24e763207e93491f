//! Inflight operation domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A tracked asynchronous remote job (deploy, undeploy, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InflightOperation {
    pub id: String,
    pub operation: String,
    /// Absent when the hub has not stamped the operation yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub initiator: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub logs: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platform_domain: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phases: Vec<LifecyclePhase>,
}

impl InflightOperation {
    /// Whether the hub is still working on this operation
    pub fn is_running(&self) -> bool {
        matches!(self.status.as_str(), "" | "pending" | "in-progress" | "running")
    }

    /// Whether the operation ended without error
    pub fn is_success(&self) -> bool {
        matches!(self.status.as_str(), "success" | "succeeded" | "completed")
    }
}

/// One step of an inflight operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecyclePhase {
    pub phase: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_without_timestamp_decodes() {
        let op: InflightOperation = serde_json::from_value(json!({
            "id": "op",
            "operation": "deploy",
            "status": "running"
        }))
        .unwrap();

        assert!(op.timestamp.is_none());
        assert!(op.is_running());
    }

    #[test]
    fn test_operation_timestamp_and_phases() {
        let op: InflightOperation = serde_json::from_value(json!({
            "id": "op",
            "operation": "undeploy",
            "status": "completed",
            "timestamp": "2020-01-01T10:00:00Z",
            "phases": [{"phase": "plan", "status": "success"}]
        }))
        .unwrap();

        assert_eq!(op.timestamp.unwrap().to_rfc3339(), "2020-01-01T10:00:00+00:00");
        assert_eq!(op.phases[0].phase, "plan");
        assert!(op.is_success());
    }
}

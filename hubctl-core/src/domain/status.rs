//! Instance status domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate deployment status of an instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceStatus {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<CommitStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k8s: Option<CommitStatus>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentStatus>,
}

/// Git commit a template or Kubernetes stack was deployed from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitStatus {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub commit: String,
    #[serde(rename = "ref", skip_serializing_if = "String::is_empty")]
    pub git_ref: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subject: String,
}

impl CommitStatus {
    /// Commit hash abbreviated to its first 7 characters
    pub fn short_commit(&self) -> &str {
        match self.commit.char_indices().nth(7) {
            Some((end, _)) => &self.commit[..end],
            None => &self.commit,
        }
    }
}

/// Status of a single deployed component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentStatus {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_commit_truncates_to_seven() {
        let status = CommitStatus {
            commit: "abcdef1234567890".to_string(),
            ..Default::default()
        };
        assert_eq!(status.short_commit(), "abcdef1");
    }

    #[test]
    fn test_short_commit_keeps_short_hashes() {
        let status = CommitStatus {
            commit: "abc".to_string(),
            ..Default::default()
        };
        assert_eq!(status.short_commit(), "abc");
    }
}

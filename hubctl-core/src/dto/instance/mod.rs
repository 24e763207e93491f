//! Stack instance DTOs

use serde::{Deserialize, Serialize};

use crate::domain::instance::{GitRemote, Output, Parameter, Provides};
use crate::domain::operation::InflightOperation;
use crate::domain::status::InstanceStatus;

/// Request to create a new stack instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackInstanceRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub environment: String,
    pub template: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub platform: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components_enabled: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

/// Partial or full update of a stack instance
///
/// Empty fields are omitted so that a merge patch only touches what the
/// caller set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StackInstancePatch {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components_enabled: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_remote: Option<GitRemote>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub state_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InstanceStatus>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inflight_operations: Vec<InflightOperation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<Output>,
    #[serde(skip_serializing_if = "Provides::is_empty")]
    pub provides: Provides,
}

/// Response to a deploy or undeploy command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeployResponse {
    pub job_id: String,
}

//! Stack instance domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::files::Files;
use super::operation::InflightOperation;
use super::status::InstanceStatus;
use super::value::{Value, ValueKind};

/// Capability name mapped to the components providing it
pub type Provides = BTreeMap<String, Vec<String>>;

/// A deployed realization of a stack template within an environment
///
/// Addressable either by its server-assigned `id` or by its globally unique
/// `domain`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StackInstance {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub description: String,
    pub tags: Vec<String>,
    pub environment: EnvironmentRef,
    pub stack: StackRef,
    pub template: TemplateRef,
    pub platform: Option<PlatformRef>,
    pub components_enabled: Vec<String>,
    pub verbs: Vec<String>,
    pub git_remote: GitRemote,
    pub parameters: Vec<Parameter>,
    pub outputs: Vec<Output>,
    pub provides: Provides,
    pub state_files: Vec<String>,
    pub status: InstanceStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inflight_operations: Vec<InflightOperation>,
}

impl StackInstance {
    /// State file locations grouped by storage kind
    pub fn state_file_targets(&self) -> Vec<Files> {
        Files::group(&self.state_files)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentRef {
    pub id: String,
    pub name: String,
    pub domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateRef {
    pub id: String,
    pub name: String,
}

/// Platform instance the stack instance is deployed onto
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformRef {
    pub id: String,
    pub name: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub state_files: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub provides: Provides,
}

/// Git remote of the instance
///
/// `public` is filled in by the hub on read and may not be written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitRemote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<GitRefPin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k8s: Option<GitRefPin>,
}

impl GitRemote {
    /// Template ref, when one is set
    pub fn template_ref(&self) -> Option<&str> {
        self.template.as_ref().and_then(GitRefPin::populated)
    }

    /// Kubernetes stack ref, when one is set
    pub fn k8s_ref(&self) -> Option<&str> {
        self.k8s.as_ref().and_then(GitRefPin::populated)
    }

    /// Whether any writable sub-field carries a value
    pub fn has_refs(&self) -> bool {
        self.template_ref().is_some() || self.k8s_ref().is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitRefPin {
    #[serde(rename = "ref")]
    pub git_ref: String,
}

impl GitRefPin {
    fn populated(&self) -> Option<&str> {
        Some(self.git_ref.as_str()).filter(|r| !r.is_empty())
    }
}

/// Named, typed input of an instance or one of its components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ValueKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub from: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub component: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub origin: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub messenger: String,
}

/// Named, typed result published by a deployed component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ValueKind>,
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub brief: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub messenger: String,
}

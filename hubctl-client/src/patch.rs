//! Patch construction
//!
//! A patch is either a merge (only the fields present are changed) or a
//! replace (`?replace=1`, the fields present overwrite whole collections).
//!
//! Instances read from the hub carry `gitRemote.public`, which the hub fills
//! in itself and refuses to accept on write. Patches built from a previous
//! read would echo it back, so every patch is scrubbed on construction:
//! `public` is removed, and a `gitRemote` left without a template or k8s ref
//! is dropped altogether.

use hubctl_core::dto::instance::StackInstancePatch;
use serde_json::{Map, Value};

use crate::error::{ClientError, Result};
use crate::paths;

/// How the hub applies a patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatchMode {
    #[default]
    Merge,
    Replace,
}

#[derive(Debug, Clone)]
enum PatchBody {
    Typed(StackInstancePatch),
    Raw(Map<String, Value>),
}

/// A scrubbed patch ready for submission
#[derive(Debug, Clone)]
pub struct InstancePatch {
    body: PatchBody,
    mode: PatchMode,
}

impl InstancePatch {
    /// Merge-style partial update
    pub fn merge(change: StackInstancePatch) -> Self {
        Self::typed(change, PatchMode::Merge)
    }

    /// Full-replace update
    pub fn replace(change: StackInstancePatch) -> Self {
        Self::typed(change, PatchMode::Replace)
    }

    /// Patch with an explicit mode
    pub fn typed(mut change: StackInstancePatch, mode: PatchMode) -> Self {
        scrub_git_remote(&mut change);
        Self {
            body: PatchBody::Typed(change),
            mode,
        }
    }

    /// Patch from a caller-supplied JSON document
    ///
    /// # Errors
    /// `InvalidPayload` if the body is not a JSON object.
    pub fn raw(body: &[u8], mode: PatchMode) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ClientError::InvalidPayload(format!("patch is not valid JSON: {}", e)))?;
        let Value::Object(mut object) = value else {
            return Err(ClientError::InvalidPayload(
                "patch must be a JSON object".to_string(),
            ));
        };
        scrub_raw_git_remote(&mut object);
        Ok(Self {
            body: PatchBody::Raw(object),
            mode,
        })
    }

    pub fn mode(&self) -> PatchMode {
        self.mode
    }

    /// Request path for the instance with the given id
    pub fn path(&self, id: &str) -> String {
        paths::patch(id, self.mode == PatchMode::Replace)
    }

    /// Typed change, when the patch was built from one
    pub fn change(&self) -> Option<&StackInstancePatch> {
        match &self.body {
            PatchBody::Typed(change) => Some(change),
            PatchBody::Raw(_) => None,
        }
    }

    /// Serialized request body
    pub fn payload(&self) -> Result<Vec<u8>> {
        let encoded = match &self.body {
            PatchBody::Typed(change) => serde_json::to_vec(change),
            PatchBody::Raw(object) => serde_json::to_vec(object),
        };
        encoded.map_err(|e| ClientError::InvalidPayload(format!("unable to encode patch: {}", e)))
    }
}

/// Strip the read-only parts of `gitRemote` from a typed patch
pub fn scrub_git_remote(change: &mut StackInstancePatch) {
    if let Some(remote) = change.git_remote.as_mut() {
        remote.public = None;
        if !remote.has_refs() {
            change.git_remote = None;
        }
    }
}

fn scrub_raw_git_remote(object: &mut Map<String, Value>) {
    let keep = match object.get_mut("gitRemote") {
        None => return,
        Some(Value::Object(remote)) => {
            remote.remove("public");
            has_raw_ref(remote, "template") || has_raw_ref(remote, "k8s")
        }
        Some(_) => false,
    };
    if !keep {
        object.remove("gitRemote");
    }
}

fn has_raw_ref(remote: &Map<String, Value>, key: &str) -> bool {
    remote
        .get(key)
        .and_then(|pin| pin.get("ref"))
        .and_then(Value::as_str)
        .is_some_and(|r| !r.is_empty())
}

//! State file descriptors
//!
//! Groups state file locations by the storage that holds them. The
//! descriptors are handed to whatever persists or fetches the files; this
//! crate only classifies them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage backing a group of files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageKind {
    #[serde(rename = "fs")]
    Filesystem,
    #[serde(rename = "object-store")]
    ObjectStore,
}

impl StorageKind {
    /// Classify a location by its scheme
    pub fn of(path: &str) -> Self {
        if path.starts_with("s3://") {
            StorageKind::ObjectStore
        } else {
            StorageKind::Filesystem
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Filesystem => f.write_str("fs"),
            StorageKind::ObjectStore => f.write_str("object-store"),
        }
    }
}

/// A storage kind paired with the paths it holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Files {
    pub kind: StorageKind,
    pub paths: Vec<String>,
}

impl Files {
    /// Group paths by storage kind, keeping first-seen order
    pub fn group(paths: &[String]) -> Vec<Files> {
        let mut groups: Vec<Files> = Vec::new();
        for path in paths {
            let kind = StorageKind::of(path);
            match groups.iter_mut().find(|group| group.kind == kind) {
                Some(group) => group.paths.push(path.clone()),
                None => groups.push(Files {
                    kind,
                    paths: vec![path.clone()],
                }),
            }
        }
        groups
    }
}

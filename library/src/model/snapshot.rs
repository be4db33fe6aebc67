//! Whole-diagram serialized form, written and read in one piece.

use serde::{Deserialize, Serialize};

use super::link::LinkRecord;
use super::node::NodeRecord;
use crate::error::LibraryError;

pub const SNAPSHOT_VERSION: u32 = 1;

fn legacy_version() -> u32 {
    1
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersistedSnapshot {
    /// Blobs written before versioning existed carry no tag and load as version 1.
    #[serde(default = "legacy_version")]
    pub version: u32,
    #[serde(rename = "nodeDataArray")]
    pub nodes: Vec<NodeRecord>,
    #[serde(rename = "linkDataArray")]
    pub links: Vec<LinkRecord>,
}

impl PersistedSnapshot {
    pub fn new(nodes: Vec<NodeRecord>, links: Vec<LinkRecord>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            nodes,
            links,
        }
    }

    pub fn from_json(json_str: &str) -> Result<Self, LibraryError> {
        let snapshot: PersistedSnapshot = serde_json::from_str(json_str)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(LibraryError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String, LibraryError> {
        Ok(serde_json::to_string(self)?)
    }
}

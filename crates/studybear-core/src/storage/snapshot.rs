//! Flat JSON snapshot of every tracked member.
//!
//! The whole registry is written on every tick; last writer wins. Reading
//! never fails startup: a missing, unreadable or malformed file is logged
//! and treated as an empty registry.

use std::path::{Path, PathBuf};

use crate::error::SnapshotError;
use crate::registry::TrackedMember;

/// Default file name inside the data directory.
pub const SNAPSHOT_FILE_NAME: &str = "data.json";

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot, reporting why it could not be used.
    ///
    /// A missing file is not an error and yields an empty list.
    pub fn try_load(&self) -> Result<Vec<TrackedMember>, SnapshotError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(SnapshotError::ReadFailed {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&content).map_err(|source| SnapshotError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Read the snapshot, falling back to an empty list on any failure.
    pub fn load(&self) -> Vec<TrackedMember> {
        match self.try_load() {
            Ok(members) => {
                tracing::info!(path = %self.path.display(), members = members.len(), "snapshot loaded");
                members
            }
            Err(e) => {
                tracing::error!(error = %e, "could not load snapshot; starting empty");
                Vec::new()
            }
        }
    }

    /// Write the full member list.
    pub fn save(&self, members: &[TrackedMember]) -> Result<(), SnapshotError> {
        let json = serde_json::to_string(members).map_err(SnapshotError::Encode)?;
        std::fs::write(&self.path, json).map_err(|source| SnapshotError::WriteFailed {
            path: self.path.clone(),
            source,
        })
    }
}

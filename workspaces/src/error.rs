//! Error types for the workspaces library

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that fail a whole snapshot operation
///
/// Per-item faults during capture and restore never surface here; they are
/// collected as skips/issues on the operation's result instead.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid workspace name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("path {} has no common root with {}", path.display(), root.display())]
    UnrelatedPath { path: PathBuf, root: PathBuf },

    #[error("workspace not found: {0}")]
    NotFound(String),
}

impl SnapshotError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = SnapshotError> = std::result::Result<T, E>;

//! Workspace snapshots
//!
//! Captures the open-document layout of an editor into a named snapshot,
//! stores it under the project, and replays it later.

pub mod capture;
pub mod commands;
pub mod contents;
pub mod models;
pub mod paths;
pub mod restore;
pub mod store;
pub mod view;

// Re-export key types
pub use capture::{CaptureEngine, CaptureReport, CaptureSkip};
pub use models::{DocumentEntry, Settings, Snapshot, ToolWindowState, WindowState};
pub use paths::PathResolver;
pub use restore::{RestoreEngine, RestoreResult};
pub use store::SnapshotStore;
pub use view::{EditorView, HostError};

//! Host editor capability contract
//!
//! The snapshot engines never touch the editor directly. The host wraps its
//! window and document objects behind [`EditorView`], handing out stable
//! opaque ids. Every call is fallible; callers treat failures as per-item
//! faults.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::models::{Cursor, Geometry, ToolWindowState, WindowState};

/// Stable host-assigned window identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

/// Stable host-assigned document identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "document#{}", self.0)
    }
}

/// Errors reported by the host for a single call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host object is gone or not accessible right now
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// The host does not implement this capability
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("{0}")]
    Failed(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Layout state of a window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowLayout {
    pub geometry: Geometry,
    pub state: WindowState,
    pub floating: bool,
    pub visible: bool,
    pub kind: Option<String>,
}

/// What the host hands back after opening a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenedDocument {
    pub document: DocumentId,
    /// Window showing the document, if the host created one
    pub window: Option<WindowId>,
}

/// Live editor state the engines observe and mutate
///
/// All calls happen on the host's UI thread, one at a time.
pub trait EditorView {
    /// Open document windows in the host's enumeration order
    fn windows(&self) -> HostResult<Vec<WindowId>>;

    /// Open documents in the host's enumeration order
    fn documents(&self) -> HostResult<Vec<DocumentId>>;

    /// Backing file of a document; `None` for unsaved buffers
    fn document_path(&self, document: DocumentId) -> HostResult<Option<PathBuf>>;

    /// Window currently showing a document, if any
    fn document_window(&self, document: DocumentId) -> HostResult<Option<WindowId>>;

    /// Caret position; `None` when the document has no text selection
    fn cursor(&self, document: DocumentId) -> HostResult<Option<Cursor>>;

    /// Move the caret; the host clamps out-of-range positions
    fn move_cursor(&mut self, document: DocumentId, cursor: Cursor) -> HostResult<()>;

    fn window_layout(&self, window: WindowId) -> HostResult<WindowLayout>;

    fn set_window_state(&mut self, window: WindowId, state: WindowState) -> HostResult<()>;

    fn set_geometry(&mut self, window: WindowId, geometry: Geometry) -> HostResult<()>;

    fn set_visible(&mut self, _window: WindowId, _visible: bool) -> HostResult<()> {
        Ok(())
    }

    /// The single globally active window
    fn active_window(&self) -> HostResult<Option<WindowId>>;

    fn open_file(&mut self, path: &Path) -> HostResult<OpenedDocument>;

    /// Close a document, discarding unsaved changes
    fn close_document(&mut self, document: DocumentId) -> HostResult<()>;

    /// Place the most recently opened window into a new split next to `anchor`
    fn split_adjacent(&mut self, _anchor: WindowId) -> HostResult<()> {
        Err(HostError::Unsupported("split placement".to_string()))
    }

    fn focus(&mut self, window: WindowId) -> HostResult<()>;

    /// Auxiliary panels (explorers, output panes)
    fn tool_windows(&self) -> HostResult<Vec<ToolWindowState>> {
        Ok(Vec::new())
    }

    /// Full text of a document, if it is a text document
    fn document_text(&self, _document: DocumentId) -> HostResult<Option<String>> {
        Ok(None)
    }
}

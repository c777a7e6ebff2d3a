//! Test utilities for engine tests
//!
//! This module is only compiled in test builds. [`FakeEditor`] is an
//! in-memory [`EditorView`] that records every mutating host call so tests
//! can assert on ordering, and can be told to fail specific calls.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::snapshot::models::{Cursor, Geometry, ToolWindowState, WindowState};
use crate::snapshot::view::{
    DocumentId, EditorView, HostError, HostResult, OpenedDocument, WindowId, WindowLayout,
};

/// Geometry the fake gives freshly opened windows
pub const OPENED_GEOMETRY: Geometry = Geometry {
    left: 0,
    top: 0,
    width: 1024,
    height: 768,
};

/// A mutating call observed by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Close(PathBuf),
    Open(PathBuf),
    MoveCursor(PathBuf, Cursor),
    SetState(WindowId, WindowState),
    SetGeometry(WindowId, Geometry),
    Split { anchor: WindowId, window: WindowId },
    Focus(WindowId),
}

#[derive(Debug, Clone)]
struct FakeDocument {
    id: DocumentId,
    path: Option<PathBuf>,
    window: Option<WindowId>,
    cursor: Option<Cursor>,
    text: Option<String>,
}

#[derive(Debug, Clone)]
struct FakeWindow {
    id: WindowId,
    layout: WindowLayout,
    split_from: Option<WindowId>,
}

/// In-memory editor host
#[derive(Debug, Default)]
pub struct FakeEditor {
    next_id: u64,
    documents: Vec<FakeDocument>,
    windows: Vec<FakeWindow>,
    active: Option<WindowId>,
    last_opened: Option<WindowId>,
    tool_windows: Vec<ToolWindowState>,
    pub calls: Vec<Call>,
    /// Paths whose document properties throw on read
    pub unreadable: HashSet<PathBuf>,
    /// Paths whose close call fails
    pub close_fails: HashSet<PathBuf>,
    /// Paths whose open call fails
    pub open_fails: HashSet<PathBuf>,
    pub split_supported: bool,
    pub geometry_fails: bool,
    pub focus_fails: bool,
    pub enumerate_windows_fails: bool,
}

impl FakeEditor {
    pub fn new() -> Self {
        Self {
            split_supported: true,
            ..Self::default()
        }
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Add a window with the given layout
    pub fn add_window(&mut self, layout: WindowLayout) -> WindowId {
        let id = WindowId(self.next());
        self.windows.push(FakeWindow {
            id,
            layout,
            split_from: None,
        });
        id
    }

    /// Add a document shown in `window`
    pub fn add_document(
        &mut self,
        path: Option<&Path>,
        window: Option<WindowId>,
        text: &str,
    ) -> DocumentId {
        let id = DocumentId(self.next());
        self.documents.push(FakeDocument {
            id,
            path: path.map(Path::to_path_buf),
            window,
            cursor: None,
            text: Some(text.to_string()),
        });
        id
    }

    /// Add a document in its own normal docked window
    pub fn open_with_window(&mut self, path: &Path, text: &str) -> (DocumentId, WindowId) {
        let window = self.add_window(WindowLayout {
            geometry: OPENED_GEOMETRY,
            visible: true,
            ..WindowLayout::default()
        });
        let doc = self.add_document(Some(path), Some(window), text);
        (doc, window)
    }

    pub fn set_active(&mut self, window: WindowId) {
        self.active = Some(window);
    }

    pub fn set_cursor(&mut self, document: DocumentId, cursor: Cursor) {
        if let Some(doc) = self.documents.iter_mut().find(|d| d.id == document) {
            doc.cursor = Some(cursor);
        }
    }

    pub fn add_tool_window(&mut self, kind: &str, caption: &str, visible: bool) {
        self.tool_windows.push(ToolWindowState {
            kind: kind.to_string(),
            caption: caption.to_string(),
            is_visible: visible,
        });
    }

    /// Paths of open documents, in open order
    pub fn open_paths(&self) -> Vec<PathBuf> {
        self.documents.iter().filter_map(|d| d.path.clone()).collect()
    }

    pub fn window_of(&self, path: &Path) -> Option<WindowId> {
        self.documents
            .iter()
            .find(|d| d.path.as_deref() == Some(path))
            .and_then(|d| d.window)
    }

    pub fn cursor_of(&self, path: &Path) -> Option<Cursor> {
        self.documents
            .iter()
            .find(|d| d.path.as_deref() == Some(path))
            .and_then(|d| d.cursor)
    }

    pub fn layout(&self, window: WindowId) -> Option<&WindowLayout> {
        self.windows
            .iter()
            .find(|w| w.id == window)
            .map(|w| &w.layout)
    }

    /// Anchor a window was split from, if any
    pub fn split_from(&self, window: WindowId) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|w| w.id == window)
            .and_then(|w| w.split_from)
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.active
    }

    /// Paths opened, in call order
    pub fn opened(&self) -> Vec<PathBuf> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Open(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    fn doc(&self, document: DocumentId) -> HostResult<&FakeDocument> {
        let doc = self
            .documents
            .iter()
            .find(|d| d.id == document)
            .ok_or_else(|| HostError::Unavailable(document.to_string()))?;
        if let Some(path) = &doc.path {
            if self.unreadable.contains(path) {
                return Err(HostError::Failed(format!("{} threw", path.display())));
            }
        }
        Ok(doc)
    }

    fn window_mut(&mut self, window: WindowId) -> HostResult<&mut FakeWindow> {
        self.windows
            .iter_mut()
            .find(|w| w.id == window)
            .ok_or_else(|| HostError::Unavailable(window.to_string()))
    }
}

impl EditorView for FakeEditor {
    fn windows(&self) -> HostResult<Vec<WindowId>> {
        if self.enumerate_windows_fails {
            return Err(HostError::Unavailable("window list".to_string()));
        }
        Ok(self.windows.iter().map(|w| w.id).collect())
    }

    fn documents(&self) -> HostResult<Vec<DocumentId>> {
        Ok(self.documents.iter().map(|d| d.id).collect())
    }

    fn document_path(&self, document: DocumentId) -> HostResult<Option<PathBuf>> {
        Ok(self.doc(document)?.path.clone())
    }

    fn document_window(&self, document: DocumentId) -> HostResult<Option<WindowId>> {
        Ok(self.doc(document)?.window)
    }

    fn cursor(&self, document: DocumentId) -> HostResult<Option<Cursor>> {
        Ok(self.doc(document)?.cursor)
    }

    fn move_cursor(&mut self, document: DocumentId, cursor: Cursor) -> HostResult<()> {
        let doc = self
            .documents
            .iter_mut()
            .find(|d| d.id == document)
            .ok_or_else(|| HostError::Unavailable(document.to_string()))?;

        // Clamp like a real editor would
        let text = doc.text.clone().unwrap_or_default();
        let lines: Vec<&str> = text.lines().collect();
        let line = cursor.line.clamp(1, lines.len().max(1) as u32);
        let line_len = lines
            .get(line as usize - 1)
            .map_or(0, |l| l.chars().count()) as u32;
        let column = cursor.column.clamp(1, line_len + 1);
        let clamped = Cursor { line, column };

        doc.cursor = Some(clamped);
        let path = doc.path.clone().unwrap_or_default();
        self.calls.push(Call::MoveCursor(path, clamped));
        Ok(())
    }

    fn window_layout(&self, window: WindowId) -> HostResult<WindowLayout> {
        self.windows
            .iter()
            .find(|w| w.id == window)
            .map(|w| w.layout.clone())
            .ok_or_else(|| HostError::Unavailable(window.to_string()))
    }

    fn set_window_state(&mut self, window: WindowId, state: WindowState) -> HostResult<()> {
        self.window_mut(window)?.layout.state = state;
        self.calls.push(Call::SetState(window, state));
        Ok(())
    }

    fn set_geometry(&mut self, window: WindowId, geometry: Geometry) -> HostResult<()> {
        if self.geometry_fails {
            return Err(HostError::Failed("window is transitioning".to_string()));
        }
        self.window_mut(window)?.layout.geometry = geometry;
        self.calls.push(Call::SetGeometry(window, geometry));
        Ok(())
    }

    fn set_visible(&mut self, window: WindowId, visible: bool) -> HostResult<()> {
        self.window_mut(window)?.layout.visible = visible;
        Ok(())
    }

    fn active_window(&self) -> HostResult<Option<WindowId>> {
        Ok(self.active)
    }

    fn open_file(&mut self, path: &Path) -> HostResult<OpenedDocument> {
        if self.open_fails.contains(path) {
            return Err(HostError::Failed(format!("cannot open {}", path.display())));
        }
        let text = std::fs::read_to_string(path).unwrap_or_default();
        let (document, window) = self.open_with_window(path, &text);
        self.last_opened = Some(window);
        self.calls.push(Call::Open(path.to_path_buf()));
        Ok(OpenedDocument {
            document,
            window: Some(window),
        })
    }

    fn close_document(&mut self, document: DocumentId) -> HostResult<()> {
        let index = self
            .documents
            .iter()
            .position(|d| d.id == document)
            .ok_or_else(|| HostError::Unavailable(document.to_string()))?;
        let path = self.documents[index].path.clone().unwrap_or_default();
        if self.close_fails.contains(&path) {
            return Err(HostError::Failed(format!("cannot close {}", path.display())));
        }

        let removed = self.documents.remove(index);
        if let Some(window) = removed.window {
            self.windows.retain(|w| w.id != window);
            if self.active == Some(window) {
                self.active = None;
            }
        }
        self.calls.push(Call::Close(path));
        Ok(())
    }

    fn split_adjacent(&mut self, anchor: WindowId) -> HostResult<()> {
        if !self.split_supported {
            return Err(HostError::Unsupported("split placement".to_string()));
        }
        let window = self
            .last_opened
            .ok_or_else(|| HostError::Failed("nothing opened yet".to_string()))?;
        self.window_mut(window)?.split_from = Some(anchor);
        self.calls.push(Call::Split { anchor, window });
        Ok(())
    }

    fn focus(&mut self, window: WindowId) -> HostResult<()> {
        if self.focus_fails {
            return Err(HostError::Failed("focus refused".to_string()));
        }
        self.window_mut(window)?;
        self.active = Some(window);
        self.calls.push(Call::Focus(window));
        Ok(())
    }

    fn tool_windows(&self) -> HostResult<Vec<ToolWindowState>> {
        Ok(self.tool_windows.clone())
    }

    fn document_text(&self, document: DocumentId) -> HostResult<Option<String>> {
        Ok(self.doc(document)?.text.clone())
    }
}

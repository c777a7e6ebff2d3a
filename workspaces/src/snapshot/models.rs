//! Workspace snapshot models
//!
//! Field names serialize in camelCase; they are the on-disk compatibility
//! contract for saved workspaces.

use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::paths::{names_entry, normalize};
use crate::error::{Result, SnapshotError};

/// Tab group id for documents that had no window at capture time
pub const UNGROUPED: i32 = -1;

/// Longest accepted workspace name, in characters
pub const MAX_NAME_LEN: usize = 128;

/// Window display state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

/// On-screen window rectangle in device units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    /// A zero-sized rectangle means nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// 1-based caret position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub line: u32,
    pub column: u32,
}

/// One open document in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    /// Path relative to the project root, `/`-separated
    pub relative_path: String,
    /// Caret line (1-based; 0 = not captured)
    #[serde(default)]
    pub line: u32,
    /// Caret column (1-based; 0 = not captured)
    #[serde(default)]
    pub column: u32,
    #[serde(default)]
    pub is_active: bool,
    /// Zero-based position among documents at capture time
    #[serde(default)]
    pub order: u32,
    /// Cluster of documents shown together; -1 = ungrouped
    #[serde(default = "ungrouped")]
    pub tab_group: i32,
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(default)]
    pub window_state: WindowState,
    #[serde(default)]
    pub is_floating: bool,
    /// Host-specific window kind tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_kind: Option<String>,
}

fn ungrouped() -> i32 {
    UNGROUPED
}

impl DocumentEntry {
    /// Entry with no cursor, window or group information
    pub fn new(relative_path: impl Into<String>, order: u32) -> Self {
        Self {
            relative_path: relative_path.into(),
            line: 0,
            column: 0,
            is_active: false,
            order,
            tab_group: UNGROUPED,
            geometry: Geometry::default(),
            window_state: WindowState::Normal,
            is_floating: false,
            window_kind: None,
        }
    }

    /// Recorded caret position, if one was captured
    pub fn cursor(&self) -> Option<Cursor> {
        if self.line == 0 {
            return None;
        }
        Some(Cursor {
            line: self.line,
            column: self.column.max(1),
        })
    }

    pub fn is_grouped(&self) -> bool {
        self.tab_group >= 0
    }
}

/// Auxiliary panel state; informational only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolWindowState {
    pub kind: String,
    pub caption: String,
    #[serde(default)]
    pub is_visible: bool,
}

/// Named record of an editing session's layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub name: String,
    /// Documents in capture order
    #[serde(default)]
    pub documents: Vec<DocumentEntry>,
    #[serde(default)]
    pub tool_windows: Vec<ToolWindowState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Vec::new(),
            tool_windows: Vec::new(),
            captured_at: None,
        }
    }

    /// The document that had focus at capture time
    pub fn active_document(&self) -> Option<&DocumentEntry> {
        self.documents.iter().find(|d| d.is_active)
    }

    /// Check the structural invariants of a snapshot
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;

        let mut seen = HashSet::new();
        let mut active = 0usize;

        for doc in &self.documents {
            let rel = doc.relative_path.as_str();
            if rel.trim().is_empty() {
                return Err(SnapshotError::InvalidSnapshot(format!(
                    "document at order {} has an empty path",
                    doc.order
                )));
            }
            if is_absolute_like(rel) {
                return Err(SnapshotError::InvalidSnapshot(format!(
                    "document path {:?} is absolute",
                    rel
                )));
            }
            if !names_entry(rel) {
                return Err(SnapshotError::InvalidSnapshot(format!(
                    "document path {:?} is the project root or above it",
                    rel
                )));
            }
            if !seen.insert(normalize(Path::new(&rel.replace('\\', "/")))) {
                return Err(SnapshotError::InvalidSnapshot(format!(
                    "document path {:?} appears more than once",
                    rel
                )));
            }
            if doc.tab_group < UNGROUPED {
                return Err(SnapshotError::InvalidSnapshot(format!(
                    "document {:?} has tab group {}",
                    rel, doc.tab_group
                )));
            }
            if doc.is_active {
                active += 1;
            }
        }

        if active > 1 {
            return Err(SnapshotError::InvalidSnapshot(format!(
                "{} documents are marked active",
                active
            )));
        }

        Ok(())
    }
}

/// Absolute on any platform: leading separator or a drive letter
fn is_absolute_like(path: &str) -> bool {
    if path.starts_with(['/', '\\']) || Path::new(path).is_absolute() {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Check that a workspace name is usable as a file key
pub fn validate_name(name: &str) -> Result<()> {
    static NAME_PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = NAME_PATTERN
        .get_or_init(|| Regex::new(r#"^[^/\\:*?"<>|\x00-\x1f\x7f]+$"#).unwrap());

    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name.chars().count() > MAX_NAME_LEN {
        Some("name is too long")
    } else if name.starts_with('.') {
        Some("name starts with a dot")
    } else if !pattern.is_match(name) {
        Some("name contains a path separator, reserved or control character")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SnapshotError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// User preferences for the load flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_show_load_prompt")]
    pub show_load_prompt: bool,
}

fn default_show_load_prompt() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_load_prompt: true,
        }
    }
}

impl Settings {
    /// Apply the answer from the load confirmation prompt
    ///
    /// Returns true when the settings changed and need saving.
    pub fn record_prompt_answer(&mut self, dont_ask_again: bool) -> bool {
        if dont_ask_again && self.show_load_prompt {
            self.show_load_prompt = false;
            return true;
        }
        false
    }
}

//! Replays a snapshot onto a live editor
//!
//! Restore closes the current session, reopens documents group by group in
//! their captured order, reapplies caret and window layout, then focuses the
//! previously active document. Only a structurally invalid snapshot fails
//! the operation; everything else is reported on [`RestoreResult`].

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::{DocumentEntry, Settings, Snapshot, WindowState};
use super::paths::PathResolver;
use super::view::{EditorView, HostError, HostResult, OpenedDocument, WindowId};
use crate::error::Result;

/// Whether the caller must confirm with the user before calling
/// [`RestoreEngine::apply`]
pub fn needs_confirmation(settings: &Settings) -> bool {
    settings.show_load_prompt
}

/// Restore progress; phases only move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePhase {
    Idle,
    Closing,
    Opening { group: usize },
    Focusing,
    Done,
}

impl fmt::Display for RestorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Closing => write!(f, "closing"),
            Self::Opening { group } => write!(f, "opening group {}", group),
            Self::Focusing => write!(f, "focusing"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Host step that failed without stopping the restore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreStep {
    Close,
    Place,
    Cursor,
    Geometry,
    Focus,
}

/// A swallowed per-item failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreIssue {
    /// Relative path of the entry involved, when there is one
    pub path: Option<String>,
    pub step: RestoreStep,
    pub error: HostError,
}

/// Why an entry was not opened
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("file no longer exists: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("path is not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("host failed to open file: {0}")]
    OpenFailed(HostError),
}

/// An entry that was not opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub relative_path: String,
    pub reason: SkipReason,
}

/// Outcome of a restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreResult {
    /// Relative paths opened, in open order
    pub opened: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
    pub issues: Vec<RestoreIssue>,
    /// Documents closed before reopening
    pub closed: usize,
    /// Relative path of the document focused at the end
    pub focused: Option<String>,
    /// Phases entered, in order
    pub phases: Vec<RestorePhase>,
}

impl RestoreResult {
    fn new() -> Self {
        Self {
            opened: Vec::new(),
            skipped: Vec::new(),
            issues: Vec::new(),
            closed: 0,
            focused: None,
            phases: vec![RestorePhase::Idle],
        }
    }

    pub fn phase(&self) -> RestorePhase {
        self.phases.last().copied().unwrap_or(RestorePhase::Idle)
    }

    /// Everything opened and every host step succeeded
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.issues.is_empty()
    }

    fn enter(&mut self, phase: RestorePhase) {
        debug!("Restore phase: {} -> {}", self.phase(), phase);
        self.phases.push(phase);
    }

    fn issue(&mut self, path: Option<&str>, step: RestoreStep, error: HostError) {
        match &error {
            HostError::Unsupported(_) => {
                debug!("Restore step {:?} unsupported for {:?}: {}", step, path, error)
            }
            _ => warn!("Restore step {:?} failed for {:?}: {}", step, path, error),
        }
        self.issues.push(RestoreIssue {
            path: path.map(str::to_string),
            step,
            error,
        });
    }
}

/// Order documents for reopening
///
/// Documents are partitioned by tab group (ungrouped entries each form their
/// own partition), partitions are ordered by their smallest `order`, and
/// documents inside a partition by `order`.
pub fn plan_groups(documents: &[DocumentEntry]) -> Vec<Vec<&DocumentEntry>> {
    let mut grouped: HashMap<i32, Vec<&DocumentEntry>> = HashMap::new();
    let mut groups: Vec<Vec<&DocumentEntry>> = Vec::new();

    for doc in documents {
        if doc.is_grouped() {
            grouped.entry(doc.tab_group).or_default().push(doc);
        } else {
            groups.push(vec![doc]);
        }
    }
    groups.extend(grouped.into_values());

    for group in &mut groups {
        group.sort_by_key(|d| d.order);
    }
    groups.sort_by_key(|g| (g[0].order, g[0].tab_group));
    groups
}

/// Applies snapshots to a live editor
#[derive(Debug, Clone)]
pub struct RestoreEngine {
    resolver: PathResolver,
}

impl RestoreEngine {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            resolver: PathResolver::new(project_root),
        }
    }

    /// Replace the editor's open documents with the snapshot's layout
    ///
    /// Performs no confirmation; see [`needs_confirmation`].
    pub fn apply(&self, snapshot: &Snapshot, view: &mut dyn EditorView) -> Result<RestoreResult> {
        snapshot.validate()?;

        let mut result = RestoreResult::new();

        result.enter(RestorePhase::Closing);
        close_all(view, &mut result);

        let mut focus_target: Option<(WindowId, String)> = None;
        for (index, group) in plan_groups(&snapshot.documents).into_iter().enumerate() {
            result.enter(RestorePhase::Opening { group: index });

            let mut anchor: Option<WindowId> = None;
            for entry in group {
                if let Some(window) = self.restore_entry(view, entry, &mut anchor, &mut result) {
                    if entry.is_active {
                        focus_target = Some((window, entry.relative_path.clone()));
                    }
                }
            }
        }

        result.enter(RestorePhase::Focusing);
        if let Some((window, path)) = focus_target {
            match view.focus(window) {
                Ok(()) => result.focused = Some(path),
                Err(e) => result.issue(Some(&path), RestoreStep::Focus, e),
            }
        }

        result.enter(RestorePhase::Done);
        info!(
            "Restored workspace '{}': {} opened, {} skipped, {} issues",
            snapshot.name,
            result.opened.len(),
            result.skipped.len(),
            result.issues.len()
        );

        Ok(result)
    }

    /// Open one entry and reapply its state
    ///
    /// Returns the entry's window when it was opened into one.
    fn restore_entry(
        &self,
        view: &mut dyn EditorView,
        entry: &DocumentEntry,
        anchor: &mut Option<WindowId>,
        result: &mut RestoreResult,
    ) -> Option<WindowId> {
        let rel = entry.relative_path.as_str();

        let absolute = self.resolver.to_absolute(rel);
        if !absolute.is_file() {
            debug!("Skipping {}: not an existing file", absolute.display());
            let reason = if absolute.exists() {
                SkipReason::NotAFile(absolute)
            } else {
                SkipReason::MissingFile(absolute)
            };
            result.skipped.push(SkippedEntry {
                relative_path: rel.to_string(),
                reason,
            });
            return None;
        }

        let OpenedDocument { document, window } = match view.open_file(&absolute) {
            Ok(opened) => opened,
            Err(e) => {
                warn!("Error loading document {}: {}", absolute.display(), e);
                result.skipped.push(SkippedEntry {
                    relative_path: rel.to_string(),
                    reason: SkipReason::OpenFailed(e),
                });
                return None;
            }
        };
        result.opened.push(rel.to_string());

        if let Some(window) = window {
            match *anchor {
                None => *anchor = Some(window),
                Some(first) => {
                    if let Err(e) = place_beside(view, first, window) {
                        result.issue(Some(rel), RestoreStep::Place, e);
                    }
                }
            }
        }

        if let Some(cursor) = entry.cursor() {
            if let Err(e) = view.move_cursor(document, cursor) {
                result.issue(Some(rel), RestoreStep::Cursor, e);
            }
        }

        if let Some(window) = window {
            if let Err(e) = apply_layout(view, window, entry) {
                result.issue(Some(rel), RestoreStep::Geometry, e);
            }
        }

        window
    }
}

/// Close every open document without saving
fn close_all(view: &mut dyn EditorView, result: &mut RestoreResult) {
    let documents = match view.documents() {
        Ok(documents) => documents,
        Err(e) => {
            result.issue(None, RestoreStep::Close, e);
            return;
        }
    };

    for document in documents {
        match view.close_document(document) {
            Ok(()) => result.closed += 1,
            Err(e) => {
                let path = view
                    .document_path(document)
                    .ok()
                    .flatten()
                    .map(|p| p.display().to_string());
                result.issue(path.as_deref(), RestoreStep::Close, e);
            }
        }
    }
}

/// Put the most recently opened window into a split next to `anchor`
fn place_beside(view: &mut dyn EditorView, anchor: WindowId, window: WindowId) -> HostResult<()> {
    view.set_visible(window, true)?;
    view.set_visible(anchor, true)?;
    view.split_adjacent(anchor)
}

/// Reapply window state and, unless maximized and docked, geometry
fn apply_layout(view: &mut dyn EditorView, window: WindowId, entry: &DocumentEntry) -> HostResult<()> {
    view.set_window_state(window, entry.window_state)?;

    if entry.geometry.is_empty() {
        return Ok(());
    }
    if entry.is_floating || entry.window_state != WindowState::Maximized {
        view.set_geometry(window, entry.geometry)?;
    }
    Ok(())
}

//! Capture routines for building snapshots from live editor state
//!
//! Walks the host's windows and documents through [`EditorView`] and records
//! one [`DocumentEntry`] per file-backed document. A document whose state
//! can't be read is skipped with a reason; capture itself never fails.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::{DocumentEntry, Snapshot, UNGROUPED};
use super::paths::{names_entry, normalize, PathResolver};
use super::view::{DocumentId, EditorView, HostError, WindowId};

/// Why a document was left out of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureSkipReason {
    #[error("document has no backing file")]
    NoBackingFile,
    #[error("document is already recorded")]
    Duplicate,
    #[error("path has no relative form under the project root")]
    UnrelatedPath,
    #[error("path is the project root or one of its parents")]
    ProjectDirectory,
    #[error("host error: {0}")]
    Host(#[from] HostError),
}

/// A document left out of a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSkip {
    pub document: DocumentId,
    pub path: Option<PathBuf>,
    pub reason: CaptureSkipReason,
}

/// Snapshot plus the documents that didn't make it in
#[derive(Debug, Clone)]
pub struct CaptureReport {
    pub snapshot: Snapshot,
    pub skipped: Vec<CaptureSkip>,
}

/// Tab group ids keyed by host window id, in first-seen order
#[derive(Debug, Default)]
struct TabGroups {
    ids: HashMap<WindowId, i32>,
}

impl TabGroups {
    fn from_windows(windows: &[WindowId]) -> Self {
        let mut groups = Self::default();
        for &window in windows {
            let next = groups.ids.len() as i32;
            groups.ids.entry(window).or_insert(next);
        }
        groups
    }

    fn group_of(&self, window: WindowId) -> i32 {
        self.ids.get(&window).copied().unwrap_or(UNGROUPED)
    }
}

/// Builds snapshots from a live editor
#[derive(Debug, Clone)]
pub struct CaptureEngine {
    resolver: PathResolver,
}

impl CaptureEngine {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            resolver: PathResolver::new(project_root),
        }
    }

    /// Capture the current layout as a snapshot named `name`
    pub fn capture(&self, view: &dyn EditorView, name: &str) -> Snapshot {
        self.capture_with_report(view, name).snapshot
    }

    /// Capture the current layout, also reporting skipped documents
    pub fn capture_with_report(&self, view: &dyn EditorView, name: &str) -> CaptureReport {
        let mut snapshot = Snapshot::new(name);
        let mut skipped = Vec::new();

        // 1. Tab groups from window enumeration order
        let groups = match view.windows() {
            Ok(windows) => TabGroups::from_windows(&windows),
            Err(e) => {
                warn!("Failed to enumerate windows, documents will be ungrouped: {}", e);
                TabGroups::default()
            }
        };

        let active_window = view.active_window().unwrap_or_else(|e| {
            warn!("Failed to query active window: {}", e);
            None
        });

        let documents = view.documents().unwrap_or_else(|e| {
            warn!("Failed to enumerate documents: {}", e);
            Vec::new()
        });

        // 2. One entry per file-backed document
        let mut seen_paths = HashSet::new();
        let mut have_active = false;

        for document in documents {
            let order = snapshot.documents.len() as u32;
            match self.capture_document(view, document, &groups, active_window, order) {
                Ok((path, mut entry)) => {
                    if !seen_paths.insert(normalize(&path)) {
                        debug!("Skipping duplicate document {}", path.display());
                        skipped.push(CaptureSkip {
                            document,
                            path: Some(path),
                            reason: CaptureSkipReason::Duplicate,
                        });
                        continue;
                    }
                    if entry.is_active {
                        if have_active {
                            entry.is_active = false;
                        }
                        have_active = true;
                    }
                    snapshot.documents.push(entry);
                }
                Err(skip) => {
                    if skip.reason == CaptureSkipReason::NoBackingFile {
                        debug!("Skipping {} without a backing file", document);
                    } else {
                        warn!(
                            "Error saving document state for {}: {}",
                            skip.path
                                .as_ref()
                                .map_or_else(|| document.to_string(), |p| p.display().to_string()),
                            skip.reason
                        );
                    }
                    skipped.push(skip);
                }
            }
        }

        // 3. Close gaps left by skipped windows
        compact_tab_groups(&mut snapshot.documents);

        // 4. Auxiliary panels, best effort
        snapshot.tool_windows = view.tool_windows().unwrap_or_else(|e| {
            warn!("Failed to enumerate tool windows: {}", e);
            Vec::new()
        });
        snapshot.captured_at = Some(Utc::now());

        info!(
            "Captured workspace '{}' ({} documents, {} skipped)",
            snapshot.name,
            snapshot.documents.len(),
            skipped.len()
        );

        CaptureReport { snapshot, skipped }
    }

    /// Read one document's state; any host failure skips the document
    fn capture_document(
        &self,
        view: &dyn EditorView,
        document: DocumentId,
        groups: &TabGroups,
        active_window: Option<WindowId>,
        order: u32,
    ) -> Result<(PathBuf, DocumentEntry), CaptureSkip> {
        let skip = |path: Option<PathBuf>, reason: CaptureSkipReason| CaptureSkip {
            document,
            path,
            reason,
        };

        let path = match view.document_path(document) {
            Ok(Some(path)) if !path.as_os_str().is_empty() => path,
            Ok(_) => return Err(skip(None, CaptureSkipReason::NoBackingFile)),
            Err(e) => return Err(skip(None, e.into())),
        };

        let relative_path = self
            .resolver
            .to_relative(&path)
            .map_err(|_| skip(Some(path.clone()), CaptureSkipReason::UnrelatedPath))?;
        if !names_entry(&relative_path) {
            return Err(skip(Some(path), CaptureSkipReason::ProjectDirectory));
        }

        let window = view
            .document_window(document)
            .map_err(|e| skip(Some(path.clone()), e.into()))?;
        let cursor = view
            .cursor(document)
            .map_err(|e| skip(Some(path.clone()), e.into()))?;

        let mut entry = DocumentEntry::new(relative_path, order);
        entry.is_active = window.is_some() && window == active_window;

        if let Some(cursor) = cursor {
            entry.line = cursor.line;
            entry.column = cursor.column;
        }

        if let Some(window) = window {
            let layout = view
                .window_layout(window)
                .map_err(|e| skip(Some(path.clone()), e.into()))?;
            entry.geometry = layout.geometry;
            entry.window_state = layout.state;
            entry.is_floating = layout.floating;
            entry.window_kind = layout.kind;
            entry.tab_group = groups.group_of(window);
        }

        Ok((path, entry))
    }
}

/// Renumber recorded groups to 0..k in first-seen window order
///
/// Windows whose documents were skipped would otherwise leave gaps.
fn compact_tab_groups(documents: &mut [DocumentEntry]) {
    let used: BTreeSet<i32> = documents
        .iter()
        .filter(|d| d.is_grouped())
        .map(|d| d.tab_group)
        .collect();
    let remap: HashMap<i32, i32> = used
        .into_iter()
        .enumerate()
        .map(|(new, old)| (old, new as i32))
        .collect();

    for doc in documents.iter_mut().filter(|d| d.is_grouped()) {
        doc.tab_group = remap[&doc.tab_group];
    }
}

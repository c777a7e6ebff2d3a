//! The user-facing workspace commands, minus their dialogs
//!
//! The host's UI prompts for a name, a selection or a confirmation and then
//! calls into these flows with the answer.

use std::path::{Path, PathBuf};

use tracing::info;

use super::capture::{CaptureEngine, CaptureSkip};
use super::contents::collect_contents;
use super::models::Snapshot;
use super::restore::{needs_confirmation, RestoreEngine, RestoreResult};
use super::store::SnapshotStore;
use super::view::EditorView;
use crate::error::Result;

/// Result of saving the current session
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub snapshot: Snapshot,
    pub path: PathBuf,
    /// Documents that could not be recorded
    pub skipped: Vec<CaptureSkip>,
}

/// Capture the editor and store it as `name`
pub fn save_session(
    view: &dyn EditorView,
    project_root: &Path,
    store: &SnapshotStore,
    name: &str,
) -> Result<SaveOutcome> {
    let report = CaptureEngine::new(project_root).capture_with_report(view, name);
    let path = store.save(name, &report.snapshot)?;

    Ok(SaveOutcome {
        snapshot: report.snapshot,
        path,
        skipped: report.skipped,
    })
}

/// What the load picker can offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadChoices {
    /// No saved workspaces; tell the user there is nothing to load
    Nothing,
    Available(Vec<Snapshot>),
}

pub fn prepare_load(store: &SnapshotStore) -> Result<LoadChoices> {
    let snapshots = store.list()?;
    if snapshots.is_empty() {
        return Ok(LoadChoices::Nothing);
    }
    Ok(LoadChoices::Available(snapshots))
}

/// The user's answer to the load confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// No prompt was shown
    NotAsked,
    Accepted { dont_ask_again: bool },
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Restored(RestoreResult),
    Declined,
    /// Settings require a prompt that wasn't shown; nothing was touched
    ConfirmationRequired,
}

/// Restore `snapshot` after settling the confirmation prompt
///
/// Accepting with "don't ask again" persists the setting before restoring.
pub fn load_session(
    store: &SnapshotStore,
    snapshot: &Snapshot,
    project_root: &Path,
    view: &mut dyn EditorView,
    confirmation: Confirmation,
) -> Result<LoadOutcome> {
    let mut settings = store.load_settings()?;

    match confirmation {
        Confirmation::Declined => return Ok(LoadOutcome::Declined),
        Confirmation::NotAsked if needs_confirmation(&settings) => {
            return Ok(LoadOutcome::ConfirmationRequired);
        }
        Confirmation::NotAsked => {}
        Confirmation::Accepted { dont_ask_again } => {
            if settings.record_prompt_answer(dont_ask_again) {
                store.save_settings(&settings)?;
                info!("Load prompt disabled for this project");
            }
        }
    }

    let result = RestoreEngine::new(project_root).apply(snapshot, view)?;
    Ok(LoadOutcome::Restored(result))
}

/// Text for the clipboard, or `None` when no document has text
pub fn copy_contents(view: &dyn EditorView) -> Option<String> {
    let contents = collect_contents(view);
    if contents.is_empty() {
        None
    } else {
        Some(contents)
    }
}

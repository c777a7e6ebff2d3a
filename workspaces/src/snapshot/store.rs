//! Snapshot store: disk I/O, paths, atomic writes, settings
//!
//! Layout under the project root:
//! - `<workspaces_dir>/<name>.json` - one file per saved snapshot
//! - `<workspaces_dir>/workspace_settings.json` - the [`Settings`] record
//!
//! Snapshot writes go through temp file + fsync + rename so a reader never
//! sees a partial file. Unreadable snapshot files are skipped when listing.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use fs2::FileExt;
use tracing::{debug, info, warn};

use super::models::{validate_name, Settings, Snapshot};
use crate::config::Config;
use crate::error::{Result, SnapshotError};

/// Age threshold for temp file cleanup (1 hour)
const CLEANUP_AGE_THRESHOLD: Duration = Duration::from_secs(3600);

/// Per-project snapshot storage
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    /// Directory holding snapshot and settings files
    dir: PathBuf,
    config: Config,
}

impl SnapshotStore {
    /// Create a store for a project; nothing is created on disk until a write
    pub fn new(project_root: &Path, config: Config) -> Self {
        Self {
            dir: config.snapshot_dir(project_root),
            config,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the path for a snapshot file
    pub fn snapshot_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, self.config.extension))
    }

    fn settings_path(&self) -> PathBuf {
        self.dir.join(&self.config.settings_file)
    }

    /// Names must be valid file keys and not shadow the settings file
    fn check_name(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        if name.eq_ignore_ascii_case(self.config.settings_stem()) {
            return Err(SnapshotError::InvalidName {
                name: name.to_string(),
                reason: "name is reserved for settings".to_string(),
            });
        }
        Ok(())
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| SnapshotError::io(&self.dir, e))
    }

    /// Write `bytes` to `final_path` atomically
    fn write_atomic(&self, final_path: &Path, bytes: &[u8]) -> Result<()> {
        let file_name = final_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = self
            .dir
            .join(format!("{}.tmp.{}", file_name, std::process::id()));

        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?; // fsync
            drop(file);
            fs::rename(&temp_path, final_path)
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            SnapshotError::io(final_path, e)
        })
    }

    /// Save a snapshot under `name`, replacing any existing one
    ///
    /// The stored snapshot's `name` is set to `name`.
    pub fn save(&self, name: &str, snapshot: &Snapshot) -> Result<PathBuf> {
        self.check_name(name)?;

        let mut snapshot = snapshot.clone();
        snapshot.name = name.to_string();
        snapshot.validate()?;

        self.ensure_dir()?;
        let path = self.snapshot_path(name);
        let json = serde_json::to_string_pretty(&snapshot)?;
        self.write_atomic(&path, json.as_bytes())?;

        info!(
            "Saved workspace '{}' ({} documents) to {}",
            name,
            snapshot.documents.len(),
            path.display()
        );
        Ok(path)
    }

    /// Read one snapshot by name
    pub fn load(&self, name: &str) -> Result<Snapshot> {
        self.check_name(name)?;

        let path = self.snapshot_path(name);
        if !path.is_file() {
            return Err(SnapshotError::NotFound(name.to_string()));
        }
        self.read_snapshot(&path, name)
    }

    fn read_snapshot(&self, path: &Path, name: &str) -> Result<Snapshot> {
        let content = fs::read_to_string(path).map_err(|e| SnapshotError::io(path, e))?;
        let mut snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|e| SnapshotError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;

        // The file name is the key
        if snapshot.name != name {
            debug!(
                "Workspace file {} names itself '{}'; using '{}'",
                path.display(),
                snapshot.name,
                name
            );
            snapshot.name = name.to_string();
        }
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Names of stored snapshots, sorted
    pub fn names(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| SnapshotError::io(&self.dir, e))? {
            let entry = entry.map_err(|e| SnapshotError::io(&self.dir, e))?;
            let path = entry.path();

            // Only snapshot files (skip settings, *.tmp.*, anything else)
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(self.config.extension.as_str()) {
                continue;
            }
            if path.file_name().and_then(|n| n.to_str()) == Some(self.config.settings_file.as_str())
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Read every stored snapshot, sorted by name
    ///
    /// Files that fail to parse or validate are skipped.
    pub fn list(&self) -> Result<Vec<Snapshot>> {
        let mut snapshots = Vec::new();

        for name in self.names()? {
            let path = self.snapshot_path(&name);
            let loaded = self
                .check_name(&name)
                .and_then(|()| self.read_snapshot(&path, &name));
            match loaded {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => {
                    warn!("Failed to read workspace {}: {}", path.display(), e);
                    // Continue processing other snapshots
                }
            }
        }

        Ok(snapshots)
    }

    /// Load settings, creating the default record if there is none
    ///
    /// A corrupt settings file is replaced with defaults.
    pub fn load_settings(&self) -> Result<Settings> {
        let path = self.settings_path();

        if !path.exists() {
            let settings = Settings::default();
            self.save_settings(&settings)?;
            return Ok(settings);
        }

        let content = fs::read_to_string(&path).map_err(|e| SnapshotError::io(&path, e))?;
        match serde_json::from_str::<Settings>(&content) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!(
                    "Settings file {} is corrupt ({}); restoring defaults",
                    path.display(),
                    e
                );
                let settings = Settings::default();
                self.save_settings(&settings)?;
                Ok(settings)
            }
        }
    }

    /// Save settings with an exclusive lock held while writing
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.ensure_dir()?;
        let path = self.settings_path();

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| SnapshotError::io(&path, e))?;

        file.lock_exclusive()
            .map_err(|e| SnapshotError::io(&path, e))?;

        let contents = serde_json::to_string_pretty(settings)?;
        let written = file
            .set_len(0)
            .and_then(|()| file.write_all(contents.as_bytes()))
            .and_then(|()| file.sync_all());

        // Lock is released when file is dropped; unlock explicitly for clarity
        let _ = FileExt::unlock(&file);
        written.map_err(|e| SnapshotError::io(&path, e))
    }

    /// Whether `file_name` has the `<stem>.<ext>.tmp.<pid>` shape of
    /// [`Self::write_atomic`] temp files
    fn is_write_temp(&self, file_name: &str) -> bool {
        let Some((target, pid)) = file_name.rsplit_once(".tmp.") else {
            return false;
        };
        !pid.is_empty()
            && pid.bytes().all(|b| b.is_ascii_digit())
            && target
                .strip_suffix(self.config.extension.as_str())
                .is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
    }

    /// Remove leftover temp files from interrupted writes
    ///
    /// Deletes `<name>.<ext>.tmp.<pid>` files older than one hour. Saved
    /// snapshots always end in `.<ext>`, so a name containing `.tmp.` is
    /// never mistaken for a temp file.
    /// Returns (deleted_count, scanned_count).
    pub fn cleanup_stale_temps(&self) -> Result<(usize, usize)> {
        if !self.dir.is_dir() {
            return Ok((0, 0));
        }

        let mut scanned = 0;
        let mut deleted = 0;
        let now = SystemTime::now();

        for entry in fs::read_dir(&self.dir).map_err(|e| SnapshotError::io(&self.dir, e))? {
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            scanned += 1;

            let is_temp = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| self.is_write_temp(n));
            if !is_temp {
                continue;
            }

            let age = fs::metadata(&path)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok());
            if age.is_some_and(|age| age > CLEANUP_AGE_THRESHOLD) {
                if let Err(e) = fs::remove_file(&path) {
                    warn!("Failed to delete stale temp file {}: {}", path.display(), e);
                } else {
                    deleted += 1;
                }
            }
        }

        Ok((deleted, scanned))
    }
}

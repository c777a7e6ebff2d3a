// Configuration for where a project's workspace snapshots live
// Handles the per-project directory name, file extension and settings file name

use std::path::{Path, PathBuf};

/// Directory created under the project root to hold snapshots
pub const DEFAULT_WORKSPACES_DIR: &str = ".vsworkspaces";

/// Extension used for snapshot and settings files
pub const DEFAULT_EXTENSION: &str = "json";

/// Settings file name inside the workspaces directory
pub const DEFAULT_SETTINGS_FILE: &str = "workspace_settings.json";

/// Environment variable overriding the workspaces directory name
pub const WORKSPACES_DIR_ENV: &str = "WORKSPACES_DIR";

/// Naming configuration for the on-disk snapshot layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory name relative to the project root
    pub workspaces_dir: String,
    /// Extension for snapshot files (without the dot)
    pub extension: String,
    /// File name of the settings record
    pub settings_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspaces_dir: DEFAULT_WORKSPACES_DIR.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            settings_file: DEFAULT_SETTINGS_FILE.to_string(),
        }
    }
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var(WORKSPACES_DIR_ENV) {
            let dir = dir.trim();
            if !dir.is_empty() {
                config.workspaces_dir = dir.to_string();
            }
        }

        config
    }

    /// Get the snapshot directory for a project
    pub fn snapshot_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.workspaces_dir)
    }

    /// Get the settings file path for a project
    pub fn settings_path(&self, project_root: &Path) -> PathBuf {
        self.snapshot_dir(project_root).join(&self.settings_file)
    }

    /// File stem of the settings file; snapshot names may not use it
    pub fn settings_stem(&self) -> &str {
        Path::new(&self.settings_file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.settings_file)
    }

    /// Find the project root by walking up from `start`
    ///
    /// Returns the first ancestor (including `start`) that contains the
    /// workspaces directory.
    pub fn find_project_root(&self, start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if self.snapshot_dir(&current).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }
}

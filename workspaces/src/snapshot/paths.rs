//! Project-relative path encoding
//!
//! Snapshots store document paths relative to the project root so a saved
//! layout still applies in a different checkout of the same project.
//! Relative paths are always written with `/` separators; both `/` and `\`
//! are accepted when reading so snapshots move between platforms.
//!
//! Paths outside the root are encoded as `..`-prefixed sequences. Whether
//! they resolve to the same file elsewhere depends on the surrounding
//! directory layout being identical.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, SnapshotError};

/// Converts document paths between absolute and project-relative form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            root: normalize(&project_root.into()),
        }
    }

    /// Normalized project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Express `absolute` relative to the project root
    ///
    /// Fails only when the two paths share no common anchor (for example
    /// different drive letters), since no relative form exists then.
    pub fn to_relative(&self, absolute: &Path) -> Result<String> {
        let path = normalize(absolute);

        let (path_anchor, path_parts) = split_anchor(&path);
        let (root_anchor, root_parts) = split_anchor(&self.root);
        if path_anchor != root_anchor {
            return Err(SnapshotError::UnrelatedPath {
                path,
                root: self.root.clone(),
            });
        }

        let common = path_parts
            .iter()
            .zip(root_parts.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut segments: Vec<String> = Vec::new();
        for _ in common..root_parts.len() {
            segments.push("..".to_string());
        }
        segments.extend(path_parts[common..].iter().cloned());

        if segments.is_empty() {
            return Ok(".".to_string());
        }
        Ok(segments.join("/"))
    }

    /// Resolve a stored relative path against the project root
    pub fn to_absolute(&self, relative: &str) -> PathBuf {
        let mut path = self.root.clone();
        for part in relative.split(['/', '\\']) {
            match part {
                "" | "." => {}
                ".." => path.push(".."),
                other => path.push(other),
            }
        }
        normalize(&path)
    }

    /// Whether `absolute` lies inside the project root
    pub fn contains(&self, absolute: &Path) -> bool {
        normalize(absolute).starts_with(&self.root)
    }
}

/// Whether a stored relative path still names something below an
/// ancestor, rather than the project root or one of its parents
pub fn names_entry(relative: &str) -> bool {
    normalize(Path::new(&relative.replace('\\', "/")))
        .components()
        .any(|c| matches!(c, Component::Normal(_)))
}

/// Lexically normalize a path: drop `.` segments and fold `..` into the
/// preceding segment. Does not touch the filesystem, so it works for files
/// that no longer exist.
pub fn normalize(path: &Path) -> PathBuf {
    let mut anchor = PathBuf::new();
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    let mut leading_parents = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => anchor.push(prefix.as_os_str()),
            Component::RootDir => anchor.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() && !path.has_root() {
                    // A relative path may climb above its start; keep those.
                    leading_parents += 1;
                }
            }
            Component::Normal(part) => parts.push(part),
        }
    }

    let mut out = anchor;
    for _ in 0..leading_parents {
        out.push("..");
    }
    for part in parts {
        out.push(part);
    }
    out
}

/// Split a normalized path into its anchor (prefix + root) and segments
fn split_anchor(path: &Path) -> (PathBuf, Vec<String>) {
    let mut anchor = PathBuf::new();
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => anchor.push(component.as_os_str()),
            other => parts.push(other.as_os_str().to_string_lossy().into_owned()),
        }
    }
    (anchor, parts)
}

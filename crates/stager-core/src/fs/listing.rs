//! Directory listings keyed by relative path.
//!
//! A [`Listing`] is a flat snapshot of a tree: every non-directory entry with
//! its size, plus the set of directories. Keys are relative paths joined with
//! `/` regardless of host platform, so listings from two roots can be compared
//! directly.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, StageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingEntry {
    pub len: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Listing {
    files: BTreeMap<String, ListingEntry>,
    dirs: BTreeSet<String>,
}

impl Listing {
    /// Snapshot the tree under `root`.
    ///
    /// A missing root yields an empty listing. With `follow_links` symlinks are
    /// listed as whatever they point to; without it they are listed as plain
    /// entries so they can be replaced or removed without touching the target.
    pub fn scan(root: &Path, follow_links: bool) -> Result<Self> {
        let mut listing = Listing::default();
        if !root.exists() {
            return Ok(listing);
        }

        for entry in WalkDir::new(root).min_depth(1).follow_links(follow_links) {
            let entry = entry.map_err(|e| StageError::walk(root, e))?;
            let rel = relative_key(root, entry.path())?;

            if entry.file_type().is_dir() {
                listing.dirs.insert(rel);
                continue;
            }

            let meta = entry
                .metadata()
                .map_err(|e| StageError::walk(entry.path(), e))?;
            listing.files.insert(rel, ListingEntry { len: meta.len() });
        }

        Ok(listing)
    }

    pub fn insert_file(&mut self, rel_path: impl Into<String>, len: u64) {
        let rel_path = rel_path.into();
        let mut parent = rel_path.as_str();
        while let Some((dir, _)) = parent.rsplit_once('/') {
            self.dirs.insert(dir.to_string());
            parent = dir;
        }
        self.files.insert(rel_path, ListingEntry { len });
    }

    pub fn insert_dir(&mut self, rel_path: impl Into<String>) {
        self.dirs.insert(rel_path.into());
    }

    pub fn file(&self, rel_path: &str) -> Option<&ListingEntry> {
        self.files.get(rel_path)
    }

    pub fn has_dir(&self, rel_path: &str) -> bool {
        self.dirs.contains(rel_path)
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &ListingEntry)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn dirs(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(String::as_str)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }
}

/// Build the `/`-joined key for `path` below `root`.
pub fn relative_key(root: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| StageError::InvalidFilename {
            path: path.display().to_string(),
            reason: format!("not located under {}", root.display()),
        })?;

    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| StageError::InvalidFilename {
                    path: path.display().to_string(),
                    reason: "name is not valid UTF-8".to_string(),
                })?;
                parts.push(part);
            }
            _ => {
                return Err(StageError::InvalidFilename {
                    path: path.display().to_string(),
                    reason: "unexpected path component".to_string(),
                });
            }
        }
    }
    Ok(parts.join("/"))
}

/// Turn a `/`-joined key back into a path below `root`.
pub fn join_key(root: &Path, rel_path: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    path.extend(rel_path.split('/'));
    path
}

//! Payload manifest generation.
//!
//! The manifest is a whitespace-delimited text file listing every staged file
//! with its content digest. Layout:
//!
//! ```text
//! <entry count>
//! <1 if full payload, else 0>
//! <relative path> <hex digest>
//! ...
//! ```
//!
//! Entries are sorted by relative path so re-running on an unchanged tree
//! yields the same bytes.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Result, StageError};
use crate::fs::atomic;
use crate::fs::content::{ContentDigest, hash_file};
use crate::fs::listing::{join_key, relative_key};
use crate::workers::Workers;

/// File name of the manifest, written at the destination root.
pub const MANIFEST_FILE_NAME: &str = "payload_info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub relative_path: String,
    pub content_hash: ContentDigest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub is_full: bool,
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.entries.len());
        let _ = writeln!(out, "{}", if self.is_full { 1 } else { 0 });
        for entry in &self.entries {
            let _ = writeln!(out, "{} {}", entry.relative_path, entry.content_hash);
        }
        out
    }

    /// Parse the serialized form, checking the declared count.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let count: usize = lines
            .next()
            .and_then(|l| l.trim().parse().ok())
            .ok_or_else(|| invalid("first line must be the entry count"))?;
        let is_full = match lines.next().map(str::trim) {
            Some("1") => true,
            Some("0") => false,
            _ => return Err(invalid("second line must be 1 or 0")),
        };

        let mut entries = Vec::with_capacity(count);
        for (index, line) in lines.enumerate() {
            if line.is_empty() {
                continue;
            }
            let (path, hash) = line
                .split_once(' ')
                .ok_or_else(|| invalid(&format!("entry {} has no digest", index + 1)))?;
            let content_hash = ContentDigest::from_hex(hash)
                .ok_or_else(|| invalid(&format!("entry {} has a malformed digest", index + 1)))?;
            entries.push(ManifestEntry {
                relative_path: path.to_string(),
                content_hash,
            });
        }

        if entries.len() != count {
            return Err(invalid(&format!(
                "declares {count} entries but lists {}",
                entries.len()
            )));
        }
        Ok(Manifest { is_full, entries })
    }
}

fn invalid(reason: &str) -> StageError {
    StageError::InvalidManifest {
        reason: reason.to_string(),
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Walk `destination_root` and hash every staged file.
///
/// Hidden entries and existing manifest files are skipped. Any relative path
/// containing a space fails the whole generation, since the format cannot
/// represent it.
pub fn generate(destination_root: &Path, is_full: bool, workers: &Workers) -> Result<Manifest> {
    let mut paths = Vec::new();
    let walker = WalkDir::new(destination_root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !e.file_name().to_str().is_some_and(is_hidden));

    for entry in walker {
        let entry = entry.map_err(|e| StageError::walk(destination_root, e))?;
        if entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name() == MANIFEST_FILE_NAME {
            continue;
        }
        let rel = relative_key(destination_root, entry.path())?;
        if rel.contains(' ') {
            return Err(StageError::InvalidFilename {
                path: rel,
                reason: "manifest paths cannot contain spaces".to_string(),
            });
        }
        paths.push(rel);
    }
    paths.sort();

    let hashes = workers.try_map(&paths, |rel| hash_file(&join_key(destination_root, rel)))?;
    let entries = paths
        .into_iter()
        .zip(hashes)
        .map(|(relative_path, content_hash)| ManifestEntry {
            relative_path,
            content_hash,
        })
        .collect();

    Ok(Manifest { is_full, entries })
}

/// Outcome of [`write_manifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestReport {
    pub path: PathBuf,
    pub entries: usize,
    pub is_full: bool,
    pub written: bool,
}

/// Regenerate the manifest file at `destination_root`.
///
/// Any existing manifest is removed first, so a failed or empty generation
/// never leaves an outdated one behind. With zero entries no file is written.
pub fn write_manifest(
    destination_root: &Path,
    is_full: bool,
    workers: &Workers,
) -> Result<ManifestReport> {
    let path = destination_root.join(MANIFEST_FILE_NAME);
    if atomic::remove_file(&path)? {
        debug!(path = %path.display(), "removed previous manifest");
    }

    let manifest = generate(destination_root, is_full, workers)?;
    let written = !manifest.is_empty();
    if written {
        atomic::write_file(&path, manifest.serialize().as_bytes())?;
    }

    info!(
        path = %path.display(),
        entries = manifest.entry_count(),
        full = is_full,
        written,
        "payload manifest"
    );
    Ok(ManifestReport {
        path,
        entries: manifest.entry_count(),
        is_full,
        written,
    })
}

//! Platform extras merger.
//!
//! Runtime support files (dynamic libraries and the interpreter standard
//! library) come from a platform/architecture specific tree rather than the
//! asset build, and land in their own subdirectories of the destination. Each
//! subdirectory is its own mirror pass with [`ExtrasRule`] as include rule.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{Result, StageError};
use crate::sync::{IncludeRule, SyncOptions, SyncPlan, SyncReport, sync};
use crate::workers::Workers;

/// Suffix required of compiled interpreter bytecode in optimized builds.
pub const COMPILED_SUFFIX: &str = ".opt-1.pyc";

/// Extensions of runtime library binaries.
pub const LIBRARY_EXTENSIONS: [&str; 4] = [".dll", ".pyd", ".so", ".dylib"];

/// Subdirectories merged for windows builds.
pub const WINDOWS_SUBDIRS: [&str; 2] = ["DLLs", "Lib"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildConfig {
    Debug,
    Release,
}

impl BuildConfig {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Some(BuildConfig::Debug),
            "release" => Some(BuildConfig::Release),
            _ => None,
        }
    }

    /// Optimized builds ship bytecode only.
    pub fn requires_compiled(self) -> bool {
        matches!(self, BuildConfig::Release)
    }
}

/// Where extras come from for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtrasSource {
    pub root: PathBuf,
    pub subdirs: Vec<String>,
    pub require_compiled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtrasRule {
    pub require_compiled: bool,
}

impl IncludeRule for ExtrasRule {
    fn includes(&self, rel_path: &str) -> bool {
        let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
        if LIBRARY_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            return true;
        }
        if self.require_compiled {
            name.ends_with(COMPILED_SUFFIX)
        } else {
            name.ends_with(".py") && !rel_path.split('/').any(|part| part == "__pycache__")
        }
    }

    fn describe(&self) -> String {
        if self.require_compiled {
            format!("extras (libraries, *{COMPILED_SUFFIX})")
        } else {
            "extras (libraries, *.py)".to_string()
        }
    }
}

/// Mirror every extras subdirectory into the same-named directory under
/// `destination_root`.
pub fn merge_extras(
    extras: &ExtrasSource,
    destination_root: &Path,
    workers: &Workers,
    options: &SyncOptions,
) -> Result<SyncReport> {
    if !extras.root.is_dir() {
        return Err(StageError::SourceNotFound {
            path: extras.root.clone(),
        });
    }

    let rule = ExtrasRule {
        require_compiled: extras.require_compiled,
    };
    let mut total = SyncReport::default();
    for subdir in &extras.subdirs {
        let plan = SyncPlan::new(
            extras.root.join(subdir),
            destination_root.join(subdir),
            rule,
        );
        let report = sync(&plan, workers, options)?;
        total.merge(&report);
    }

    info!(
        source = %extras.root.display(),
        subdirs = extras.subdirs.len(),
        added = total.added,
        updated = total.updated,
        deleted = total.deleted,
        "extras merged"
    );
    Ok(total)
}

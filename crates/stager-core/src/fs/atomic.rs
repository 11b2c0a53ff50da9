//! Write-to-temp-then-rename helpers.
//!
//! Staged files only ever appear at their final path fully written. An
//! interrupted run leaves at most a hidden temp sibling, which the next mirror
//! pass deletes as unmatched.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StageError};

/// Longest piece of the target name carried into a temp name.
const TEMP_STEM_CHARS: usize = 32;

/// Pick an unused hidden sibling path for `target`.
///
/// Only a short prefix of the target name is kept, so the temp name stays
/// within the filesystem's name limit whenever the target name does.
pub fn unique_temp_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().ok_or_else(|| StageError::InvalidFilename {
        path: target.display().to_string(),
        reason: "path has no parent directory".to_string(),
    })?;
    let base = target.file_name().ok_or_else(|| StageError::InvalidFilename {
        path: target.display().to_string(),
        reason: "path has no file name".to_string(),
    })?;
    let stem: String = base.to_string_lossy().chars().take(TEMP_STEM_CHARS).collect();

    for attempt in 0u32..1000 {
        let name = if attempt == 0 {
            format!(".{stem}.tmp.{}", std::process::id())
        } else {
            format!(".{stem}.tmp.{}.{attempt}", std::process::id())
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(StageError::io(
        "allocate temp path for",
        target,
        std::io::Error::new(std::io::ErrorKind::AlreadyExists, "no free temp name"),
    ))
}

/// Copy `src` over `dst`, creating parent directories as needed.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| StageError::io("create directory", parent, e))?;
    }
    let tmp = unique_temp_path(dst)?;
    if let Err(e) = fs::copy(src, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(StageError::io("copy into", dst, e));
    }
    replace(&tmp, dst)
}

/// Write `contents` to `dst` in one step.
pub fn write_file(dst: &Path, contents: &[u8]) -> Result<()> {
    let tmp = unique_temp_path(dst)?;
    if let Err(e) = fs::write(&tmp, contents) {
        let _ = fs::remove_file(&tmp);
        return Err(StageError::io("write", &tmp, e));
    }
    replace(&tmp, dst)
}

fn replace(tmp: &Path, dst: &Path) -> Result<()> {
    fs::rename(tmp, dst).map_err(|e| {
        let _ = fs::remove_file(tmp);
        StageError::io("move into place", dst, e)
    })
}

/// Remove a file, treating "already gone" as success.
pub fn remove_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StageError::io("delete", path, e)),
    }
}

/// Remove whatever sits at `path` (file, symlink or directory tree).
pub fn remove_path(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(StageError::io("stat", path, e)),
    };
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| StageError::io("delete", path, e))
}

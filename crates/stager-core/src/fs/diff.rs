//! Diff two directory listings by relative path.
//!
//! This is the pure half of a mirror pass: it decides what must happen to the
//! destination without touching the filesystem. Both the extras passes and
//! the category pass are built on it.

use std::collections::BTreeSet;

use super::listing::Listing;

/// Something in the destination occupying a path the source needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Obstruction {
    /// A file where the source has a directory on the way to a matched file.
    File(String),
    /// A directory where the source has a matched file. `files` counts the
    /// destination files that disappear with it.
    Dir { path: String, files: usize },
}

impl Obstruction {
    pub fn path(&self) -> &str {
        match self {
            Obstruction::File(path) => path,
            Obstruction::Dir { path, .. } => path,
        }
    }

    pub fn removed_files(&self) -> usize {
        match self {
            Obstruction::File(_) => 1,
            Obstruction::Dir { files, .. } => *files,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    /// Matched source files with nothing at the destination path.
    pub add: Vec<String>,
    /// Matched source files whose destination copy has a different size.
    pub update: Vec<String>,
    /// Matched source files whose destination copy has the same size; the
    /// contents still need comparing.
    pub check: Vec<String>,
    /// Destination files outside the matched set.
    pub delete: Vec<String>,
    /// Destination entries that must be cleared before copying.
    pub obstructions: Vec<Obstruction>,
    /// Source files the include rule rejected.
    pub skipped: usize,
}

impl TreeDiff {
    pub fn is_noop(&self) -> bool {
        self.add.is_empty()
            && self.update.is_empty()
            && self.check.is_empty()
            && self.delete.is_empty()
            && self.obstructions.is_empty()
    }

    /// Number of destination files removed by this diff, obstructions included.
    pub fn removed_files(&self) -> usize {
        self.delete.len()
            + self
                .obstructions
                .iter()
                .map(Obstruction::removed_files)
                .sum::<usize>()
    }
}

/// Compare `source` against `destination`.
///
/// `include` decides which source paths belong in the destination. Destination
/// files outside that matched set are scheduled for deletion when
/// `delete_unmatched` is set, except paths listed in `preserve`.
pub fn diff_listings(
    source: &Listing,
    destination: &Listing,
    include: &dyn Fn(&str) -> bool,
    preserve: &[String],
    delete_unmatched: bool,
) -> TreeDiff {
    let mut diff = TreeDiff::default();
    let mut matched: BTreeSet<&str> = BTreeSet::new();

    for (rel, src_entry) in source.files() {
        if !include(rel) {
            diff.skipped += 1;
            continue;
        }
        matched.insert(rel);

        match destination.file(rel) {
            Some(dst_entry) if dst_entry.len == src_entry.len => diff.check.push(rel.to_string()),
            Some(_) => diff.update.push(rel.to_string()),
            None => diff.add.push(rel.to_string()),
        }
    }

    // Destination entries standing where matched files or their parent
    // directories need to go.
    let mut obstructed: BTreeSet<String> = BTreeSet::new();
    for rel in &matched {
        if destination.has_dir(rel) && obstructed.insert(rel.to_string()) {
            let prefix = format!("{rel}/");
            let files = destination
                .files()
                .filter(|(path, _)| path.starts_with(&prefix))
                .count();
            diff.obstructions.push(Obstruction::Dir {
                path: rel.to_string(),
                files,
            });
        }
        let mut parent = *rel;
        while let Some((dir, _)) = parent.rsplit_once('/') {
            if destination.file(dir).is_some() && obstructed.insert(dir.to_string()) {
                diff.obstructions.push(Obstruction::File(dir.to_string()));
            }
            parent = dir;
        }
    }

    if delete_unmatched {
        for (rel, _) in destination.files() {
            if matched.contains(rel) || preserve.iter().any(|p| p == rel) {
                continue;
            }
            if is_obstructed(rel, &obstructed) {
                continue;
            }
            diff.delete.push(rel.to_string());
        }
    }

    diff
}

fn is_obstructed(rel: &str, obstructed: &BTreeSet<String>) -> bool {
    if obstructed.contains(rel) {
        return true;
    }
    let mut parent = rel;
    while let Some((dir, _)) = parent.rsplit_once('/') {
        if obstructed.contains(dir) {
            return true;
        }
        parent = dir;
    }
    false
}

/// Destination directories that end up holding no files once `diff` is
/// applied, deepest first. Used to predict pruning without touching disk.
pub fn dirs_left_empty(destination: &Listing, diff: &TreeDiff) -> Vec<String> {
    let removed: BTreeSet<&str> = diff
        .delete
        .iter()
        .map(String::as_str)
        .chain(diff.obstructions.iter().map(Obstruction::path))
        .collect();

    let mut remaining: Vec<&str> = destination
        .files()
        .map(|(rel, _)| rel)
        .filter(|rel| !removed.contains(rel) && !under_any(rel, &removed))
        .collect();
    remaining.extend(diff.add.iter().map(String::as_str));

    let mut occupied: BTreeSet<&str> = BTreeSet::new();
    for rel in remaining {
        let mut parent = rel;
        while let Some((dir, _)) = parent.rsplit_once('/') {
            occupied.insert(dir);
            parent = dir;
        }
    }

    let mut empty: Vec<String> = destination
        .dirs()
        .filter(|dir| !occupied.contains(dir) && !removed.contains(dir) && !under_any(dir, &removed))
        .map(str::to_string)
        .collect();
    empty.sort_by_key(|dir| std::cmp::Reverse(dir.matches('/').count()));
    empty
}

fn under_any(rel: &str, roots: &BTreeSet<&str>) -> bool {
    let mut parent = rel;
    while let Some((dir, _)) = parent.rsplit_once('/') {
        if roots.contains(dir) {
            return true;
        }
        parent = dir;
    }
    false
}

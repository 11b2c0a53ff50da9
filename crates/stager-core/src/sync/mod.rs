//! Selective mirror sync engine.
//!
//! One call is one mirror pass: list both trees, diff them by relative path,
//! copy what is missing or different, delete what no longer belongs, then
//! prune empty directories once every worker has finished.

pub mod plan;

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Result, StageError};
use crate::fs::atomic;
use crate::fs::content::files_identical;
use crate::fs::diff::{Obstruction, TreeDiff, diff_listings, dirs_left_empty};
use crate::fs::listing::{Listing, join_key};
use crate::workers::Workers;

pub use plan::{CategoryRule, IncludeRule, SyncPlan};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Compute the report without changing the destination.
    pub dry_run: bool,
}

/// Counts from one pass. Advisory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
    pub dirs_pruned: usize,
    pub skipped: usize,
}

impl SyncReport {
    pub fn changes(&self) -> usize {
        self.added + self.updated + self.deleted + self.dirs_pruned
    }

    pub fn merge(&mut self, other: &SyncReport) {
        self.added += other.added;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.deleted += other.deleted;
        self.dirs_pruned += other.dirs_pruned;
        self.skipped += other.skipped;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CopyOutcome {
    Added,
    Updated,
    Unchanged,
}

/// Make `plan.destination_root` mirror the included part of `plan.source_root`.
pub fn sync(plan: &SyncPlan, workers: &Workers, options: &SyncOptions) -> Result<SyncReport> {
    let src_root = plan.source_root.as_path();
    let dst_root = plan.destination_root.as_path();

    if !src_root.is_dir() {
        return Err(StageError::SourceNotFound {
            path: src_root.to_path_buf(),
        });
    }

    let source = Listing::scan(src_root, true)?;
    let destination = Listing::scan(dst_root, false)?;
    let include = |rel: &str| plan.include.includes(rel);
    let diff = diff_listings(
        &source,
        &destination,
        &include,
        &plan.preserve,
        plan.delete_unmatched,
    );

    debug!(
        source = %src_root.display(),
        destination = %dst_root.display(),
        rule = %plan.include.describe(),
        source_files = source.file_count(),
        add = diff.add.len(),
        update = diff.update.len(),
        check = diff.check.len(),
        delete = diff.delete.len(),
        "planned mirror pass"
    );

    if diff.is_noop() {
        debug!(destination = %dst_root.display(), "destination already matches source");
    }

    let report = if options.dry_run {
        dry_run(src_root, dst_root, &destination, &diff, workers)?
    } else {
        apply(src_root, dst_root, &diff, workers)?
    };

    info!(
        destination = %dst_root.display(),
        added = report.added,
        updated = report.updated,
        unchanged = report.unchanged,
        deleted = report.deleted,
        pruned = report.dirs_pruned,
        dry_run = options.dry_run,
        "mirror pass complete"
    );
    Ok(report)
}

fn apply(src_root: &Path, dst_root: &Path, diff: &TreeDiff, workers: &Workers) -> Result<SyncReport> {
    fs::create_dir_all(dst_root).map_err(|e| StageError::io("create directory", dst_root, e))?;

    // Sequential: obstructions can share ancestors, workers must not race on them.
    for obstruction in &diff.obstructions {
        workers.cancel_flag().check()?;
        let path = join_key(dst_root, obstruction.path());
        debug!(path = %path.display(), "clearing obstruction");
        atomic::remove_path(&path)?;
    }

    let copies: Vec<(&str, bool)> = diff
        .add
        .iter()
        .map(|rel| (rel.as_str(), true))
        .chain(diff.update.iter().map(|rel| (rel.as_str(), true)))
        .chain(diff.check.iter().map(|rel| (rel.as_str(), false)))
        .collect();

    let outcomes = workers.try_map(&copies, |(rel, known_different)| {
        let from = join_key(src_root, rel);
        let to = join_key(dst_root, rel);
        if !known_different && files_identical(&from, &to)? {
            return Ok(CopyOutcome::Unchanged);
        }
        let existed = to.exists();
        debug!(file = %rel, "copying");
        atomic::copy_file(&from, &to)?;
        Ok(if existed {
            CopyOutcome::Updated
        } else {
            CopyOutcome::Added
        })
    })?;

    let removed = workers.try_map(&diff.delete, |rel| {
        let path = join_key(dst_root, rel);
        debug!(file = %rel, "deleting");
        atomic::remove_file(&path)
    })?;

    let mut report = tally(&outcomes, diff);
    report.deleted = removed.iter().filter(|r| **r).count()
        + diff
            .obstructions
            .iter()
            .map(Obstruction::removed_files)
            .sum::<usize>();

    // Every worker has returned at this point.
    workers.cancel_flag().check()?;
    report.dirs_pruned = prune_empty_dirs(dst_root)?;
    Ok(report)
}

fn dry_run(
    src_root: &Path,
    dst_root: &Path,
    destination: &Listing,
    diff: &TreeDiff,
    workers: &Workers,
) -> Result<SyncReport> {
    let mut outcomes: Vec<CopyOutcome> = Vec::new();
    outcomes.extend(diff.add.iter().map(|_| CopyOutcome::Added));
    outcomes.extend(diff.update.iter().map(|_| CopyOutcome::Updated));
    outcomes.extend(workers.try_map(&diff.check, |rel| {
        let same = files_identical(&join_key(src_root, rel), &join_key(dst_root, rel))?;
        Ok(if same {
            CopyOutcome::Unchanged
        } else {
            CopyOutcome::Updated
        })
    })?);

    let mut report = tally(&outcomes, diff);
    report.deleted = diff.removed_files();
    report.dirs_pruned = dirs_left_empty(destination, diff).len();
    Ok(report)
}

fn tally(outcomes: &[CopyOutcome], diff: &TreeDiff) -> SyncReport {
    let mut report = SyncReport {
        skipped: diff.skipped,
        ..SyncReport::default()
    };
    for outcome in outcomes {
        match outcome {
            CopyOutcome::Added => report.added += 1,
            CopyOutcome::Updated => report.updated += 1,
            CopyOutcome::Unchanged => report.unchanged += 1,
        }
    }
    report
}

/// Remove empty directories below `root`, deepest first. `root` itself stays.
pub fn prune_empty_dirs(root: &Path) -> Result<usize> {
    if !root.is_dir() {
        return Ok(0);
    }

    let mut pruned = 0;
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = entry.map_err(|e| StageError::walk(root, e))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let mut children = fs::read_dir(path).map_err(|e| StageError::io("read directory", path, e))?;
        if children.next().is_none() {
            fs::remove_dir(path).map_err(|e| StageError::io("remove directory", path, e))?;
            debug!(dir = %path.display(), "pruned empty directory");
            pruned += 1;
        }
    }
    Ok(pruned)
}

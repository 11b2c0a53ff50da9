mod support;

use std::fs;
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use tempfile::TempDir;

use stager_core::catalog::{Category, CategorySet};
use stager_core::error::StageError;
use stager_core::sync::{CategoryRule, SyncOptions, SyncPlan, sync};
use stager_core::workers::{CancelFlag, Workers};

use support::{file_names, read_tree, seed_assets, write_file};

fn scripts_and_textures() -> CategoryRule {
    CategoryRule::new(
        CategorySet::only(&[Category::Scripts, Category::Textures]),
        Some(".dds"),
    )
}

fn workers() -> Workers {
    Workers::new(Some(4), CancelFlag::new()).unwrap()
}

#[test]
fn mirror_copies_only_enabled_categories() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("assets");
    let dst = temp.path().join("out");
    seed_assets(&src);

    let plan = SyncPlan::new(src.join("ba_data"), &dst, scripts_and_textures());
    let report = sync(&plan, &workers(), &SyncOptions::default()).unwrap();

    assert_eq!(
        file_names(&dst),
        vec![
            "scripts/main.opt.pyc",
            "scripts/main.py",
            "textures/wall.dds",
        ]
    );
    assert_eq!(report.added, 3);
    assert_eq!(report.skipped, 7);
    assert_eq!(read_tree(&dst)["textures/wall.dds"], b"dds-wall");
}

#[test]
fn second_run_changes_nothing_and_leaves_files_untouched() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("assets");
    let dst = temp.path().join("out");
    seed_assets(&src);

    let plan = SyncPlan::new(src.join("ba_data"), &dst, scripts_and_textures());
    sync(&plan, &workers(), &SyncOptions::default()).unwrap();

    let staged = dst.join("scripts/main.py");
    let old = FileTime::from_system_time(SystemTime::now() - Duration::from_secs(3600));
    filetime::set_file_mtime(&staged, old).unwrap();

    let report = sync(&plan, &workers(), &SyncOptions::default()).unwrap();

    assert_eq!(report.changes(), 0);
    assert_eq!(report.unchanged, 3);
    let mtime = FileTime::from_last_modification_time(&fs::metadata(&staged).unwrap());
    assert_eq!(mtime, old);
}

#[test]
fn same_size_content_change_is_detected() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("assets");
    let dst = temp.path().join("out");
    seed_assets(&src);

    let plan = SyncPlan::new(src.join("ba_data"), &dst, scripts_and_textures());
    sync(&plan, &workers(), &SyncOptions::default()).unwrap();

    // Same length, different bytes, and an mtime that claims nothing changed.
    write_file(&src, "ba_data/textures/wall.dds", b"dds-WALL");
    let stamp = FileTime::from_last_modification_time(
        &fs::metadata(dst.join("textures/wall.dds")).unwrap(),
    );
    filetime::set_file_mtime(src.join("ba_data/textures/wall.dds"), stamp).unwrap();

    let report = sync(&plan, &workers(), &SyncOptions::default()).unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(read_tree(&dst)["textures/wall.dds"], b"dds-WALL");
}

#[test]
fn disabling_a_category_purges_its_files_and_dirs() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("assets");
    let dst = temp.path().join("out");
    seed_assets(&src);

    let all = SyncPlan::new(
        src.join("ba_data"),
        &dst,
        CategoryRule::new(CategorySet::all(), Some(".dds")),
    );
    sync(&all, &workers(), &SyncOptions::default()).unwrap();
    assert!(dst.join("audio/hit.ogg").exists());

    let fewer = SyncPlan::new(src.join("ba_data"), &dst, scripts_and_textures());
    let report = sync(&fewer, &workers(), &SyncOptions::default()).unwrap();

    assert_eq!(report.deleted, 6);
    assert!(!dst.join("audio").exists());
    assert!(!dst.join("models").exists());
    assert!(!dst.join("python").exists());
    assert_eq!(file_names(&dst).len(), 3);
}

#[test]
fn stray_destination_files_are_removed_unless_preserved() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("assets");
    let dst = temp.path().join("out");
    seed_assets(&src);
    write_file(&dst, "stale/old.txt", b"old");
    write_file(&dst, "keep.me", b"keep");

    let plan =
        SyncPlan::new(src.join("ba_data"), &dst, scripts_and_textures()).preserving("keep.me");
    sync(&plan, &workers(), &SyncOptions::default()).unwrap();

    assert!(dst.join("keep.me").exists());
    assert!(!dst.join("stale").exists());
}

#[test]
fn keep_unmatched_leaves_foreign_files() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("assets");
    let dst = temp.path().join("out");
    seed_assets(&src);
    write_file(&dst, "notes.txt", b"mine");

    let plan = SyncPlan::new(src.join("ba_data"), &dst, scripts_and_textures()).keep_unmatched();
    let report = sync(&plan, &workers(), &SyncOptions::default()).unwrap();

    assert_eq!(report.deleted, 0);
    assert!(dst.join("notes.txt").exists());
}

#[test]
fn directory_obstruction_is_replaced_by_file() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("assets");
    let dst = temp.path().join("out");
    seed_assets(&src);
    write_file(&dst, "scripts/main.py/nested.py", b"in the way");

    let plan = SyncPlan::new(src.join("ba_data"), &dst, scripts_and_textures());
    sync(&plan, &workers(), &SyncOptions::default()).unwrap();

    assert!(dst.join("scripts/main.py").is_file());
    assert_eq!(read_tree(&dst)["scripts/main.py"], b"print('hi')\n");
}

#[test]
fn file_obstruction_is_replaced_by_directory() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("assets");
    let dst = temp.path().join("out");
    seed_assets(&src);
    write_file(&dst, "textures", b"not a dir");

    let plan = SyncPlan::new(src.join("ba_data"), &dst, scripts_and_textures());
    sync(&plan, &workers(), &SyncOptions::default()).unwrap();

    assert!(dst.join("textures").is_dir());
    assert!(dst.join("textures/wall.dds").is_file());
}

#[test]
fn dry_run_reports_without_touching_destination() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("assets");
    let dst = temp.path().join("out");
    seed_assets(&src);
    write_file(&dst, "audio/hit.ogg", b"ogg-hit");

    let plan = SyncPlan::new(src.join("ba_data"), &dst, scripts_and_textures());
    let report = sync(&plan, &workers(), &SyncOptions { dry_run: true }).unwrap();

    assert_eq!(report.added, 3);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.dirs_pruned, 1);
    assert_eq!(file_names(&dst), vec!["audio/hit.ogg"]);
}

#[test]
fn names_with_spaces_sync_normally() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("assets");
    let dst = temp.path().join("out");
    write_file(&src, "ba_data/audio/big hit.ogg", b"ogg-big");

    let plan = SyncPlan::new(
        src.join("ba_data"),
        &dst,
        CategoryRule::new(CategorySet::only(&[Category::Audio]), None),
    );
    let report = sync(&plan, &workers(), &SyncOptions::default()).unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(file_names(&dst), vec!["audio/big hit.ogg"]);
}

#[test]
fn long_file_names_sync() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("assets");
    let dst = temp.path().join("out");
    // 250 bytes, close to the usual 255-byte name limit.
    let rel = format!("audio/{}.ogg", "a".repeat(246));
    write_file(&src, &format!("ba_data/{rel}"), b"ogg-long");

    let plan = SyncPlan::new(
        src.join("ba_data"),
        &dst,
        CategoryRule::new(CategorySet::only(&[Category::Audio]), None),
    );
    let report = sync(&plan, &workers(), &SyncOptions::default()).unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(read_tree(&dst)[&rel], b"ogg-long");
    assert_eq!(file_names(&dst), vec![rel]);
}

#[test]
fn missing_source_is_an_error() {
    let temp = TempDir::new().unwrap();
    let plan = SyncPlan::new(
        temp.path().join("missing"),
        temp.path().join("out"),
        scripts_and_textures(),
    );

    let err = sync(&plan, &workers(), &SyncOptions::default()).unwrap_err();

    assert!(matches!(err, StageError::SourceNotFound { .. }));
    assert!(!temp.path().join("out").exists());
}

#[test]
fn cancelled_pass_stops_with_error() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("assets");
    let dst = temp.path().join("out");
    seed_assets(&src);

    let cancel = CancelFlag::new();
    cancel.cancel();
    let workers = Workers::new(Some(2), cancel).unwrap();
    let plan = SyncPlan::new(src.join("ba_data"), &dst, scripts_and_textures());

    let err = sync(&plan, &workers, &SyncOptions::default()).unwrap_err();
    assert!(matches!(err, StageError::Cancelled));
}

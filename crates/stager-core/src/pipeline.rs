//! Staging pipeline: extras pass, category pass, manifest pass.
//!
//! Stages run strictly in order; each one needs the tree left by the
//! previous one to be complete.

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::catalog::CategorySet;
use crate::error::Result;
use crate::extras::merge_extras;
use crate::manifest::{ManifestReport, write_manifest};
use crate::profile::{Platform, PlatformProfile};
use crate::sync::{SyncOptions, SyncReport, sync};
use crate::workers::Workers;

#[derive(Debug, Clone, Default)]
pub struct StageOptions {
    pub dry_run: bool,
}

/// What one staging run did.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub platform: Platform,
    pub destination: PathBuf,
    pub categories: CategorySet,
    pub extras: Option<SyncReport>,
    pub assets: SyncReport,
    pub manifest: Option<ManifestReport>,
    pub dry_run: bool,
}

impl StageReport {
    pub fn total(&self) -> SyncReport {
        let mut total = self.assets;
        if let Some(extras) = &self.extras {
            total.merge(extras);
        }
        total
    }
}

/// Stage `profile` into its destination.
pub fn stage(
    profile: &PlatformProfile,
    workers: &Workers,
    options: &StageOptions,
) -> Result<StageReport> {
    let sync_options = SyncOptions {
        dry_run: options.dry_run,
    };

    info!(
        platform = %profile.platform,
        destination = %profile.destination_root.display(),
        categories = %profile.categories,
        workers = workers.threads(),
        "staging assets"
    );

    // Extras first, so pruning in the category pass sees the final layout.
    let extras = match &profile.extras {
        Some(extras) => Some(merge_extras(
            extras,
            &profile.destination_root,
            workers,
            &sync_options,
        )?),
        None => None,
    };

    let assets = sync(&profile.category_plan(), workers, &sync_options)?;

    let manifest = if profile.wants_manifest && !options.dry_run {
        Some(write_manifest(
            &profile.destination_root,
            profile.manifest_is_full,
            workers,
        )?)
    } else {
        None
    };

    Ok(StageReport {
        platform: profile.platform,
        destination: profile.destination_root.clone(),
        categories: profile.categories,
        extras,
        assets,
        manifest,
        dry_run: options.dry_run,
    })
}

//! Stager Core Library
//!
//! Stages build assets into per-platform destination trees: resolves a
//! platform profile, mirrors the enabled asset categories, merges extras and
//! writes the payload manifest.

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod extras;
pub mod fs;
pub mod manifest;
pub mod pipeline;
pub mod profile;
pub mod sync;
pub mod workers;

/// Re-exports of commonly used types
pub mod prelude {
    // Errors
    pub use crate::error::{Result, StageError};

    // Configuration
    pub use crate::config::{ConfigStore, StageConfig};
    pub use crate::context::StageContext;

    // Profiles
    pub use crate::catalog::{Category, CategorySet};
    pub use crate::profile::{Platform, PlatformProfile, WinArch, resolve};

    // Staging
    pub use crate::manifest::{Manifest, ManifestReport};
    pub use crate::pipeline::{StageOptions, StageReport, stage};
    pub use crate::sync::{SyncOptions, SyncReport};
    pub use crate::workers::{CancelFlag, Workers};
}

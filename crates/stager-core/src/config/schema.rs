//! Configuration schema for stager.toml

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ASSETS_DIR: &str = "build/assets";
pub const DEFAULT_EXTRAS_DIR: &str = "build/extras";

/// One configuration layer. Unset fields fall through to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    /// Worker pool size for per-file work
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,

    /// Asset build tree, relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<PathBuf>,

    /// Platform extras tree, relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras_dir: Option<PathBuf>,
}

impl StageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay `other` on top of `self`.
    pub fn merge(mut self, other: StageConfig) -> Self {
        if other.jobs.is_some() {
            self.jobs = other.jobs;
        }
        if other.assets_dir.is_some() {
            self.assets_dir = other.assets_dir;
        }
        if other.extras_dir.is_some() {
            self.extras_dir = other.extras_dir;
        }
        self
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.assets_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR))
    }

    pub fn extras_dir(&self) -> PathBuf {
        self.extras_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXTRAS_DIR))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.jobs == Some(0) {
            return Err("jobs must be at least 1".to_string());
        }
        for (key, dir) in [("assets_dir", &self.assets_dir), ("extras_dir", &self.extras_dir)] {
            if dir.as_ref().is_some_and(|d| d.as_os_str().is_empty()) {
                return Err(format!("{key} must not be empty"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_layers_win_per_field() {
        let global = StageConfig {
            jobs: Some(2),
            assets_dir: Some(PathBuf::from("global/assets")),
            extras_dir: None,
        };
        let project = StageConfig {
            jobs: None,
            assets_dir: Some(PathBuf::from("out/assets")),
            extras_dir: None,
        };
        let merged = global.merge(project);
        assert_eq!(merged.jobs, Some(2));
        assert_eq!(merged.assets_dir(), PathBuf::from("out/assets"));
        assert_eq!(merged.extras_dir(), PathBuf::from(DEFAULT_EXTRAS_DIR));
    }

    #[test]
    fn validate_rejects_zero_jobs() {
        let config = StageConfig {
            jobs: Some(0),
            ..StageConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(StageConfig::new().validate().is_ok());
    }
}

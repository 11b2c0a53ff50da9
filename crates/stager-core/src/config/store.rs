//! Layered loading of stager.toml files.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::paths::{default_global_dir, global_config_path, project_config_path};
use super::{StageConfig, parser};
use crate::error::{Result, StageError};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    global_path: Option<PathBuf>,
    project_path: PathBuf,
    explicit_path: Option<PathBuf>,
}

impl ConfigStore {
    pub fn from_project(project_root: &Path) -> Self {
        Self {
            global_path: default_global_dir().map(|dir| global_config_path(&dir)),
            project_path: project_config_path(project_root),
            explicit_path: None,
        }
    }

    pub fn from_paths(global_dir: Option<PathBuf>, project_root: &Path) -> Self {
        Self {
            global_path: global_dir.map(|dir| global_config_path(&dir)),
            project_path: project_config_path(project_root),
            explicit_path: None,
        }
    }

    /// Add a file that must exist and overrides every other layer.
    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<StageConfig> {
        let mut config = StageConfig::new();

        for path in self.global_path.iter().chain(Some(&self.project_path)) {
            if path.is_file() {
                debug!(path = %path.display(), "loading config layer");
                config = config.merge(parser::parse_stage_toml(path)?);
            }
        }

        if let Some(path) = &self.explicit_path {
            if !path.is_file() {
                return Err(StageError::Config {
                    path: path.clone(),
                    message: "config file does not exist".to_string(),
                });
            }
            debug!(path = %path.display(), "loading explicit config");
            config = config.merge(parser::parse_stage_toml(path)?);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_files_give_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ConfigStore::from_paths(Some(tmp.path().join("global")), tmp.path());
        assert_eq!(store.load().unwrap(), StageConfig::default());
    }

    #[test]
    fn project_overrides_global_and_explicit_overrides_both() {
        let tmp = tempfile::tempdir().unwrap();
        let global = tmp.path().join("global");
        let project = tmp.path().join("project");
        fs::create_dir_all(&global).unwrap();
        fs::create_dir_all(&project).unwrap();
        fs::write(global.join("stager.toml"), "jobs = 2\nextras_dir = \"g/extras\"\n").unwrap();
        fs::write(project.join("stager.toml"), "jobs = 6\n").unwrap();
        let explicit = tmp.path().join("ci.toml");
        fs::write(&explicit, "assets_dir = \"ci/assets\"\n").unwrap();

        let config = ConfigStore::from_paths(Some(global), &project)
            .with_explicit(&explicit)
            .load()
            .unwrap();
        assert_eq!(config.jobs, Some(6));
        assert_eq!(config.extras_dir(), PathBuf::from("g/extras"));
        assert_eq!(config.assets_dir(), PathBuf::from("ci/assets"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ConfigStore::from_paths(None, tmp.path())
            .with_explicit(tmp.path().join("absent.toml"))
            .load()
            .unwrap_err();
        assert!(matches!(err, StageError::Config { .. }));
    }
}

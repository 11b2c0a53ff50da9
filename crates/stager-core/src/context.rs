//! Explicit environment for one staging invocation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::StageConfig;

/// Xcode project directory (one level below the project root).
pub const ENV_SOURCE_ROOT: &str = "SOURCE_ROOT";
/// Xcode build products directory.
pub const ENV_TARGET_BUILD_DIR: &str = "TARGET_BUILD_DIR";
/// Resources folder inside the bundle, relative to the build products directory.
pub const ENV_RESOURCES_FOLDER: &str = "UNLOCALIZED_RESOURCES_FOLDER_PATH";

pub const CONTEXT_VARIABLES: [&str; 3] =
    [ENV_SOURCE_ROOT, ENV_TARGET_BUILD_DIR, ENV_RESOURCES_FOLDER];

/// Everything the profile resolver may consult besides its arguments.
///
/// Frontends build this once; the resolver never reads process state itself.
#[derive(Debug, Clone)]
pub struct StageContext {
    project_root: PathBuf,
    vars: BTreeMap<String, String>,
    config: StageConfig,
}

impl StageContext {
    pub fn new(project_root: PathBuf, config: StageConfig) -> Self {
        Self {
            project_root,
            vars: BTreeMap::new(),
            config,
        }
    }

    /// Capture the context variables from the process environment.
    pub fn from_process_env(project_root: PathBuf, config: StageConfig) -> Self {
        let mut ctx = Self::new(project_root, config);
        for name in CONTEXT_VARIABLES {
            if let Ok(value) = std::env::var(name) {
                ctx.vars.insert(name.to_string(), value);
            }
        }
        ctx
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Value of `name`; empty values count as unset.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn assets_root(&self) -> PathBuf {
        self.assets_root_for(&self.project_root)
    }

    pub fn assets_root_for(&self, project_root: &Path) -> PathBuf {
        project_root.join(self.config.assets_dir())
    }

    pub fn extras_root(&self) -> PathBuf {
        self.project_root.join(self.config.extras_dir())
    }
}

//! Config path resolution helpers.

use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "stager.toml";

pub fn global_config_path(global_dir: &Path) -> PathBuf {
    global_dir.join(CONFIG_FILE_NAME)
}

pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_FILE_NAME)
}

/// Default global config directory, if the platform has one.
pub fn default_global_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("stager"))
}

//! Error type shared by every staging stage.
//!
//! Every variant is fatal to the invocation. Callers translate them into a
//! non-zero exit status; there is no partial-success result.

use std::path::{Path, PathBuf};

pub type Result<T, E = StageError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("unknown platform selector '{selector}'")]
    UnknownPlatform { selector: String },

    #[error("unknown flag '{flag}' for platform '{selector}'")]
    UnknownFlag { selector: String, flag: String },

    #[error("unexpected argument '{argument}' for platform '{selector}'")]
    UnexpectedArgument { selector: String, argument: String },

    #[error("invalid value '{value}' for <{argument}> of platform '{selector}'")]
    InvalidArgument {
        selector: String,
        argument: &'static str,
        value: String,
    },

    #[error("missing required argument <{argument}> for platform '{selector}'")]
    MissingArgument {
        selector: String,
        argument: &'static str,
    },

    #[error("environment variable {variable} is required for platform '{selector}' but is not set")]
    MissingEnvironmentContext {
        selector: String,
        variable: &'static str,
    },

    #[error("invalid filename '{path}': {reason}")]
    InvalidFilename { path: String, reason: String },

    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("source directory not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("invalid manifest: {reason}")]
    InvalidManifest { reason: String },

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("staging cancelled")]
    Cancelled,

    #[error("failed to start worker pool: {message}")]
    ThreadPool { message: String },
}

impl StageError {
    pub(crate) fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        StageError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn walk(path: &Path, source: walkdir::Error) -> Self {
        StageError::Walk {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Short stable name of the failure category, used in machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            StageError::UnknownPlatform { .. } => "unknown-platform",
            StageError::UnknownFlag { .. } => "unknown-flag",
            StageError::UnexpectedArgument { .. } => "unexpected-argument",
            StageError::InvalidArgument { .. } => "invalid-argument",
            StageError::MissingArgument { .. } => "missing-argument",
            StageError::MissingEnvironmentContext { .. } => "missing-environment-context",
            StageError::InvalidFilename { .. } => "invalid-filename",
            StageError::Io { .. } | StageError::Walk { .. } => "io-failure",
            StageError::SourceNotFound { .. } => "source-not-found",
            StageError::InvalidManifest { .. } => "invalid-manifest",
            StageError::Config { .. } => "config",
            StageError::Cancelled => "cancelled",
            StageError::ThreadPool { .. } => "thread-pool",
        }
    }
}

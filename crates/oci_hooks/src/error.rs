//! Error types for hook files, catalog scans, and resolution.

use std::path::PathBuf;

/// A single hook definition file failed to load or validate.
#[derive(Debug, thiserror::Error)]
pub enum HookFileError {
    #[error("Failed to read hook file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid hook JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported hook file version {found:?} (expected {expected:?})")]
    UnsupportedVersion { found: String, expected: String },

    #[error("Hook path must be absolute: {0}")]
    RelativePath(String),

    #[error("Hook executable {path} is not accessible: {source}")]
    MissingExecutable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Hook declares no stages")]
    NoStages,

    #[error("Unknown hook stage: {0:?}")]
    UnknownStage(String),

    #[error("Hook trigger has no conditions")]
    NoConditions,

    #[error("Invalid {field} pattern {pattern:?}: {source}")]
    Pattern {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Scanning the hook directories failed.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read hook directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stat hook directory {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The catalog could not produce a match set for a spec.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Hook catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Hook {hook} matches on commands but process.args is empty")]
    MissingProcessArgs { hook: String },
}

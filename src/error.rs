//! Error types for the hook injector.

use oci_hooks::{CatalogError, ResolveError};

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Hook catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Hook injection failed for a container.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    #[error("Hook resolution failed for {container}: {source}")]
    Resolution {
        container: String,
        #[source]
        source: ResolveError,
    },
}

/// Errors surfaced to the runtime by the plugin adapter or its transport.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("{0}")]
    Inject(#[from] InjectError),

    #[error("Malformed request: {0}")]
    Protocol(String),

    #[error("Unsupported method {0:?}")]
    UnsupportedMethod(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

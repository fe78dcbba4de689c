//! Error types for the Collins client.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for backend calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the Collins API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid collins host {0:?}")]
    InvalidUri(String),

    #[error("unsupported scheme {0:?}, only http is supported")]
    UnsupportedScheme(String),

    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("http error: {0}")]
    Http(#[from] hyper::Error),

    #[error("failed to build request: {0}")]
    Request(#[from] http::Error),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("collins returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unknown asset status {0:?}")]
    UnknownStatus(String),
}

/// Errors that can occur while loading credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no collins config found (tried {})", display_paths(.0))]
    NotFound(Vec<PathBuf>),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

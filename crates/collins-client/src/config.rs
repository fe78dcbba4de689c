//! Collins credentials file (`collins.toml`).
//!
//! ```toml
//! host = "http://collins.example.com:9000"
//! username = "blake"
//! password = "admin:first"
//! timeout = "30s"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "COLLINS_CONFIG";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for a Collins instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollinsConfig {
    /// Base URL, e.g. `http://collins.example.com:9000`.
    pub host: String,
    pub username: String,
    pub password: String,
    /// Per-request timeout ("30s", "500ms", "2m").
    pub timeout: Option<String>,
}

impl CollinsConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the first config found in the default locations.
    pub fn discover() -> Result<Self, ConfigError> {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::discover_in(&candidate_paths(explicit, home))
    }

    /// Load the first existing file out of `candidates`.
    pub fn discover_in(candidates: &[PathBuf]) -> Result<Self, ConfigError> {
        for path in candidates {
            if path.is_file() {
                debug!(path = %path.display(), "using collins config");
                return Self::from_file(path);
            }
        }
        Err(ConfigError::NotFound(candidates.to_vec()))
    }

    /// Effective request timeout; unparseable values fall back to 60s.
    pub fn request_timeout(&self) -> Duration {
        self.timeout
            .as_deref()
            .and_then(parse_duration)
            .unwrap_or(DEFAULT_TIMEOUT)
    }
}

/// Lookup order: `$COLLINS_CONFIG`, `~/.collins.toml`, `/etc/collins.toml`.
pub fn candidate_paths(explicit: Option<PathBuf>, home: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    paths.extend(explicit);
    paths.extend(home.map(|h| h.join(".collins.toml")));
    paths.push(PathBuf::from("/etc/collins.toml"));
    paths
}

/// Parse a duration string like "5s", "500ms", "1m".
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

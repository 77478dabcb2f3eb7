//! TOML config loading: a typed error enum distinguishing I/O failure from
//! malformed content, and a thin loader around `toml`/`serde`.

use cnc_supervisor_common::config::SupervisorConfig;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Load a [`SupervisorConfig`] from a TOML file, falling back to
/// `SupervisorConfig::default()` field-by-field for anything the file omits
/// (every field in the config structs carries `#[serde(default)]`).
pub fn load(path: impl AsRef<Path>) -> Result<SupervisorConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

//! Configuration file for rowquery
//!
//! A JSON document; every key is optional:
//!
//! ```json
//! { "data_dir": "./data", "id_column": "id", "pretty_rows": false, "log_filter": "warn" }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::table::{is_valid_segment, StoreOptions};

/// Path probed when no `--config` is given
pub const DEFAULT_CONFIG_PATH: &str = "./rowquery.json";

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config JSON in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "ROWQUERY_CONFIG_READ_ERROR",
            ConfigError::Parse { .. } => "ROWQUERY_CONFIG_PARSE_ERROR",
            ConfigError::Invalid(_) => "ROWQUERY_CONFIG_INVALID",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root directory for all tables
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Column the assigned row id is written into on insert, `null` to disable
    #[serde(default = "default_id_column")]
    pub id_column: Option<String>,

    /// Pretty-print row files
    #[serde(default)]
    pub pretty_rows: bool,

    /// Tracing filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_id_column() -> Option<String> {
    Some("id".to_string())
}
fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            id_column: default_id_column(),
            pretty_rows: false,
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load and validate configuration from `path`
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(path, &content)
    }

    /// Load `path` if given; otherwise the default path, or defaults when it is absent
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.is_file() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_json(path: &Path, content: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> ConfigResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".into()));
        }
        if let Some(column) = &self.id_column {
            if !is_valid_segment(column) {
                return Err(ConfigError::Invalid(format!(
                    "Invalid id_column: {:?}",
                    column
                )));
            }
        }
        Ok(())
    }

    /// Options every table opened under this configuration shares
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            id_column: self.id_column.clone(),
            pretty_rows: self.pretty_rows,
        }
    }
}

//! Host-provided runtime configuration.
//!
//! # Responsibility
//! - Describe where the item database and rolling logs live.
//! - Derive sensible defaults from one application data directory.
//!
//! # Invariants
//! - Validated paths are absolute.
//! - Validated log levels are one of `trace|debug|info|warn|error`.

use crate::logging::{default_log_level, normalize_level};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DB_FILE_NAME: &str = "shoplist.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Configuration rejected by [`CoreConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be an absolute path, got `{value}`")]
    RelativePath { field: &'static str, value: String },
    #[error("{0}")]
    InvalidLevel(String),
}

/// Logging backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub dir: PathBuf,
}

/// Everything the core needs from its host at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log: LogConfig,
}

impl CoreConfig {
    /// Lays out database and logs under one app data directory.
    pub fn for_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log: LogConfig {
                level: default_log_level().to_string(),
                dir: data_dir.join(LOG_DIR_NAME),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_absolute("db_path", &self.db_path)?;
        require_absolute("log.dir", &self.log.dir)?;
        normalize_level(&self.log.level).map_err(ConfigError::InvalidLevel)?;
        Ok(())
    }
}

fn require_absolute(field: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_absolute() {
        return Ok(());
    }
    Err(ConfigError::RelativePath {
        field,
        value: path.display().to_string(),
    })
}

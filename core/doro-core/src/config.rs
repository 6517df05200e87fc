//! Client preferences, persisted as `config.json` under the storage root.

use std::time::Duration;

use fs_err as fs;
use serde::{Deserialize, Serialize};

use crate::error::{DoroError, Result};
use crate::storage::{write_atomic, StorageConfig};

/// 25 minutes, the classic focus interval.
pub const DEFAULT_DURATION_MS: i64 = 25 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoroConfig {
    pub default_duration_ms: i64,
    pub pending_request_poll_secs: u64,
    pub chime_enabled: bool,
    pub leaderboard_limit: usize,
}

impl Default for DoroConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: DEFAULT_DURATION_MS,
            pending_request_poll_secs: 30,
            chime_enabled: true,
            leaderboard_limit: 50,
        }
    }
}

impl DoroConfig {
    pub fn pending_request_poll_interval(&self) -> Duration {
        Duration::from_secs(self.pending_request_poll_secs.max(1))
    }
}

/// Loads the configuration, returning defaults if the file is missing or malformed.
pub fn load_config_with_storage(storage: &StorageConfig) -> DoroConfig {
    match try_load_config(storage) {
        Ok(Some(config)) => config,
        Ok(None) => DoroConfig::default(),
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring unreadable config; using defaults");
            DoroConfig::default()
        }
    }
}

fn try_load_config(storage: &StorageConfig) -> Result<Option<DoroConfig>> {
    let path = storage.config_file();
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(DoroError::Io {
                context: "read config".to_string(),
                source,
            })
        }
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|err| DoroError::ConfigMalformed {
            path,
            details: err.to_string(),
        })
}

/// Saves the configuration to disk.
pub fn save_config_with_storage(storage: &StorageConfig, config: &DoroConfig) -> Result<()> {
    let path = storage.config_file();
    let content = serde_json::to_string_pretty(config).map_err(|source| DoroError::Json {
        context: "serialize config".to_string(),
        source,
    })?;
    write_atomic(&path, content.as_bytes()).map_err(|err| match err {
        DoroError::Io { source, .. } => DoroError::ConfigWriteFailed { path, source },
        other => other,
    })
}

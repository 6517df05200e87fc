//! Storage configuration and path management for doro.
//!
//! All durable client state lives under one root directory so tests can inject a
//! temp directory and hosts can relocate it without hunting through code.

use std::io::Write;
use std::path::{Path, PathBuf};

use fs_err as fs;
use tempfile::NamedTempFile;

use crate::error::{DoroError, Result};

/// Fixed key of the durable timer record.
pub const TIMER_STATE_KEY: &str = "timerState";

/// Central configuration for all doro storage paths.
///
/// Production code uses `StorageConfig::default()` which points to `~/.doro/`.
/// Tests use `StorageConfig::with_root(temp_dir)` for isolation.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let root = dirs::home_dir()
            .map(|home| home.join(".doro"))
            .unwrap_or_else(|| std::env::temp_dir().join(".doro"));
        Self { root }
    }
}

impl StorageConfig {
    /// Creates a StorageConfig with a custom root directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the durable timer record (`timerState.json`).
    pub fn timer_state_file(&self) -> PathBuf {
        self.root.join(format!("{}.json", TIMER_STATE_KEY))
    }

    /// Path to config.json (client preferences).
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }
}

/// Writes `content` next to `path` in a temp file, then renames it into place so
/// readers never observe a partial record.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent_dir = path.parent().ok_or_else(|| DoroError::Io {
        context: format!("{} has no parent directory", path.display()),
        source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
    })?;
    fs::create_dir_all(parent_dir).map_err(|source| DoroError::Io {
        context: format!("create {}", parent_dir.display()),
        source,
    })?;

    let io_err = |context: &str, source: std::io::Error| DoroError::Io {
        context: format!("{} {}", context, path.display()),
        source,
    };
    let mut temp_file =
        NamedTempFile::new_in(parent_dir).map_err(|e| io_err("create temp file for", e))?;
    temp_file
        .write_all(content)
        .map_err(|e| io_err("write temp file for", e))?;
    temp_file
        .flush()
        .map_err(|e| io_err("flush temp file for", e))?;
    temp_file
        .persist(path)
        .map_err(|e| io_err("persist", e.error))?;
    Ok(())
}

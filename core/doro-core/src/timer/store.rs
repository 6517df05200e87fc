//! Durable storage for the single in-flight timer record.
//!
//! The record is overwritten (never appended) on every transition and is the sole
//! source of truth after a reload. Several tabs may share one store; writes are
//! last-write-wins and every reader re-derives its state from a fresh `load`.
//!
//! # Unreadable Content
//!
//! Another tab may write the record at any time. `load` maps:
//! - Missing or empty content (no session)
//! - Corrupt JSON (no session, log warning)
//! - Records whose `isPaused` flag disagrees with their payload (no session)

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fs_err as fs;

use crate::error::{DoroError, Result};
use crate::storage::{write_atomic, StorageConfig};

use super::types::TimerState;

pub trait TimerStore: Send + Sync {
    /// Reads the current record. Absence and unreadable content both yield `None`.
    fn load(&self) -> Option<TimerState>;

    fn save(&self, record: &TimerState) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Decodes raw stored content, failing open to `None`.
fn decode(content: &str) -> Option<TimerState> {
    if content.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<TimerState>(content) {
        Ok(record) if record.is_consistent() => Some(record),
        Ok(_) => {
            tracing::warn!("Timer record is inconsistent; treating as no session");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to parse timer record; treating as no session");
            None
        }
    }
}

fn encode(record: &TimerState) -> Result<String> {
    serde_json::to_string(record).map_err(|source| DoroError::Json {
        context: "serialize timer record".to_string(),
        source,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// File-backed
// ─────────────────────────────────────────────────────────────────────────────

/// Timer record stored as `<root>/timerState.json`, written atomically.
#[derive(Debug, Clone)]
pub struct FileTimerStore {
    path: PathBuf,
}

impl FileTimerStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn with_storage(storage: &StorageConfig) -> Self {
        Self::new(&storage.timer_state_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TimerStore for FileTimerStore {
    fn load(&self) -> Option<TimerState> {
        match fs::read_to_string(&self.path) {
            Ok(content) => decode(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read timer record; treating as no session");
                None
            }
        }
    }

    fn save(&self, record: &TimerState) -> Result<()> {
        write_atomic(&self.path, encode(record)?.as_bytes())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(DoroError::Io {
                context: "remove timer record".to_string(),
                source,
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory
// ─────────────────────────────────────────────────────────────────────────────

/// One shared raw slot. Clones see each other's writes, the way tabs share one
/// browser storage area.
#[derive(Debug, Clone, Default)]
pub struct MemoryTimerStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryTimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored content, exactly as another writer left it.
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Overwrites the raw content, bypassing encoding.
    pub fn set_raw(&self, content: impl Into<String>) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(content.into());
    }
}

impl TimerStore for MemoryTimerStore {
    fn load(&self) -> Option<TimerState> {
        self.raw().as_deref().and_then(decode)
    }

    fn save(&self, record: &TimerState) -> Result<()> {
        self.set_raw(encode(record)?);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

//! Error types for doro-core operations.

use std::path::PathBuf;

use doro_protocol::ErrorInfo;

use crate::timer::SessionPhase;

// ═══════════════════════════════════════════════════════════════════════════════
// Collaborator Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Failure reported by a remote collaborator (social graph, leaderboard store,
/// session persistence). The transport itself is opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Rejected by service: {}: {}", .0.code, .0.message)]
    Rejected(ErrorInfo),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Core Error
// ═══════════════════════════════════════════════════════════════════════════════

/// All errors that can occur in doro-core operations.
#[derive(Debug, thiserror::Error)]
pub enum DoroError {
    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Cannot {action} while session is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: SessionPhase,
    },

    #[error("Timer record disappeared from storage (cleared in another tab?)")]
    SessionMissing,

    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("Configuration write failed: {path}: {source}")]
    ConfigWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Remote Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Invalid payload: {}: {}", .0.code, .0.message)]
    InvalidPayload(ErrorInfo),

    #[error("{operation} failed: {source}")]
    Service {
        operation: &'static str,
        #[source]
        source: ServiceError,
    },

    #[error("Chime playback failed: {0}")]
    Chime(String),
}

impl DoroError {
    pub(crate) fn service(operation: &'static str, source: ServiceError) -> Self {
        DoroError::Service { operation, source }
    }
}

/// Convenience type alias for Results using DoroError.
pub type Result<T> = std::result::Result<T, DoroError>;

impl From<DoroError> for String {
    fn from(err: DoroError) -> String {
        err.to_string()
    }
}

//! Error types for Shiftlog core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages and exit codes.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for Shiftlog operations.
pub type Result<T> = std::result::Result<T, ShiftlogError>;

/// Core error type for Shiftlog operations.
#[derive(Debug, Error)]
pub enum ShiftlogError {
    /// Malformed or missing required field on create, cancel or reference edits
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation targets an unknown journal entry
    #[error("Entry not found: {0}")]
    EntryNotFound(Uuid),

    /// Operation targets an unknown reference record or other resource
    #[error("Not found: {0}")]
    NotFound(String),

    /// Illegal lifecycle transition (e.g. cancelling a cancelled entry)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// No operator is signed in
    #[error("No operator is signed in")]
    NotSignedIn,

    /// Incorrect passphrase during decryption
    #[error("Incorrect passphrase")]
    IncorrectPassphrase,

    /// Journal file not found
    #[error("Journal file not found")]
    JournalNotFound,

    /// Encryption or decryption error
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl ShiftlogError {
    /// True for `NotFound`-class errors (unknown entry or reference).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ShiftlogError::EntryNotFound(_)
                | ShiftlogError::NotFound(_)
                | ShiftlogError::JournalNotFound
        )
    }

    /// True for `ValidationError`-class errors.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ShiftlogError::Validation(_) | ShiftlogError::InvalidInput(_)
        )
    }

    /// True for illegal lifecycle transitions.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, ShiftlogError::InvalidState(_))
    }
}

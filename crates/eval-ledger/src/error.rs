//! Error types for eval-ledger

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the run persistence layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Run not found in the store
    #[error("run not found: {run_id}")]
    RunNotFound { run_id: String },

    /// A run with this id has already been persisted (the store is append-only)
    #[error("run already saved: {run_id}")]
    DuplicateRun { run_id: String },

    /// A persisted document could not be decoded
    #[error("corrupt run document at {path}: {detail}")]
    Corrupt { path: PathBuf, detail: String },

    /// Serialization error
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

//! Core error taxonomy for Verisuite.

use std::path::PathBuf;

/// Errors produced by the evaluation core.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("cannot compare runs from different suites: {baseline} vs {current}")]
    SuiteMismatch { baseline: String, current: String },

    #[error("suite file not found: {0}")]
    SuiteNotFound(PathBuf),

    #[error("suite parse error: {0}")]
    SuiteParse(#[from] serde_yaml::Error),

    #[error("system prompt '{name}' version '{version}' not found")]
    PromptNotFound { name: String, version: String },

    #[error("suite '{suite}' declares llm scoring but no judge client was provided")]
    MissingJudge { suite: String },

    #[error("client error: {0}")]
    Client(#[from] verisuite_client::ClientError),

    #[error("storage error: {0}")]
    Storage(#[from] eval_ledger::StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, EvalError>;

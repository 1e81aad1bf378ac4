//! Suite definitions and loading.
//!
//! A suite is a named, ordered collection of cases (prompt + expectations),
//! declared in YAML. The scorer variant is a suite-level declaration,
//! defaulting to rule-based scoring.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{EvalError, Result};

/// Which scorer evaluates this suite's responses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    /// Deterministic rule scoring against `expected` predicates.
    #[default]
    Rules,

    /// LLM-as-judge scoring against natural-language criteria.
    Llm,
}

/// Declarative expectations for one case.
///
/// Each field is an independent predicate, present only when declared in the
/// suite file. A case with no recognized predicate passes vacuously.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Expectations {
    /// Substring that must appear verbatim (case-sensitive) in the response.
    #[serde(default)]
    pub contains: Option<String>,

    /// At least one of these substrings must appear.
    #[serde(default)]
    pub contains_any: Option<Vec<String>>,

    /// Inclusive upper bound on response character count.
    #[serde(default)]
    pub max_length: Option<usize>,

    /// Inclusive lower bound on response character count.
    #[serde(default)]
    pub min_length: Option<usize>,

    /// Inclusive upper bound on whitespace-tokenized word count.
    #[serde(default)]
    pub max_words: Option<usize>,

    /// Inclusive lower bound on whitespace-tokenized word count.
    #[serde(default)]
    pub min_words: Option<usize>,

    /// Exact whitespace-tokenized word count.
    #[serde(default)]
    pub exact_words: Option<usize>,

    /// When true, the response must parse as JSON.
    #[serde(default)]
    pub valid_json: Option<bool>,

    /// The response must parse as JSON and contain every listed top-level key.
    #[serde(default)]
    pub json_has_keys: Option<Vec<String>>,

    /// Case-level judge criteria; takes precedence over the suite-level
    /// criteria for LLM scoring.
    #[serde(default)]
    pub llm_criteria: Option<String>,
}

/// One prompt and its expectations, identified uniquely within a suite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvalCase {
    /// Case identifier, unique within the suite.
    pub id: String,

    /// Prompt text sent to the model.
    pub prompt: String,

    /// Expectations the response is scored against.
    #[serde(default)]
    pub expected: Expectations,
}

/// A named collection of cases evaluated together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvalSuite {
    /// Suite identifier.
    pub id: String,

    /// Scorer declaration (default: rules).
    #[serde(default)]
    pub scorer: ScorerKind,

    /// Suite-level judge criteria, used when a case declares none.
    #[serde(default)]
    pub llm_criteria: Option<String>,

    /// Ordered cases.
    #[serde(default)]
    pub cases: Vec<EvalCase>,
}

impl EvalSuite {
    /// SHA-256 hex digest of the canonical JSON form of this suite.
    ///
    /// Recorded in logs so a run can be traced back to the exact suite
    /// content that produced it.
    pub fn digest(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        hex::encode(hasher.finalize())
    }
}

/// Load a YAML suite from disk.
pub fn load_suite(path: impl AsRef<Path>) -> Result<EvalSuite> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            EvalError::SuiteNotFound(path.to_path_buf())
        } else {
            EvalError::Io(e)
        }
    })?;
    load_suite_str(&content)
}

/// Parse a YAML suite from a string.
pub fn load_suite_str(content: &str) -> Result<EvalSuite> {
    Ok(serde_yaml::from_str(content)?)
}

/// Discover `*.yaml` suite files in a directory, sorted by file name.
/// An absent directory yields no suites rather than an error.
pub fn suite_paths(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("yaml"))
        .collect();
    paths.sort();
    Ok(paths)
}

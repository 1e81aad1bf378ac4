//! Run and result records.
//!
//! `EvalResult` describes one case execution; `EvalRun` groups the results of
//! one suite execution against one model. Both are immutable after creation:
//! the store is append-only and never updates a persisted run.
//!
//! Optional fields deliberately serialize as explicit `null` (no
//! `skip_serializing_if`) so a reader can distinguish "never set" from a
//! field that was dropped by an older writer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The outcome of evaluating a single case against a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvalResult {
    /// Unique identifier for this result.
    pub id: Uuid,

    /// Suite this result belongs to.
    pub suite_id: String,

    /// Case identifier, unique within the owning run.
    pub case_id: String,

    /// Resolved model name that produced the response.
    pub model: String,

    /// Literal prompt text sent to the model.
    pub prompt: String,

    /// Literal response text received.
    pub response: String,

    /// Pass/fail verdict.
    pub passed: bool,

    /// Score in [0.0, 1.0]. Binary for both scorer variants.
    pub score: f64,

    /// Human-readable failure reasons. Empty iff passed under rule scoring.
    pub reasons: Vec<String>,

    /// When the case was scored.
    pub timestamp: DateTime<Utc>,

    /// System prompt applied to the model invocation, if any.
    #[serde(default)]
    pub system_prompt_name: Option<String>,

    /// Resolved version of the applied system prompt.
    #[serde(default)]
    pub system_prompt_version: Option<String>,
}

impl EvalResult {
    /// Create a result for a scored case with a fresh id and timestamp.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        suite_id: impl Into<String>,
        case_id: impl Into<String>,
        model: impl Into<String>,
        prompt: impl Into<String>,
        response: impl Into<String>,
        passed: bool,
        score: f64,
        reasons: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            suite_id: suite_id.into(),
            case_id: case_id.into(),
            model: model.into(),
            prompt: prompt.into(),
            response: response.into(),
            passed,
            score,
            reasons,
            timestamp: Utc::now(),
            system_prompt_name: None,
            system_prompt_version: None,
        }
    }

    /// Attach system-prompt attribution.
    pub fn with_system_prompt(
        mut self,
        name: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        self.system_prompt_name = Some(name.into());
        self.system_prompt_version = version;
        self
    }
}

/// One execution of a suite against a single model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvalRun {
    /// Unique identifier for this run.
    pub id: Uuid,

    /// Suite that was executed.
    pub suite_id: String,

    /// Model the run targeted (one model per run).
    pub model: String,

    /// When the run was assembled.
    pub timestamp: DateTime<Utc>,

    /// Per-case results, in suite order.
    pub results: Vec<EvalResult>,

    /// System prompt used for the whole run, if any.
    #[serde(default)]
    pub system_prompt_name: Option<String>,

    /// Resolved version of the system prompt.
    #[serde(default)]
    pub system_prompt_version: Option<String>,

    /// Global revision number, stamped at save time. Strictly increasing
    /// across saves; runs saved as one batch share a revision.
    #[serde(default)]
    pub revision: Option<u64>,

    /// Short git commit hash captured at run time for provenance.
    #[serde(default)]
    pub git_commit_hash: Option<String>,
}

impl EvalRun {
    /// Create a run with a fresh id and timestamp, revision unassigned.
    pub fn new(
        suite_id: impl Into<String>,
        model: impl Into<String>,
        results: Vec<EvalResult>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            suite_id: suite_id.into(),
            model: model.into(),
            timestamp: Utc::now(),
            results,
            system_prompt_name: None,
            system_prompt_version: None,
            revision: None,
            git_commit_hash: None,
        }
    }

    /// Number of passing results.
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> EvalResult {
        EvalResult::new(
            "math-basics",
            "addition",
            "gpt-4o-mini",
            "What is 2 + 2?",
            "4",
            true,
            1.0,
            vec![],
        )
    }

    #[test]
    fn result_serde_roundtrip() {
        let result = sample_result().with_system_prompt("terse", Some("v2".to_string()));
        let json = serde_json::to_string(&result).expect("serialize");
        let back: EvalResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(result, back);
    }

    #[test]
    fn run_serde_roundtrip_preserves_optional_fields() {
        let mut run = EvalRun::new("math-basics", "gpt-4o-mini", vec![sample_result()]);
        run.revision = Some(7);
        run.git_commit_hash = Some("a1b2c3d".to_string());

        let json = serde_json::to_string(&run).expect("serialize");
        let back: EvalRun = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(run, back);
    }

    #[test]
    fn unset_optionals_serialize_as_explicit_null() {
        let run = EvalRun::new("math-basics", "gpt-4o-mini", vec![]);
        let value = serde_json::to_value(&run).expect("serialize");
        let obj = value.as_object().expect("object");

        for field in [
            "system_prompt_name",
            "system_prompt_version",
            "revision",
            "git_commit_hash",
        ] {
            assert!(obj.contains_key(field), "{field} must be present");
            assert!(obj[field].is_null(), "{field} must be null when unset");
        }
    }

    #[test]
    fn run_deserializes_without_optional_fields() {
        // Documents written before revision/provenance were recorded.
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "suite_id": "math-basics",
            "model": "gpt-4o-mini",
            "timestamp": Utc::now(),
            "results": [],
        });
        let run: EvalRun = serde_json::from_value(json).expect("deserialize");
        assert!(run.revision.is_none());
        assert!(run.git_commit_hash.is_none());
        assert!(run.system_prompt_name.is_none());
    }

    #[test]
    fn passed_count_counts_only_passing_results() {
        let mut failing = sample_result();
        failing.passed = false;
        failing.score = 0.0;
        failing.reasons = vec!["Contains: expected '5' not found".to_string()];

        let run = EvalRun::new("math-basics", "gpt-4o-mini", vec![sample_result(), failing]);
        assert_eq!(run.passed_count(), 1);
        assert_eq!(run.results.len(), 2);
    }
}

//! Scorer dispatch.
//!
//! Both scorer variants implement one contract:
//! `(prompt, response, expectations) -> outcome`. The variant is a
//! suite-level declaration resolved once per suite, not per case.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use verisuite_client::ModelClient;

use crate::error::{EvalError, Result};
use crate::suite::{EvalSuite, Expectations, ScorerKind};

pub mod judge;
pub mod rules;

pub use judge::{JudgeScorer, DEFAULT_JUDGE_MODEL};
pub use rules::RuleScorer;

/// The outcome of scoring one response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreOutcome {
    /// Pass/fail verdict.
    pub passed: bool,

    /// Score in [0.0, 1.0]. Binary for both built-in scorers.
    pub score: f64,

    /// One human-readable reason per failed check. Empty iff passed under
    /// rule scoring; judge scoring records its reasoning here.
    pub reasons: Vec<String>,
}

impl ScoreOutcome {
    /// Verdict derived from accumulated reasons: passed iff none, binary score.
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        let passed = reasons.is_empty();
        Self {
            passed,
            score: if passed { 1.0 } else { 0.0 },
            reasons,
        }
    }

    /// Binary outcome with an explicit verdict and reasons.
    pub fn verdict(passed: bool, reasons: Vec<String>) -> Self {
        Self {
            passed,
            score: if passed { 1.0 } else { 0.0 },
            reasons,
        }
    }
}

/// Scoring capability shared by the rule and judge scorers.
///
/// Scorer-internal failures (e.g. the judge invocation itself) propagate to
/// the caller; the contract only defines behavior once a response text is in
/// hand.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(
        &self,
        prompt: &str,
        response: &str,
        expected: &Expectations,
    ) -> Result<ScoreOutcome>;
}

/// Resolve the scorer a suite declares.
///
/// The judge client is only required when the suite declares `scorer: llm`;
/// rule suites never touch it.
pub fn scorer_for_suite(
    suite: &EvalSuite,
    judge_client: Option<Arc<dyn ModelClient>>,
) -> Result<Box<dyn Scorer>> {
    match suite.scorer {
        ScorerKind::Rules => Ok(Box::new(RuleScorer::new())),
        ScorerKind::Llm => {
            let client = judge_client.ok_or_else(|| EvalError::MissingJudge {
                suite: suite.id.clone(),
            })?;
            Ok(Box::new(JudgeScorer::new(client, suite.llm_criteria.clone())))
        }
    }
}

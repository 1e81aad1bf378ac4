//! Deterministic rule scorer.
//!
//! Expectations expand into an ordered registry of independent checks, one
//! per predicate key present. Every check runs (no short-circuit) and a
//! failing check contributes exactly one reason naming the observed vs.
//! expected value. The verdict is passed iff zero reasons; the score is
//! binary — this scorer never awards partial credit.

use async_trait::async_trait;

use crate::error::Result;
use crate::scorer::{ScoreOutcome, Scorer};
use crate::suite::Expectations;

/// One declared predicate, ready to evaluate against a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    Contains(String),
    ContainsAny(Vec<String>),
    MaxLength(usize),
    MinLength(usize),
    MaxWords(usize),
    MinWords(usize),
    ExactWords(usize),
    ValidJson,
    JsonHasKeys(Vec<String>),
}

impl Check {
    /// Expand expectations into the checks they declare, in a fixed order.
    /// `llm_criteria` is not a rule predicate and never appears here.
    pub fn registry(expected: &Expectations) -> Vec<Check> {
        let mut checks = Vec::new();
        if let Some(needle) = &expected.contains {
            checks.push(Check::Contains(needle.clone()));
        }
        if let Some(needles) = &expected.contains_any {
            checks.push(Check::ContainsAny(needles.clone()));
        }
        if let Some(max) = expected.max_length {
            checks.push(Check::MaxLength(max));
        }
        if let Some(min) = expected.min_length {
            checks.push(Check::MinLength(min));
        }
        if let Some(max) = expected.max_words {
            checks.push(Check::MaxWords(max));
        }
        if let Some(min) = expected.min_words {
            checks.push(Check::MinWords(min));
        }
        if let Some(exact) = expected.exact_words {
            checks.push(Check::ExactWords(exact));
        }
        if expected.valid_json == Some(true) {
            checks.push(Check::ValidJson);
        }
        if let Some(keys) = &expected.json_has_keys {
            checks.push(Check::JsonHasKeys(keys.clone()));
        }
        checks
    }

    /// Evaluate against a response; a failing check yields its reason.
    pub fn evaluate(&self, response: &str) -> Option<String> {
        match self {
            Check::Contains(needle) => (!response.contains(needle.as_str()))
                .then(|| format!("Contains: expected '{needle}' not found")),

            Check::ContainsAny(needles) => {
                let found = needles.iter().any(|n| response.contains(n.as_str()));
                (!found).then(|| format!("Contains_any: none of {needles:?} found"))
            }

            Check::MaxLength(max) => {
                let len = response.chars().count();
                (len > *max).then(|| format!("Length: {len} exceeds max {max}"))
            }

            Check::MinLength(min) => {
                let len = response.chars().count();
                (len < *min).then(|| format!("Length: {len} below min {min}"))
            }

            Check::MaxWords(max) => {
                let words = word_count(response);
                (words > *max).then(|| format!("Word count: {words} exceeds max {max}"))
            }

            Check::MinWords(min) => {
                let words = word_count(response);
                (words < *min).then(|| format!("Word count: {words} below min {min}"))
            }

            Check::ExactWords(exact) => {
                let words = word_count(response);
                (words != *exact).then(|| format!("Word count: {words} != expected {exact}"))
            }

            Check::ValidJson => serde_json::from_str::<serde_json::Value>(response)
                .is_err()
                .then(|| "JSON: invalid JSON".to_string()),

            Check::JsonHasKeys(keys) => {
                match serde_json::from_str::<serde_json::Value>(response) {
                    Err(_) => Some("JSON keys: cannot parse JSON".to_string()),
                    Ok(value) => {
                        let missing: Vec<&String> = keys
                            .iter()
                            .filter(|k| value.get(k.as_str()).is_none())
                            .collect();
                        (!missing.is_empty())
                            .then(|| format!("JSON keys: missing {missing:?}"))
                    }
                }
            }
        }
    }
}

fn word_count(response: &str) -> usize {
    response.split_whitespace().count()
}

/// Scorer evaluating the declared check registry against a response.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleScorer;

impl RuleScorer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scorer for RuleScorer {
    async fn score(
        &self,
        _prompt: &str,
        response: &str,
        expected: &Expectations,
    ) -> Result<ScoreOutcome> {
        let reasons: Vec<String> = Check::registry(expected)
            .iter()
            .filter_map(|check| check.evaluate(response))
            .collect();
        Ok(ScoreOutcome::from_reasons(reasons))
    }
}

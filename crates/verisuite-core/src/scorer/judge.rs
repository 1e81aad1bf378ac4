//! LLM-as-judge scorer.
//!
//! Delegates the verdict to a second model invocation. The judge is asked
//! for a minimal JSON answer (`{"passed": bool, "reasoning": string}`); when
//! that answer cannot be parsed, the scorer degrades to a substring
//! heuristic on the raw judge text and marks the reason so operators can
//! tell "judge said no" apart from "could not parse the judge's answer".

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use verisuite_client::{ModelClient, ModelRequest};

use crate::error::Result;
use crate::scorer::{ScoreOutcome, Scorer};
use crate::suite::Expectations;

/// Judge model used when no explicit judge is configured. Deliberately a
/// fixed, strong model independent of whatever model is under evaluation.
pub const DEFAULT_JUDGE_MODEL: &str = "gpt-4.1";

/// System instruction for the judge invocation.
pub const JUDGE_SYSTEM_PROMPT: &str = "\
You are an evaluation judge. Your task is to assess whether an AI assistant's \
response meets the specified criteria.

You will be given:
1. The original prompt sent to the assistant
2. The assistant's response
3. Evaluation criteria

Evaluate the response against the criteria and return a JSON object with:
- \"passed\": boolean (true if the response meets the criteria, false otherwise)
- \"reasoning\": string (brief explanation of your judgment)

Return ONLY the JSON object, no other text.";

/// Longest judge-text excerpt recorded on the degraded path.
const UNPARSED_EXCERPT_CHARS: usize = 200;

fn judge_prompt(prompt: &str, response: &str, criteria: &str) -> String {
    format!(
        "## Original Prompt\n{prompt}\n\n\
         ## Assistant's Response\n{response}\n\n\
         ## Evaluation Criteria\n{criteria}\n\n\
         Evaluate the response and return your judgment as JSON."
    )
}

/// The structured answer the judge is instructed to return.
#[derive(Debug, Deserialize)]
struct JudgeVerdict {
    passed: Option<bool>,
    reasoning: Option<String>,
}

/// Scorer that delegates pass/fail to a judge model.
pub struct JudgeScorer {
    client: Arc<dyn ModelClient>,
    suite_criteria: Option<String>,
}

impl JudgeScorer {
    /// Create a judge scorer. `suite_criteria` is the suite-level default,
    /// overridden by case-level `llm_criteria` when present.
    pub fn new(client: Arc<dyn ModelClient>, suite_criteria: Option<String>) -> Self {
        Self {
            client,
            suite_criteria,
        }
    }

    fn resolve_criteria<'a>(&'a self, expected: &'a Expectations) -> Option<&'a str> {
        expected
            .llm_criteria
            .as_deref()
            .or(self.suite_criteria.as_deref())
            .filter(|c| !c.is_empty())
    }

    /// Interpret the judge's raw answer. Well-formed JSON with a boolean
    /// `passed` is the normal path; anything else falls back to the
    /// substring heuristic, explicitly flagged in the reason.
    fn interpret(judge_text: &str) -> ScoreOutcome {
        if let Ok(verdict) = serde_json::from_str::<JudgeVerdict>(judge_text) {
            if let Some(passed) = verdict.passed {
                let reasoning = verdict
                    .reasoning
                    .unwrap_or_else(|| "No reasoning provided".to_string());
                return ScoreOutcome::verdict(passed, vec![reasoning]);
            }
        }

        warn!("judge answer not parseable, falling back to substring heuristic");
        let lowered = judge_text.to_lowercase();
        let passed = lowered.contains("true") && lowered.contains("passed");
        let excerpt: String = judge_text.chars().take(UNPARSED_EXCERPT_CHARS).collect();
        ScoreOutcome::verdict(passed, vec![format!("Judge response (unparsed): {excerpt}")])
    }
}

#[async_trait]
impl Scorer for JudgeScorer {
    async fn score(
        &self,
        prompt: &str,
        response: &str,
        expected: &Expectations,
    ) -> Result<ScoreOutcome> {
        // A scoring decision is still owed when criteria are missing: fail
        // closed rather than silently pass or abort the run.
        let Some(criteria) = self.resolve_criteria(expected) else {
            return Ok(ScoreOutcome::verdict(
                false,
                vec!["no llm_criteria provided for judge scoring".to_string()],
            ));
        };

        let request = ModelRequest::new(judge_prompt(prompt, response, criteria))
            .with_system_prompt(JUDGE_SYSTEM_PROMPT);
        let judge_response = self.client.generate(&request).await?;

        Ok(Self::interpret(&judge_response.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verisuite_client::ScriptedClient;

    fn scorer_with(responses: Vec<&str>, suite_criteria: Option<&str>) -> JudgeScorer {
        let client = Arc::new(ScriptedClient::new(
            "judge-model",
            responses.into_iter().map(String::from).collect(),
        ));
        JudgeScorer::new(client, suite_criteria.map(String::from))
    }

    fn criteria(text: &str) -> Expectations {
        Expectations {
            llm_criteria: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn parsed_verdict_is_binary_with_reasoning() {
        let scorer = scorer_with(
            vec![r#"{"passed": true, "reasoning": "Polite and concise."}"#],
            None,
        );
        let outcome = scorer
            .score("Say hello.", "Hello!", &criteria("Response is polite."))
            .await
            .unwrap();

        assert!(outcome.passed);
        assert_eq!(outcome.score, 1.0);
        assert_eq!(outcome.reasons, vec!["Polite and concise."]);
    }

    #[tokio::test]
    async fn parsed_failure_keeps_judge_reasoning() {
        let scorer = scorer_with(
            vec![r#"{"passed": false, "reasoning": "Response is rude."}"#],
            None,
        );
        let outcome = scorer
            .score("Say hello.", "Go away.", &criteria("Response is polite."))
            .await
            .unwrap();

        assert!(!outcome.passed);
        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.reasons, vec!["Response is rude."]);
    }

    #[tokio::test]
    async fn unparseable_answer_uses_flagged_heuristic() {
        let scorer = scorer_with(vec!["I think this passed: true overall"], None);
        let outcome = scorer
            .score("p", "r", &criteria("anything"))
            .await
            .unwrap();

        assert!(outcome.passed);
        assert!(outcome.reasons[0].starts_with("Judge response (unparsed):"));
    }

    #[tokio::test]
    async fn json_without_passed_field_degrades_to_heuristic() {
        let scorer = scorer_with(vec![r#"{"reasoning": "looks fine"}"#], None);
        let outcome = scorer
            .score("p", "r", &criteria("anything"))
            .await
            .unwrap();

        // Heuristic finds neither "true" nor "passed" in the raw text.
        assert!(!outcome.passed);
        assert!(outcome.reasons[0].starts_with("Judge response (unparsed):"));
    }

    #[tokio::test]
    async fn missing_criteria_fails_closed_without_invoking_judge() {
        let client = Arc::new(ScriptedClient::new("judge-model", vec![]));
        let scorer = JudgeScorer::new(client.clone(), None);

        let outcome = scorer
            .score("p", "r", &Expectations::default())
            .await
            .unwrap();

        assert!(!outcome.passed);
        assert_eq!(outcome.score, 0.0);
        assert_eq!(
            outcome.reasons,
            vec!["no llm_criteria provided for judge scoring"]
        );
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn case_criteria_take_precedence_over_suite_criteria() {
        let client = Arc::new(ScriptedClient::single(
            "judge-model",
            r#"{"passed": true, "reasoning": "ok"}"#,
        ));
        let scorer = JudgeScorer::new(client.clone(), Some("suite-level criteria".to_string()));

        scorer
            .score("p", "r", &criteria("case-level criteria"))
            .await
            .unwrap();

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("case-level criteria"));
        assert!(!requests[0].prompt.contains("suite-level criteria"));
    }

    #[tokio::test]
    async fn suite_criteria_apply_when_case_declares_none() {
        let scorer = scorer_with(
            vec![r#"{"passed": true, "reasoning": "ok"}"#],
            Some("suite-level criteria"),
        );

        let outcome = scorer
            .score("p", "r", &Expectations::default())
            .await
            .unwrap();
        assert!(outcome.passed);
    }
}

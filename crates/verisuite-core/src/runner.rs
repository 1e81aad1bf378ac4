//! Suite execution.
//!
//! Runs every case of a suite against one model, strictly sequentially:
//! each case's model invocation and scoring completes before the next case
//! begins. Any client or scorer error aborts the whole run and propagates.

use std::path::Path;
use std::sync::Arc;

use verisuite_client::{ModelClient, ModelRequest};

use eval_ledger::{EvalResult, EvalRun};

use crate::error::Result;
use crate::git::capture_commit_hash;
use crate::obs;
use crate::prompts::PromptLibrary;
use crate::scorer::Scorer;
use crate::suite::EvalSuite;

/// Default directory for the system-prompt library.
pub const DEFAULT_PROMPTS_DIR: &str = "system_prompts";

/// A requested system prompt: a name and, optionally, a pinned version.
#[derive(Debug, Clone)]
pub struct PromptSelection {
    pub name: String,
    /// Pinned version; latest when `None`.
    pub version: Option<String>,
}

/// Executes suites case-by-case against one model.
pub struct SuiteRunner {
    client: Arc<dyn ModelClient>,
    scorer: Box<dyn Scorer>,
    prompts: PromptLibrary,
}

impl SuiteRunner {
    /// Create a runner with the default prompt library location.
    pub fn new(client: Arc<dyn ModelClient>, scorer: Box<dyn Scorer>) -> Self {
        Self {
            client,
            scorer,
            prompts: PromptLibrary::open(DEFAULT_PROMPTS_DIR),
        }
    }

    /// Override the system-prompt library.
    pub fn with_prompt_library(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = prompts;
        self
    }

    /// Execute `suite`, producing an unsaved run (revision unassigned).
    ///
    /// A requested system prompt is resolved once, before the first case,
    /// so an unknown prompt name fails the run up front rather than after
    /// paid model invocations.
    pub async fn run(
        &self,
        suite: &EvalSuite,
        system_prompt: Option<&PromptSelection>,
    ) -> Result<EvalRun> {
        let _span = obs::EvalSpan::enter(&suite.id, self.client.model());
        obs::emit_run_started(
            &suite.id,
            self.client.model(),
            suite.cases.len(),
            &suite.digest(),
        );

        let resolved = match system_prompt {
            Some(selection) => {
                let (content, version) = self
                    .prompts
                    .resolve(&selection.name, selection.version.as_deref())?;
                Some((selection.name.clone(), version, content))
            }
            None => None,
        };

        let mut results: Vec<EvalResult> = Vec::with_capacity(suite.cases.len());
        let mut model_name: Option<String> = None;

        for case in &suite.cases {
            let mut request = ModelRequest::new(case.prompt.clone());
            if let Some((_, _, content)) = &resolved {
                request = request.with_system_prompt(content.clone());
            }

            let response = self.client.generate(&request).await?;
            model_name = Some(response.model.clone());

            let outcome = self
                .scorer
                .score(&case.prompt, &response.content, &case.expected)
                .await?;
            obs::emit_case_scored(
                &case.id,
                outcome.passed,
                outcome.score,
                outcome.reasons.len(),
            );

            let mut result = EvalResult::new(
                &suite.id,
                &case.id,
                &response.model,
                &case.prompt,
                &response.content,
                outcome.passed,
                outcome.score,
                outcome.reasons,
            );
            if let Some((name, version, _)) = &resolved {
                result = result.with_system_prompt(name.clone(), Some(version.clone()));
            }
            results.push(result);
        }

        let mut run = EvalRun::new(
            &suite.id,
            model_name.unwrap_or_else(|| self.client.model().to_string()),
            results,
        );
        if let Some((name, version, _)) = &resolved {
            run.system_prompt_name = Some(name.clone());
            run.system_prompt_version = Some(version.clone());
        }
        run.git_commit_hash = capture_commit_hash(Path::new("."));

        obs::emit_run_finished(&run.id.to_string(), run.passed_count(), run.results.len());
        Ok(run)
    }
}

//! Verisuite Core Library
//!
//! Suites, scorer dispatch, suite execution, and run comparison for the
//! Verisuite LLM evaluation harness.

pub mod compare;
pub mod error;
pub mod git;
pub mod obs;
pub mod prompts;
pub mod report;
pub mod runner;
pub mod scorer;
pub mod suite;
pub mod telemetry;

pub use compare::{compare_runs, CaseComparison, RunComparison, DEFAULT_SCORE_THRESHOLD};
pub use error::{EvalError, Result};
pub use git::capture_commit_hash;
pub use prompts::PromptLibrary;
pub use report::{render_comparison, render_run, render_run_listing};
pub use runner::{PromptSelection, SuiteRunner, DEFAULT_PROMPTS_DIR};
pub use scorer::{scorer_for_suite, JudgeScorer, RuleScorer, ScoreOutcome, Scorer, DEFAULT_JUDGE_MODEL};
pub use suite::{load_suite, load_suite_str, suite_paths, EvalCase, EvalSuite, Expectations, ScorerKind};
pub use telemetry::init_tracing;

pub use eval_ledger::{EvalResult, EvalRun, FsRunStore, MemoryRunStore, RunStore, StorageError};

/// Verisuite version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Verisuite - LLM evaluation harness CLI
//!
//! The `verisuite` command runs declarative evaluation suites against one or
//! more models and keeps an append-only ledger of scored runs.
//!
//! ## Commands
//!
//! - `run`: Evaluate a suite (or a directory of suites) against models
//! - `list`: Show stored runs, newest first
//! - `compare`: Classify per-case movement between two stored runs
//! - `serve`: Expose the run ledger over a read-only HTTP API

mod api;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use uuid::Uuid;

use eval_ledger::{EvalRun, FsRunStore, RunStore, DEFAULT_STORE_DIR};
use verisuite_client::{client_for_model, ModelClient};
use verisuite_core::{
    compare_runs, load_suite, render_comparison, render_run, render_run_listing, scorer_for_suite,
    suite_paths, PromptLibrary, PromptSelection, ScorerKind, SuiteRunner, DEFAULT_JUDGE_MODEL,
    DEFAULT_PROMPTS_DIR, DEFAULT_SCORE_THRESHOLD,
};

#[derive(Parser)]
#[command(name = "verisuite")]
#[command(author = "Verisuite Maintainers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LLM evaluation harness with an append-only run ledger", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding the run ledger
    #[arg(long, global = true, default_value = DEFAULT_STORE_DIR)]
    store_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a suite against one or more models and record the runs
    Run {
        /// Path to a suite YAML file
        #[arg(short, long, conflicts_with = "all_suites")]
        suite: Option<PathBuf>,

        /// Evaluate every suite in the suites directory
        #[arg(long)]
        all_suites: bool,

        /// Directory scanned by --all-suites
        #[arg(long, default_value = "suites")]
        suites_dir: PathBuf,

        /// Model to evaluate (repeatable)
        #[arg(short, long, default_value = "gpt-4o-mini")]
        model: Vec<String>,

        /// Model used for llm-scored suites, independent of the models
        /// under evaluation
        #[arg(long, default_value = DEFAULT_JUDGE_MODEL)]
        judge_model: String,

        /// Named system prompt to apply to every case
        #[arg(long)]
        system_prompt: Option<String>,

        /// System prompt version (latest if omitted)
        #[arg(long, requires = "system_prompt")]
        system_prompt_version: Option<String>,

        /// Directory holding versioned system prompt files
        #[arg(long, default_value = DEFAULT_PROMPTS_DIR)]
        prompts_dir: PathBuf,
    },

    /// List stored runs, newest first
    List {
        /// Only show runs for this suite
        #[arg(short, long)]
        suite: Option<String>,
    },

    /// Compare two stored runs case by case
    Compare {
        /// Run ID of the baseline
        baseline: String,

        /// Run ID of the current run
        current: String,

        /// Score delta (exclusive) above which a both-passed case moves
        #[arg(short, long, default_value_t = DEFAULT_SCORE_THRESHOLD)]
        threshold: f64,
    },

    /// Serve the run ledger over a read-only HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: SocketAddr,

        /// Directory holding versioned system prompt files
        #[arg(long, default_value = DEFAULT_PROMPTS_DIR)]
        prompts_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    verisuite_core::init_tracing(cli.json, level);

    let store = FsRunStore::new(&cli.store_dir);

    match cli.command {
        Commands::Run {
            suite,
            all_suites,
            suites_dir,
            model,
            judge_model,
            system_prompt,
            system_prompt_version,
            prompts_dir,
        } => {
            let paths = resolve_suite_paths(suite, all_suites, &suites_dir)?;
            let selection = system_prompt.map(|name| PromptSelection {
                name,
                version: system_prompt_version,
            });
            cmd_run(
                &store,
                &paths,
                &model,
                &judge_model,
                selection.as_ref(),
                &prompts_dir,
            )
            .await
        }
        Commands::List { suite } => cmd_list(&store, suite.as_deref()).await,
        Commands::Compare {
            baseline,
            current,
            threshold,
        } => cmd_compare(&store, &baseline, &current, threshold).await,
        Commands::Serve { addr, prompts_dir } => {
            api::serve(addr, Arc::new(store), prompts_dir).await
        }
    }
}

/// Turn the run-command flags into a concrete list of suite files.
fn resolve_suite_paths(
    suite: Option<PathBuf>,
    all_suites: bool,
    suites_dir: &Path,
) -> Result<Vec<PathBuf>> {
    if let Some(path) = suite {
        return Ok(vec![path]);
    }
    if !all_suites {
        bail!("nothing to run: pass --suite <file> or --all-suites");
    }
    let paths = suite_paths(suites_dir)
        .with_context(|| format!("Failed to scan suites directory: {:?}", suites_dir))?;
    if paths.is_empty() {
        bail!("no suite files found in {:?}", suites_dir);
    }
    Ok(paths)
}

/// Evaluate each suite against every requested model.
///
/// All runs produced for one suite in this invocation are saved as a single
/// batch, so they share a revision number. The judge for llm-scored suites
/// is its own client for `judge_model`, never the model under evaluation.
async fn cmd_run(
    store: &dyn RunStore,
    suite_files: &[PathBuf],
    models: &[String],
    judge_model: &str,
    selection: Option<&PromptSelection>,
    prompts_dir: &Path,
) -> Result<()> {
    for path in suite_files {
        let suite =
            load_suite(path).with_context(|| format!("Failed to load suite: {:?}", path))?;
        info!(suite_id = %suite.id, models = models.len(), "evaluating suite");

        let judge_client: Option<Arc<dyn ModelClient>> = match suite.scorer {
            ScorerKind::Llm => Some(Arc::from(client_for_model(judge_model).with_context(
                || format!("Failed to build judge client for model '{}'", judge_model),
            )?)),
            ScorerKind::Rules => None,
        };

        let mut batch: Vec<EvalRun> = Vec::with_capacity(models.len());
        for model in models {
            let client: Arc<dyn ModelClient> = Arc::from(
                client_for_model(model)
                    .with_context(|| format!("Failed to build client for model '{}'", model))?,
            );
            let scorer = scorer_for_suite(&suite, judge_client.clone())
                .with_context(|| format!("Failed to build scorer for suite '{}'", suite.id))?;

            let runner = SuiteRunner::new(client, scorer)
                .with_prompt_library(PromptLibrary::open(prompts_dir));
            let run = runner
                .run(&suite, selection)
                .await
                .with_context(|| format!("Evaluation failed for model '{}'", model))?;
            batch.push(run);
        }

        let saved = store
            .save_batch(batch)
            .await
            .context("Failed to save runs")?;
        for run in &saved {
            verisuite_core::obs::emit_run_saved(&run.id.to_string(), run.revision);
            println!("{}", render_run(run));
        }
    }

    Ok(())
}

/// List stored runs, newest first, optionally filtered by suite
async fn cmd_list(store: &dyn RunStore, suite: Option<&str>) -> Result<()> {
    let runs = store
        .list_runs(suite)
        .await
        .context("Failed to read the run ledger")?;
    print!("{}", render_run_listing(&runs));
    Ok(())
}

/// Compare two stored runs case by case
async fn cmd_compare(
    store: &dyn RunStore,
    baseline: &str,
    current: &str,
    threshold: f64,
) -> Result<()> {
    let baseline_id = parse_run_id(baseline)?;
    let current_id = parse_run_id(current)?;

    let baseline_run = store
        .get_run(&baseline_id)
        .await
        .with_context(|| format!("Baseline run not found: {}", baseline))?;
    let current_run = store
        .get_run(&current_id)
        .await
        .with_context(|| format!("Current run not found: {}", current))?;

    let comparison = compare_runs(&baseline_run, &current_run, threshold)?;
    print!("{}", render_comparison(&comparison, &baseline_run, &current_run));
    Ok(())
}

fn parse_run_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("Invalid run ID: '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eval_ledger::EvalResult;
    use verisuite_core::load_suite_str;

    fn stored_run(suite_id: &str, passed: bool) -> EvalRun {
        let score = if passed { 1.0 } else { 0.0 };
        let reasons = if passed {
            vec![]
        } else {
            vec!["Contains: expected '4' not found".to_string()]
        };
        let result = EvalResult::new(suite_id, "math", "test-model", "2 + 2?", "4", passed, score, reasons);
        EvalRun::new(suite_id, "test-model", vec![result])
    }

    #[tokio::test]
    async fn compare_rejects_unknown_run_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRunStore::new(dir.path());

        let missing = Uuid::new_v4().to_string();
        let err = cmd_compare(&store, &missing, &missing, DEFAULT_SCORE_THRESHOLD)
            .await
            .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Baseline run not found"), "unexpected error: {msg}");
    }

    #[tokio::test]
    async fn compare_rejects_malformed_run_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRunStore::new(dir.path());

        let err = cmd_compare(&store, "not-a-uuid", "also-not", DEFAULT_SCORE_THRESHOLD)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Invalid run ID"));
    }

    #[tokio::test]
    async fn compare_rejects_runs_from_different_suites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRunStore::new(dir.path());

        let a = store.save_run(stored_run("suite-a", true)).await.unwrap();
        let b = store.save_run(stored_run("suite-b", true)).await.unwrap();

        let err = cmd_compare(
            &store,
            &a.id.to_string(),
            &b.id.to_string(),
            DEFAULT_SCORE_THRESHOLD,
        )
        .await
        .unwrap_err();
        assert!(format!("{err:#}").contains("cannot compare runs from different suites"));
    }

    #[tokio::test]
    async fn compare_prints_for_matching_suites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRunStore::new(dir.path());

        let a = store.save_run(stored_run("suite-a", true)).await.unwrap();
        let b = store.save_run(stored_run("suite-a", false)).await.unwrap();

        cmd_compare(
            &store,
            &a.id.to_string(),
            &b.id.to_string(),
            DEFAULT_SCORE_THRESHOLD,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn list_tolerates_an_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRunStore::new(dir.path());

        cmd_list(&store, None).await.unwrap();
        cmd_list(&store, Some("quick-test")).await.unwrap();
    }

    #[test]
    fn resolve_requires_a_suite_source() {
        let err = resolve_suite_paths(None, false, Path::new("suites")).unwrap_err();
        assert!(format!("{err}").contains("nothing to run"));
    }

    #[test]
    fn resolve_prefers_an_explicit_suite_file() {
        let paths =
            resolve_suite_paths(Some(PathBuf::from("demo.yaml")), false, Path::new("suites"))
                .unwrap();
        assert_eq!(paths, vec![PathBuf::from("demo.yaml")]);
    }

    #[test]
    fn resolve_scans_the_suites_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.yaml"), "id: b\ncases: []").unwrap();
        std::fs::write(dir.path().join("a.yaml"), "id: a\ncases: []").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let paths = resolve_suite_paths(None, true, dir.path()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("a.yaml"));
        assert!(paths[1].ends_with("b.yaml"));

        // Sanity: the scanned files actually parse as suites.
        for p in &paths {
            let content = std::fs::read_to_string(p).unwrap();
            load_suite_str(&content).unwrap();
        }
    }

    #[test]
    fn resolve_rejects_an_empty_suites_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_suite_paths(None, true, dir.path()).unwrap_err();
        assert!(format!("{err}").contains("no suite files found"));
    }

    #[test]
    fn run_defaults_to_the_fixed_judge_model() {
        let cli = Cli::try_parse_from(["verisuite", "run", "--suite", "tone.yaml"]).unwrap();
        match cli.command {
            Commands::Run {
                judge_model, model, ..
            } => {
                assert_eq!(judge_model, DEFAULT_JUDGE_MODEL);
                // The candidate default is a different model entirely.
                assert_ne!(model, vec![judge_model]);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn judge_model_is_overridable() {
        let cli = Cli::try_parse_from([
            "verisuite",
            "run",
            "--suite",
            "tone.yaml",
            "--judge-model",
            "gpt-5",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { judge_model, .. } => assert_eq!(judge_model, "gpt-5"),
            _ => panic!("expected run command"),
        }
    }
}

//! Read-only HTTP API over the run ledger.
//!
//! Serves the same data the CLI prints, as JSON, for dashboards and other
//! front-ends:
//!
//! - `GET /api/runs` — run summaries, newest first
//! - `GET /api/runs/{run_id}` — one full run document (404 when missing)
//! - `GET /api/compare?baseline=..&current=..` — case-by-case comparison
//!   (404 for a missing side, 400 for a suite mismatch)
//! - `GET /api/system-prompts` — prompt names with their versions
//!
//! The API never mutates the ledger; runs are only written by `run`.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use eval_ledger::{EvalRun, RunStore, StorageError};
use verisuite_core::{compare_runs, PromptLibrary, DEFAULT_SCORE_THRESHOLD};

#[derive(Clone)]
pub struct ApiState {
    store: Arc<dyn RunStore>,
    prompts_dir: PathBuf,
}

/// One line of the run listing.
#[derive(Debug, Serialize)]
struct RunSummary {
    id: Uuid,
    suite_id: String,
    model: String,
    timestamp: String,
    passed: usize,
    total: usize,
    system_prompt_name: Option<String>,
    system_prompt_version: Option<String>,
}

impl From<&EvalRun> for RunSummary {
    fn from(run: &EvalRun) -> Self {
        Self {
            id: run.id,
            suite_id: run.suite_id.clone(),
            model: run.model.clone(),
            timestamp: run.timestamp.to_rfc3339(),
            passed: run.passed_count(),
            total: run.results.len(),
            system_prompt_name: run.system_prompt_name.clone(),
            system_prompt_version: run.system_prompt_version.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompareQuery {
    baseline: String,
    current: String,
}

#[derive(Debug, Serialize)]
struct PromptVersions {
    versions: Vec<String>,
    latest: Option<String>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/runs", get(list_runs))
        .route("/api/runs/:run_id", get(get_run))
        .route("/api/compare", get(compare))
        .route("/api/system-prompts", get(system_prompts))
        .with_state(state)
}

/// Bind `addr` and serve the API until the process is stopped.
pub async fn serve(addr: SocketAddr, store: Arc<dyn RunStore>, prompts_dir: PathBuf) -> Result<()> {
    let app = router(ApiState { store, prompts_dir });
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "serving eval API");
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}

fn error_body(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "detail": detail.into() })),
    )
        .into_response()
}

/// Look a run up by its raw id. A malformed id is indistinguishable from an
/// absent run; only genuine storage failures surface as errors.
async fn fetch_run(store: &dyn RunStore, raw: &str) -> Result<Option<EvalRun>, StorageError> {
    let Ok(id) = Uuid::parse_str(raw) else {
        return Ok(None);
    };
    match store.get_run(&id).await {
        Ok(run) => Ok(Some(run)),
        Err(StorageError::RunNotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

async fn list_runs(State(state): State<ApiState>) -> Response {
    match state.store.list_runs(None).await {
        Ok(runs) => Json(runs.iter().map(RunSummary::from).collect::<Vec<_>>()).into_response(),
        Err(e) => error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn get_run(State(state): State<ApiState>, Path(run_id): Path<String>) -> Response {
    match fetch_run(state.store.as_ref(), &run_id).await {
        Ok(Some(run)) => Json(run).into_response(),
        Ok(None) => error_body(StatusCode::NOT_FOUND, "Run not found"),
        Err(e) => error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn compare(State(state): State<ApiState>, Query(query): Query<CompareQuery>) -> Response {
    let baseline = match fetch_run(state.store.as_ref(), &query.baseline).await {
        Ok(Some(run)) => run,
        Ok(None) => {
            return error_body(
                StatusCode::NOT_FOUND,
                format!("Baseline run '{}' not found", query.baseline),
            )
        }
        Err(e) => return error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    let current = match fetch_run(state.store.as_ref(), &query.current).await {
        Ok(Some(run)) => run,
        Ok(None) => {
            return error_body(
                StatusCode::NOT_FOUND,
                format!("Current run '{}' not found", query.current),
            )
        }
        Err(e) => return error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    match compare_runs(&baseline, &current, DEFAULT_SCORE_THRESHOLD) {
        Ok(comparison) => Json(comparison).into_response(),
        Err(e) => error_body(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

async fn system_prompts(State(state): State<ApiState>) -> Response {
    let library = PromptLibrary::open(&state.prompts_dir);
    let catalog = || -> verisuite_core::Result<BTreeMap<String, PromptVersions>> {
        let mut out = BTreeMap::new();
        for name in library.list()? {
            let versions = library.versions(&name)?;
            let latest = versions.last().cloned();
            out.insert(name, PromptVersions { versions, latest });
        }
        Ok(out)
    };

    match catalog() {
        Ok(map) => Json(map).into_response(),
        Err(e) => error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

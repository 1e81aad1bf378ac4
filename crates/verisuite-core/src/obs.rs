//! Structured observability hooks for eval run lifecycle events.
//!
//! Events are emitted at `info!` level through the global `tracing`
//! subscriber; [`crate::telemetry::init_tracing`] configures formatting.

use tracing::info;

/// RAII guard that enters a suite-scoped tracing span for the duration of a
/// run, so every emission inside carries the suite and model fields.
pub struct EvalSpan {
    _span: tracing::span::EnteredSpan,
}

impl EvalSpan {
    /// Create and enter a span tagged with the suite and target model.
    pub fn enter(suite_id: &str, model: &str) -> Self {
        let span = tracing::info_span!("verisuite.run", suite_id = %suite_id, model = %model);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: suite run started.
pub fn emit_run_started(suite_id: &str, model: &str, case_count: usize, suite_digest: &str) {
    info!(
        event = "run.started",
        suite_id = %suite_id,
        model = %model,
        case_count = case_count,
        suite_digest = %suite_digest,
    );
}

/// Emit event: one case scored.
pub fn emit_case_scored(case_id: &str, passed: bool, score: f64, reason_count: usize) {
    info!(
        event = "case.scored",
        case_id = %case_id,
        passed = passed,
        score = score,
        reason_count = reason_count,
    );
}

/// Emit event: suite run finished with aggregate counts.
pub fn emit_run_finished(run_id: &str, passed: usize, total: usize) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        passed = passed,
        total = total,
    );
}

/// Emit event: a run was persisted with its assigned revision.
pub fn emit_run_saved(run_id: &str, revision: Option<u64>) {
    info!(event = "run.saved", run_id = %run_id, revision = ?revision);
}

//! Plain-text rendering of runs and comparisons for CLI output.

use std::fmt::Write as _;

use eval_ledger::EvalRun;

use crate::compare::RunComparison;

fn pass_label(passed: bool) -> &'static str {
    if passed {
        "PASS"
    } else {
        "FAIL"
    }
}

fn optional_status(passed: Option<bool>) -> &'static str {
    match passed {
        Some(p) => pass_label(p),
        None => "?",
    }
}

fn optional_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{s:.1}"),
        None => "?".to_string(),
    }
}

/// Render one run: header plus a PASS/FAIL line per case with reasons.
pub fn render_run(run: &EvalRun) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Suite: {}", run.suite_id);
    let _ = writeln!(out, "Model: {}", run.model);
    if let Some(name) = &run.system_prompt_name {
        let version = run
            .system_prompt_version
            .as_deref()
            .map(|v| format!(" ({v})"))
            .unwrap_or_default();
        let _ = writeln!(out, "System Prompt: {name}{version}");
    }
    let _ = writeln!(out, "Results: {} case(s)", run.results.len());
    let _ = writeln!(out);

    for result in &run.results {
        let _ = writeln!(out, "[{}] {}", pass_label(result.passed), result.case_id);
        let _ = writeln!(out, "  Prompt: {}", result.prompt);
        let _ = writeln!(out, "  Response: {}", result.response);
        if !result.reasons.is_empty() {
            let _ = writeln!(out, "  Reasons: {:?}", result.reasons);
        }
    }
    out
}

/// Render a comparison: aggregate counts plus a labelled line per case.
pub fn render_comparison(
    comparison: &RunComparison,
    baseline: &EvalRun,
    current: &EvalRun,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Comparing runs:");
    let _ = writeln!(
        out,
        "  Baseline: {} ({}, {})",
        baseline.id,
        baseline.model,
        baseline.timestamp.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(
        out,
        "  Current:  {} ({}, {})",
        current.id,
        current.model,
        current.timestamp.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Regressions: {} | Improvements: {} | Unchanged: {}",
        comparison.regressions, comparison.improvements, comparison.unchanged
    );
    let _ = writeln!(out);

    for case in &comparison.cases {
        let label = if case.regression {
            "REGRESSION"
        } else if case.improvement {
            "IMPROVEMENT"
        } else {
            "UNCHANGED"
        };
        let _ = writeln!(out, "[{label}] {}", case.case_id);
        let _ = writeln!(
            out,
            "  {} ({}) -> {} ({})",
            optional_status(case.baseline_passed),
            optional_score(case.baseline_score),
            optional_status(case.current_passed),
            optional_score(case.current_score),
        );
    }
    out
}

/// Render the stored-run listing, newest first.
pub fn render_run_listing(runs: &[EvalRun]) -> String {
    if runs.is_empty() {
        return "No stored runs found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Stored runs ({}):", runs.len());
    let _ = writeln!(out);
    for run in runs {
        let _ = writeln!(out, "  {}", run.id);
        let _ = writeln!(out, "    Suite: {} | Model: {}", run.suite_id, run.model);
        let revision = run
            .revision
            .map(|r| format!(" | Revision: {r}"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "    Results: {}/{} passed | {}{revision}",
            run.passed_count(),
            run.results.len(),
            run.timestamp.format("%Y-%m-%d %H:%M"),
        );
        let _ = writeln!(out);
    }
    out
}

//! Run comparison engine.
//!
//! Compares two persisted runs of the same suite and classifies every case
//! as regression, improvement, or unchanged. Classification is two-tier:
//! pass/fail transitions always win, and score deltas are only consulted
//! when both sides passed. Output is ordered by case id so comparisons are
//! deterministic.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use eval_ledger::{EvalResult, EvalRun};

use crate::error::{EvalError, Result};

/// Default score delta a case may move without being classified.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.1;

/// Per-case verdict of a run comparison.
///
/// A case missing from one run leaves that side's fields `None`; such cases
/// carry insufficient data to classify and count as unchanged. The two
/// booleans are mutually exclusive and both false for "unchanged".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseComparison {
    pub case_id: String,
    pub baseline_passed: Option<bool>,
    pub current_passed: Option<bool>,
    pub baseline_score: Option<f64>,
    pub current_score: Option<f64>,
    pub regression: bool,
    pub improvement: bool,
}

/// Aggregate outcome of comparing two runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunComparison {
    pub baseline_run_id: Uuid,
    pub current_run_id: Uuid,
    /// Per-case verdicts, sorted by case id.
    pub cases: Vec<CaseComparison>,
    pub regressions: usize,
    pub improvements: usize,
    pub unchanged: usize,
}

/// Classify a single case given both sides, where either may be absent.
fn classify(
    baseline: Option<&EvalResult>,
    current: Option<&EvalResult>,
    score_threshold: f64,
) -> (bool, bool) {
    let (Some(baseline), Some(current)) = (baseline, current) else {
        // One-sided cases cannot be compared.
        return (false, false);
    };

    match (baseline.passed, current.passed) {
        // Pass/fail transitions always win, regardless of scores.
        (true, false) => (true, false),
        (false, true) => (false, true),
        // Score deltas only matter between two passing results; the
        // threshold itself is still "unchanged".
        (true, true) => {
            let delta = current.score - baseline.score;
            if delta < -score_threshold {
                (true, false)
            } else if delta > score_threshold {
                (false, true)
            } else {
                (false, false)
            }
        }
        // Failure scores are not compared.
        (false, false) => (false, false),
    }
}

/// Compare two runs of the same suite.
///
/// Fails with [`EvalError::SuiteMismatch`] when the runs belong to different
/// suites — comparing across suites is meaningless and never silently
/// proceeds.
pub fn compare_runs(
    baseline: &EvalRun,
    current: &EvalRun,
    score_threshold: f64,
) -> Result<RunComparison> {
    if baseline.suite_id != current.suite_id {
        return Err(EvalError::SuiteMismatch {
            baseline: baseline.suite_id.clone(),
            current: current.suite_id.clone(),
        });
    }

    let baseline_results: HashMap<&str, &EvalResult> = baseline
        .results
        .iter()
        .map(|r| (r.case_id.as_str(), r))
        .collect();
    let current_results: HashMap<&str, &EvalResult> = current
        .results
        .iter()
        .map(|r| (r.case_id.as_str(), r))
        .collect();

    // Union of case ids; suites evolve, so one-sided cases are legitimate.
    let all_case_ids: BTreeSet<&str> = baseline_results
        .keys()
        .chain(current_results.keys())
        .copied()
        .collect();

    let mut cases = Vec::with_capacity(all_case_ids.len());
    let mut regressions = 0;
    let mut improvements = 0;
    let mut unchanged = 0;

    for case_id in all_case_ids {
        let baseline_result = baseline_results.get(case_id).copied();
        let current_result = current_results.get(case_id).copied();

        let (regression, improvement) =
            classify(baseline_result, current_result, score_threshold);

        if regression {
            regressions += 1;
        } else if improvement {
            improvements += 1;
        } else {
            unchanged += 1;
        }

        cases.push(CaseComparison {
            case_id: case_id.to_string(),
            baseline_passed: baseline_result.map(|r| r.passed),
            current_passed: current_result.map(|r| r.passed),
            baseline_score: baseline_result.map(|r| r.score),
            current_score: current_result.map(|r| r.score),
            regression,
            improvement,
        });
    }

    tracing::debug!(
        baseline = %baseline.id,
        current = %current.id,
        regressions,
        improvements,
        unchanged,
        "runs compared"
    );

    Ok(RunComparison {
        baseline_run_id: baseline.id,
        current_run_id: current.id,
        cases,
        regressions,
        improvements,
        unchanged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(case_id: &str, passed: bool, score: f64) -> EvalResult {
        let reasons = if passed {
            vec![]
        } else {
            vec!["Contains: expected '4' not found".to_string()]
        };
        EvalResult::new("suite-a", case_id, "gpt-4o-mini", "p", "r", passed, score, reasons)
    }

    fn run(suite: &str, results: Vec<EvalResult>) -> EvalRun {
        EvalRun::new(suite, "gpt-4o-mini", results)
    }

    fn compare(baseline: &EvalRun, current: &EvalRun) -> RunComparison {
        compare_runs(baseline, current, DEFAULT_SCORE_THRESHOLD).unwrap()
    }

    #[test]
    fn identical_runs_have_no_regressions_or_improvements() {
        let baseline = run(
            "suite-a",
            vec![result("a", true, 1.0), result("b", false, 0.0)],
        );
        let current = run(
            "suite-a",
            vec![result("a", true, 1.0), result("b", false, 0.0)],
        );

        let comparison = compare(&baseline, &current);
        assert_eq!(comparison.regressions, 0);
        assert_eq!(comparison.improvements, 0);
        assert_eq!(comparison.unchanged, 2);
    }

    #[test]
    fn pass_to_fail_is_always_a_regression() {
        // Even when the current score is numerically higher.
        let baseline = run("suite-a", vec![result("a", true, 0.2)]);
        let current = run("suite-a", vec![result("a", false, 0.9)]);

        let comparison = compare(&baseline, &current);
        assert_eq!(comparison.regressions, 1);
        assert!(comparison.cases[0].regression);
        assert!(!comparison.cases[0].improvement);
    }

    #[test]
    fn fail_to_pass_is_always_an_improvement() {
        let baseline = run("suite-a", vec![result("a", false, 0.0)]);
        let current = run("suite-a", vec![result("a", true, 1.0)]);

        let comparison = compare(&baseline, &current);
        assert_eq!(comparison.improvements, 1);
        assert!(comparison.cases[0].improvement);
    }

    #[test]
    fn score_delta_at_threshold_is_unchanged() {
        // 1.0 and 0.75 are exact in binary, so the delta is exactly the
        // threshold, which is inclusive-unchanged.
        let baseline = run("suite-a", vec![result("a", true, 1.0)]);
        let current = run("suite-a", vec![result("a", true, 0.75)]);

        let comparison = compare_runs(&baseline, &current, 0.25).unwrap();
        assert_eq!(comparison.regressions, 0);
        assert_eq!(comparison.unchanged, 1);
    }

    #[test]
    fn score_drop_beyond_threshold_is_a_regression() {
        let baseline = run("suite-a", vec![result("a", true, 1.0)]);
        let current = run("suite-a", vec![result("a", true, 0.5)]);

        let comparison = compare_runs(&baseline, &current, 0.25).unwrap();
        assert_eq!(comparison.regressions, 1);
    }

    #[test]
    fn score_rise_beyond_threshold_is_an_improvement() {
        let baseline = run("suite-a", vec![result("a", true, 0.5)]);
        let current = run("suite-a", vec![result("a", true, 0.9)]);

        let comparison = compare(&baseline, &current);
        assert_eq!(comparison.improvements, 1);
    }

    #[test]
    fn fail_to_fail_ignores_score_movement() {
        let baseline = run("suite-a", vec![result("a", false, 0.0)]);
        let current = run("suite-a", vec![result("a", false, 0.9)]);

        let comparison = compare(&baseline, &current);
        assert_eq!(comparison.unchanged, 1);
        assert_eq!(comparison.regressions, 0);
        assert_eq!(comparison.improvements, 0);
    }

    #[test]
    fn case_only_in_baseline_counts_as_unchanged_with_null_current() {
        let baseline = run("suite-a", vec![result("a", true, 1.0), result("b", true, 1.0)]);
        let current = run("suite-a", vec![result("a", true, 1.0)]);

        let comparison = compare(&baseline, &current);
        assert_eq!(comparison.unchanged, 2);

        let removed = comparison.cases.iter().find(|c| c.case_id == "b").unwrap();
        assert_eq!(removed.baseline_passed, Some(true));
        assert_eq!(removed.current_passed, None);
        assert_eq!(removed.current_score, None);
        assert!(!removed.regression);
        assert!(!removed.improvement);
    }

    #[test]
    fn case_only_in_current_counts_as_unchanged_with_null_baseline() {
        let baseline = run("suite-a", vec![]);
        let current = run("suite-a", vec![result("new", false, 0.0)]);

        let comparison = compare(&baseline, &current);
        assert_eq!(comparison.unchanged, 1);
        assert_eq!(comparison.cases[0].baseline_passed, None);
        assert_eq!(comparison.cases[0].current_passed, Some(false));
    }

    #[test]
    fn cases_are_ordered_by_case_id() {
        let baseline = run(
            "suite-a",
            vec![result("zulu", true, 1.0), result("alpha", true, 1.0)],
        );
        let current = run("suite-a", vec![result("mike", true, 1.0)]);

        let comparison = compare(&baseline, &current);
        let ids: Vec<&str> = comparison.cases.iter().map(|c| c.case_id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "mike", "zulu"]);
    }

    #[test]
    fn counts_sum_to_case_union() {
        let baseline = run(
            "suite-a",
            vec![result("a", true, 1.0), result("b", true, 1.0), result("c", false, 0.0)],
        );
        let current = run(
            "suite-a",
            vec![result("a", false, 0.0), result("c", true, 1.0), result("d", true, 1.0)],
        );

        let comparison = compare(&baseline, &current);
        assert_eq!(
            comparison.regressions + comparison.improvements + comparison.unchanged,
            comparison.cases.len()
        );
        assert_eq!(comparison.regressions, 1); // a
        assert_eq!(comparison.improvements, 1); // c
        assert_eq!(comparison.unchanged, 2); // b, d
    }

    #[test]
    fn different_suites_refuse_to_compare() {
        let baseline = run("suite-a", vec![result("a", true, 1.0)]);
        let current = run("suite-b", vec![result("a", true, 1.0)]);

        match compare_runs(&baseline, &current, DEFAULT_SCORE_THRESHOLD) {
            Err(EvalError::SuiteMismatch {
                baseline: b,
                current: c,
            }) => {
                assert_eq!(b, "suite-a");
                assert_eq!(c, "suite-b");
            }
            other => panic!("expected SuiteMismatch, got {:?}", other.map(|_| ())),
        }
    }
}

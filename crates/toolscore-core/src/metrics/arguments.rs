//! Argument precision, recall and F1.
//!
//! Calls are paired greedily: expected call `i` takes the first unconsumed
//! actual call `j >= i` with the same tool. This is a heuristic, not an
//! optimal assignment; reordered traces can lose credit.

use serde::Serialize;
use serde_json::Value;

use crate::domain::{json_equal, Args, ToolCall};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub matched_calls: usize,
    pub correct_args: usize,
    pub total_expected_args: usize,
    pub total_provided_args: usize,
}

impl ArgumentMetrics {
    fn zero() -> Self {
        Self {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
            matched_calls: 0,
            correct_args: 0,
            total_expected_args: 0,
            total_provided_args: 0,
        }
    }
}

pub fn argument_f1(expected: &[ToolCall], actual: &[ToolCall]) -> ArgumentMetrics {
    let mut report = ArgumentMetrics::zero();
    if expected.is_empty() || actual.is_empty() {
        return report;
    }

    let mut consumed = vec![false; actual.len()];
    for (i, gold) in expected.iter().enumerate() {
        let pair = actual
            .iter()
            .enumerate()
            .skip(i)
            .find(|(j, c)| !consumed[*j] && c.tool() == gold.tool());

        report.total_expected_args += gold.args().len();
        if let Some((j, trace)) = pair {
            consumed[j] = true;
            report.matched_calls += 1;
            report.correct_args += correct_args(gold.args(), trace.args());
            report.total_provided_args += trace.args().len();
        }
    }

    let ratio = |num: usize, den: usize| {
        if den == 0 {
            0.0
        } else {
            num as f64 / den as f64
        }
    };
    report.precision = ratio(report.correct_args, report.total_provided_args);
    report.recall = ratio(report.correct_args, report.total_expected_args);
    report.f1 = if report.precision + report.recall > 0.0 {
        2.0 * report.precision * report.recall / (report.precision + report.recall)
    } else {
        0.0
    };
    report
}

fn correct_args(expected: &Args, actual: &Args) -> usize {
    expected
        .iter()
        .filter(|(key, value)| actual.get(*key).is_some_and(|got| values_match(value, got)))
        .count()
}

/// Structural equality, relaxed to ignore surrounding whitespace on strings.
fn values_match(expected: &Value, actual: &Value) -> bool {
    if json_equal(expected, actual) {
        return true;
    }
    match (expected, actual) {
        (Value::String(e), Value::String(a)) => e.trim() == a.trim(),
        _ => false,
    }
}

//! Tool correctness: were the expected tools called at all (or in order)?

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::ToolCall;

use super::tool_names;

/// Name-level correctness report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCorrectnessMetrics {
    pub tool_correctness: f64,
    pub expected_tools: Vec<String>,
    pub called_tools: Vec<String>,
    pub missing_tools: Vec<String>,
    pub extra_tools: Vec<String>,
    /// Present only in strict-order mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_sequence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub called_sequence: Option<Vec<String>>,
    pub correct_count: usize,
    pub total_expected: usize,
    pub strict_order: bool,
}

/// Score expected tool coverage.
///
/// Unordered: `|E∩A| / |E|` over distinct names. With `strict_order`, the
/// `i`-th expected name must equal the `i`-th actual name and the score is
/// `correct / len(expected)`.
pub fn tool_correctness(
    expected: &[ToolCall],
    actual: &[ToolCall],
    strict_order: bool,
) -> ToolCorrectnessMetrics {
    let e: BTreeSet<&str> = tool_names(expected).collect();
    let a: BTreeSet<&str> = tool_names(actual).collect();
    let sorted = |set: &BTreeSet<&str>| set.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    let missing: BTreeSet<&str> = e.difference(&a).copied().collect();
    let extra: BTreeSet<&str> = a.difference(&e).copied().collect();

    let mut report = ToolCorrectnessMetrics {
        tool_correctness: 0.0,
        expected_tools: sorted(&e),
        called_tools: sorted(&a),
        missing_tools: sorted(&missing),
        extra_tools: sorted(&extra),
        expected_sequence: None,
        called_sequence: None,
        correct_count: 0,
        total_expected: 0,
        strict_order,
    };

    if expected.is_empty() {
        report.tool_correctness = if actual.is_empty() { 1.0 } else { 0.0 };
        return report;
    }

    if strict_order {
        let correct = expected
            .iter()
            .zip(actual)
            .filter(|(x, y)| x.tool() == y.tool())
            .count();
        report.tool_correctness = correct as f64 / expected.len() as f64;
        report.correct_count = correct;
        report.total_expected = expected.len();
        report.expected_sequence = Some(tool_names(expected).map(str::to_string).collect());
        report.called_sequence = Some(tool_names(actual).map(str::to_string).collect());
    } else {
        let correct = e.intersection(&a).count();
        report.tool_correctness = correct as f64 / e.len() as f64;
        report.correct_count = correct;
        report.total_expected = e.len();
    }
    report
}

/// Correctness where tool name and full argument map must both match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrictArgsCorrectness {
    pub tool_correctness_strict: f64,
    pub match_count: usize,
    pub total_expected: usize,
    pub unmatched_expected: Vec<ToolCall>,
    pub unmatched_actual: Vec<ToolCall>,
}

/// Each expected call consumes the first remaining actual call that is the
/// [same call](ToolCall::same_call).
pub fn tool_correctness_with_args(
    expected: &[ToolCall],
    actual: &[ToolCall],
) -> StrictArgsCorrectness {
    let mut remaining: Vec<&ToolCall> = actual.iter().collect();
    let mut unmatched_expected = Vec::new();
    let mut match_count = 0;

    for gold in expected {
        match remaining.iter().position(|c| gold.same_call(c)) {
            Some(pos) => {
                remaining.remove(pos);
                match_count += 1;
            }
            None => unmatched_expected.push(gold.clone()),
        }
    }

    let score = if expected.is_empty() {
        if actual.is_empty() {
            1.0
        } else {
            0.0
        }
    } else {
        match_count as f64 / expected.len() as f64
    };

    StrictArgsCorrectness {
        tool_correctness_strict: score,
        match_count,
        total_expected: expected.len(),
        unmatched_expected,
        unmatched_actual: remaining.into_iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{call, calls};
    use serde_json::json;

    #[test]
    fn test_empty_expected_boundaries() {
        assert_eq!(tool_correctness(&[], &[], false).tool_correctness, 1.0);
        let r = tool_correctness(&[], &calls(&["x"]), false);
        assert_eq!(r.tool_correctness, 0.0);
        assert_eq!(r.extra_tools, vec!["x"]);
        assert_eq!(r.total_expected, 0);
    }

    #[test]
    fn test_unordered_reports_sets() {
        let r = tool_correctness(
            &calls(&["search", "read_file"]),
            &calls(&["read_file", "search", "write_file"]),
            false,
        );
        assert_eq!(r.tool_correctness, 1.0);
        assert_eq!(r.extra_tools, vec!["write_file"]);
        assert!(r.missing_tools.is_empty());
        assert_eq!(r.expected_tools, vec!["read_file", "search"]);
        assert!(!r.strict_order);
    }

    #[test]
    fn test_strict_order_positional() {
        let r = tool_correctness(&calls(&["a", "b", "c"]), &calls(&["a", "c", "b"]), true);
        assert!((r.tool_correctness - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(r.correct_count, 1);
        assert_eq!(
            r.called_sequence,
            Some(vec!["a".to_string(), "c".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_with_args_consumes_matches() {
        let expected = vec![call("a", json!({"x": 1})), call("a", json!({"x": 1}))];
        let actual = vec![call("a", json!({"x": 1.0})), call("a", json!({"x": 2}))];
        let r = tool_correctness_with_args(&expected, &actual);
        assert_eq!(r.match_count, 1);
        assert_eq!(r.tool_correctness_strict, 0.5);
        assert_eq!(r.unmatched_expected.len(), 1);
        assert_eq!(r.unmatched_actual[0].args()["x"], json!(2));
    }

    #[test]
    fn test_with_args_boundaries() {
        assert_eq!(tool_correctness_with_args(&[], &[]).tool_correctness_strict, 1.0);
        assert_eq!(
            tool_correctness_with_args(&[], &calls(&["a"])).tool_correctness_strict,
            0.0
        );
    }
}

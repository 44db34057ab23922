//! Trajectory (path) accuracy: step-by-step positional comparison.

use serde::Serialize;

use crate::domain::{args_equal, Args, ToolCall};

const NOT_EXECUTED: &str = "Agent did not execute this step";
const STOPPED_EARLY: &str = "Agent stopped early - step not executed";
const UNNECESSARY: &str = "Unnecessary step - not in expected path";

/// One row of the step-by-step comparison. Steps are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryStep {
    pub step: usize,
    pub expected_tool: Option<String>,
    pub actual_tool: Option<String>,
    pub matches: bool,
    pub expected_args: Args,
    pub actual_args: Args,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrajectoryStep {
    fn missing(step: usize, expected: &ToolCall, error: &str) -> Self {
        Self {
            step,
            expected_tool: Some(expected.tool().to_string()),
            actual_tool: None,
            matches: false,
            expected_args: expected.args().clone(),
            actual_args: Args::new(),
            error: Some(error.to_string()),
        }
    }

    fn extra(step: usize, actual: &ToolCall) -> Self {
        Self {
            step,
            expected_tool: None,
            actual_tool: Some(actual.tool().to_string()),
            matches: false,
            expected_args: Args::new(),
            actual_args: actual.args().clone(),
            error: Some(UNNECESSARY.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryMetrics {
    pub trajectory_accuracy: f64,
    pub step_match_rate: f64,
    pub path_efficiency: f64,
    pub correct_steps: usize,
    pub total_expected_steps: usize,
    pub trajectory_details: Vec<TrajectoryStep>,
}

impl TrajectoryMetrics {
    /// Steps that did not match, in step order.
    pub fn mismatches(&self) -> impl Iterator<Item = &TrajectoryStep> {
        self.trajectory_details.iter().filter(|s| !s.matches)
    }
}

/// `step_match_rate * path_efficiency`, where a step matches when tool name
/// and the full argument map agree, and efficiency is `|e| / |a|` once the
/// agent takes more steps than expected.
pub fn trajectory_accuracy(expected: &[ToolCall], actual: &[ToolCall]) -> TrajectoryMetrics {
    if expected.is_empty() {
        let score = if actual.is_empty() { 1.0 } else { 0.0 };
        return TrajectoryMetrics {
            trajectory_accuracy: score,
            step_match_rate: score,
            path_efficiency: 1.0,
            correct_steps: 0,
            total_expected_steps: 0,
            trajectory_details: Vec::new(),
        };
    }

    if actual.is_empty() {
        return TrajectoryMetrics {
            trajectory_accuracy: 0.0,
            step_match_rate: 0.0,
            path_efficiency: 0.0,
            correct_steps: 0,
            total_expected_steps: expected.len(),
            trajectory_details: expected
                .iter()
                .enumerate()
                .map(|(i, e)| TrajectoryStep::missing(i + 1, e, NOT_EXECUTED))
                .collect(),
        };
    }

    let mut details = Vec::with_capacity(expected.len().max(actual.len()));
    let mut correct = 0;

    for (i, (e, a)) in expected.iter().zip(actual).enumerate() {
        let matches = e.tool() == a.tool() && args_equal(e.args(), a.args());
        if matches {
            correct += 1;
        }
        details.push(TrajectoryStep {
            step: i + 1,
            expected_tool: Some(e.tool().to_string()),
            actual_tool: Some(a.tool().to_string()),
            matches,
            expected_args: e.args().clone(),
            actual_args: a.args().clone(),
            error: None,
        });
    }

    let overlap = expected.len().min(actual.len());
    for (i, e) in expected.iter().enumerate().skip(overlap) {
        details.push(TrajectoryStep::missing(i + 1, e, STOPPED_EARLY));
    }
    for (i, a) in actual.iter().enumerate().skip(overlap) {
        details.push(TrajectoryStep::extra(i + 1, a));
    }

    let step_match_rate = correct as f64 / expected.len() as f64;
    let path_efficiency = if actual.len() > expected.len() {
        expected.len() as f64 / actual.len() as f64
    } else {
        1.0
    };

    TrajectoryMetrics {
        trajectory_accuracy: step_match_rate * path_efficiency,
        step_match_rate,
        path_efficiency,
        correct_steps: correct,
        total_expected_steps: expected.len(),
        trajectory_details: details,
    }
}

/// Order-insensitive credit: each expected name consumes at most one equal
/// actual name. With `normalize_names`, names are lower-cased and stripped
/// of `_` and `-` before comparing.
pub fn partial_trajectory_accuracy(
    expected: &[ToolCall],
    actual: &[ToolCall],
    normalize_names: bool,
) -> f64 {
    if expected.is_empty() {
        return if actual.is_empty() { 1.0 } else { 0.0 };
    }
    if actual.is_empty() {
        return 0.0;
    }

    let key = |call: &ToolCall| {
        if normalize_names {
            normalize_tool_name(call.tool())
        } else {
            call.tool().to_string()
        }
    };

    let mut remaining: Vec<String> = actual.iter().map(key).collect();
    let mut matched = 0;
    for name in expected.iter().map(key) {
        if let Some(pos) = remaining.iter().position(|r| *r == name) {
            remaining.swap_remove(pos);
            matched += 1;
        }
    }
    matched as f64 / expected.len() as f64
}

fn normalize_tool_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{call, calls};
    use serde_json::json;

    #[test]
    fn test_empty_boundaries() {
        let r = trajectory_accuracy(&[], &[]);
        assert_eq!((r.trajectory_accuracy, r.step_match_rate, r.path_efficiency), (1.0, 1.0, 1.0));

        let r = trajectory_accuracy(&[], &calls(&["a"]));
        assert_eq!((r.trajectory_accuracy, r.step_match_rate, r.path_efficiency), (0.0, 0.0, 1.0));
    }

    #[test]
    fn test_agent_did_nothing() {
        let r = trajectory_accuracy(&calls(&["a", "b"]), &[]);
        assert_eq!((r.trajectory_accuracy, r.step_match_rate, r.path_efficiency), (0.0, 0.0, 0.0));
        assert_eq!(r.trajectory_details.len(), 2);
        assert_eq!(r.trajectory_details[1].step, 2);
        assert_eq!(r.trajectory_details[0].error.as_deref(), Some(NOT_EXECUTED));
    }

    #[test]
    fn test_partial_credit_for_early_stop() {
        let r = trajectory_accuracy(&calls(&["a", "b", "c"]), &calls(&["a"]));
        assert!((r.step_match_rate - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(r.path_efficiency, 1.0);
        assert!((r.trajectory_accuracy - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(r.trajectory_details[2].error.as_deref(), Some(STOPPED_EARLY));
        assert_eq!(r.trajectory_details[2].actual_tool, None);
    }

    #[test]
    fn test_extra_steps_reduce_efficiency() {
        let r = trajectory_accuracy(&calls(&["a", "b"]), &calls(&["a", "b", "c", "d"]));
        assert_eq!(r.step_match_rate, 1.0);
        assert_eq!(r.path_efficiency, 0.5);
        assert_eq!(r.trajectory_accuracy, 0.5);
        assert_eq!(r.trajectory_details[3].expected_tool, None);
        assert_eq!(r.trajectory_details[3].error.as_deref(), Some(UNNECESSARY));
    }

    #[test]
    fn test_step_requires_full_argument_equality() {
        let e = vec![call("a", json!({"x": 1}))];
        assert_eq!(trajectory_accuracy(&e, &[call("a", json!({"x": 1.0}))]).correct_steps, 1);
        assert_eq!(
            trajectory_accuracy(&e, &[call("a", json!({"x": 1, "y": 2}))]).correct_steps,
            0
        );
        let r = trajectory_accuracy(&e, &[call("a", json!({"x": 2}))]);
        assert_eq!(r.mismatches().count(), 1);
    }

    #[test]
    fn test_partial_trajectory() {
        assert_eq!(partial_trajectory_accuracy(&[], &[], false), 1.0);
        assert_eq!(partial_trajectory_accuracy(&calls(&["a"]), &[], false), 0.0);
        assert_eq!(
            partial_trajectory_accuracy(&calls(&["a", "a", "b"]), &calls(&["b", "a"]), false),
            2.0 / 3.0
        );
    }

    #[test]
    fn test_partial_trajectory_name_normalization() {
        let e = calls(&["Web_Search", "read-file"]);
        let a = calls(&["websearch", "READFILE"]);
        assert_eq!(partial_trajectory_accuracy(&e, &a, false), 0.0);
        assert_eq!(partial_trajectory_accuracy(&e, &a, true), 1.0);
    }
}

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use crate::domain::ToolCall;
use crate::evaluate::{EvaluationResult, EvaluationSummary, MetricsReport};

/// Version of the persisted result document.
pub const RESULT_SCHEMA_VERSION: &str = "1.0";

/// Canonical evaluation document written for CI and PR reporting.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationArtifact<'a> {
    pub schema_version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub summary: EvaluationSummary,
    pub metrics: &'a MetricsReport,
    pub gold_calls: &'a [ToolCall],
    pub trace_calls: &'a [ToolCall],
}

impl<'a> EvaluationArtifact<'a> {
    pub fn new(result: &'a EvaluationResult, generated_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: RESULT_SCHEMA_VERSION,
            generated_at,
            summary: result.summary(),
            metrics: &result.metrics,
            gold_calls: &result.gold_calls,
            trace_calls: &result.trace_calls,
        }
    }
}

/// Write the evaluation result as pretty JSON.
pub fn write_result_json(path: &Path, result: &EvaluationResult) -> Result<()> {
    let artifact = EvaluationArtifact::new(result, Utc::now());
    let content = serde_json::to_string_pretty(&artifact).context("serialize evaluation result")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

fn pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn or_dash(tool: Option<&String>) -> &str {
    tool.map_or("-", String::as_str)
}

/// Render markdown summary for PR/comment/check output.
pub fn render_summary_md(result: &EvaluationResult) -> String {
    let m = &result.metrics;
    let summary = result.summary();
    let mut out = String::new();

    out.push_str("# Tool Call Evaluation\n\n");
    out.push_str(&format!(
        "- gold calls: {}\n- trace calls: {}\n- composite score: {:.3}\n- status: {}\n\n",
        summary.gold_calls_count,
        summary.trace_calls_count,
        summary.composite_score,
        if summary.passed { "PASS" } else { "FAIL" }
    ));

    out.push_str("## Metrics\n\n| metric | value |\n| --- | --- |\n");
    let rows = [
        ("invocation accuracy", pct(m.invocation_accuracy)),
        ("selection accuracy", pct(m.selection_accuracy)),
        (
            "tool correctness",
            pct(m.tool_correctness_metrics.tool_correctness),
        ),
        ("tool correctness (args)", pct(m.tool_correctness_strict)),
        ("sequence accuracy", pct(m.sequence_metrics.sequence_accuracy)),
        (
            "edit distance",
            m.sequence_metrics.edit_distance.to_string(),
        ),
        ("argument precision", pct(m.argument_metrics.precision)),
        ("argument recall", pct(m.argument_metrics.recall)),
        ("argument f1", pct(m.argument_metrics.f1)),
        (
            "trajectory accuracy",
            pct(m.trajectory_metrics.trajectory_accuracy),
        ),
        ("partial trajectory accuracy", pct(m.partial_trajectory_accuracy)),
        ("redundant call rate", pct(m.efficiency_metrics.redundant_rate)),
    ];
    for (name, value) in rows {
        out.push_str(&format!("| {} | {} |\n", name, value));
    }
    if let Some(latency) = &m.latency_metrics {
        out.push_str(&format!(
            "| total duration | {:.3}s |\n",
            latency.total_duration
        ));
    }
    if let Some(cost) = &m.cost_metrics {
        out.push_str(&format!("| total cost | ${:.4} |\n", cost.total_cost));
    }
    if let Some(side_effects) = &m.side_effect_metrics {
        out.push_str(&format!(
            "| side-effect success | {} |\n",
            pct(side_effects.success_rate)
        ));
    }
    if let Some(score) = m.semantic_metrics.as_ref().and_then(|s| s.semantic_score) {
        out.push_str(&format!("| semantic score | {} |\n", pct(score)));
    }

    let mismatches: Vec<_> = m.trajectory_metrics.mismatches().collect();
    if !mismatches.is_empty() {
        out.push_str("\n## Trajectory Mismatches\n\n");
        for step in mismatches {
            out.push_str(&format!(
                "- step {}: expected `{}`, got `{}`",
                step.step,
                or_dash(step.expected_tool.as_ref()),
                or_dash(step.actual_tool.as_ref())
            ));
            if let Some(error) = &step.error {
                out.push_str(&format!(" ({})", error));
            }
            out.push('\n');
        }
    }
    out
}

/// Write the markdown summary.
pub fn write_summary_md(path: &Path, result: &EvaluationResult) -> Result<()> {
    let md = render_summary_md(result);
    std::fs::write(path, md).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::{evaluate_calls, EvaluationOptions};
    use serde_json::json;

    fn call(tool: &str, args: serde_json::Value) -> ToolCall {
        ToolCall::from_value_args(tool, Some(args)).expect("valid call")
    }

    fn sample() -> EvaluationResult {
        evaluate_calls(
            vec![
                call("search", json!({"q": "rust"})),
                call("summarize", json!({})),
            ],
            vec![call("search", json!({"q": "rust"}))],
            &EvaluationOptions::default(),
        )
    }

    #[test]
    fn result_document_has_expected_keys() {
        let result = sample();
        let generated_at = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .expect("parse RFC3339")
            .with_timezone(&Utc);
        let raw = serde_json::to_value(EvaluationArtifact::new(&result, generated_at))
            .expect("serialize artifact");
        let obj = raw.as_object().expect("artifact object");
        for key in [
            "schema_version",
            "generated_at",
            "summary",
            "metrics",
            "gold_calls",
            "trace_calls",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(raw["summary"]["gold_calls_count"], json!(2));
        assert_eq!(raw["summary"]["trace_calls_count"], json!(1));
        assert_eq!(raw["metrics"]["invocation_accuracy"], json!(0.25));
        assert_eq!(raw["trace_calls"][0]["tool"], json!("search"));
    }

    #[test]
    fn summary_markdown_render_is_stable() {
        let actual = render_summary_md(&sample());
        let expected = "# Tool Call Evaluation\n\n\
- gold calls: 2\n- trace calls: 1\n- composite score: 0.900\n- status: PASS\n\n\
## Metrics\n\n| metric | value |\n| --- | --- |\n\
| invocation accuracy | 25.0% |\n\
| selection accuracy | 100.0% |\n\
| tool correctness | 50.0% |\n\
| tool correctness (args) | 50.0% |\n\
| sequence accuracy | 50.0% |\n\
| edit distance | 1 |\n\
| argument precision | 100.0% |\n\
| argument recall | 100.0% |\n\
| argument f1 | 100.0% |\n\
| trajectory accuracy | 50.0% |\n\
| partial trajectory accuracy | 50.0% |\n\
| redundant call rate | 0.0% |\n\
\n## Trajectory Mismatches\n\n\
- step 2: expected `summarize`, got `-` (Agent stopped early - step not executed)\n";
        assert_eq!(actual, expected);
    }

    #[test]
    fn write_summary_creates_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("summary.md");
        write_summary_md(&path, &sample()).expect("write summary");
        let written = std::fs::read_to_string(&path).expect("read back");
        assert!(written.starts_with("# Tool Call Evaluation"));
    }
}

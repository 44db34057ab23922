//! One evaluation: every metric over a (gold, trace) pair.
//!
//! [`evaluate_calls`] is pure apart from logging and whatever the optional
//! collaborators (side-effect validators, semantic judge) do.
//! [`evaluate_files`] adds the loading boundary in front of it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::adapters::TraceFormat;
use crate::composite::{CompositeComponents, CompositeScore, CompositeWeights};
use crate::config::EvalConfig;
use crate::domain::{Result, ToolCall};
use crate::loader::{load_gold_standard, load_trace};
use crate::metrics::{
    argument_f1, cost_attribution, edit_distance, invocation_accuracy, latency,
    partial_trajectory_accuracy, redundant_call_rate, selection_accuracy,
    side_effect_success_rate, tool_correctness, tool_correctness_with_args, trajectory_accuracy,
    ArgumentMetrics, CostMetrics, EfficiencyMetrics, LatencyMetrics, SequenceMetrics,
    SideEffectMetrics, ToolCorrectnessMetrics, TrajectoryMetrics, ValidatorRegistry,
};
use crate::obs::{
    emit_evaluation_finished, emit_evaluation_started, emit_judge_failed, EvaluationSpan,
};

// ---------------------------------------------------------------------------
// Semantic judge collaborator
// ---------------------------------------------------------------------------

/// Outcome of a semantic comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticJudgement {
    /// Overall semantic equivalence in 0.0..=1.0.
    pub semantic_score: f64,
    pub per_call_scores: Vec<f64>,
    pub explanations: Vec<String>,
    pub model_used: Option<String>,
}

/// External judge for semantic (non-structural) equivalence. The core never
/// ships an implementation; callers plug in an LLM client or a fake.
pub trait SemanticJudge {
    fn judge(&self, expected: &[ToolCall], actual: &[ToolCall])
        -> std::result::Result<SemanticJudgement, String>;
}

/// Judge output as it appears in the report. A failed judge leaves
/// `semantic_score` null and records the error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticMetrics {
    pub semantic_score: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub per_call_scores: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub explanations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<SemanticJudgement> for SemanticMetrics {
    fn from(j: SemanticJudgement) -> Self {
        Self {
            semantic_score: Some(j.semantic_score),
            per_call_scores: j.per_call_scores,
            explanations: j.explanations,
            model_used: j.model_used,
            error: None,
        }
    }
}

impl SemanticMetrics {
    fn failed(error: String) -> Self {
        Self {
            semantic_score: None,
            per_call_scores: Vec::new(),
            explanations: Vec::new(),
            model_used: None,
            error: Some(error),
        }
    }
}

// ---------------------------------------------------------------------------
// Options / result types
// ---------------------------------------------------------------------------

/// Knobs and collaborators for one evaluation.
#[derive(Default, Clone, Copy)]
pub struct EvaluationOptions<'a> {
    /// Trace format used by [`evaluate_files`].
    pub format: TraceFormat,
    pub strict_order: bool,
    pub weights: CompositeWeights,
    pub min_composite_score: Option<f64>,
    pub normalize_tool_names: bool,
    pub validators: Option<&'a ValidatorRegistry>,
    pub judge: Option<&'a dyn SemanticJudge>,
}

impl<'a> EvaluationOptions<'a> {
    pub fn from_config(config: &EvalConfig) -> Self {
        Self {
            format: config.format,
            strict_order: config.strict_order,
            weights: config.weights,
            min_composite_score: config.min_composite_score,
            normalize_tool_names: config.normalize_tool_names,
            validators: None,
            judge: None,
        }
    }

    pub fn with_validators(mut self, registry: &'a ValidatorRegistry) -> Self {
        self.validators = Some(registry);
        self
    }

    pub fn with_judge(mut self, judge: &'a dyn SemanticJudge) -> Self {
        self.judge = Some(judge);
        self
    }
}

/// Every metric computed for one pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub invocation_accuracy: f64,
    pub selection_accuracy: f64,
    pub tool_correctness_metrics: ToolCorrectnessMetrics,
    /// Tool name and full argument map must both match.
    pub tool_correctness_strict: f64,
    pub argument_metrics: ArgumentMetrics,
    pub sequence_metrics: SequenceMetrics,
    pub trajectory_metrics: TrajectoryMetrics,
    pub partial_trajectory_accuracy: f64,
    pub efficiency_metrics: EfficiencyMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_metrics: Option<LatencyMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_metrics: Option<CostMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_effect_metrics: Option<SideEffectMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_metrics: Option<SemanticMetrics>,
    pub composite: CompositeScore,
}

/// Counts plus the headline score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub gold_calls_count: usize,
    pub trace_calls_count: usize,
    pub composite_score: f64,
    pub passed: bool,
}

/// The aggregate returned by one evaluation. Owns both input sequences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub gold_calls: Vec<ToolCall>,
    pub trace_calls: Vec<ToolCall>,
    pub metrics: MetricsReport,
}

impl EvaluationResult {
    pub fn summary(&self) -> EvaluationSummary {
        EvaluationSummary {
            gold_calls_count: self.gold_calls.len(),
            trace_calls_count: self.trace_calls.len(),
            composite_score: self.metrics.composite.score,
            passed: self.metrics.composite.passed,
        }
    }

    /// Flat `name → value` view used for baselines.
    pub fn flat_metrics(&self) -> BTreeMap<String, f64> {
        let m = &self.metrics;
        let mut flat = BTreeMap::new();
        let mut put = |key: &str, value: f64| {
            flat.insert(key.to_string(), value);
        };
        put("invocation_accuracy", m.invocation_accuracy);
        put("selection_accuracy", m.selection_accuracy);
        put("tool_correctness", m.tool_correctness_metrics.tool_correctness);
        put("sequence_accuracy", m.sequence_metrics.sequence_accuracy);
        put("argument_f1", m.argument_metrics.f1);
        put("argument_precision", m.argument_metrics.precision);
        put("argument_recall", m.argument_metrics.recall);
        put("redundant_rate", m.efficiency_metrics.redundant_rate);
        put("trajectory_accuracy", m.trajectory_metrics.trajectory_accuracy);
        put("composite_score", m.composite.score);
        if let Some(score) = m.semantic_metrics.as_ref().and_then(|s| s.semantic_score) {
            put("semantic_score", score);
        }
        flat
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run every metric over `gold` (expected) and `trace` (actual).
pub fn evaluate_calls(
    gold: Vec<ToolCall>,
    trace: Vec<ToolCall>,
    options: &EvaluationOptions<'_>,
) -> EvaluationResult {
    emit_evaluation_started(gold.len(), trace.len());

    let e = gold.as_slice();
    let a = trace.as_slice();

    let latency_metrics = Some(latency(a)).filter(|l| l.total_duration > 0.0);
    let cost_metrics = Some(cost_attribution(a)).filter(|c| c.total_cost > 0.0);
    let side_effect_metrics = options
        .validators
        .map(|registry| side_effect_success_rate(e, a, registry));
    let semantic_metrics = options.judge.map(|judge| match judge.judge(e, a) {
        Ok(judgement) => SemanticMetrics::from(judgement),
        Err(err) => {
            emit_judge_failed(&err);
            SemanticMetrics::failed(err)
        }
    });

    let selection = selection_accuracy(e, a);
    let arguments = argument_f1(e, a);
    let sequence = edit_distance(e, a);
    let efficiency = redundant_call_rate(e, a);
    let composite = options.weights.score_components(
        CompositeComponents {
            selection_accuracy: selection,
            argument_f1: arguments.f1,
            sequence_accuracy: sequence.sequence_accuracy,
            efficiency: 1.0 - efficiency.redundant_rate,
        },
        options.min_composite_score,
    );

    let metrics = MetricsReport {
        invocation_accuracy: invocation_accuracy(e, a),
        selection_accuracy: selection,
        tool_correctness_metrics: tool_correctness(e, a, options.strict_order),
        tool_correctness_strict: tool_correctness_with_args(e, a).tool_correctness_strict,
        argument_metrics: arguments,
        sequence_metrics: sequence,
        trajectory_metrics: trajectory_accuracy(e, a),
        partial_trajectory_accuracy: partial_trajectory_accuracy(
            e,
            a,
            options.normalize_tool_names,
        ),
        efficiency_metrics: efficiency,
        latency_metrics,
        cost_metrics,
        side_effect_metrics,
        semantic_metrics,
        composite,
    };

    emit_evaluation_finished(metrics.composite.score, metrics.composite.passed);

    EvaluationResult {
        gold_calls: gold,
        trace_calls: trace,
        metrics,
    }
}

/// Load a gold file and a trace file, then [`evaluate_calls`].
pub fn evaluate_files(
    gold_path: impl AsRef<Path>,
    trace_path: impl AsRef<Path>,
    options: &EvaluationOptions<'_>,
) -> Result<EvaluationResult> {
    let gold_path = gold_path.as_ref();
    let _span = EvaluationSpan::enter(&gold_path.display().to_string());

    let gold = load_gold_standard(gold_path)?;
    let trace = load_trace(trace_path, options.format)?;
    Ok(evaluate_calls(gold, trace, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn call(tool: &str, args: Value) -> ToolCall {
        ToolCall::from_value_args(tool, Some(args)).unwrap()
    }

    struct FixedJudge(std::result::Result<f64, &'static str>);

    impl SemanticJudge for FixedJudge {
        fn judge(
            &self,
            _expected: &[ToolCall],
            actual: &[ToolCall],
        ) -> std::result::Result<SemanticJudgement, String> {
            let score = self.0.map_err(str::to_string)?;
            Ok(SemanticJudgement {
                semantic_score: score,
                per_call_scores: vec![score; actual.len()],
                explanations: vec!["equivalent".into()],
                model_used: Some("fake".into()),
            })
        }
    }

    #[test]
    fn test_perfect_match() {
        let gold = vec![call("search", json!({"q": "rust"})), call("open", json!({"id": 1}))];
        let result = evaluate_calls(gold.clone(), gold, &EvaluationOptions::default());
        let m = &result.metrics;
        assert_eq!(m.invocation_accuracy, 1.0);
        assert_eq!(m.selection_accuracy, 1.0);
        assert_eq!(m.tool_correctness_strict, 1.0);
        assert_eq!(m.trajectory_metrics.trajectory_accuracy, 1.0);
        assert!((m.composite.score - 1.0).abs() < 1e-9);
        assert!(m.latency_metrics.is_none());
        assert!(m.cost_metrics.is_none());
        assert!(m.side_effect_metrics.is_none());
        assert!(m.semantic_metrics.is_none());
        assert!(result.summary().passed);
    }

    #[test]
    fn test_latency_and_cost_only_when_present() {
        let trace = vec![call("search", json!({})).with_duration(1.5).with_cost(0.02)];
        let result = evaluate_calls(vec![call("search", json!({}))], trace, &EvaluationOptions::default());
        assert_eq!(result.metrics.latency_metrics.as_ref().unwrap().total_duration, 1.5);
        assert_eq!(result.metrics.cost_metrics.as_ref().unwrap().total_cost, 0.02);
    }

    #[test]
    fn test_min_score_gates_composite() {
        let options = EvaluationOptions {
            min_composite_score: Some(0.9),
            ..EvaluationOptions::default()
        };
        let result = evaluate_calls(vec![call("a", json!({}))], vec![call("b", json!({}))], &options);
        assert!(!result.metrics.composite.passed);
        assert_eq!(result.metrics.composite.min_score, Some(0.9));
    }

    #[test]
    fn test_judge_error_is_recorded() {
        let judge = FixedJudge(Err("rate limited"));
        let options = EvaluationOptions::default().with_judge(&judge);
        let result = evaluate_calls(vec![call("a", json!({}))], vec![call("a", json!({}))], &options);
        let semantic = result.metrics.semantic_metrics.as_ref().unwrap();
        assert_eq!(semantic.semantic_score, None);
        assert_eq!(semantic.error.as_deref(), Some("rate limited"));
        assert!(!result.flat_metrics().contains_key("semantic_score"));

        let raw = serde_json::to_value(semantic).unwrap();
        assert_eq!(raw, json!({"semantic_score": null, "error": "rate limited"}));
    }

    #[test]
    fn test_judge_score_reaches_flat_metrics() {
        let judge = FixedJudge(Ok(0.75));
        let options = EvaluationOptions::default().with_judge(&judge);
        let result = evaluate_calls(vec![call("a", json!({}))], vec![call("a", json!({}))], &options);
        assert_eq!(result.flat_metrics()["semantic_score"], 0.75);
    }

    #[test]
    fn test_validators_feed_side_effect_metrics() {
        let registry = ValidatorRegistry::new().with(
            "file_exists",
            |call: &ToolCall, _expected: &Value| -> std::result::Result<bool, String> {
                Ok(call.args().contains_key("filename"))
            },
        );
        let gold = crate::loader::parse_gold_standard(&json!([
            {"tool": "make_file", "args": {"filename": "a.txt"}, "side_effects": {"file_exists": "a.txt"}}
        ]))
        .unwrap();
        let trace = vec![call("make_file", json!({"filename": "a.txt"}))];
        let options = EvaluationOptions::default().with_validators(&registry);
        let result = evaluate_calls(gold, trace, &options);
        let side_effects = result.metrics.side_effect_metrics.unwrap();
        assert_eq!(side_effects.total_checks, 1);
        assert_eq!(side_effects.success_rate, 1.0);
    }

    #[test]
    fn test_flat_metrics_keys() {
        let result = evaluate_calls(Vec::new(), Vec::new(), &EvaluationOptions::default());
        let keys: Vec<_> = result.flat_metrics().into_keys().collect();
        assert_eq!(
            keys,
            [
                "argument_f1",
                "argument_precision",
                "argument_recall",
                "composite_score",
                "invocation_accuracy",
                "redundant_rate",
                "selection_accuracy",
                "sequence_accuracy",
                "tool_correctness",
                "trajectory_accuracy",
            ]
        );
    }
}

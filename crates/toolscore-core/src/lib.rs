//! Toolscore Core Library
//!
//! Normalizes LLM tool-call traces from several providers into one canonical
//! call model and scores them against a gold standard.

pub mod adapters;
pub mod baseline;
pub mod capture;
pub mod composite;
pub mod config;
pub mod detect;
pub mod domain;
pub mod evaluate;
pub mod loader;
pub mod metrics;
pub mod obs;
pub mod reporting;
pub mod telemetry;

pub use adapters::{parse_trace, TraceFormat};
pub use baseline::{
    compare_to_baseline, load_baseline, save_baseline, Baseline, ComparisonResult,
    RegressionItem, RegressionStatus,
};
pub use capture::{CallRecorder, CaptureSink};
pub use composite::{CompositeComponents, CompositeScore, CompositeWeights, COMPOSITE_KEYS};
pub use config::{EvalConfig, DEFAULT_REGRESSION_THRESHOLD};
pub use detect::detect_format;
pub use domain::{
    args_equal, args_from_value, json_equal, Args, Result, ToolCall, ToolscoreError,
    ValidationError,
};
pub use evaluate::{
    evaluate_calls, evaluate_files, EvaluationOptions, EvaluationResult, EvaluationSummary,
    MetricsReport, SemanticJudge, SemanticJudgement, SemanticMetrics,
};
pub use loader::{load_gold_standard, load_trace, parse_gold_standard};
pub use metrics::{
    argument_f1, cost_attribution, edit_distance, invocation_accuracy, latency,
    partial_trajectory_accuracy, redundant_call_rate, selection_accuracy,
    side_effect_success_rate, tool_correctness, tool_correctness_with_args, trajectory_accuracy,
    ArgumentMetrics, CostMetrics, EfficiencyMetrics, LatencyMetrics, SequenceMetrics,
    SideEffectCheck, SideEffectMetrics, SideEffectValidator, StrictArgsCorrectness,
    ToolCorrectnessMetrics, TrajectoryMetrics, TrajectoryStep, ValidatorRegistry,
};
pub use reporting::{
    render_summary_md, write_result_json, write_summary_md, EvaluationArtifact,
    RESULT_SCHEMA_VERSION,
};

pub use obs::{
    emit_baseline_compared, emit_evaluation_finished, emit_evaluation_started,
    emit_format_detected, emit_item_skipped, emit_judge_failed, EvaluationSpan,
};
pub use telemetry::init_tracing;

/// Toolscore version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Structured observability hooks for evaluation lifecycle events.
//!
//! This module provides:
//! - Evaluation-scoped tracing spans via the `EvaluationSpan` RAII guard
//! - Emission functions for key events: evaluation start/finish, format
//!   detection, skipped trace items, baseline comparison
//!
//! Events are filtered through `RUST_LOG`; see [`crate::telemetry::init_tracing`].

use tracing::{debug, info};

/// RAII guard that enters an evaluation-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = EvaluationSpan::enter("gold.json");
/// // every event emitted while `_span` lives carries label = "gold.json"
/// ```
pub struct EvaluationSpan {
    _span: tracing::span::EnteredSpan,
}

impl EvaluationSpan {
    /// Create and enter a span tagged with a caller-chosen label.
    pub fn enter(label: &str) -> Self {
        let span = tracing::info_span!("toolscore.evaluation", label = %label);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: evaluation started with the sizes of both sequences.
pub fn emit_evaluation_started(gold_calls: usize, trace_calls: usize) {
    debug!(
        event = "evaluation.started",
        gold_calls = gold_calls,
        trace_calls = trace_calls,
    );
}

/// Emit event: evaluation finished with its composite score.
pub fn emit_evaluation_finished(composite_score: f64, passed: bool) {
    info!(
        event = "evaluation.finished",
        composite_score = composite_score,
        passed = passed,
    );
}

/// Emit event: the trace format was chosen by auto-detection.
pub fn emit_format_detected(format: &str) {
    debug!(event = "trace.format_detected", format = %format);
}

/// Emit event: an adapter skipped a malformed item.
pub fn emit_item_skipped(format: &str, index: usize, reason: &str) {
    debug!(event = "trace.item_skipped", format = %format, index = index, reason = %reason);
}

/// Emit event: baseline comparison completed.
pub fn emit_baseline_compared(regressions: usize, improvements: usize, passed: bool) {
    info!(
        event = "baseline.compared",
        regressions = regressions,
        improvements = improvements,
        passed = passed,
    );
}

/// Emit event: the semantic judge failed; the evaluation continues.
pub fn emit_judge_failed(error: &dyn std::fmt::Display) {
    tracing::warn!(event = "judge.failed", error = %error);
}

//! Metrics engine.
//!
//! Every function here is pure over `(expected, actual)` call slices: no
//! I/O, no shared state, no errors. Boundary cases (empty inputs) return
//! fixed values documented per metric; count fields on the report structs
//! tell a vacuous 1.0 apart from a real one.

pub mod accuracy;
pub mod arguments;
pub mod cost;
pub mod efficiency;
pub mod sequence;
pub mod side_effects;
pub mod tool_correctness;
pub mod trajectory;

pub use accuracy::{invocation_accuracy, selection_accuracy};
pub use arguments::{argument_f1, ArgumentMetrics};
pub use cost::{cost_attribution, latency, CostMetrics, LatencyMetrics};
pub use efficiency::{redundant_call_rate, EfficiencyMetrics};
pub use sequence::{edit_distance, SequenceMetrics};
pub use side_effects::{
    side_effect_success_rate, SideEffectCheck, SideEffectMetrics, SideEffectValidator,
    ValidatorRegistry,
};
pub use tool_correctness::{
    tool_correctness, tool_correctness_with_args, StrictArgsCorrectness, ToolCorrectnessMetrics,
};
pub use trajectory::{
    partial_trajectory_accuracy, trajectory_accuracy, TrajectoryMetrics, TrajectoryStep,
};

use crate::domain::ToolCall;

fn tool_names(calls: &[ToolCall]) -> impl Iterator<Item = &str> {
    calls.iter().map(ToolCall::tool)
}

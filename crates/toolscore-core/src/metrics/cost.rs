//! Latency and cost attribution over the calls that report them.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::ToolCall;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyMetrics {
    pub total_duration: f64,
    pub average_duration: f64,
    pub max_duration: f64,
    pub min_duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostMetrics {
    pub total_cost: f64,
    pub average_cost: f64,
    pub cost_by_tool: BTreeMap<String, f64>,
}

/// Duration statistics (seconds); all zero when no call has a duration.
pub fn latency(actual: &[ToolCall]) -> LatencyMetrics {
    let durations: Vec<f64> = actual.iter().filter_map(ToolCall::duration).collect();
    if durations.is_empty() {
        return LatencyMetrics {
            total_duration: 0.0,
            average_duration: 0.0,
            max_duration: 0.0,
            min_duration: 0.0,
        };
    }

    let total: f64 = durations.iter().sum();
    LatencyMetrics {
        total_duration: total,
        average_duration: total / durations.len() as f64,
        max_duration: durations.iter().copied().fold(f64::MIN, f64::max),
        min_duration: durations.iter().copied().fold(f64::MAX, f64::min),
    }
}

/// Cost totals; the average is taken over calls that report a cost.
pub fn cost_attribution(actual: &[ToolCall]) -> CostMetrics {
    let mut cost_by_tool: BTreeMap<String, f64> = BTreeMap::new();
    let mut total = 0.0;
    let mut priced = 0usize;

    for call in actual {
        if let Some(cost) = call.cost() {
            total += cost;
            priced += 1;
            *cost_by_tool.entry(call.tool().to_string()).or_insert(0.0) += cost;
        }
    }

    CostMetrics {
        total_cost: total,
        average_cost: if priced == 0 { 0.0 } else { total / priced as f64 },
        cost_by_tool,
    }
}

//! Redundant-call rate.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::ToolCall;

use super::tool_names;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyMetrics {
    pub redundant_count: usize,
    pub total_calls: usize,
    pub redundant_rate: f64,
}

/// Actual occurrences of a tool beyond its expected count are redundant.
/// Tools never expected count every occurrence, exactly once.
pub fn redundant_call_rate(expected: &[ToolCall], actual: &[ToolCall]) -> EfficiencyMetrics {
    if actual.is_empty() {
        return EfficiencyMetrics {
            redundant_count: 0,
            total_calls: 0,
            redundant_rate: 0.0,
        };
    }

    let expected_counts = count_by_name(expected);
    let redundant: usize = count_by_name(actual)
        .into_iter()
        .map(|(tool, n)| n.saturating_sub(expected_counts.get(tool).copied().unwrap_or(0)))
        .sum();

    EfficiencyMetrics {
        redundant_count: redundant,
        total_calls: actual.len(),
        redundant_rate: redundant as f64 / actual.len() as f64,
    }
}

fn count_by_name(calls: &[ToolCall]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for name in tool_names(calls) {
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
}

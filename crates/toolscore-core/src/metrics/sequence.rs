//! Sequence alignment over tool names.

#![allow(clippy::needless_range_loop)] // DP table indexing

use serde::Serialize;

use crate::domain::ToolCall;

use super::tool_names;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceMetrics {
    pub edit_distance: usize,
    pub normalized_distance: f64,
    pub sequence_accuracy: f64,
}

/// Levenshtein distance between the two tool-name sequences, normalized by
/// the longer length (at least 1).
pub fn edit_distance(expected: &[ToolCall], actual: &[ToolCall]) -> SequenceMetrics {
    let e: Vec<&str> = tool_names(expected).collect();
    let a: Vec<&str> = tool_names(actual).collect();

    let distance = levenshtein(&e, &a);
    let longest = e.len().max(a.len()).max(1);
    let normalized = distance as f64 / longest as f64;

    SequenceMetrics {
        edit_distance: distance,
        normalized_distance: normalized,
        sequence_accuracy: 1.0 - normalized,
    }
}

fn levenshtein(a: &[&str], b: &[&str]) -> usize {
    let m = a.len();
    let n = b.len();
    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for i in 0..=m {
        dp[i][0] = i;
    }
    for j in 0..=n {
        dp[0][j] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }
    dp[m][n]
}

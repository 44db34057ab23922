//! Baseline persistence and regression comparison.
//!
//! A [`Baseline`] is a flat metric map saved from an earlier evaluation.
//! [`compare_to_baseline`] diffs a fresh [`EvaluationResult`] against it and
//! produces a [`ComparisonResult`]: the pass/fail decision that blocks a
//! regression from landing.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::domain::{Result, ToolscoreError};
use crate::evaluate::EvaluationResult;
use crate::loader::read_json;
use crate::obs::emit_baseline_compared;

/// Metrics where a drop is an improvement.
const LOWER_IS_BETTER: &[&str] = &["redundant_rate"];

// ---------------------------------------------------------------------------
// Baseline
// ---------------------------------------------------------------------------

/// A saved evaluation snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Baseline {
    /// Toolscore version that produced the baseline.
    #[serde(default = "unknown_version")]
    pub version: String,
    pub created_at: DateTime<Utc>,
    /// SHA-256 hex digest of the gold file; empty when not recorded.
    #[serde(default)]
    pub gold_file_hash: String,
    pub metrics: BTreeMap<String, f64>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

fn unknown_version() -> String {
    "unknown".to_string()
}

impl Baseline {
    /// Snapshot a result. The gold file, when given and present, is hashed
    /// so later comparisons can tell whether the expectations changed.
    pub fn from_result(result: &EvaluationResult, gold_file: Option<&Path>) -> Result<Self> {
        let gold_file_hash = match gold_file {
            Some(path) if path.exists() => file_sha256(path)?,
            _ => String::new(),
        };

        let summary = result.summary();
        let mut metadata = BTreeMap::new();
        metadata.insert("gold_calls_count".into(), summary.gold_calls_count.into());
        metadata.insert("trace_calls_count".into(), summary.trace_calls_count.into());

        Ok(Self {
            version: crate::VERSION.to_string(),
            created_at: Utc::now(),
            gold_file_hash,
            metrics: result.flat_metrics(),
            metadata,
        })
    }

    /// `Some(true)` when `gold_file` still hashes to the recorded digest,
    /// `None` when no digest was recorded.
    pub fn gold_file_matches(&self, gold_file: &Path) -> Result<Option<bool>> {
        if self.gold_file_hash.is_empty() {
            return Ok(None);
        }
        Ok(Some(file_sha256(gold_file)? == self.gold_file_hash))
    }
}

fn file_sha256(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Write a baseline as pretty JSON, creating parent directories.
pub fn save_baseline(baseline: &Baseline, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(baseline)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read a baseline written by [`save_baseline`].
///
/// # Errors
///
/// `NotFound`/`Parse` as for any JSON file; `Format` when the document is
/// not an object with a `metrics` map.
pub fn load_baseline(path: impl AsRef<Path>) -> Result<Baseline> {
    let path = path.as_ref();
    let value = read_json(path)?;
    let has_metrics = value.as_object().is_some_and(|o| o.contains_key("metrics"));
    if !has_metrics {
        return Err(ToolscoreError::format(format!(
            "invalid baseline file format: {}",
            path.display()
        )));
    }
    serde_json::from_value(value).map_err(|err| {
        ToolscoreError::format(format!(
            "invalid baseline file format: {}: {err}",
            path.display()
        ))
    })
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegressionStatus {
    Regression,
    Improvement,
    Stable,
}

/// Movement of one metric against the baseline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegressionItem {
    pub metric_name: String,
    pub baseline_value: f64,
    pub current_value: f64,
    /// `current - baseline`.
    pub delta: f64,
    /// Relative change in percent; ±100 (or 0) when the baseline is 0.
    pub delta_percent: f64,
    pub threshold: f64,
    pub status: RegressionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonResult {
    pub passed: bool,
    pub threshold: f64,
    pub baseline_timestamp: DateTime<Utc>,
    pub comparison_timestamp: DateTime<Utc>,
    /// Regressions first, then by descending `|delta|`.
    pub items: Vec<RegressionItem>,
    pub summary: String,
}

impl ComparisonResult {
    pub fn regressions(&self) -> impl Iterator<Item = &RegressionItem> {
        self.with_status(RegressionStatus::Regression)
    }

    pub fn improvements(&self) -> impl Iterator<Item = &RegressionItem> {
        self.with_status(RegressionStatus::Improvement)
    }

    pub fn stable(&self) -> impl Iterator<Item = &RegressionItem> {
        self.with_status(RegressionStatus::Stable)
    }

    fn with_status(&self, status: RegressionStatus) -> impl Iterator<Item = &RegressionItem> {
        self.items.iter().filter(move |i| i.status == status)
    }
}

/// Compare `result` against every metric recorded in `baseline`.
///
/// A metric regresses when it moves the wrong way by more than `threshold`
/// (absolute). Metrics missing from the current result count as 0.0.
pub fn compare_to_baseline(
    result: &EvaluationResult,
    baseline: &Baseline,
    threshold: f64,
) -> ComparisonResult {
    let current = result.flat_metrics();

    let mut items: Vec<RegressionItem> = baseline
        .metrics
        .iter()
        .map(|(name, &baseline_value)| {
            let current_value = current.get(name).copied().unwrap_or(0.0);
            let delta = current_value - baseline_value;
            RegressionItem {
                metric_name: name.clone(),
                baseline_value,
                current_value,
                delta,
                delta_percent: delta_percent(delta, baseline_value),
                threshold,
                status: classify(name, delta, threshold),
            }
        })
        .collect();

    items.sort_by(|a, b| {
        let rank = |i: &RegressionItem| u8::from(i.status != RegressionStatus::Regression);
        rank(a)
            .cmp(&rank(b))
            .then_with(|| b.delta.abs().total_cmp(&a.delta.abs()))
    });

    let regressions = items
        .iter()
        .filter(|i| i.status == RegressionStatus::Regression)
        .count();
    let improvements = items
        .iter()
        .filter(|i| i.status == RegressionStatus::Improvement)
        .count();
    let passed = regressions == 0;
    let pct = threshold * 100.0;

    let summary = if !passed {
        format!("FAIL: {regressions} regression(s) detected (threshold: {pct:.0}%)")
    } else if improvements > 0 {
        format!("PASS: No regressions, {improvements} improvement(s) detected")
    } else {
        format!("PASS: No significant changes (threshold: {pct:.0}%)")
    };

    emit_baseline_compared(regressions, improvements, passed);

    ComparisonResult {
        passed,
        threshold,
        baseline_timestamp: baseline.created_at,
        comparison_timestamp: Utc::now(),
        items,
        summary,
    }
}

fn delta_percent(delta: f64, baseline: f64) -> f64 {
    if baseline != 0.0 {
        delta / baseline * 100.0
    } else if delta > 0.0 {
        100.0
    } else if delta < 0.0 {
        -100.0
    } else {
        0.0
    }
}

fn classify(metric: &str, delta: f64, threshold: f64) -> RegressionStatus {
    // orient so that positive always means "better"
    let gain = if LOWER_IS_BETTER.contains(&metric) {
        -delta
    } else {
        delta
    };
    if gain < -threshold {
        RegressionStatus::Regression
    } else if gain > threshold {
        RegressionStatus::Improvement
    } else {
        RegressionStatus::Stable
    }
}

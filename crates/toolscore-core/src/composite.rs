//! Composite score: a weighted sum of four component metrics.
//!
//! Weights are validated when they are built or deserialized, so scoring
//! itself cannot fail. Weights are not normalized; the defaults sum to 1.0.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::ValidationError;
use crate::evaluate::MetricsReport;

/// Component keys accepted in a weight map.
pub const COMPOSITE_KEYS: [&str; 4] = [
    "selection_accuracy",
    "argument_f1",
    "sequence_accuracy",
    "efficiency",
];

/// Validated composite weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>")]
pub struct CompositeWeights {
    selection_accuracy: f64,
    argument_f1: f64,
    sequence_accuracy: f64,
    efficiency: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            selection_accuracy: 0.4,
            argument_f1: 0.3,
            sequence_accuracy: 0.2,
            efficiency: 0.1,
        }
    }
}

impl CompositeWeights {
    /// Build weights from `(key, weight)` pairs. Keys not supplied weigh 0.
    ///
    /// # Errors
    ///
    /// - `UnknownWeightKey` for a key outside [`COMPOSITE_KEYS`]
    /// - `NonFiniteWeight` for NaN or infinite values
    /// - `NegativeWeight` for values below zero
    pub fn new<K, I>(weights: I) -> Result<Self, ValidationError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut out = Self {
            selection_accuracy: 0.0,
            argument_f1: 0.0,
            sequence_accuracy: 0.0,
            efficiency: 0.0,
        };

        for (key, value) in weights {
            let key = key.as_ref();
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteWeight {
                    key: key.to_string(),
                });
            }
            if value < 0.0 {
                return Err(ValidationError::NegativeWeight {
                    key: key.to_string(),
                    value,
                });
            }
            let slot = match key {
                "selection_accuracy" => &mut out.selection_accuracy,
                "argument_f1" => &mut out.argument_f1,
                "sequence_accuracy" => &mut out.sequence_accuracy,
                "efficiency" => &mut out.efficiency,
                other => {
                    return Err(ValidationError::UnknownWeightKey {
                        key: other.to_string(),
                        allowed: COMPOSITE_KEYS.join(", "),
                    })
                }
            };
            *slot = value;
        }
        Ok(out)
    }

    /// Weight for one component key.
    pub fn get(&self, key: &str) -> Option<f64> {
        match key {
            "selection_accuracy" => Some(self.selection_accuracy),
            "argument_f1" => Some(self.argument_f1),
            "sequence_accuracy" => Some(self.sequence_accuracy),
            "efficiency" => Some(self.efficiency),
            _ => None,
        }
    }

    /// Weighted sum of the components.
    pub fn combine(&self, c: &CompositeComponents) -> f64 {
        self.selection_accuracy * c.selection_accuracy
            + self.argument_f1 * c.argument_f1
            + self.sequence_accuracy * c.sequence_accuracy
            + self.efficiency * c.efficiency
    }

    /// Score a metrics report. `passed` is true when no minimum is given or
    /// the score reaches it.
    pub fn score(&self, report: &MetricsReport, min_score: Option<f64>) -> CompositeScore {
        self.score_components(CompositeComponents::from_report(report), min_score)
    }

    /// [`score`](Self::score) over already-extracted components.
    pub fn score_components(
        &self,
        components: CompositeComponents,
        min_score: Option<f64>,
    ) -> CompositeScore {
        let score = self.combine(&components);
        CompositeScore {
            score,
            weights: *self,
            components,
            min_score,
            passed: min_score.map_or(true, |min| score >= min),
        }
    }
}

impl TryFrom<BTreeMap<String, f64>> for CompositeWeights {
    type Error = ValidationError;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::new(map)
    }
}

/// The four inputs to the composite, read off a [`MetricsReport`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompositeComponents {
    pub selection_accuracy: f64,
    pub argument_f1: f64,
    pub sequence_accuracy: f64,
    /// `1 - redundant_rate`.
    pub efficiency: f64,
}

impl CompositeComponents {
    pub fn from_report(report: &MetricsReport) -> Self {
        Self {
            selection_accuracy: report.selection_accuracy,
            argument_f1: report.argument_metrics.f1,
            sequence_accuracy: report.sequence_metrics.sequence_accuracy,
            efficiency: 1.0 - report.efficiency_metrics.redundant_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeScore {
    pub score: f64,
    pub weights: CompositeWeights,
    pub components: CompositeComponents,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    pub passed: bool,
}

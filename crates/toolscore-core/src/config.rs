//! Evaluation configuration file (JSON).
//!
//! Every field is optional in the file; missing fields take the defaults
//! below. The CLI overlays its flags on top of a loaded config.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::adapters::TraceFormat;
use crate::composite::CompositeWeights;
use crate::domain::{Result, ToolscoreError};
use crate::loader::read_json;

/// Default tolerance for baseline comparison.
pub const DEFAULT_REGRESSION_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Trace format; `auto` detects it from the payload.
    pub format: TraceFormat,

    /// Positional tool-correctness instead of set-based.
    pub strict_order: bool,

    /// Composite weights, validated on load.
    pub weights: CompositeWeights,

    /// Composite scores below this fail the evaluation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_composite_score: Option<f64>,

    /// Allowed drop before a baseline metric counts as a regression.
    pub regression_threshold: f64,

    /// Case/separator-insensitive names for partial trajectory accuracy.
    pub normalize_tool_names: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            format: TraceFormat::Auto,
            strict_order: false,
            weights: CompositeWeights::default(),
            min_composite_score: None,
            regression_threshold: DEFAULT_REGRESSION_THRESHOLD,
            normalize_tool_names: false,
        }
    }
}

impl EvalConfig {
    /// Load a config file.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing file, `Parse` for malformed JSON or invalid
    /// fields, `Validation` for rejected composite weights.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let parse_err = |source| ToolscoreError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let mut value = read_json(path)?;
        let raw_weights = value.as_object_mut().and_then(|obj| obj.remove("weights"));

        let mut config: Self = serde_json::from_value(value).map_err(parse_err)?;
        if let Some(raw) = raw_weights {
            let raw: BTreeMap<String, f64> = serde_json::from_value(raw).map_err(parse_err)?;
            config.weights = CompositeWeights::new(raw)?;
        }
        Ok(config)
    }
}

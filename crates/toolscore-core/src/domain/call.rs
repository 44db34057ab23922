//! Canonical tool-call record shared by every adapter and metric.
//!
//! A [`ToolCall`] always has a non-empty tool name and an argument map.
//! Missing or `null` arguments are normalized to an empty map once, at
//! construction time, so consumers never see an unset `args`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ValidationError;

/// Argument and metadata map type. Keys are kept sorted, which keeps every
/// serialized report byte-for-byte reproducible.
pub type Args = Map<String, Value>;

/// A single normalized tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawToolCall")]
pub struct ToolCall {
    tool: String,
    args: Args,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<f64>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    metadata: Args,
}

impl ToolCall {
    /// Create a call with the given tool name and arguments.
    ///
    /// # Errors
    ///
    /// `ValidationError::EmptyToolName` when `tool` is empty.
    pub fn new(tool: impl Into<String>, args: Args) -> Result<Self, ValidationError> {
        let tool = tool.into();
        if tool.is_empty() {
            return Err(ValidationError::EmptyToolName);
        }
        Ok(Self {
            tool,
            args,
            result: None,
            timestamp: None,
            duration: None,
            cost: None,
            metadata: Map::new(),
        })
    }

    /// Create a call from a loosely-typed argument value.
    ///
    /// `None`/`null` become an empty map, objects are used as-is and any
    /// other value is wrapped as `{"value": v}`.
    pub fn from_value_args(
        tool: impl Into<String>,
        args: Option<Value>,
    ) -> Result<Self, ValidationError> {
        Self::new(tool, args_from_value(args))
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Attach a single metadata entry (builder pattern).
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Replace the whole metadata map.
    pub fn with_metadata_map(mut self, metadata: Args) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn timestamp(&self) -> Option<f64> {
        self.timestamp
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn cost(&self) -> Option<f64> {
        self.cost
    }

    pub fn metadata(&self) -> &Args {
        &self.metadata
    }

    /// Look up one metadata entry.
    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Structural equality over `(tool, args)`, with numeric cross-type
    /// equality inside the argument values.
    pub fn same_call(&self, other: &ToolCall) -> bool {
        self.tool == other.tool && args_equal(&self.args, &other.args)
    }
}

/// Wire shape accepted when decoding a [`ToolCall`]; validated on conversion.
#[derive(Deserialize)]
struct RawToolCall {
    tool: String,
    #[serde(default)]
    args: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    timestamp: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    cost: Option<f64>,
    #[serde(default)]
    metadata: Option<Args>,
}

impl TryFrom<RawToolCall> for ToolCall {
    type Error = ValidationError;

    fn try_from(raw: RawToolCall) -> Result<Self, Self::Error> {
        let mut call = ToolCall::from_value_args(raw.tool, raw.args)?;
        call.result = raw.result;
        call.timestamp = raw.timestamp;
        call.duration = raw.duration;
        call.cost = raw.cost;
        call.metadata = raw.metadata.unwrap_or_default();
        Ok(call)
    }
}

/// Normalize an optional argument value into an argument map.
pub fn args_from_value(value: Option<Value>) -> Args {
    match value {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

/// JSON equality where numbers compare by `f64` value (`1 == 1.0`),
/// applied recursively through arrays and objects. Strings compare exactly.
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| json_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => args_equal(x, y),
        _ => a == b,
    }
}

/// Full argument-map equality under [`json_equal`] value rules.
pub fn args_equal(a: &Args, b: &Args) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| json_equal(value, other)))
}

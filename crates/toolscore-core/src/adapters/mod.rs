//! Trace-format adapters.
//!
//! Each submodule exposes one pure `parse(&Value) -> Result<Vec<ToolCall>>`
//! function for a single provider wire format. Dispatch is a closed
//! [`TraceFormat`] enum; [`parse_trace`] resolves `Auto` through
//! [`crate::detect::detect_format`].
//!
//! Shared contract:
//! - the payload must be a JSON object or array, anything else is a
//!   [`ToolscoreError::Format`];
//! - malformed items are skipped (logged at `debug`), never raised;
//! - every produced call carries its source tag in `metadata["format"]`.

pub mod anthropic;
pub mod custom;
pub mod gemini;
pub mod langchain;
pub mod mcp;
pub mod openai;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::detect::detect_format;
use crate::domain::{Args, Result, ToolCall, ToolscoreError};
use crate::obs::{emit_format_detected, emit_item_skipped};

/// Supported trace wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceFormat {
    /// Pick a format from the payload shape.
    #[default]
    Auto,
    OpenAi,
    Anthropic,
    Gemini,
    Mcp,
    LangChain,
    Custom,
}

impl TraceFormat {
    /// Every explicit (non-`Auto`) format.
    pub const EXPLICIT: [TraceFormat; 6] = [
        TraceFormat::OpenAi,
        TraceFormat::Anthropic,
        TraceFormat::Gemini,
        TraceFormat::Mcp,
        TraceFormat::LangChain,
        TraceFormat::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TraceFormat::Auto => "auto",
            TraceFormat::OpenAi => "openai",
            TraceFormat::Anthropic => "anthropic",
            TraceFormat::Gemini => "gemini",
            TraceFormat::Mcp => "mcp",
            TraceFormat::LangChain => "langchain",
            TraceFormat::Custom => "custom",
        }
    }
}

impl fmt::Display for TraceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraceFormat {
    type Err = ToolscoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(TraceFormat::Auto),
            "openai" => Ok(TraceFormat::OpenAi),
            "anthropic" => Ok(TraceFormat::Anthropic),
            "gemini" => Ok(TraceFormat::Gemini),
            "mcp" => Ok(TraceFormat::Mcp),
            "langchain" => Ok(TraceFormat::LangChain),
            "custom" => Ok(TraceFormat::Custom),
            other => Err(ToolscoreError::format(format!(
                "unsupported format: {other}"
            ))),
        }
    }
}

/// Parse a raw trace payload into canonical calls.
///
/// `TraceFormat::Auto` is resolved with [`detect_format`] first.
pub fn parse_trace(format: TraceFormat, payload: &Value) -> Result<Vec<ToolCall>> {
    let resolved = match format {
        TraceFormat::Auto => {
            let detected = detect_format(payload);
            emit_format_detected(detected.as_str());
            detected
        }
        explicit => explicit,
    };

    match resolved {
        TraceFormat::OpenAi => openai::parse(payload),
        TraceFormat::Anthropic => anthropic::parse(payload),
        TraceFormat::Gemini => gemini::parse(payload),
        TraceFormat::Mcp => mcp::parse(payload),
        TraceFormat::LangChain => langchain::parse(payload),
        // detection never yields Auto
        TraceFormat::Custom | TraceFormat::Auto => custom::parse(payload),
    }
}

/// Reject payloads that are neither an object nor an array.
pub(crate) fn ensure_container(payload: &Value, format: TraceFormat) -> Result<()> {
    match payload {
        Value::Object(_) | Value::Array(_) => Ok(()),
        Value::Null => Err(ToolscoreError::format(format!(
            "{format} trace must not be null"
        ))),
        other => Err(ToolscoreError::format(format!(
            "{format} trace must be an object or array, got {}",
            json_type_name(other)
        ))),
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Truthiness used by the candidate-key lookups: `null`, `false`, `0`, `""`,
/// `[]` and `{}` are all treated as absent.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Decode a JSON-encoded argument string. Only objects count as success.
pub(crate) fn decode_args_str(raw: &str) -> Option<Args> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Single-entry map, used for the per-provider string fallbacks.
pub(crate) fn single_field(key: &str, value: Value) -> Args {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}

/// Build a call, skipping (and logging) items with an empty tool name.
pub(crate) fn named_call(
    format: &str,
    index: usize,
    tool: &str,
    args: Args,
    metadata: Args,
) -> Option<ToolCall> {
    match ToolCall::new(tool, args) {
        Ok(call) => Some(call.with_metadata_map(metadata)),
        Err(err) => {
            emit_item_skipped(format, index, &err.to_string());
            None
        }
    }
}

/// Optional value → JSON (`None` becomes `null`).
pub(crate) fn opt_value(value: Option<&Value>) -> Value {
    value.cloned().unwrap_or(Value::Null)
}

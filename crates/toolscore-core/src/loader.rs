//! Loading boundary: gold-standard and trace files.
//!
//! This is the only place (besides config, baseline and reporting) that
//! touches the filesystem. Errors carry the offending path.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::adapters::{json_type_name, parse_trace, TraceFormat};
use crate::domain::{args_from_value, Result, ToolCall, ToolscoreError};
use crate::obs::emit_item_skipped;

/// Read and decode a JSON file.
///
/// # Errors
///
/// `NotFound` when the path does not exist, `Io` when it cannot be read,
/// `Parse` when the contents are not valid JSON.
pub fn read_json(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(ToolscoreError::NotFound(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| ToolscoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a gold-standard file: a JSON array of
/// `{tool, args?, description?, side_effects?}` objects.
pub fn load_gold_standard(path: impl AsRef<Path>) -> Result<Vec<ToolCall>> {
    let value = read_json(path.as_ref())?;
    parse_gold_standard(&value)
}

/// Gold-standard rules over an in-memory value.
///
/// Non-object items and items without a non-empty string `tool` are skipped.
/// `side_effects` (default `{}`) and a non-empty `description` are kept in
/// the call's metadata.
pub fn parse_gold_standard(value: &Value) -> Result<Vec<ToolCall>> {
    let Value::Array(items) = value else {
        return Err(ToolscoreError::format(format!(
            "gold standard must be a JSON array of tool calls, got {}",
            json_type_name(value)
        )));
    };

    let mut calls = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            emit_item_skipped("gold", index, "not an object");
            continue;
        };
        let Some(tool) = obj.get("tool").and_then(Value::as_str).filter(|t| !t.is_empty())
        else {
            emit_item_skipped("gold", index, "missing tool name");
            continue;
        };

        let mut metadata = Map::new();
        metadata.insert(
            "side_effects".into(),
            obj.get("side_effects")
                .filter(|v| !v.is_null())
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
        );
        if let Some(description) = obj
            .get("description")
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
        {
            metadata.insert("description".into(), Value::String(description.to_string()));
        }

        let call = ToolCall::new(tool, args_from_value(obj.get("args").cloned()))?
            .with_metadata_map(metadata);
        calls.push(call);
    }
    Ok(calls)
}

/// Load a trace file and run it through the adapter for `format`
/// (`Auto` detects it from the payload).
pub fn load_trace(path: impl AsRef<Path>, format: TraceFormat) -> Result<Vec<ToolCall>> {
    let value = read_json(path.as_ref())?;
    parse_trace(format, &value)
}

//! Generic JSON traces: `{"calls": [...]}`, `{"tool_calls": [...]}`, a bare
//! array of call objects, or a single call object.
//!
//! This is also the shape [`ToolCall`] serializes to, so canonical calls
//! written by [`crate::capture::CallRecorder`] round-trip through here.

use serde_json::{Map, Value};

use super::{ensure_container, is_truthy, json_type_name, TraceFormat};
use crate::domain::{args_from_value, Result, ToolCall, ToolscoreError};
use crate::obs::emit_item_skipped;

const FORMAT: &str = "custom";

const NAME_KEYS: &[&str] = &["tool", "name", "function"];
const ARGS_KEYS: &[&str] = &["args", "arguments", "input"];
const RESULT_KEYS: &[&str] = &["result", "output"];
const TIMESTAMP_KEYS: &[&str] = &["timestamp", "time"];
const DURATION_KEYS: &[&str] = &["duration", "elapsed"];
const COST_KEYS: &[&str] = &["cost"];

pub fn parse(payload: &Value) -> Result<Vec<ToolCall>> {
    ensure_container(payload, TraceFormat::Custom)?;

    let single;
    let calls = match payload {
        Value::Object(obj) => match container(obj) {
            Some(calls) => calls,
            None if obj.contains_key("tool") || obj.contains_key("name") => {
                single = Value::Array(vec![payload.clone()]);
                &single
            }
            None => return Ok(Vec::new()),
        },
        other => other,
    };

    let Value::Array(items) = calls else {
        return Err(ToolscoreError::format(format!(
            "expected a list of calls in custom trace, got {}",
            json_type_name(calls)
        )));
    };

    Ok(items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| parse_call(item, index))
        .collect())
}

fn parse_call(item: &Value, index: usize) -> Option<ToolCall> {
    let obj = item.as_object()?;

    let Some(tool) = NAME_KEYS
        .iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| is_truthy(value))
        .and_then(Value::as_str)
    else {
        emit_item_skipped(FORMAT, index, "no tool name");
        return None;
    };

    let args = args_from_value(first_truthy(obj, ARGS_KEYS).cloned());
    let mut call = ToolCall::new(tool, args).ok()?;

    if let Some(result) = first_truthy(obj, RESULT_KEYS) {
        call = call.with_result(result.clone());
    }
    if let Some(ts) = first_truthy(obj, TIMESTAMP_KEYS).and_then(Value::as_f64) {
        call = call.with_timestamp(ts);
    }
    if let Some(duration) = first_truthy(obj, DURATION_KEYS).and_then(Value::as_f64) {
        call = call.with_duration(duration);
    }
    if let Some(cost) = first_truthy(obj, COST_KEYS).and_then(Value::as_f64) {
        call = call.with_cost(cost);
    }

    let metadata: Map<String, Value> = obj
        .iter()
        .filter(|(key, _)| !is_known_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some(call.with_metadata_map(metadata))
}

/// `calls` wins whenever present, even if empty; `tool_calls` is only
/// consulted without it.
fn container(obj: &Map<String, Value>) -> Option<&Value> {
    obj.get("calls")
        .or_else(|| obj.get("tool_calls"))
        .filter(|value| is_truthy(value))
}

fn first_truthy<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| is_truthy(value))
}

fn is_known_key(key: &str) -> bool {
    [
        NAME_KEYS,
        ARGS_KEYS,
        RESULT_KEYS,
        TIMESTAMP_KEYS,
        DURATION_KEYS,
        COST_KEYS,
    ]
    .iter()
    .any(|keys| keys.contains(&key))
}

//! LangChain agent traces.
//!
//! Three item shapes are recognized, tried in this order:
//! - legacy `AgentAction`: `{tool, tool_input, log?, tool_call_id?}`
//! - modern tool call: `{name, args, id?, type?}`
//! - action dict: `{action, action_input}`

use serde_json::{json, Map, Value};

use super::{decode_args_str, json_type_name, named_call, single_field};
use crate::domain::{Args, Result, ToolCall, ToolscoreError};

const FORMAT: &str = "langchain";

pub fn parse(payload: &Value) -> Result<Vec<ToolCall>> {
    let Value::Array(items) = payload else {
        return Err(ToolscoreError::format(format!(
            "langchain trace must be a list, got {}",
            json_type_name(payload)
        )));
    };

    let mut calls = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let Some(item) = item.as_object() else {
            continue;
        };
        let parsed = if item.contains_key("tool") {
            legacy_action(item, index)
        } else if item.contains_key("name") {
            modern_call(item, index)
        } else if item.contains_key("action") {
            action_dict(item, index)
        } else {
            None
        };
        calls.extend(parsed);
    }
    Ok(calls)
}

fn legacy_action(item: &Map<String, Value>, index: usize) -> Option<ToolCall> {
    let mut metadata = tagged("langchain_legacy");
    if let Some(log) = item.get("log") {
        metadata.insert("log".into(), log.clone());
    }
    if let Some(id) = item.get("tool_call_id") {
        metadata.insert("id".into(), id.clone());
    }
    let args = decode_input(item.get("tool_input"));
    named_call(FORMAT, index, name_of(item, "tool"), args, metadata)
}

fn modern_call(item: &Map<String, Value>, index: usize) -> Option<ToolCall> {
    let mut metadata = tagged("langchain_modern");
    for key in ["id", "type"] {
        if let Some(value) = item.get(key) {
            metadata.insert(key.into(), value.clone());
        }
    }
    let args = decode_input(item.get("args"));
    named_call(FORMAT, index, name_of(item, "name"), args, metadata)
}

fn action_dict(item: &Map<String, Value>, index: usize) -> Option<ToolCall> {
    let args = decode_input(item.get("action_input"));
    named_call(
        FORMAT,
        index,
        name_of(item, "action"),
        args,
        tagged("langchain_action"),
    )
}

fn name_of<'a>(item: &'a Map<String, Value>, key: &str) -> &'a str {
    item.get(key).and_then(Value::as_str).unwrap_or("")
}

fn tagged(tag: &str) -> Args {
    single_field("format", json!(tag))
}

/// Strings are JSON-decoded with an `{"input": s}` fallback; any other
/// non-object input becomes `{}`.
fn decode_input(raw: Option<&Value>) -> Args {
    match raw {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(s)) => {
            decode_args_str(s).unwrap_or_else(|| single_field("input", Value::String(s.clone())))
        }
        _ => Args::new(),
    }
}

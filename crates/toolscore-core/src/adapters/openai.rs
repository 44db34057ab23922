//! OpenAI chat-completion traces.
//!
//! Accepts a bare message list, `{"messages": [...]}`, or a completion
//! response `{"choices": [{"message": {...}}, ...]}`. Both the legacy
//! `function_call` field and modern `tool_calls[]` entries are extracted.

use serde_json::{json, Map, Value};

use super::{decode_args_str, ensure_container, named_call, single_field, TraceFormat};
use crate::domain::{args_from_value, Args, Result, ToolCall, ToolscoreError};

const FORMAT: &str = "openai";

pub fn parse(payload: &Value) -> Result<Vec<ToolCall>> {
    ensure_container(payload, TraceFormat::OpenAi)?;
    let messages = messages(payload)?;

    let mut calls = Vec::new();
    for (index, msg) in messages.iter().enumerate() {
        let Some(msg) = msg.as_object() else {
            continue;
        };

        if let Some(function_call) = msg.get("function_call") {
            let mut metadata = Map::new();
            metadata.insert("format".into(), json!("function_call"));
            if let Some(call) = function_call_entry(function_call, index, metadata) {
                calls.push(call);
            }
        }

        if let Some(Value::Array(tool_calls)) = msg.get("tool_calls") {
            for entry in tool_calls {
                if entry.get("type").and_then(Value::as_str) != Some("function") {
                    continue;
                }
                let mut metadata = Map::new();
                metadata.insert("format".into(), json!("tool_calls"));
                metadata.insert(
                    "id".into(),
                    entry.get("id").cloned().unwrap_or(Value::Null),
                );
                let function = entry.get("function").unwrap_or(&Value::Null);
                if let Some(call) = function_call_entry(function, index, metadata) {
                    calls.push(call);
                }
            }
        }
    }
    Ok(calls)
}

/// Resolve the message list from any accepted container shape.
fn messages(payload: &Value) -> Result<Vec<Value>> {
    let list = match payload {
        Value::Object(obj) => obj
            .get("messages")
            .or_else(|| obj.get("choices"))
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())),
        other => other.clone(),
    };

    let Value::Array(items) = list else {
        return Err(ToolscoreError::format(
            "expected a list of messages in openai trace",
        ));
    };

    // completion response: unwrap choices[].message
    let is_choices = items
        .first()
        .and_then(Value::as_object)
        .is_some_and(|first| first.contains_key("message"));
    if is_choices {
        return Ok(items
            .iter()
            .filter_map(|choice| choice.get("message").cloned())
            .collect());
    }
    Ok(items)
}

fn function_call_entry(function: &Value, index: usize, metadata: Args) -> Option<ToolCall> {
    let name = function.get("name").and_then(Value::as_str).unwrap_or("");
    let args = decode_arguments(function.get("arguments"));
    named_call(FORMAT, index, name, args, metadata)
}

fn decode_arguments(raw: Option<&Value>) -> Args {
    match raw {
        Some(Value::String(s)) => {
            decode_args_str(s).unwrap_or_else(|| single_field("raw", Value::String(s.clone())))
        }
        other => args_from_value(other.cloned()),
    }
}

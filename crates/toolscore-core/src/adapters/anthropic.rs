//! Anthropic messages traces: `tool_use` content blocks on assistant turns.

use serde_json::{json, Map, Value};

use super::{ensure_container, named_call, opt_value, TraceFormat};
use crate::domain::{Result, ToolCall, ToolscoreError};

const FORMAT: &str = "anthropic";

pub fn parse(payload: &Value) -> Result<Vec<ToolCall>> {
    ensure_container(payload, TraceFormat::Anthropic)?;

    let messages = match payload {
        Value::Object(obj) => obj.get("messages").or_else(|| obj.get("content")),
        other => Some(other),
    };
    let messages = match messages {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ToolscoreError::format(
                "expected a list of messages in anthropic trace",
            ))
        }
    };

    let mut calls = Vec::new();
    for (index, msg) in messages.iter().enumerate() {
        if msg.get("role").and_then(Value::as_str) != Some("assistant") {
            continue;
        }
        let Some(Value::Array(blocks)) = msg.get("content") else {
            continue;
        };

        for block in blocks {
            if block.get("type").and_then(Value::as_str) != Some("tool_use") {
                continue;
            }
            let name = block.get("name").and_then(Value::as_str).unwrap_or("");
            let args = block
                .get("input")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();

            let mut metadata = Map::new();
            metadata.insert("format".into(), json!(FORMAT));
            metadata.insert("id".into(), opt_value(block.get("id")));
            metadata.insert("stop_reason".into(), opt_value(msg.get("stop_reason")));

            if let Some(call) = named_call(FORMAT, index, name, args, metadata) {
                calls.push(call);
            }
        }
    }
    Ok(calls)
}

//! Model Context Protocol traces (JSON-RPC 2.0).
//!
//! Requests (`method` + `params`) become calls with arguments; responses
//! (`result`/`error` + `id`) become calls carrying the tool result. JSON-RPC
//! responses do not name the tool, so the optional `result._tool_name` hint
//! is used and `"unknown"` when it is absent.

use serde_json::{json, Map, Value};

use super::{decode_args_str, ensure_container, is_truthy, named_call, opt_value, TraceFormat};
use crate::domain::{args_from_value, Args, Result, ToolCall};

const FORMAT: &str = "mcp";

const TOOLS_CALL: &str = "tools/call";

const UNKNOWN_TOOL: &str = "unknown";

pub fn parse(payload: &Value) -> Result<Vec<ToolCall>> {
    ensure_container(payload, TraceFormat::Mcp)?;

    let messages: Vec<&Value> = match payload {
        Value::Object(obj) if obj.contains_key("jsonrpc") => vec![payload],
        Value::Object(obj) => obj
            .get("messages")
            .or_else(|| obj.get("calls"))
            .or_else(|| obj.get("tools"))
            .and_then(Value::as_array)
            .map(|items| items.iter().collect())
            .unwrap_or_default(),
        Value::Array(items) => items.iter().collect(),
        _ => Vec::new(),
    };

    Ok(messages
        .into_iter()
        .enumerate()
        .filter_map(|(index, msg)| parse_message(msg, index))
        .collect())
}

fn parse_message(message: &Value, index: usize) -> Option<ToolCall> {
    let msg = message.as_object()?;
    let is_rpc = ["jsonrpc", "method", "params", "error"]
        .iter()
        .any(|k| msg.contains_key(*k));
    if !is_rpc {
        return None;
    }

    if msg.contains_key("method") && msg.contains_key("params") {
        return parse_request(msg, index);
    }
    if msg.contains_key("id") && (msg.contains_key("result") || msg.contains_key("error")) {
        return parse_response(msg, index);
    }
    None
}

fn parse_request(request: &Map<String, Value>, index: usize) -> Option<ToolCall> {
    let method = request.get("method").and_then(Value::as_str).unwrap_or("");
    let params = request.get("params").unwrap_or(&Value::Null);

    let (tool, args) = if method == TOOLS_CALL {
        let name = params.get("name").and_then(Value::as_str).unwrap_or("");
        let args = match params.get("arguments") {
            Some(Value::String(s)) => decode_args_str(s).unwrap_or_default(),
            other => args_from_value(other.cloned()),
        };
        (name, args)
    } else if !method.is_empty() && !method.starts_with("tools/") {
        // tool invoked directly as the JSON-RPC method
        (method, args_from_value(Some(params.clone())))
    } else {
        return None;
    };

    let mut metadata = Map::new();
    metadata.insert("format".into(), json!(FORMAT));
    metadata.insert("jsonrpc_id".into(), opt_value(request.get("id")));
    metadata.insert("method".into(), json!(method));

    named_call(FORMAT, index, tool, args, metadata)
}

fn parse_response(response: &Map<String, Value>, index: usize) -> Option<ToolCall> {
    let result = response.get("result").unwrap_or(&Value::Null);
    let error = response.get("error").filter(|e| !e.is_null());

    // an explicit empty hint is skipped by named_call, not renamed
    let tool = match result.get("_tool_name") {
        None | Some(Value::Null) => UNKNOWN_TOOL,
        Some(hint) => hint.as_str().unwrap_or(""),
    };

    let is_error =
        error.is_some() || result.get("isError").is_some_and(is_truthy);

    let mut metadata = Map::new();
    metadata.insert("format".into(), json!(FORMAT));
    metadata.insert("jsonrpc_id".into(), opt_value(response.get("id")));
    metadata.insert(
        "error".into(),
        opt_value(error.and_then(|e| e.get("message"))),
    );
    metadata.insert(
        "error_code".into(),
        opt_value(error.and_then(|e| e.get("code"))),
    );
    metadata.insert("is_error".into(), json!(is_error));

    let call = named_call(FORMAT, index, tool, Args::new(), metadata)?;
    if is_error {
        return Some(call);
    }
    Some(call.with_result(result_value(result)))
}

/// `structuredContent` if truthy, else the joined text items of a non-empty
/// `content` list, else the whole result object.
fn result_value(result: &Value) -> Value {
    if let Some(structured) = result.get("structuredContent").filter(|v| is_truthy(v)) {
        return structured.clone();
    }
    if let Some(Value::Array(content)) = result.get("content") {
        if !content.is_empty() {
            let text = content
                .iter()
                .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
                .map(|item| item.get("text").and_then(Value::as_str).unwrap_or(""))
                .collect::<Vec<_>>()
                .join(" ");
            return Value::String(text);
        }
    }
    result.clone()
}

//! Gemini `generateContent` traces.
//!
//! Function calls live in `parts[]` entries under `functionCall` (REST) or
//! `function_call` (SDK dumps). Parts may be nested in
//! `candidates[].content.parts`, in a top-level `content`, or given directly.

use serde_json::{json, Map, Value};

use super::{decode_args_str, ensure_container, named_call, opt_value, single_field, TraceFormat};
use crate::domain::{args_from_value, Args, Result, ToolCall};

const FORMAT: &str = "gemini";

const CALL_KEYS: [&str; 2] = ["functionCall", "function_call"];

pub fn parse(payload: &Value) -> Result<Vec<ToolCall>> {
    ensure_container(payload, TraceFormat::Gemini)?;

    let mut calls = Vec::new();
    match payload {
        Value::Object(obj) => {
            if let Some(candidates) = obj.get("candidates") {
                for candidate in candidates.as_array().into_iter().flatten() {
                    if let Some(content) = candidate.get("content") {
                        collect_content(content, &mut calls);
                    }
                }
            } else if let Some(content) = obj.get("content") {
                collect_content(content, &mut calls);
            } else if let Some(parts) = obj.get("parts") {
                collect_parts(parts, &mut calls);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let Some(item) = item.as_object() else {
                    continue;
                };
                if let Some(content) = item.get("content") {
                    collect_content(content, &mut calls);
                } else if let Some(parts) = item.get("parts") {
                    collect_parts(parts, &mut calls);
                } else if CALL_KEYS.iter().any(|k| item.contains_key(*k)) {
                    // a bare function-call object at the top level
                    let bare = Value::Object(item.clone());
                    calls.extend(function_call(&bare, index));
                }
            }
        }
        _ => {}
    }
    Ok(calls)
}

fn collect_content(content: &Value, calls: &mut Vec<ToolCall>) {
    match content {
        Value::Object(obj) => {
            if let Some(parts) = obj.get("parts") {
                collect_parts(parts, calls);
            }
        }
        Value::Array(_) => collect_parts(content, calls),
        _ => {}
    }
}

fn collect_parts(parts: &Value, calls: &mut Vec<ToolCall>) {
    let Some(parts) = parts.as_array() else {
        return;
    };
    for (index, part) in parts.iter().enumerate() {
        let Some(part) = part.as_object() else {
            continue;
        };
        if let Some(call) = CALL_KEYS.iter().find_map(|k| part.get(*k)) {
            calls.extend(function_call(call, index));
        }
    }
}

fn function_call(call: &Value, index: usize) -> Option<ToolCall> {
    let name = call.get("name").and_then(Value::as_str).unwrap_or("");
    let args = decode_arguments(call.get("args").or_else(|| call.get("arguments")));

    let mut metadata = Map::new();
    metadata.insert("format".into(), json!(FORMAT));
    metadata.insert("id".into(), opt_value(call.get("id")));

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_response() {
        let payload = json!({"candidates": [
            {"content": {"role": "model", "parts": [
                {"text": "checking"},
                {"functionCall": {"name": "get_weather", "args": {"city": "Oslo"}}}
            ]}}
        ]});
        let calls = parse(&payload).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool(), "get_weather");
        assert_eq!(calls[0].args()["city"], json!("Oslo"));
        assert_eq!(calls[0].metadata_value("format"), Some(&json!("gemini")));
    }

    #[test]
    fn test_list_of_contents_and_bare_calls() {
        let payload = json!([
            {"role": "model", "parts": [{"function_call": {"name": "a", "arguments": "{\"x\": 1}"}}]},
            {"content": [{"functionCall": {"name": "b"}}]},
            {"functionCall": {"name": "ignored-shape"}, "name": "c", "args": {"k": true}}
        ]);
        let calls = parse(&payload).unwrap();
        let names: Vec<_> = calls.iter().map(ToolCall::tool).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(calls[0].args()["x"], json!(1));
        assert!(calls[1].args().is_empty());
    }

    #[test]
    fn test_string_args_fallback_to_raw() {
        let payload = json!({"parts": [{"functionCall": {"name": "a", "args": "oops"}}]});
        let calls = parse(&payload).unwrap();
        assert_eq!(calls[0].args()["raw"], json!("oops"));
    }

    #[test]
    fn test_unrecognized_object_yields_nothing() {
        assert!(parse(&json!({"something": 1})).unwrap().is_empty());
    }
}

//! Trace format auto-detection.
//!
//! Rules are checked in a fixed order and the first match wins; anything
//! unrecognized falls through to [`TraceFormat::Custom`]. Detection never
//! fails. LangChain traces are not auto-detected and need an explicit format.

use serde_json::Value;

use crate::adapters::TraceFormat;

/// Pick the adapter for an undeclared payload.
pub fn detect_format(payload: &Value) -> TraceFormat {
    if let Value::Object(obj) = payload {
        if obj.contains_key("jsonrpc") {
            return TraceFormat::Mcp;
        }
        if obj.contains_key("candidates") {
            return TraceFormat::Gemini;
        }
        if obj.contains_key("messages") || obj.contains_key("choices") {
            return TraceFormat::OpenAi;
        }
    }

    let Some(first) = payload
        .as_array()
        .and_then(|items| items.first())
        .and_then(Value::as_object)
    else {
        return TraceFormat::Custom;
    };

    let has_gemini_part = first
        .get("parts")
        .and_then(Value::as_array)
        .is_some_and(|parts| {
            parts
                .iter()
                .any(|p| p.as_object().is_some_and(|p| p.contains_key("functionCall")))
        });
    if has_gemini_part {
        return TraceFormat::Gemini;
    }

    let is_assistant = first.get("role").and_then(Value::as_str) == Some("assistant");
    if is_assistant && first.get("content").is_some_and(Value::is_array) {
        return TraceFormat::Anthropic;
    }

    if first.contains_key("function_call") || first.contains_key("tool_calls") {
        return TraceFormat::OpenAi;
    }

    TraceFormat::Custom
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_jsonrpc_marker_is_mcp() {
        let payload = json!({"jsonrpc": "2.0", "method": "tools/call", "params": {}});
        assert_eq!(detect_format(&payload), TraceFormat::Mcp);
    }

    #[test]
    fn test_object_markers() {
        assert_eq!(detect_format(&json!({"candidates": []})), TraceFormat::Gemini);
        assert_eq!(detect_format(&json!({"messages": []})), TraceFormat::OpenAi);
        assert_eq!(detect_format(&json!({"choices": []})), TraceFormat::OpenAi);
        assert_eq!(detect_format(&json!({"calls": []})), TraceFormat::Custom);
    }

    #[test]
    fn test_jsonrpc_wins_over_messages() {
        let payload = json!({"jsonrpc": "2.0", "messages": []});
        assert_eq!(detect_format(&payload), TraceFormat::Mcp);
    }

    #[test]
    fn test_gemini_parts_list() {
        let payload = json!([{"role": "model", "parts": [{"functionCall": {"name": "x"}}]}]);
        assert_eq!(detect_format(&payload), TraceFormat::Gemini);
    }

    #[test]
    fn test_assistant_list_content_is_anthropic() {
        let payload = json!([{"role": "assistant", "content": [{"type": "text", "text": "hi"}]}]);
        assert_eq!(detect_format(&payload), TraceFormat::Anthropic);
    }

    #[test]
    fn test_assistant_string_content_with_tool_calls_is_openai() {
        let payload = json!([{"role": "assistant", "content": null, "tool_calls": []}]);
        assert_eq!(detect_format(&payload), TraceFormat::OpenAi);
    }

    #[test]
    fn test_fallbacks_to_custom() {
        assert_eq!(detect_format(&json!([])), TraceFormat::Custom);
        assert_eq!(detect_format(&json!([1, 2])), TraceFormat::Custom);
        assert_eq!(detect_format(&json!([{"tool": "x"}])), TraceFormat::Custom);
        assert_eq!(detect_format(&json!("scalar")), TraceFormat::Custom);
    }
}

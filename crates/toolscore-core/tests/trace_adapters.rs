//! Every provider format normalizes to the same canonical calls.

use serde_json::{json, Value};
use toolscore_core::{detect_format, parse_trace, ToolCall, ToolscoreError, TraceFormat};

fn names(calls: &[ToolCall]) -> Vec<&str> {
    calls.iter().map(ToolCall::tool).collect()
}

fn openai_trace() -> Value {
    json!({"messages": [
        {"role": "user", "content": "find rust docs and open the first hit"},
        {"role": "assistant", "tool_calls": [
            {"id": "call_1", "type": "function",
             "function": {"name": "search", "arguments": "{\"q\": \"rust\"}"}},
            {"id": "call_2", "type": "function",
             "function": {"name": "open", "arguments": "{\"rank\": 1}"}}
        ]}
    ]})
}

fn anthropic_trace() -> Value {
    json!([
        {"role": "assistant", "content": [
            {"type": "text", "text": "Searching."},
            {"type": "tool_use", "id": "toolu_1", "name": "search", "input": {"q": "rust"}},
            {"type": "tool_use", "id": "toolu_2", "name": "open", "input": {"rank": 1}}
        ]}
    ])
}

fn gemini_trace() -> Value {
    json!({"candidates": [{"content": {"parts": [
        {"functionCall": {"name": "search", "args": {"q": "rust"}}},
        {"functionCall": {"name": "open", "args": {"rank": 1}}}
    ]}}]})
}

fn mcp_trace() -> Value {
    json!([
        {"jsonrpc": "2.0", "id": 1, "method": "tools/call",
         "params": {"name": "search", "arguments": {"q": "rust"}}},
        {"jsonrpc": "2.0", "id": 2, "method": "tools/call",
         "params": {"name": "open", "arguments": "{\"rank\": 1}"}}
    ])
}

fn langchain_trace() -> Value {
    json!([
        {"tool": "search", "tool_input": {"q": "rust"}, "log": "searching"},
        {"name": "open", "args": {"rank": 1}, "id": "lc_2", "type": "tool_call"}
    ])
}

fn custom_trace() -> Value {
    json!({"calls": [
        {"tool": "search", "args": {"q": "rust"}, "duration": 0.2},
        {"name": "open", "arguments": {"rank": 1}}
    ]})
}

#[test]
fn all_formats_agree_on_tool_and_args() {
    let cases = [
        (TraceFormat::OpenAi, openai_trace()),
        (TraceFormat::Anthropic, anthropic_trace()),
        (TraceFormat::Gemini, gemini_trace()),
        (TraceFormat::Mcp, mcp_trace()),
        (TraceFormat::LangChain, langchain_trace()),
        (TraceFormat::Custom, custom_trace()),
    ];

    for (format, payload) in cases {
        let calls = parse_trace(format, &payload)
            .unwrap_or_else(|e| panic!("{format} failed to parse: {e}"));
        assert_eq!(names(&calls), ["search", "open"], "{format}");
        assert_eq!(calls[0].args()["q"], json!("rust"), "{format}");
        assert_eq!(calls[1].args()["rank"], json!(1), "{format}");
    }
}

#[test]
fn auto_detection_picks_the_right_adapter() {
    assert_eq!(detect_format(&openai_trace()), TraceFormat::OpenAi);
    assert_eq!(detect_format(&anthropic_trace()), TraceFormat::Anthropic);
    assert_eq!(detect_format(&gemini_trace()), TraceFormat::Gemini);
    assert_eq!(detect_format(&custom_trace()), TraceFormat::Custom);
    assert_eq!(
        detect_format(&json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {}})),
        TraceFormat::Mcp
    );

    let calls = parse_trace(TraceFormat::Auto, &anthropic_trace()).unwrap();
    assert_eq!(calls[0].metadata_value("format"), Some(&json!("anthropic")));
    assert_eq!(calls[0].metadata_value("id"), Some(&json!("toolu_1")));
}

#[test]
fn scalar_payloads_are_format_errors() {
    for format in TraceFormat::EXPLICIT {
        let err = parse_trace(format, &json!("not a trace")).unwrap_err();
        assert!(
            matches!(err, ToolscoreError::Format(_)),
            "{format} accepted a scalar payload"
        );
    }
}

#[test]
fn malformed_items_are_skipped_not_raised() {
    let payload = json!({"messages": [
        {"role": "assistant", "tool_calls": [
            {"id": "a", "type": "function", "function": {"name": "", "arguments": "{}"}},
            {"id": "b", "type": "retrieval"},
            {"id": "c", "type": "function", "function": {"name": "ok", "arguments": "not json"}}
        ]},
        "garbage"
    ]});
    let calls = parse_trace(TraceFormat::OpenAi, &payload).unwrap();
    assert_eq!(names(&calls), ["ok"]);
    assert_eq!(calls[0].args()["raw"], json!("not json"));
}

#[test]
fn mcp_responses_carry_results() {
    let payload = json!({"messages": [
        {"jsonrpc": "2.0", "id": 1, "method": "tools/call",
         "params": {"name": "read_file", "arguments": {"path": "a.txt"}}},
        {"jsonrpc": "2.0", "id": 1,
         "result": {"_tool_name": "read_file", "content": [{"type": "text", "text": "hello"}]}},
        {"jsonrpc": "2.0", "id": 2, "error": {"code": -32602, "message": "bad params"}}
    ]});
    let calls = parse_trace(TraceFormat::Mcp, &payload).unwrap();
    assert_eq!(names(&calls), ["read_file", "read_file", "unknown"]);
    assert_eq!(calls[1].result(), Some(&json!("hello")));
    assert!(calls[2].result().is_none());
    assert_eq!(calls[2].metadata_value("error_code"), Some(&json!(-32602)));
    assert_eq!(calls[2].metadata_value("is_error"), Some(&json!(true)));
}

#[test]
fn langchain_needs_an_explicit_format() {
    let payload = json!([{"action": "search", "action_input": "rust"}]);
    assert_eq!(detect_format(&payload), TraceFormat::Custom);

    let calls = parse_trace(TraceFormat::LangChain, &payload).unwrap();
    assert_eq!(calls[0].tool(), "search");
    assert_eq!(calls[0].args()["input"], json!("rust"));
}

#[test]
fn canonical_calls_round_trip_through_custom() {
    let original = ToolCall::from_value_args("search", Some(json!({"q": "rust", "n": 3})))
        .unwrap()
        .with_duration(0.5)
        .with_cost(0.001);
    let doc = json!({ "calls": [&original] });
    let back = parse_trace(TraceFormat::Auto, &doc).unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].tool(), original.tool());
    assert_eq!(back[0].args(), original.args());
    assert_eq!(back[0].duration(), Some(0.5));
    assert_eq!(back[0].cost(), Some(0.001));
}

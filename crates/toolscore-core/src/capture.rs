//! Capture sink for recording tool calls as an agent makes them.
//!
//! Callers own the sink; there is no process-wide recorder. The recorded
//! calls serialize to the `{"calls": [...]}` document the custom adapter
//! reads back, so a capture can be scored directly.

use serde_json::{json, Value};

use crate::domain::ToolCall;

/// Destination for observed tool calls.
pub trait CaptureSink {
    fn record(&mut self, call: ToolCall);
}

/// In-memory sink that keeps calls in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallRecorder {
    calls: Vec<ToolCall>,
}

impl CallRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[ToolCall] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn into_calls(self) -> Vec<ToolCall> {
        self.calls
    }

    /// Recorded calls as a custom-format trace document.
    pub fn to_json(&self) -> Value {
        json!({ "calls": self.calls })
    }
}

impl CaptureSink for CallRecorder {
    fn record(&mut self, call: ToolCall) {
        tracing::trace!(event = "capture.recorded", tool = %call.tool());
        self.calls.push(call);
    }
}

impl<S: CaptureSink + ?Sized> CaptureSink for &mut S {
    fn record(&mut self, call: ToolCall) {
        (**self).record(call);
    }
}

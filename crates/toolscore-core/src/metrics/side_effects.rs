//! Side-effect checks declared on gold calls.
//!
//! A gold call may carry `metadata.side_effects = {"<check>": <expected>}`.
//! Each check is looked up by name in a caller-supplied
//! [`ValidatorRegistry`]; the registry owns no I/O of its own, so concrete
//! validators (filesystem, HTTP, database, ...) live with the caller.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::domain::ToolCall;

/// A named side-effect check against the trace call that fulfilled a gold
/// call. `Err` carries a human-readable failure reason.
pub trait SideEffectValidator {
    fn validate(&self, call: &ToolCall, expected: &Value) -> Result<bool, String>;
}

impl<F> SideEffectValidator for F
where
    F: Fn(&ToolCall, &Value) -> Result<bool, String>,
{
    fn validate(&self, call: &ToolCall, expected: &Value) -> Result<bool, String> {
        self(call, expected)
    }
}

/// Check name → validator.
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: BTreeMap<String, Box<dyn SideEffectValidator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the validator for `check`.
    pub fn register(
        &mut self,
        check: impl Into<String>,
        validator: impl SideEffectValidator + 'static,
    ) -> &mut Self {
        self.validators.insert(check.into(), Box::new(validator));
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(
        mut self,
        check: impl Into<String>,
        validator: impl SideEffectValidator + 'static,
    ) -> Self {
        self.register(check, validator);
        self
    }

    pub fn get(&self, check: &str) -> Option<&dyn SideEffectValidator> {
        self.validators.get(check).map(|v| v.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideEffectCheck {
    pub tool: String,
    pub check: String,
    pub passed: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideEffectMetrics {
    pub total_checks: usize,
    pub passed_checks: usize,
    pub success_rate: f64,
    pub details: Vec<SideEffectCheck>,
}

/// Run every declared side-effect check. Gold call `i` is checked against the
/// first trace call `j >= i` with the same tool; trace calls are not consumed.
pub fn side_effect_success_rate(
    expected: &[ToolCall],
    actual: &[ToolCall],
    registry: &ValidatorRegistry,
) -> SideEffectMetrics {
    let mut details = Vec::new();

    for (i, gold) in expected.iter().enumerate() {
        let Some(checks) = gold
            .metadata_value("side_effects")
            .and_then(Value::as_object)
            .filter(|m| !m.is_empty())
        else {
            continue;
        };

        let trace = actual
            .iter()
            .enumerate()
            .find(|(j, c)| *j >= i && c.tool() == gold.tool())
            .map(|(_, c)| c);

        for (check, expected_value) in checks {
            let (passed, reason) = match trace {
                None => (false, "Tool call not found in trace".to_string()),
                Some(call) => run_check(registry, check, call, expected_value),
            };
            details.push(SideEffectCheck {
                tool: gold.tool().to_string(),
                check: check.clone(),
                passed,
                reason,
            });
        }
    }

    let total = details.len();
    let passed = details.iter().filter(|d| d.passed).count();
    SideEffectMetrics {
        total_checks: total,
        passed_checks: passed,
        success_rate: if total == 0 {
            1.0
        } else {
            passed as f64 / total as f64
        },
        details,
    }
}

fn run_check(
    registry: &ValidatorRegistry,
    check: &str,
    call: &ToolCall,
    expected: &Value,
) -> (bool, String) {
    let Some(validator) = registry.get(check) else {
        return (false, "No validator available".to_string());
    };
    match validator.validate(call, expected) {
        Ok(true) => (true, "Validator passed".to_string()),
        Ok(false) => (false, "Validator failed".to_string()),
        Err(err) => (false, format!("Validator error: {err}")),
    }
}

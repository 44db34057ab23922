//! Set-based accuracy over tool names.

use std::collections::BTreeSet;

use crate::domain::ToolCall;

use super::tool_names;

/// Whether the agent invoked the tools it should have, and only those.
///
/// With distinct name sets `E` (expected) and `A` (actual):
/// `clamp((|E∩A| - 0.5 * (|A\E| + |E\A|)) / |E|, 0, 1)`.
/// Both empty scores 1.0; exactly one empty scores 0.0.
pub fn invocation_accuracy(expected: &[ToolCall], actual: &[ToolCall]) -> f64 {
    match (expected.is_empty(), actual.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }

    let e: BTreeSet<&str> = tool_names(expected).collect();
    let a: BTreeSet<&str> = tool_names(actual).collect();

    let correct = e.intersection(&a).count() as f64;
    let penalty = (a.difference(&e).count() + e.difference(&a).count()) as f64;

    ((correct - 0.5 * penalty) / e.len() as f64).clamp(0.0, 1.0)
}

/// Fraction of actual calls whose tool appears anywhere in the expected set.
pub fn selection_accuracy(expected: &[ToolCall], actual: &[ToolCall]) -> f64 {
    if actual.is_empty() {
        return if expected.is_empty() { 1.0 } else { 0.0 };
    }
    if expected.is_empty() {
        return 0.0;
    }

    let e: BTreeSet<&str> = tool_names(expected).collect();
    let hits = actual.iter().filter(|c| e.contains(c.tool())).count();
    hits as f64 / actual.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::calls;

    #[test]
    fn test_invocation_boundaries() {
        assert_eq!(invocation_accuracy(&[], &[]), 1.0);
        assert_eq!(invocation_accuracy(&calls(&["a"]), &[]), 0.0);
        assert_eq!(invocation_accuracy(&[], &calls(&["a"])), 0.0);
    }

    #[test]
    fn test_invocation_penalizes_extra_and_missing() {
        // E = {a, b}, A = {a, c}: (1 - 0.5 * 2) / 2 = 0
        assert_eq!(invocation_accuracy(&calls(&["a", "b"]), &calls(&["a", "c"])), 0.0);
        // E = {a, b}, A = {a, b, c}: (2 - 0.5) / 2 = 0.75
        assert_eq!(
            invocation_accuracy(&calls(&["a", "b"]), &calls(&["a", "b", "c"])),
            0.75
        );
        // duplicates collapse into the name set
        assert_eq!(invocation_accuracy(&calls(&["a"]), &calls(&["a", "a"])), 1.0);
    }

    #[test]
    fn test_selection() {
        assert_eq!(selection_accuracy(&[], &[]), 1.0);
        assert_eq!(selection_accuracy(&[], &calls(&["x"])), 0.0);
        assert_eq!(selection_accuracy(&calls(&["x"]), &[]), 0.0);
        assert_eq!(
            selection_accuracy(&calls(&["a", "b"]), &calls(&["a", "a", "c", "b"])),
            0.75
        );
    }
}

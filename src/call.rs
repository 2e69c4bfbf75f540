//! Recorded method calls and the patterns they are matched against.

use core::fmt;

use crate::{
    matchers::Expected,
    value::{IntoCallArgs, Value},
};

/// A single intercepted invocation: a method name plus positional arguments.
///
/// `MethodCall`s are immutable once created. One is appended to the owning
/// [`Mock`](crate::Mock)'s call log on every interception, and another is
/// built at every expectation-declaration point for matching. Equality is
/// structural, not identity-based.
///
/// The [`Display`](fmt::Display) rendering (`name(arg1, arg2)`, with each
/// argument rendered as compact JSON) is used verbatim in verification
/// failure messages. It is pure, total and deterministic; it is not meant
/// to be parsed back.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    name: String,
    args: Vec<Value>,
}

impl MethodCall {
    /// Creates a call value from a method name and arguments.
    pub fn new(name: impl Into<String>, args: impl IntoCallArgs) -> Self {
        Self {
            name: name.into(),
            args: args.into_call_args(),
        }
    }

    /// Returns the method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the positional arguments.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Returns the argument at `index`, if any.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }
}

impl fmt::Display for MethodCall {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                formatter.write_str(", ")?;
            }
            write!(formatter, "{arg}")?;
        }
        formatter.write_str(")")
    }
}

/// Pattern an actual [`MethodCall`] is compared against: an expected method
/// name plus an expected argument list of literals and/or matchers.
///
/// Matching proceeds in a fixed order: name, then the variable-length-tail
/// short circuit, then arity, then position-wise comparison. The order is
/// observable (it decides which stub wins when several could apply, and
/// which diagnostics a failed verification renders) and must not change.
#[derive(Debug, Clone)]
pub struct CallPattern {
    name: String,
    expected: Vec<Expected>,
}

impl CallPattern {
    /// Creates a pattern from a method name and expected arguments.
    pub fn new(name: impl Into<String>, expected: Vec<Expected>) -> Self {
        Self {
            name: name.into(),
            expected,
        }
    }

    /// Returns the expected method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks the pattern against an actual call.
    pub fn matches(&self, call: &MethodCall) -> bool {
        if call.name() != self.name {
            return false;
        }
        if matches!(self.expected.first(), Some(Expected::AnyArgs)) {
            return true;
        }
        if call.args().len() != self.expected.len() {
            return false;
        }
        self.expected
            .iter()
            .zip(call.args())
            .all(|(expected, actual)| expected.matches(actual))
    }
}

impl fmt::Display for CallPattern {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if matches!(self.expected.first(), Some(Expected::AnyArgs)) {
            return write!(formatter, "{}(..)", self.name);
        }
        write!(formatter, "{}(", self.name)?;
        for (i, expected) in self.expected.iter().enumerate() {
            if i > 0 {
                formatter.write_str(", ")?;
            }
            write!(formatter, "{expected}")?;
        }
        formatter.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::matchers::{any, any_args};

    #[test]
    fn rendering_calls() {
        let call = MethodCall::new("find_user", (42, "alice"));
        assert_eq!(call.to_string(), r#"find_user(42, "alice")"#);

        let call = MethodCall::new("ping", ());
        assert_eq!(call.to_string(), "ping()");

        let call = MethodCall::new("store", (json!({ "id": 1, "tags": ["a"] }),));
        assert_eq!(call.to_string(), r#"store({"id":1,"tags":["a"]})"#);
    }

    #[test]
    fn rendering_is_deterministic() {
        let call = MethodCall::new("store", (json!({ "b": 2, "a": 1 }),));
        let rendered = call.to_string();
        for _ in 0..10 {
            assert_eq!(call.to_string(), rendered);
        }
    }

    #[test]
    fn name_mismatch_wins_over_everything() {
        let pattern = CallPattern::new("find", vec![any_args()]);
        assert!(!pattern.matches(&MethodCall::new("other", ())));
    }

    #[test]
    fn wildcard_tail_bypasses_arity() {
        let pattern = CallPattern::new("find", vec![any_args()]);
        assert!(pattern.matches(&MethodCall::new("find", ())));
        assert!(pattern.matches(&MethodCall::new("find", (1,))));
        assert!(pattern.matches(&MethodCall::new("find", (1, "x", true))));
    }

    #[test]
    fn arity_is_checked_before_positions() {
        let pattern = CallPattern::new("find", vec![any(), any()]);
        assert!(!pattern.matches(&MethodCall::new("find", (1,))));
        assert!(pattern.matches(&MethodCall::new("find", (1, 2))));
    }

    #[test]
    fn positional_comparison_uses_loose_equality() {
        let pattern = CallPattern::new("find", vec![Expected::from(1), Expected::from("x")]);
        assert!(pattern.matches(&MethodCall::new("find", ("1", "x"))));
        assert!(!pattern.matches(&MethodCall::new("find", (2, "x"))));
    }

    #[test]
    fn rendering_patterns() {
        let pattern = CallPattern::new("find", vec![Expected::from(1), any()]);
        assert_eq!(pattern.to_string(), "find(1, _)");
        let pattern = CallPattern::new("find", vec![any_args()]);
        assert_eq!(pattern.to_string(), "find(..)");
    }
}

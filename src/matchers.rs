//! Argument matchers used in place of literal values when declaring
//! expected call patterns.

use core::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::value::{is_truthy, loose_eq, to_value, Value};

/// Predicate over a single actual argument value.
///
/// Matchers are stateless: given the same input value, [`Self::matches()`]
/// always produces the same verdict. The description is embedded into
/// rendered call patterns for diagnostics.
pub trait ArgMatcher: fmt::Debug + Send + Sync {
    /// Checks the actual argument value against this matcher.
    fn matches(&self, value: &Value) -> bool;

    /// Describes the matcher for failure messages.
    fn describe(&self) -> String;
}

/// One slot in an expected argument list: a literal value (compared with
/// loose structural equality), a matcher, or the variable-length-tail
/// sentinel produced by [`any_args()`].
///
/// Scalars, strings and [`Value`]s convert into `Expected` via `From`;
/// arbitrary serializable values via [`literal()`].
#[derive(Debug, Clone)]
pub enum Expected {
    /// Literal value, compared using loose structural equality.
    Literal(Value),
    /// Delegates to the contained matcher.
    Matcher(Arc<dyn ArgMatcher>),
    /// "The remaining tail of arguments, of any length and value". Only
    /// meaningful as the first (and sole) element of an expected list,
    /// where it bypasses arity checking; in any other position it matches
    /// a single argument of any value.
    AnyArgs,
}

impl Expected {
    /// Checks a single actual value against this expectation.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Literal(expected) => loose_eq(expected, value),
            Self::Matcher(matcher) => matcher.matches(value),
            Self::AnyArgs => true,
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(formatter, "{value}"),
            Self::Matcher(matcher) => formatter.write_str(&matcher.describe()),
            Self::AnyArgs => formatter.write_str(".."),
        }
    }
}

impl From<Value> for Expected {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

macro_rules! impl_expected_from_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
        impl From<$ty> for Expected {
            fn from(value: $ty) -> Self {
                Self::Literal(Value::from(value))
            }
        }
        )+
    };
}

impl_expected_from_scalar!(
    bool, i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, &str, String,
);

/// Wraps an arbitrary serializable value as a literal expectation.
///
/// # Panics
///
/// Panics if the value cannot be converted (see [`to_value()`](crate::to_value)).
pub fn literal<T: Serialize>(value: T) -> Expected {
    Expected::Literal(to_value(value))
}

/// Conversion of declared expectations into an expected argument list.
///
/// Implemented for `()` (a call with no arguments), a lone [`Expected`],
/// `Vec<Expected>`, and tuples of up to 8 elements convertible to
/// [`Expected`], so that `.with((42, any()))` reads naturally.
pub trait IntoExpectedArgs {
    /// Performs the conversion.
    fn into_expected_args(self) -> Vec<Expected>;
}

impl IntoExpectedArgs for () {
    fn into_expected_args(self) -> Vec<Expected> {
        Vec::new()
    }
}

impl IntoExpectedArgs for Expected {
    fn into_expected_args(self) -> Vec<Expected> {
        vec![self]
    }
}

impl IntoExpectedArgs for Vec<Expected> {
    fn into_expected_args(self) -> Vec<Expected> {
        self
    }
}

macro_rules! impl_into_expected_args {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Into<Expected>,)+> IntoExpectedArgs for ($($name,)+) {
            fn into_expected_args(self) -> Vec<Expected> {
                vec![$(self.$idx.into(),)+]
            }
        }
    };
}

impl_into_expected_args!(A: 0);
impl_into_expected_args!(A: 0, B: 1);
impl_into_expected_args!(A: 0, B: 1, C: 2);
impl_into_expected_args!(A: 0, B: 1, C: 2, D: 3);
impl_into_expected_args!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_into_expected_args!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_into_expected_args!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_into_expected_args!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

#[derive(Debug, Clone, Copy)]
struct AnyArg;

impl ArgMatcher for AnyArg {
    fn matches(&self, _: &Value) -> bool {
        true
    }

    fn describe(&self) -> String {
        "_".to_owned()
    }
}

/// Matches any single argument value.
pub fn any() -> Expected {
    Expected::Matcher(Arc::new(AnyArg))
}

/// The variable-length-tail sentinel: as the sole expected argument, it
/// matches a call with any number of arguments of any value, including
/// zero arguments.
pub fn any_args() -> Expected {
    Expected::AnyArgs
}

#[derive(Debug, Clone)]
struct AllOf {
    inner: Vec<Expected>,
}

impl ArgMatcher for AllOf {
    fn matches(&self, value: &Value) -> bool {
        self.inner.iter().all(|expected| expected.matches(value))
    }

    fn describe(&self) -> String {
        let inner: Vec<_> = self.inner.iter().map(ToString::to_string).collect();
        format!("all_of({})", inner.join(", "))
    }
}

/// Matches iff every contained expectation matches the same value.
pub fn all_of<I>(expectations: I) -> Expected
where
    I: IntoIterator,
    I::Item: Into<Expected>,
{
    let inner = expectations.into_iter().map(Into::into).collect();
    Expected::Matcher(Arc::new(AllOf { inner }))
}

#[derive(Debug, Clone)]
enum Step {
    Field(String),
    At(usize),
    Eq(Value),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
}

impl Step {
    /// Applies the step, returning `None` when the step cannot produce
    /// a value (missing field, index out of bounds, wrong value shape).
    fn apply(&self, current: Value) -> Option<Value> {
        match self {
            Self::Field(name) => match current {
                Value::Object(mut fields) => fields.remove(name),
                _ => None,
            },
            Self::At(index) => match current {
                Value::Array(mut items) if *index < items.len() => Some(items.swap_remove(*index)),
                _ => None,
            },
            Self::Eq(expected) => Some(Value::Bool(loose_eq(expected, &current))),
            Self::Contains(needle) => Self::on_string(&current, |s| s.contains(needle)),
            Self::StartsWith(prefix) => Self::on_string(&current, |s| s.starts_with(prefix)),
            Self::EndsWith(suffix) => Self::on_string(&current, |s| s.ends_with(suffix)),
        }
    }

    fn on_string(current: &Value, predicate: impl FnOnce(&str) -> bool) -> Option<Value> {
        match current {
            Value::String(string) => Some(Value::Bool(predicate(string))),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(formatter, ".field({name:?})"),
            Self::At(index) => write!(formatter, ".at({index})"),
            Self::Eq(value) => write!(formatter, ".eq({value})"),
            Self::Contains(needle) => write!(formatter, ".contains({needle:?})"),
            Self::StartsWith(prefix) => write!(formatter, ".starts_with({prefix:?})"),
            Self::EndsWith(suffix) => write!(formatter, ".ends_with({suffix:?})"),
        }
    }
}

/// Matcher built by chaining extraction and comparison operations, created
/// via [`arg()`].
///
/// The recorded operations are applied to the actual argument in order.
/// An extraction step that produces no value (a missing field, an
/// out-of-bounds index, a string predicate applied to a non-string), as
/// well as any `null` intermediate result, short-circuits to "no match"
/// before the final step. The truthiness of the final step's result decides the
/// outcome, so a chain may end either on a predicate (`eq`, `contains`)
/// or on an extraction whose value is checked for truthiness.
#[derive(Debug, Clone)]
pub struct FluentMatcher {
    steps: Vec<Step>,
}

/// Starts a fluent matcher chain.
pub fn arg() -> FluentMatcher {
    FluentMatcher { steps: Vec::new() }
}

impl FluentMatcher {
    fn push(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Extracts the named field of an object argument.
    #[must_use]
    pub fn field(self, name: impl Into<String>) -> Self {
        self.push(Step::Field(name.into()))
    }

    /// Extracts the element at `index` of an array argument.
    #[must_use]
    pub fn at(self, index: usize) -> Self {
        self.push(Step::At(index))
    }

    /// Compares the current value to `value` using loose structural equality.
    #[must_use]
    #[allow(clippy::should_implement_trait)] // matcher DSL naming, not `PartialEq`
    pub fn eq(self, value: impl Serialize) -> Self {
        self.push(Step::Eq(to_value(value)))
    }

    /// Checks that the current string value contains `needle`.
    #[must_use]
    pub fn contains(self, needle: impl Into<String>) -> Self {
        self.push(Step::Contains(needle.into()))
    }

    /// Checks that the current string value starts with `prefix`.
    #[must_use]
    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        self.push(Step::StartsWith(prefix.into()))
    }

    /// Checks that the current string value ends with `suffix`.
    #[must_use]
    pub fn ends_with(self, suffix: impl Into<String>) -> Self {
        self.push(Step::EndsWith(suffix.into()))
    }
}

impl ArgMatcher for FluentMatcher {
    fn matches(&self, value: &Value) -> bool {
        let mut current = value.clone();
        let last = self.steps.len().saturating_sub(1);
        for (i, step) in self.steps.iter().enumerate() {
            current = match step.apply(current) {
                Some(next) if i == last || !next.is_null() => next,
                _ => return false,
            };
        }
        is_truthy(&current)
    }

    fn describe(&self) -> String {
        let mut description = "arg()".to_owned();
        for step in &self.steps {
            description.push_str(&step.to_string());
        }
        description
    }
}

impl From<FluentMatcher> for Expected {
    fn from(matcher: FluentMatcher) -> Self {
        Self::Matcher(Arc::new(matcher))
    }
}

//! Dynamic values exchanged with mocks, and the loose equality relation
//! governing literal argument comparisons.

use serde::Serialize;

pub use serde_json::Value;

/// Converts any serializable value into a [`Value`] suitable for recording
/// as a mock argument or a stubbed response.
///
/// # Panics
///
/// Panics if the value cannot be represented as a [`Value`] (e.g., a map
/// with non-string keys). Since conversions only happen in test code, this
/// immediately fails the offending test.
pub fn to_value<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|err| panic!("cannot convert value for mocking: {err}"))
}

/// Loose structural equality between two values.
///
/// Unlike `PartialEq` on [`Value`], a numeric string is equal to the number
/// it parses to (`"1"` equals `1`), while `null` is distinct from every
/// non-null value including `""` and `false`. Arrays and objects compare
/// element-wise / key-wise with the same relation, so structurally equal
/// containers match regardless of instance identity.
#[allow(clippy::float_cmp)] // exact numeric equality is the intended relation
pub(crate) fn loose_eq(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(lhs), Value::Bool(rhs)) => lhs == rhs,
        (Value::String(lhs), Value::String(rhs)) => lhs == rhs,
        (Value::Number(lhs), Value::Number(rhs)) => {
            lhs.as_f64().unwrap_or(f64::NAN) == rhs.as_f64().unwrap_or(f64::NAN)
        }
        (Value::Number(number), Value::String(string))
        | (Value::String(string), Value::Number(number)) => string
            .parse::<f64>()
            .map_or(false, |parsed| parsed == number.as_f64().unwrap_or(f64::NAN)),
        (Value::Array(lhs), Value::Array(rhs)) => {
            lhs.len() == rhs.len() && lhs.iter().zip(rhs).all(|(lhs, rhs)| loose_eq(lhs, rhs))
        }
        (Value::Object(lhs), Value::Object(rhs)) => {
            lhs.len() == rhs.len()
                && lhs
                    .iter()
                    .all(|(key, lhs)| rhs.get(key).map_or(false, |rhs| loose_eq(lhs, rhs)))
        }
        _ => false,
    }
}

/// Truthiness of a value, as consulted by the final step of a fluent
/// matcher chain: `null`, `false`, numeric zero, `""`, `[]` and `{}` are
/// falsy; everything else is truthy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(false, |number| number != 0.0),
        Value::String(string) => !string.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Conversion of an argument list into the [`Value`]s recorded for a call.
///
/// Implemented for `()`, for `Vec<Value>`, and for tuples of up to 8
/// serializable elements, so that `mock.call("push", (1, "item"))` reads
/// naturally at call sites.
pub trait IntoCallArgs {
    /// Performs the conversion.
    fn into_call_args(self) -> Vec<Value>;
}

impl IntoCallArgs for () {
    fn into_call_args(self) -> Vec<Value> {
        Vec::new()
    }
}

impl IntoCallArgs for Vec<Value> {
    fn into_call_args(self) -> Vec<Value> {
        self
    }
}

macro_rules! impl_into_call_args {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Serialize,)+> IntoCallArgs for ($($name,)+) {
            fn into_call_args(self) -> Vec<Value> {
                vec![$(to_value(self.$idx),)+]
            }
        }
    };
}

impl_into_call_args!(A: 0);
impl_into_call_args!(A: 0, B: 1);
impl_into_call_args!(A: 0, B: 1, C: 2);
impl_into_call_args!(A: 0, B: 1, C: 2, D: 3);
impl_into_call_args!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_into_call_args!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_into_call_args!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_into_call_args!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

//! Fluent construction of expected-call → response bindings.

use serde::Serialize;

use crate::{
    call::{CallPattern, MethodCall},
    matchers::{any_args, Expected, IntoExpectedArgs},
    mock::{AnswerFn, CallStub, Mock, Response, ThrownError},
    value::to_value,
};

use parking_lot::Mutex;
use std::sync::Arc;

/// Starts stubbing `method` on the given mock.
///
/// Without an explicit [`with()`](WhenBuilder::with), the stub expects a
/// call with no arguments.
///
/// # Examples
///
/// ```
/// use understudy::{when, Mock};
///
/// let mock = Mock::new();
/// when(&mock, "next_id").then_return_seq([1, 2]);
/// when(&mock, "greet")
///     .with(("bob",))
///     .then_return("hello, bob");
///
/// assert_eq!(mock.call("next_id", ()), Some(1.into()));
/// assert_eq!(mock.call("greet", ("bob",)), Some("hello, bob".into()));
/// ```
pub fn when<'a>(mock: &'a Mock, method: &str) -> WhenBuilder<'a> {
    WhenBuilder {
        mock,
        name: method.to_owned(),
        expected: Vec::new(),
    }
}

/// Builder returned by [`when()`].
///
/// Each `then_*` method appends one or more stubs to the owning mock
/// immediately, in declaration order, and hands the builder back so
/// responses for the same pattern can be chained. All stubs must be
/// declared before the code under test invokes the mock; matching only
/// considers stubs present at call time.
#[derive(Debug)]
pub struct WhenBuilder<'a> {
    mock: &'a Mock,
    name: String,
    expected: Vec<Expected>,
}

impl WhenBuilder<'_> {
    /// Sets the expected arguments for the stubbed call.
    #[must_use]
    pub fn with(mut self, args: impl IntoExpectedArgs) -> Self {
        self.expected = args.into_expected_args();
        self
    }

    /// Accepts any arguments, of any arity; shorthand for
    /// `.with(any_args())`.
    #[must_use]
    pub fn with_any_args(mut self) -> Self {
        self.expected = vec![any_args()];
        self
    }

    fn pattern(&self) -> CallPattern {
        CallPattern::new(&self.name, self.expected.clone())
    }

    fn push(self, response: Response) -> Self {
        self.mock.push_stub(CallStub {
            pattern: self.pattern(),
            response,
        });
        self
    }

    /// Appends a stub responding with the given constant.
    pub fn then_return(self, value: impl Serialize) -> Self {
        self.push(Response::Return(to_value(value)))
    }

    /// Appends one constant-response stub per value, in order, so that
    /// repeated matching calls receive the values sequentially.
    pub fn then_return_seq<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Serialize,
    {
        for value in values {
            self = self.then_return(value);
        }
        self
    }

    /// Appends a stub raising the given error when the matching call
    /// occurs.
    pub fn then_throw(self, error: impl Into<ThrownError>) -> Self {
        self.push(Response::Throw(error.into()))
    }

    /// Appends one raising stub per error, in order.
    pub fn then_throw_seq<I>(mut self, errors: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ThrownError>,
    {
        for error in errors {
            self = self.then_throw(error);
        }
        self
    }

    /// Appends a stub responding by invoking `answer` with the actual
    /// [`MethodCall`].
    pub fn then_answer<F, R>(self, mut answer: F) -> Self
    where
        F: FnMut(&MethodCall) -> R + Send + 'static,
        R: Serialize,
    {
        let answer: AnswerFn = Box::new(move |call: &MethodCall| to_value(answer(call)));
        self.push(Response::Answer(Arc::new(Mutex::new(answer))))
    }
}

//! The mock state holder: call log, stub queue and call interception.

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use core::fmt;
use std::sync::Arc;

use crate::{
    call::{CallPattern, MethodCall},
    value::{to_value, IntoCallArgs, Value},
};

/// Error configured via [`then_throw()`](crate::WhenBuilder::then_throw) and
/// raised when the matching call occurs.
///
/// Raising a `ThrownError` is intentional control flow for simulating
/// collaborator failures, not a bug in the mock: [`Mock::try_call()`]
/// surfaces it as `Err`, while [`Mock::call()`] and generated trait doubles
/// panic with it, failing the current test.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ThrownError {
    message: String,
    payload: Option<Value>,
}

impl ThrownError {
    /// Creates an error with the provided message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
        }
    }

    /// Attaches a structured payload, retrievable via [`Self::payload()`]
    /// by code under test that consumes the error as a value.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Serialize) -> Self {
        self.payload = Some(to_value(payload));
        self
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the structured payload, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }
}

impl From<&str> for ThrownError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ThrownError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

pub(crate) type AnswerFn = Box<dyn FnMut(&MethodCall) -> Value + Send>;

/// Response half of a stub.
pub(crate) enum Response {
    Return(Value),
    Throw(ThrownError),
    Answer(Arc<Mutex<AnswerFn>>),
}

impl fmt::Debug for Response {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Return(value) => formatter.debug_tuple("Return").field(value).finish(),
            Self::Throw(err) => formatter.debug_tuple("Throw").field(err).finish(),
            Self::Answer(_) => formatter.debug_tuple("Answer").field(&"_").finish(),
        }
    }
}

impl Clone for Response {
    fn clone(&self) -> Self {
        match self {
            Self::Return(value) => Self::Return(value.clone()),
            Self::Throw(err) => Self::Throw(err.clone()),
            Self::Answer(answer) => Self::Answer(Arc::clone(answer)),
        }
    }
}

/// A (pattern, response) pair queued on a mock.
#[derive(Debug, Clone)]
pub(crate) struct CallStub {
    pub(crate) pattern: CallPattern,
    pub(crate) response: Response,
}

#[derive(Debug, Default)]
struct Inner {
    stubs: Vec<CallStub>,
    calls: Vec<MethodCall>,
}

/// The collaborator double: records every call it receives and holds an
/// ordered queue of stubbed responses.
///
/// A `Mock` is a cheaply cloneable handle; clones share the same call log
/// and stub queue, so one handle can be given to the code under test while
/// the test keeps another for stubbing and verification. The handle is
/// `Send + Sync`, although a mock is meant to be owned by a single test.
///
/// # Examples
///
/// ```
/// use understudy::{verify, when, Mock};
///
/// let mock = Mock::named("repository");
/// when(&mock, "find_user").with((42,)).then_return("alice");
///
/// assert_eq!(mock.call("find_user", (42,)), Some("alice".into()));
/// assert_eq!(mock.call("find_user", (7,)), None); // unstubbed
/// verify(&mock).received("find_user", (42,));
/// ```
#[derive(Clone)]
pub struct Mock {
    label: String,
    inner: Arc<Mutex<Inner>>,
}

impl fmt::Debug for Mock {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        formatter
            .debug_struct("Mock")
            .field("label", &self.label)
            .field("calls", &inner.calls)
            .field("stubs", &inner.stubs.len())
            .finish()
    }
}

impl Default for Mock {
    fn default() -> Self {
        Self::new()
    }
}

impl Mock {
    /// Creates an unnamed mock.
    pub fn new() -> Self {
        Self::named("mock")
    }

    /// Creates a mock with a diagnostic label used in failure messages.
    pub fn named(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Returns the diagnostic label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Intercepts a call: logs it, then responds with the first matching
    /// stub, or with no value if no stub matches.
    ///
    /// # Panics
    ///
    /// Panics if the matching stub was configured with
    /// [`then_throw()`](crate::WhenBuilder::then_throw); use
    /// [`Self::try_call()`] when the code under test consumes errors as
    /// values.
    pub fn call(&self, name: &str, args: impl IntoCallArgs) -> Option<Value> {
        self.try_call(name, args)
            .unwrap_or_else(|err| panic!("{}", self.thrown_message(name, &err)))
    }

    /// Fallible variant of [`Self::call()`]: a raise-error stub surfaces
    /// as `Err` instead of panicking. The call is logged either way.
    pub fn try_call(
        &self,
        name: &str,
        args: impl IntoCallArgs,
    ) -> Result<Option<Value>, ThrownError> {
        self.try_call_with_values(name, args.into_call_args())
    }

    #[doc(hidden)] // used by `#[double]`-generated code
    pub fn try_call_with_values(
        &self,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Option<Value>, ThrownError> {
        let call = MethodCall::new(name, args);

        let response = {
            let mut inner = self.inner.lock();
            // The log append happens before stub evaluation so that
            // a raising stub still leaves a call record.
            inner.calls.push(call.clone());

            let matched: Vec<_> = inner
                .stubs
                .iter()
                .enumerate()
                .filter(|(_, stub)| stub.pattern.matches(&call))
                .map(|(i, _)| i)
                .collect();
            let Some((&first, rest)) = matched.split_first() else {
                return Ok(None);
            };

            // The first matching stub (in declaration order) responds.
            // Consumption is asymmetric: a sole match is consumed
            // outright; overlapping matches drop the front element of
            // the full queue regardless of its position or pattern.
            if rest.is_empty() {
                inner.stubs.remove(first).response
            } else if first == 0 {
                inner.stubs.remove(0).response
            } else {
                inner.stubs.remove(0);
                inner.stubs[first - 1].response.clone()
            }
        };

        match response {
            Response::Return(value) => Ok(Some(value)),
            Response::Throw(err) => Err(err),
            Response::Answer(answer) => {
                let mut answer = answer.lock();
                Ok(Some((*answer)(&call)))
            }
        }
    }

    #[doc(hidden)] // used by `#[double]`-generated code
    pub fn dispatch<R>(&self, name: &str, args: Vec<Value>) -> R
    where
        R: DeserializeOwned + Default,
    {
        match self.try_call_with_values(name, args) {
            Ok(None) => R::default(),
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|err| {
                panic!(
                    "mock `{}`: cannot convert response of `{name}`: {err}",
                    self.label
                )
            }),
            Err(err) => panic!("{}", self.thrown_message(name, &err)),
        }
    }

    fn thrown_message(&self, name: &str, err: &ThrownError) -> String {
        format!(
            "mock `{}`: stubbed error raised by `{name}`: {err}",
            self.label
        )
    }

    /// Returns a snapshot of the interaction history, oldest call first.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().calls.clone()
    }

    /// Drains the interaction history, returning calls recorded since
    /// creation or since the previous `take_calls()`.
    pub fn take_calls(&self) -> Vec<MethodCall> {
        std::mem::take(&mut self.inner.lock().calls)
    }

    /// Returns the number of stubs that have not responded yet.
    pub fn unused_stubs(&self) -> usize {
        self.inner.lock().stubs.len()
    }

    /// Clears both the interaction history and the stub queue.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.calls.clear();
        inner.stubs.clear();
    }

    pub(crate) fn push_stub(&self, stub: CallStub) {
        self.inner.lock().stubs.push(stub);
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::when::when;

    assert_impl_all!(Mock: Send, Sync);
    assert_impl_all!(ThrownError: Send, Sync);

    #[test]
    fn every_call_is_logged() {
        let mock = Mock::new();
        assert_eq!(mock.call("ping", ()), None);
        when(&mock, "pong").then_return(1);
        mock.call("pong", ());
        mock.call("other", ("x",));

        let calls = mock.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], MethodCall::new("ping", ()));
        assert_eq!(calls[1], MethodCall::new("pong", ()));
        assert_eq!(calls[2], MethodCall::new("other", ("x",)));
    }

    #[test]
    fn unmatched_calls_leave_stubs_untouched() {
        let mock = Mock::new();
        when(&mock, "find").with((1,)).then_return("a");
        assert_eq!(mock.call("find", (2,)), None);
        assert_eq!(mock.unused_stubs(), 1);
    }

    #[test]
    fn sequential_returns_are_consumed() {
        let mock = Mock::new();
        when(&mock, "next").then_return_seq(["a", "b"]);
        assert_eq!(mock.call("next", ()), Some("a".into()));
        assert_eq!(mock.call("next", ()), Some("b".into()));
        assert_eq!(mock.call("next", ()), None);
        assert_eq!(mock.unused_stubs(), 0);
    }

    #[test]
    fn thrown_errors_are_still_logged() {
        let mock = Mock::new();
        when(&mock, "fragile").then_throw("boom");
        let err = mock.try_call("fragile", ()).unwrap_err();
        assert_eq!(err.message(), "boom");
        assert_eq!(mock.calls().len(), 1);
        assert_eq!(mock.unused_stubs(), 0);
    }

    #[test]
    #[should_panic(expected = "stubbed error raised by `fragile`: boom")]
    fn thrown_errors_panic_in_infallible_calls() {
        let mock = Mock::new();
        when(&mock, "fragile").then_throw("boom");
        mock.call("fragile", ());
    }

    #[test]
    fn resetting_clears_state() {
        let mock = Mock::new();
        when(&mock, "find").then_return(1);
        mock.call("other", ());
        mock.reset();
        assert_eq!(mock.calls().len(), 0);
        assert_eq!(mock.unused_stubs(), 0);
    }
}

//! Verifiers replaying the recorded call log against expected patterns.

use thiserror::Error;

use std::collections::VecDeque;

use crate::{
    call::{CallPattern, MethodCall},
    matchers::IntoExpectedArgs,
    mock::Mock,
};

/// Failed verification, carrying the rendered expected and actual strings.
///
/// Every verifier funnels its failures through this type, so the
/// expected/actual formatting stays uniform across the family. The
/// panicking verifier methods panic with its [`Display`](core::fmt::Display)
/// rendering; the `try_`-prefixed twins return it as a value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("verification failed for mock `{mock}`\nexpected: {expected}\n  actual: {actual}")]
pub struct VerificationError {
    mock: String,
    expected: String,
    actual: String,
}

impl VerificationError {
    fn new(mock: &Mock, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            mock: mock.label().to_owned(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Returns the rendered expectation.
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Returns the rendered actual interactions.
    pub fn actual(&self) -> &str {
        &self.actual
    }
}

fn render_log(calls: &[MethodCall]) -> String {
    if calls.is_empty() {
        "no interactions".to_owned()
    } else {
        let rendered: Vec<_> = calls.iter().map(ToString::to_string).collect();
        rendered.join(", ")
    }
}

/// Starts verifying the interactions recorded by a mock.
///
/// # Examples
///
/// ```
/// use understudy::{any, verify, Mock};
///
/// let mock = Mock::new();
/// mock.call("save", (1, "alice"));
/// mock.call("save", (2, "bob"));
///
/// verify(&mock).received("save", (1, "alice"));
/// verify(&mock).received_times(2, "save", (any(), any()));
/// verify(&mock).never_received("drop", ());
/// ```
pub fn verify(mock: &Mock) -> Verifier<'_> {
    Verifier { mock }
}

/// Verifier over a mock's recorded call log, created by [`verify()`].
#[derive(Debug)]
pub struct Verifier<'a> {
    mock: &'a Mock,
}

impl Verifier<'_> {
    /// Asserts that at least one recorded call matches.
    ///
    /// # Panics
    ///
    /// Panics if no recorded call matches; the message contains the full
    /// rendered call log, or "no interactions" if there were none.
    pub fn received(self, method: &str, args: impl IntoExpectedArgs) {
        if let Err(err) = self.try_received(method, args) {
            panic!("{err}");
        }
    }

    /// Fallible variant of [`Self::received()`].
    ///
    /// # Errors
    ///
    /// Returns the expected/actual diff if no recorded call matches.
    pub fn try_received(
        self,
        method: &str,
        args: impl IntoExpectedArgs,
    ) -> Result<(), VerificationError> {
        let pattern = CallPattern::new(method, args.into_expected_args());
        let calls = self.mock.calls();
        if calls.iter().any(|call| pattern.matches(call)) {
            Ok(())
        } else {
            Err(VerificationError::new(
                self.mock,
                format!("a call matching {pattern}"),
                render_log(&calls),
            ))
        }
    }

    /// Asserts that no recorded call matches.
    ///
    /// # Panics
    ///
    /// Panics if a recorded call matches; the message names the offending
    /// call.
    pub fn never_received(self, method: &str, args: impl IntoExpectedArgs) {
        if let Err(err) = self.try_never_received(method, args) {
            panic!("{err}");
        }
    }

    /// Fallible variant of [`Self::never_received()`].
    ///
    /// # Errors
    ///
    /// Returns the expected/actual diff naming the offending call.
    pub fn try_never_received(
        self,
        method: &str,
        args: impl IntoExpectedArgs,
    ) -> Result<(), VerificationError> {
        let pattern = CallPattern::new(method, args.into_expected_args());
        let calls = self.mock.calls();
        match calls.iter().find(|call| pattern.matches(call)) {
            None => Ok(()),
            Some(call) => Err(VerificationError::new(
                self.mock,
                format!("no calls matching {pattern}"),
                call.to_string(),
            )),
        }
    }

    /// Asserts that exactly `times` recorded calls match.
    ///
    /// # Panics
    ///
    /// Panics on a count mismatch; the message states the expected count
    /// against the rendered call log.
    pub fn received_times(self, times: usize, method: &str, args: impl IntoExpectedArgs) {
        if let Err(err) = self.try_received_times(times, method, args) {
            panic!("{err}");
        }
    }

    /// Fallible variant of [`Self::received_times()`].
    ///
    /// # Errors
    ///
    /// Returns the expected/actual diff on a count mismatch.
    pub fn try_received_times(
        self,
        times: usize,
        method: &str,
        args: impl IntoExpectedArgs,
    ) -> Result<(), VerificationError> {
        let pattern = CallPattern::new(method, args.into_expected_args());
        let calls = self.mock.calls();
        let count = calls.iter().filter(|call| pattern.matches(call)).count();
        if count == times {
            Ok(())
        } else {
            Err(VerificationError::new(
                self.mock,
                format!("exactly {times} call(s) matching {pattern}"),
                format!("{count} matching call(s) among: {}", render_log(&calls)),
            ))
        }
    }
}

/// Starts order-scoped verification over a mock's call log.
///
/// The returned cursor enforces strict, one-directional, non-skippable
/// ordering: every [`verify()`](InOrder::verify) consumes the next
/// recorded call and checks it against the expectation, so a call that
/// has been consumed (or skipped past) cannot be matched again.
///
/// # Examples
///
/// ```
/// use understudy::{in_order, Mock};
///
/// let mock = Mock::new();
/// mock.call("open", ());
/// mock.call("write", ("data",));
/// mock.call("close", ());
///
/// in_order(&mock)
///     .verify("open", ())
///     .verify("write", ("data",));
/// // `close` was recorded but never asserted on; that is fine.
/// ```
pub fn in_order(mock: &Mock) -> InOrder<'_> {
    InOrder { mock, scope: None }
}

/// Order-scoped verifier created by [`in_order()`].
///
/// The scope queue is seeded lazily from the mock's full call log on the
/// first assertion, so creating the verifier before the interactions
/// happen is tolerated.
#[derive(Debug)]
pub struct InOrder<'a> {
    mock: &'a Mock,
    scope: Option<VecDeque<MethodCall>>,
}

impl InOrder<'_> {
    /// Asserts that the next unconsumed recorded call matches.
    ///
    /// # Panics
    ///
    /// Panics if the next call does not match, or if every recorded call
    /// has already been consumed.
    pub fn verify(&mut self, method: &str, args: impl IntoExpectedArgs) -> &mut Self {
        if let Err(err) = self.try_verify(method, args) {
            panic!("{err}");
        }
        self
    }

    /// Fallible variant of [`Self::verify()`].
    ///
    /// # Errors
    ///
    /// Returns the expected/actual diff on a mismatch; an exhausted scope
    /// reads as "no interactions". The next call is consumed either way.
    pub fn try_verify(
        &mut self,
        method: &str,
        args: impl IntoExpectedArgs,
    ) -> Result<(), VerificationError> {
        let mock = self.mock;
        let scope = self
            .scope
            .get_or_insert_with(|| mock.calls().into_iter().collect());
        let pattern = CallPattern::new(method, args.into_expected_args());
        match scope.pop_front() {
            None => Err(VerificationError::new(
                mock,
                format!("a call matching {pattern}"),
                "no interactions",
            )),
            Some(call) if pattern.matches(&call) => Ok(()),
            Some(call) => Err(VerificationError::new(
                mock,
                format!("a call matching {pattern}"),
                call.to_string(),
            )),
        }
    }

    /// Returns the number of recorded calls not yet consumed by this
    /// cursor.
    pub fn remaining(&self) -> usize {
        self.scope
            .as_ref()
            .map_or_else(|| self.mock.calls().len(), VecDeque::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::any;

    #[test]
    fn received_failure_renders_the_log() {
        let mock = Mock::named("repo");
        let err = verify(&mock).try_received("find", (1,)).unwrap_err();
        assert_eq!(err.expected(), "a call matching find(1)");
        assert_eq!(err.actual(), "no interactions");

        mock.call("find", (2,));
        let err = verify(&mock).try_received("find", (1,)).unwrap_err();
        assert_eq!(err.actual(), "find(2)");
        assert!(err.to_string().contains("mock `repo`"), "{err}");
    }

    #[test]
    fn never_received_failure_names_the_offending_call() {
        let mock = Mock::new();
        mock.call("drop", (1,));
        let err = verify(&mock).try_never_received("drop", (any(),)).unwrap_err();
        assert_eq!(err.expected(), "no calls matching drop(_)");
        assert_eq!(err.actual(), "drop(1)");
    }

    #[test]
    fn received_times_failure_shows_counts() {
        let mock = Mock::new();
        mock.call("ping", ());
        mock.call("ping", ());
        mock.call("pong", ());

        verify(&mock).received_times(2, "ping", ());
        let err = verify(&mock).try_received_times(3, "ping", ()).unwrap_err();
        assert_eq!(err.expected(), "exactly 3 call(s) matching ping()");
        assert_eq!(err.actual(), "2 matching call(s) among: ping(), ping(), pong()");
    }

    #[test]
    fn in_order_consumes_mismatches_too() {
        let mock = Mock::new();
        mock.call("first", ());
        mock.call("second", ());

        let mut order = in_order(&mock);
        assert!(order.try_verify("second", ()).is_err());
        // The mismatching `first` call has been consumed.
        assert!(order.try_verify("second", ()).is_ok());
        assert_eq!(order.remaining(), 0);
    }

    #[test]
    fn in_order_exhaustion_reads_as_no_interactions() {
        let mock = Mock::new();
        mock.call("only", ());

        let mut order = in_order(&mock);
        order.verify("only", ());
        let err = order.try_verify("only", ()).unwrap_err();
        assert_eq!(err.actual(), "no interactions");
    }

    #[test]
    fn in_order_scope_is_seeded_lazily() {
        let mock = Mock::new();
        let mut order = in_order(&mock); // before any interaction
        mock.call("later", ());
        assert!(order.try_verify("later", ()).is_ok());
    }
}

//! Interaction-recording mock objects with stubbing and call verification.
//!
//! Classic mocking frameworks intercept collaborator calls at runtime via
//! reflection or dynamic proxies, neither of which Rust offers. This crate
//! opts for a dynamically-typed core instead: a [`Mock`] is a plain value
//! that records every `(name, arguments)` invocation it receives into an
//! append-only call log, answers from an ordered queue of stubbed
//! responses, and is interrogated afterwards by a family of verifiers.
//! Arguments and responses are [`Value`]s, so anything serializable
//! participates, and literal arguments compare structurally: a distinct
//! but equal `[1, 2]` matches. For code under test that consumes a trait
//! rather than calling a mock directly, the [`double`] attribute macro
//! generates a typed adapter implementing the trait on top of a `Mock`.
//!
//! # Features and limitations
//!
//! - Stub responses per call pattern: constants (sequential ones too),
//!   raised errors, or callbacks computing a response from the actual
//!   call.
//! - Verify interactions after the fact: at least once, never, an exact
//!   number of times, or in strict relative order via a consuming cursor.
//! - Argument matchers compose into patterns: [`any()`], the
//!   variable-length [`any_args()`] tail, [`all_of()`], and a fluent
//!   extraction/comparison chain built with [`arg()`].
//! - Literal arguments compare with a deliberately loose relation: the
//!   string `"1"` matches the number `1`, while `null` stays distinct
//!   from `""` and `false`. See [`to_value()`] and the matcher docs.
//! - Single-threaded: a mock is meant to be owned by one test. The handle
//!   is `Send + Sync + Clone` only so it can be handed to the code under
//!   test.
//! - `#[double]` requires owned, deserializable, defaultable return types
//!   and non-generic, non-`async` methods with a `self` receiver; trait
//!   doubles cannot cover what the trait system cannot express.
//!
//! # Examples
//!
//! ## Basics
//!
//! ```
//! use understudy::{verify, when, Mock};
//!
//! let mock = Mock::named("repository");
//! when(&mock, "find_user")
//!     .with((42,))
//!     .then_return_seq(["alice", "bob"]);
//!
//! assert_eq!(mock.call("find_user", (42,)), Some("alice".into()));
//! assert_eq!(mock.call("find_user", (42,)), Some("bob".into()));
//! // The stubs for this pattern are exhausted now.
//! assert_eq!(mock.call("find_user", (42,)), None);
//!
//! verify(&mock).received("find_user", (42,));
//! verify(&mock).received_times(3, "find_user", (42,));
//! verify(&mock).never_received("delete_user", (42,));
//! ```
//!
//! ## Argument matchers
//!
//! ```
//! use serde_json::json;
//! use understudy::{any, arg, verify, when, Mock};
//!
//! let mock = Mock::named("mailer");
//! when(&mock, "send")
//!     .with((arg().field("to").ends_with("@example.com"), any()))
//!     .then_return(true);
//!
//! let sent = mock.call("send", (json!({ "to": "bob@example.com" }), "hi!"));
//! assert_eq!(sent, Some(true.into()));
//! verify(&mock).received("send", (any(), "hi!"));
//! ```
//!
//! ## Raised errors and computed answers
//!
//! ```
//! use understudy::{when, Mock, ThrownError, Value};
//!
//! let mock = Mock::named("gateway");
//! when(&mock, "charge")
//!     .with_any_args()
//!     .then_throw(ThrownError::new("insufficient funds").with_payload(402));
//! when(&mock, "total").with_any_args().then_answer(|call| {
//!     call.args().iter().filter_map(Value::as_i64).sum::<i64>()
//! });
//!
//! let err = mock.try_call("charge", (100,)).unwrap_err();
//! assert_eq!(err.message(), "insufficient funds");
//! assert_eq!(err.payload(), Some(&Value::from(402)));
//! assert_eq!(mock.call("total", (2, 3, 5)), Some(10.into()));
//! ```
//!
//! ## In-order verification
//!
//! ```
//! use understudy::{in_order, Mock};
//!
//! let mock = Mock::named("file");
//! mock.call("open", ("/tmp/report",));
//! mock.call("write", ("summary",));
//! mock.call("close", ());
//!
//! in_order(&mock)
//!     .verify("open", ("/tmp/report",))
//!     .verify("write", ("summary",));
//! // Consuming past a call is final: `open` cannot be asserted anymore.
//! ```
//!
//! ## Typed doubles
//!
//! ```
//! use understudy::{double, verify, when};
//!
//! #[double]
//! trait UserStore {
//!     fn find(&self, id: u64) -> Option<String>;
//!     fn save(&mut self, id: u64, name: String) -> bool;
//! }
//!
//! let mut store = UserStoreDouble::new();
//! when(store.mock(), "find").with((42,)).then_return("alice");
//! when(store.mock(), "save").with_any_args().then_return(true);
//!
//! assert_eq!(store.find(42), Some("alice".to_owned()));
//! assert!(store.save(42, "alice".to_owned()));
//! assert_eq!(store.find(7), None); // unstubbed calls return the default
//!
//! verify(store.mock()).received("save", (42, "alice"));
//! ```

// Linter settings.
#![warn(missing_debug_implementations, missing_docs, bare_trait_objects)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

mod call;
mod matchers;
mod mock;
mod value;
mod verify;
mod when;

pub use crate::{
    call::{CallPattern, MethodCall},
    matchers::{
        all_of, any, any_args, arg, literal, ArgMatcher, Expected, FluentMatcher, IntoExpectedArgs,
    },
    mock::{Mock, ThrownError},
    value::{to_value, IntoCallArgs, Value},
    verify::{in_order, verify, InOrder, VerificationError, Verifier},
    when::{when, WhenBuilder},
};
pub use understudy_derive::double;

#[cfg(doctest)]
doc_comment::doctest!("../README.md");

//! Procedural macros for the `understudy` crate.
//!
//! The [`double`] macro is re-exported from `understudy`; use it from
//! there rather than depending on this crate directly.

#![recursion_limit = "128"]

extern crate proc_macro;

mod double;
mod util;

use proc_macro::TokenStream;

/// Generates a typed test double for a trait definition.
///
/// The macro re-emits the trait unchanged and adds a `<Trait>Double`
/// struct holding an `understudy::Mock`. The struct implements the trait
/// by converting every method call into dynamic values and routing it
/// through the mock, so the double can be stubbed and verified like any
/// other mock while being usable wherever the trait is expected.
///
/// Method return types must implement `DeserializeOwned` and `Default`
/// (the default is returned when no stub matches). Generic and `async`
/// methods, associated items other than methods, and methods without a
/// `self` receiver are rejected at compile time.
///
/// # Attributes
///
/// - `name = "CustomIdent"` overrides the generated struct name
///   (`<Trait>Double` by default);
/// - `label = "custom"` overrides the mock's diagnostic label
///   (the trait name by default).
#[proc_macro_attribute]
pub fn double(attr: TokenStream, item: TokenStream) -> TokenStream {
    double::wrap(attr, item)
}

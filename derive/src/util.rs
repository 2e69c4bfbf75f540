//! Misc utils.

use syn::{spanned::Spanned, FnArg, Ident, Pat, PatIdent, Signature};

/// Kind of the first argument of a trait method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ReceiverKind {
    /// `self`, `&self` or `&mut self`.
    Standard,
    /// Typed `self` (e.g., `self: Box<Self>`).
    Arbitrary,
    /// Not a receiver at all.
    Missing,
}

pub(crate) fn receiver_kind(signature: &Signature) -> ReceiverKind {
    match signature.inputs.first() {
        Some(FnArg::Receiver(_)) => ReceiverKind::Standard,
        Some(FnArg::Typed(pat_type)) => {
            if let Pat::Ident(pat_ident) = pat_type.pat.as_ref() {
                if pat_ident.ident == "self" {
                    return ReceiverKind::Arbitrary;
                }
            }
            ReceiverKind::Missing
        }
        None => ReceiverKind::Missing,
    }
}

/// Replaces each non-receiver argument pattern with a plain `__arg{i}`
/// ident (trait definitions may use `_` or destructuring patterns, which
/// cannot be referenced from the generated method body). Returns the
/// idents in declaration order.
pub(crate) fn rename_args(signature: &mut Signature) -> Vec<Ident> {
    let mut idents = Vec::new();
    for (i, arg) in signature.inputs.iter_mut().enumerate() {
        if let FnArg::Typed(pat_type) = arg {
            let ident = Ident::new(&format!("__arg{i}"), pat_type.pat.span());
            pat_type.pat = Box::new(Pat::Ident(PatIdent {
                attrs: vec![],
                by_ref: None,
                mutability: None,
                ident: ident.clone(),
                subpat: None,
            }));
            idents.push(ident);
        }
    }
    idents
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detecting_receivers() {
        let signature: Signature = syn::parse_quote!(fn test(&self, x: u8));
        assert_eq!(receiver_kind(&signature), ReceiverKind::Standard);
        let signature: Signature = syn::parse_quote!(fn test(self, x: u8));
        assert_eq!(receiver_kind(&signature), ReceiverKind::Standard);
        let signature: Signature = syn::parse_quote!(fn test(self: Box<Self>));
        assert_eq!(receiver_kind(&signature), ReceiverKind::Arbitrary);
        let signature: Signature = syn::parse_quote!(fn test(x: u8));
        assert_eq!(receiver_kind(&signature), ReceiverKind::Missing);
        let signature: Signature = syn::parse_quote!(fn test());
        assert_eq!(receiver_kind(&signature), ReceiverKind::Missing);
    }

    #[test]
    fn renaming_args() {
        let mut signature: Signature = syn::parse_quote! {
            fn test(&self, id: u64, _: &str) -> bool
        };
        let idents = rename_args(&mut signature);

        assert_eq!(
            idents.iter().map(ToString::to_string).collect::<Vec<_>>(),
            ["__arg1", "__arg2"]
        );
        let expected: Signature = syn::parse_quote! {
            fn test(&self, __arg1: u64, __arg2: &str) -> bool
        };
        assert_eq!(signature, expected);
    }
}

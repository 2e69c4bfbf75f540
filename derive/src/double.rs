//! `#[double]` attribute macro.

use darling::FromMeta;
use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::{
    parse::Parser, punctuated::Punctuated, token::Comma, GenericParam, Ident, Item, ItemTrait,
    NestedMeta, Signature, TraitItem, TraitItemMethod, Visibility,
};

use crate::util::{receiver_kind, rename_args, ReceiverKind};

#[derive(Debug, Default, FromMeta)]
struct DoubleAttrs {
    #[darling(default)]
    name: Option<String>,
    #[darling(default)]
    label: Option<String>,
}

impl DoubleAttrs {
    fn parse(attr: TokenStream) -> darling::Result<Self> {
        let meta = Punctuated::<NestedMeta, Comma>::parse_terminated.parse(attr)?;
        let meta: Vec<_> = meta.into_iter().collect();
        Self::from_list(&meta)
    }
}

#[derive(Debug)]
struct DoubleMethod {
    signature: Signature,
    args: Vec<Ident>,
}

impl DoubleMethod {
    fn new(method: &TraitItemMethod) -> darling::Result<Self> {
        let mut signature = method.sig.clone();
        if let Some(const_token) = &signature.constness {
            let message = "`const` trait methods are not supported";
            return Err(darling::Error::custom(message).with_span(const_token));
        }
        if let Some(async_token) = &signature.asyncness {
            let message = "`async` trait methods are not supported";
            return Err(darling::Error::custom(message).with_span(async_token));
        }
        let non_lifetime_param = signature
            .generics
            .params
            .iter()
            .find(|param| !matches!(param, GenericParam::Lifetime(_)));
        if let Some(param) = non_lifetime_param {
            let message = "generic methods cannot be doubled";
            return Err(darling::Error::custom(message).with_span(param));
        }
        if let Some(where_clause) = &signature.generics.where_clause {
            let message = "`where` clauses on methods are not supported";
            return Err(darling::Error::custom(message).with_span(where_clause));
        }
        match receiver_kind(&signature) {
            ReceiverKind::Standard => { /* OK */ }
            ReceiverKind::Arbitrary => {
                let message = "arbitrary `self` types are not supported";
                return Err(darling::Error::custom(message).with_span(&signature));
            }
            ReceiverKind::Missing => {
                let message = "associated functions without a `self` receiver cannot be doubled";
                return Err(darling::Error::custom(message).with_span(&signature));
            }
        }

        let args = rename_args(&mut signature);
        Ok(Self { signature, args })
    }
}

impl ToTokens for DoubleMethod {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let signature = &self.signature;
        let name = self.signature.ident.to_string();
        let args = &self.args;
        tokens.extend(quote! {
            #signature {
                self.mock.dispatch(#name, ::std::vec![#(::understudy::to_value(&#args),)*])
            }
        });
    }
}

#[derive(Debug)]
struct Double {
    trait_def: ItemTrait,
    ident: Ident,
    label: String,
    vis: Visibility,
    methods: Vec<DoubleMethod>,
}

impl Double {
    fn new(attrs: DoubleAttrs, trait_def: ItemTrait) -> darling::Result<Self> {
        if let Some(unsafe_token) = &trait_def.unsafety {
            let message = "unsafe traits cannot be doubled";
            return Err(darling::Error::custom(message).with_span(unsafe_token));
        }
        if !trait_def.generics.params.is_empty() {
            let message = "generic traits are not supported";
            return Err(darling::Error::custom(message).with_span(&trait_def.generics));
        }
        if !trait_def.supertraits.is_empty() {
            let message = "traits with supertraits are not supported";
            return Err(darling::Error::custom(message).with_span(&trait_def.supertraits));
        }

        let mut methods = Vec::new();
        for item in &trait_def.items {
            if let TraitItem::Method(method) = item {
                methods.push(DoubleMethod::new(method)?);
            } else {
                let message = "only methods are supported in doubled traits";
                return Err(darling::Error::custom(message).with_span(item));
            }
        }

        let ident = attrs.name.map_or_else(
            || Ident::new(&format!("{}Double", trait_def.ident), trait_def.ident.span()),
            |name| Ident::new(&name, trait_def.ident.span()),
        );
        let label = attrs
            .label
            .unwrap_or_else(|| trait_def.ident.to_string());
        Ok(Self {
            ident,
            label,
            vis: trait_def.vis.clone(),
            methods,
            trait_def,
        })
    }
}

impl ToTokens for Double {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let trait_def = &self.trait_def;
        let trait_ident = &trait_def.ident;
        let ident = &self.ident;
        let vis = &self.vis;
        let label = &self.label;
        let methods = &self.methods;
        let doc = format!("Test double for the [`{trait_ident}`] trait, generated by `#[double]`.");

        tokens.extend(quote! {
            #trait_def

            #[doc = #doc]
            #[derive(Debug, Clone)]
            #vis struct #ident {
                mock: ::understudy::Mock,
            }

            impl #ident {
                /// Creates a double with no stubs configured.
                #vis fn new() -> Self {
                    Self {
                        mock: ::understudy::Mock::named(#label),
                    }
                }

                /// Returns the underlying mock for stubbing and verification.
                #vis fn mock(&self) -> &::understudy::Mock {
                    &self.mock
                }
            }

            impl ::core::default::Default for #ident {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl #trait_ident for #ident {
                #(#methods)*
            }
        });
    }
}

pub(crate) fn wrap(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = match DoubleAttrs::parse(attr) {
        Ok(attrs) => attrs,
        Err(err) => return err.write_errors().into(),
    };
    match syn::parse::<Item>(item) {
        Ok(Item::Trait(trait_def)) => match Double::new(attrs, trait_def) {
            Ok(double) => quote!(#double).into(),
            Err(err) => err.write_errors().into(),
        },
        Ok(item) => {
            let message = "only trait definitions can be doubled";
            darling::Error::custom(message)
                .with_span(&item)
                .write_errors()
                .into()
        }
        Err(err) => err.into_compile_error().into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trait() -> ItemTrait {
        syn::parse_quote! {
            pub trait UserStore {
                fn find(&self, id: u64) -> Option<String>;
                fn save(&mut self, id: u64, name: String) -> bool;
            }
        }
    }

    #[test]
    fn generating_method_impls() {
        let double = Double::new(DoubleAttrs::default(), sample_trait()).unwrap();
        assert_eq!(double.ident, "UserStoreDouble");
        assert_eq!(double.label, "UserStore");

        let find = &double.methods[0];
        let find: syn::ImplItemMethod = syn::parse_quote!(#find);
        let expected: syn::ImplItemMethod = syn::parse_quote! {
            fn find(&self, __arg1: u64) -> Option<String> {
                self.mock.dispatch("find", ::std::vec![::understudy::to_value(&__arg1),])
            }
        };
        assert_eq!(find, expected, "{}", quote!(#find));

        let save = &double.methods[1];
        let save: syn::ImplItemMethod = syn::parse_quote!(#save);
        let expected: syn::ImplItemMethod = syn::parse_quote! {
            fn save(&mut self, __arg1: u64, __arg2: String) -> bool {
                self.mock.dispatch(
                    "save",
                    ::std::vec![
                        ::understudy::to_value(&__arg1),
                        ::understudy::to_value(&__arg2),
                    ]
                )
            }
        };
        assert_eq!(save, expected, "{}", quote!(#save));
    }

    #[test]
    fn overriding_name_and_label() {
        let attrs = DoubleAttrs {
            name: Some("FakeStore".to_owned()),
            label: Some("store".to_owned()),
        };
        let double = Double::new(attrs, sample_trait()).unwrap();
        assert_eq!(double.ident, "FakeStore");
        assert_eq!(double.label, "store");
    }

    #[test]
    fn error_on_async_method() {
        let trait_def: ItemTrait = syn::parse_quote! {
            trait Service {
                async fn run(&self);
            }
        };
        let err = Double::new(DoubleAttrs::default(), trait_def)
            .unwrap_err()
            .to_string();
        assert!(err.contains("async"), "{err}");
    }

    #[test]
    fn error_on_missing_receiver() {
        let trait_def: ItemTrait = syn::parse_quote! {
            trait Factory {
                fn create() -> String;
            }
        };
        let err = Double::new(DoubleAttrs::default(), trait_def)
            .unwrap_err()
            .to_string();
        assert!(err.contains("receiver"), "{err}");
    }

    #[test]
    fn error_on_generic_method() {
        let trait_def: ItemTrait = syn::parse_quote! {
            trait Printer {
                fn print<T>(&self, value: T);
            }
        };
        let err = Double::new(DoubleAttrs::default(), trait_def)
            .unwrap_err()
            .to_string();
        assert!(err.contains("generic methods"), "{err}");
    }

    #[test]
    fn error_on_generic_trait() {
        let trait_def: ItemTrait = syn::parse_quote! {
            trait Store<T> {
                fn get(&self) -> T;
            }
        };
        let err = Double::new(DoubleAttrs::default(), trait_def)
            .unwrap_err()
            .to_string();
        assert!(err.contains("generic traits"), "{err}");
    }

    #[test]
    fn error_on_non_method_items() {
        let trait_def: ItemTrait = syn::parse_quote! {
            trait Store {
                const CAPACITY: usize;
                fn get(&self) -> usize;
            }
        };
        let err = Double::new(DoubleAttrs::default(), trait_def)
            .unwrap_err()
            .to_string();
        assert!(err.contains("only methods"), "{err}");
    }
}

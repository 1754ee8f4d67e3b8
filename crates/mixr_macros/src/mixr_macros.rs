//! MIXR Macros - Proc macros for reflective class declaration
//!
//! This crate provides the `#[mixr_class]` attribute macro, which generates
//! the per-class reflection boilerplate: the process-wide class metadata,
//! the property table chained to the base class, and the `Class` impl.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, Expr, ItemStruct, Lit, Meta, Path, Token,
};

/// Parsed attributes for the mixr_class macro
struct MixrClassAttrs {
    name: Option<String>,
    factory: Option<String>,
    base: Option<Path>,
    slots: Vec<String>,
}

impl Parse for MixrClassAttrs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut attrs = MixrClassAttrs {
            name: None,
            factory: None,
            base: None,
            slots: Vec::new(),
        };

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    let lit: Lit = input.parse()?;
                    if let Lit::Str(s) = lit {
                        attrs.name = Some(s.value());
                    }
                }
                "factory" => {
                    let lit: Lit = input.parse()?;
                    if let Lit::Str(s) = lit {
                        attrs.factory = Some(s.value());
                    }
                }
                "base" => {
                    attrs.base = Some(input.parse()?);
                }
                "slots" => {
                    let array: syn::ExprArray = input.parse()?;
                    for elem in array.elems {
                        match elem {
                            Expr::Lit(syn::ExprLit {
                                lit: Lit::Str(s), ..
                            }) => attrs.slots.push(s.value()),
                            other => {
                                return Err(syn::Error::new_spanned(
                                    other,
                                    "slot names must be string literals",
                                ));
                            }
                        }
                    }
                }
                _ => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", ident),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(attrs)
    }
}

/// Extract doc comments from attributes
fn extract_doc_comment(attrs: &[syn::Attribute]) -> Option<String> {
    let docs: Vec<String> = attrs
        .iter()
        .filter_map(|attr| {
            if attr.path().is_ident("doc") {
                if let Meta::NameValue(meta) = &attr.meta {
                    if let Expr::Lit(expr_lit) = &meta.value {
                        if let Lit::Str(s) = &expr_lit.lit {
                            return Some(s.value().trim().to_string());
                        }
                    }
                }
            }
            None
        })
        .collect();

    if docs.is_empty() {
        None
    } else {
        Some(docs.join("\n"))
    }
}

/// Attribute macro declaring a reflective MIXR class.
///
/// # Attributes
///
/// - `name` (optional): Class name (defaults to the struct name)
/// - `factory` (optional): Factory name used by configuration documents
///   (defaults to the class name)
/// - `base` (optional): Base class type; omitted only for the root class
/// - `slots` (optional): Locally declared slot names, in index order
///
/// # Example
///
/// ```ignore
/// /// Counts frames until a limit is reached.
/// #[mixr_class(factory = "Counter", base = ComponentBase, slots = ["limit", "step"])]
/// pub struct Counter {
///     base: ComponentBase,
///     limit: AtomicI64,
///     step: AtomicI64,
/// }
/// ```
///
/// This generates:
/// - The struct itself, unchanged
/// - A lazily initialized `ClassMetadata` whose property table is chained
///   to the base class's table
/// - `impl mixr_base::Class for Counter`
#[proc_macro_attribute]
pub fn mixr_class(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = parse_macro_input!(attr as MixrClassAttrs);
    let input = parse_macro_input!(item as ItemStruct);

    let ident = &input.ident;
    let class_name = attrs.name.unwrap_or_else(|| ident.to_string());
    let factory_name = attrs.factory.unwrap_or_else(|| class_name.clone());
    let slots = &attrs.slots;

    let static_name = format_ident!("__MIXR_CLASS_{}", ident.to_string().to_uppercase());

    let description_expr = match extract_doc_comment(&input.attrs) {
        Some(doc) => quote! { Some(#doc) },
        None => quote! { None },
    };

    // Root classes have no base table or base metadata
    let (base_table, base_meta) = match &attrs.base {
        Some(base) => (
            quote! { Some(<#base as ::mixr_base::Class>::class_metadata().property_table()) },
            quote! { Some(<#base as ::mixr_base::Class>::class_metadata()) },
        ),
        None => (quote! { None }, quote! { None }),
    };

    let output = quote! {
        #input

        #[doc(hidden)]
        static #static_name: ::std::sync::LazyLock<::mixr_base::ClassMetadata> =
            ::std::sync::LazyLock::new(|| {
                ::mixr_base::ClassMetadata::new(
                    #class_name,
                    #factory_name,
                    ::mixr_base::PropertyTable::new(&[#(#slots),*], #base_table),
                    #base_meta,
                )
                .with_description(#description_expr)
            });

        impl ::mixr_base::Class for #ident {
            fn class_metadata() -> &'static ::mixr_base::ClassMetadata {
                &#static_name
            }
        }
    };

    output.into()
}

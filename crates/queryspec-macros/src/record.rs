//! `#[derive(Record)]` implementation.
//!
//! Generates `entity_name`, `field`, and `field_values` from the struct's
//! named fields.

use darling::{FromDeriveInput, FromField};
use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

/// Struct-level attributes parsed from `#[record(...)]`.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(record), supports(struct_named))]
pub struct RecordOpts {
    pub ident: syn::Ident,
    pub generics: syn::Generics,
    pub data: darling::ast::Data<(), FieldOpts>,

    /// The entity name; defaults to the snake-cased struct name.
    #[darling(default)]
    pub entity: Option<String>,

    /// Path to the `queryspec_db` crate.
    #[darling(default, rename = "crate")]
    pub krate: Option<syn::Path>,
}

/// Field-level attributes parsed from `#[record(...)]`.
#[derive(Debug, FromField)]
#[darling(attributes(record))]
pub struct FieldOpts {
    pub ident: Option<syn::Ident>,

    /// The name expressions use for this field.
    #[darling(default)]
    pub rename: Option<String>,

    /// Hide the field from expressions.
    #[darling(default)]
    pub skip: bool,
}

/// `CustomerOrder` -> `customer_order`
fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}

/// Generates the `Record` implementation for the given derive input.
pub fn derive_record_impl(input: DeriveInput) -> TokenStream {
    let opts = match RecordOpts::from_derive_input(&input) {
        Ok(o) => o,
        Err(e) => return e.write_errors(),
    };

    let struct_name = &opts.ident;
    let entity = opts
        .entity
        .clone()
        .unwrap_or_else(|| to_snake_case(&struct_name.to_string()));
    let krate = opts
        .krate
        .clone()
        .unwrap_or_else(|| syn::parse_quote!(::queryspec_db));

    let Some(fields) = opts.data.as_ref().take_struct() else {
        return syn::Error::new_spanned(struct_name, "#[derive(Record)] only supports structs with named fields")
            .to_compile_error();
    };

    let visible: Vec<(&syn::Ident, String)> = fields
        .fields
        .iter()
        .filter(|f| !f.skip)
        .filter_map(|f| {
            let ident = f.ident.as_ref()?;
            let name = f.rename.clone().unwrap_or_else(|| ident.to_string());
            Some((ident, name))
        })
        .collect();

    let match_arms = visible.iter().map(|(ident, name)| {
        quote! {
            #name => ::core::option::Option::Some(#krate::value::Value::from(::core::clone::Clone::clone(&self.#ident))),
        }
    });
    let pairs = visible.iter().map(|(ident, name)| {
        quote! {
            (::std::borrow::Cow::Borrowed(#name), #krate::value::Value::from(::core::clone::Clone::clone(&self.#ident)))
        }
    });

    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    quote! {
        impl #impl_generics #krate::record::Record for #struct_name #ty_generics #where_clause {
            fn entity_name() -> &'static str {
                #entity
            }

            fn field(&self, name: &str) -> ::core::option::Option<#krate::value::Value> {
                match name {
                    #(#match_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_values(&self) -> ::std::vec::Vec<(::std::borrow::Cow<'static, str>, #krate::value::Value)> {
                ::std::vec![#(#pairs),*]
            }
        }
    }
}

//! # queryspec-macros
//!
//! Derive macros for queryspec. `#[derive(Record)]` implements
//! `queryspec_db::record::Record` for a struct with named fields, so that
//! specifications can filter, order, search, and project it by field name.
//!
//! This crate is independent of the other queryspec crates because
//! proc-macro crates cannot depend on crates that use them.

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `queryspec_db::record::Record`.
///
/// # Attributes
///
/// On the struct, `#[record(...)]` accepts:
///
/// - `entity = "name"`: the entity name; defaults to the struct name in
///   snake case.
/// - `crate = "path"`: the path to `queryspec_db`, for crates that reach it
///   through a re-export (e.g. `crate = "queryspec::db"`).
///
/// On a field, `#[record(...)]` accepts:
///
/// - `rename = "name"`: the name expressions use for the field.
/// - `skip`: hides the field from expressions.
///
/// Every non-skipped field type must convert into `Value` with `From` and
/// implement `Clone`.
///
/// # Examples
///
/// ```ignore
/// use queryspec_macros::Record;
///
/// #[derive(Clone, Record)]
/// #[record(entity = "customers")]
/// struct Customer {
///     id: i64,
///     #[record(rename = "fullName")]
///     full_name: String,
///     #[record(skip)]
///     password_hash: String,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::derive_record_impl(input).into()
}

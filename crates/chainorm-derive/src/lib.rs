//! Derive macros for chainorm
//!
//! Provides `#[derive(Model)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod model;

/// Derive the `Model` trait for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use chainorm::Model;
/// use chrono::NaiveDateTime;
///
/// #[derive(Default, Model)]
/// #[orm(table = "people")]
/// struct User {
///     id: i64,
///     name: String,
///     #[orm(skip)]
///     cached_score: u32,
///     created_at: NaiveDateTime,
/// }
/// ```
///
/// # Generated
///
/// - `TYPE_NAME` - bare struct name, used to infer the table name
/// - `TABLE` - the `table` override, if any
/// - `FIELDS` - persisted fields in declaration order with their column kind
/// - `get` / `set` - field access by declared name
///
/// Every persisted field type must implement `chainorm::SqlValue`.
///
/// # Attributes
///
/// - `#[orm(table = "name")]` - Override the inferred table name
/// - `#[orm(skip)]` - Do not persist this field
#[proc_macro_derive(Model, attributes(orm))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

//! Procedural macros for Pactum.
//!
//! `#[derive(Contract)]` generates the `pactum_core::Reflect` implementation
//! of a request or response type: the field descriptor table that drives
//! binding, validation and schema generation.
//!
//! # Example
//!
//! ```rust,ignore
//! use pactum::prelude::*;
//!
//! /// Fetch one page of a user's posts.
//! #[derive(Debug, Default, Serialize, Deserialize, Contract)]
//! pub struct ListPosts {
//!     #[contract(path = "user_id")]
//!     pub user_id: String,
//!
//!     /// Page number, starting at 1.
//!     #[contract(query = "page", default = "1", minimum = 1)]
//!     pub page: i64,
//!
//!     #[contract(header = "X-Request-Id")]
//!     pub request_id: Option<String>,
//! }
//! ```
//!
//! # Field attributes
//!
//! | Attribute | Meaning |
//! |-----------|---------|
//! | `path`, `query`, `header`, `cookie`, `form` `= "name"` | binding source and wire name |
//! | `raw` | receives the raw request |
//! | `default = "..."` | used when the parameter is absent or empty |
//! | `doc = "..."` | description (defaults to the `///` comment) |
//! | `required`, `example = "..."` | documentation annotations |
//! | `min_length`, `max_length`, `pattern` | string constraints |
//! | `minimum`, `maximum` | numeric constraints |
//! | `enum_values = "a,b"` | allowed values |
//! | `min_items`, `max_items` | sequence constraints |
//!
//! A field named `body` of struct type holds the JSON body of a request that
//! also binds parameters.
//!
//! # Container attributes
//!
//! `name = "..."` overrides the schema display name, `inline` keeps the type
//! out of the shared definitions, and `schema_provider`, `schema_transformer`
//! and `self_validate` opt into the matching `pactum_core` traits.
//!
//! Wire names of body members follow `#[serde(rename)]` and
//! `#[serde(rename_all)]`; `#[serde(skip)]` and non-`pub` fields are not
//! described.

mod contract;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `pactum_core::Reflect`.
///
/// See the [crate documentation](crate) for the supported attributes.
#[proc_macro_derive(Contract, attributes(contract))]
pub fn derive_contract(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    contract::expand_contract(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

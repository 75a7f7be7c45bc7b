//! # Pactum Docs
//!
//! JSON Schema and OpenAPI 3.1 generation from contract types.
//!
//! This crate provides:
//! - **[`SchemaRegistry`]**: converts [`Reflect`](pactum_core::Reflect) types
//!   into schema nodes, emitting each named struct once under
//!   `components.schemas` and referencing it everywhere else
//! - **[`OpenApiGenerator`]**: builds a route-keyed OpenAPI document from
//!   [`RouteSpec`]s
//!
//! ## Quick Start
//!
//! ```rust
//! use pactum_docs::{OpenApiGenerator, RouteSpec};
//! use pactum_macros::Contract;
//!
//! #[derive(Contract)]
//! pub struct GetUser {
//!     #[contract(path = "id")]
//!     pub id: String,
//! }
//!
//! #[derive(Contract)]
//! pub struct User {
//!     pub id: String,
//!     pub name: String,
//! }
//!
//! let spec = OpenApiGenerator::new()
//!     .title("Users")
//!     .version("1.0.0")
//!     .route(
//!         RouteSpec::get("/users/{id}")
//!             .request::<GetUser>()
//!             .response::<User>()
//!             .summary("Fetch a user"),
//!     )
//!     .generate()
//!     .unwrap();
//!
//! let op = spec.operation("/users/{id}", &http::Method::GET).unwrap();
//! assert_eq!(op.operation_id, "getUsersById");
//! assert!(spec.schema("User").is_some());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod openapi;
mod registry;

pub use error::{DocsError, DocsResult};
pub use openapi::{
    generate_operation_id, problem_detail_schema, Components, Info, MediaType, OpenApi,
    OpenApiGenerator, Operation, Parameter, ParameterIn, PathItem, RequestBody, Response,
    RouteSpec, Server, Tag, PROBLEM_DETAIL_SCHEMA,
};
pub use registry::{SchemaRegistry, COMPONENTS_PREFIX};

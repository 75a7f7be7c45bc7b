//! # Pactum
//!
//! **Type-driven HTTP contracts**
//!
//! One annotated request or response type drives everything at the HTTP
//! boundary:
//!
//! - **Binding**: path, query, header, cookie, form and body values land in
//!   typed fields, with declared defaults
//! - **Validation**: every constraint violation is reported at once
//! - **Negotiation**: `Accept` and `Content-Type` select codecs by quality
//! - **Documentation**: an OpenAPI 3.1 document with shared, cycle-safe
//!   schema definitions
//!
//! ## Quick Start
//!
//! ```rust
//! use pactum::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize, Contract)]
//! pub struct GetUser {
//!     #[contract(path = "id")]
//!     pub id: String,
//!     #[contract(query = "page", default = "1", minimum = 1)]
//!     pub page: i64,
//! }
//!
//! /// A registered user.
//! #[derive(Debug, Default, Serialize, Deserialize, Contract)]
//! pub struct User {
//!     pub id: String,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let codecs = CodecRegistry::standard();
//! let ctx = ExtractionContext::builder()
//!     .uri("/users/42")
//!     .path_param("id", "42")
//!     .build();
//!
//! let req: GetUser = decode_request(&ctx, &codecs).await.unwrap();
//! assert_eq!((req.id.as_str(), req.page), ("42", 1));
//!
//! let spec = OpenApiGenerator::new()
//!     .title("Users")
//!     .version("1.0.0")
//!     .route(RouteSpec::get("/users/{id}").request::<GetUser>().response::<User>())
//!     .generate()
//!     .unwrap();
//! assert!(spec.schema("User").is_some());
//! # }
//! ```
//!
//! `#[derive(Contract)]` expands to paths under `pactum_core`, so crates
//! deriving it list `pactum-core` next to `pactum` in their dependencies.
//!
//! ## Crates
//!
//! | Module | Crate | Contents |
//! |--------|-------|----------|
//! | [`core`] | `pactum-core` | reflection model, shapes, errors |
//! | [`validate`] | `pactum-validate` | constraint validation |
//! | [`extract`] | `pactum-extract` | binding, codecs, replies |
//! | [`docs`] | `pactum-docs` | schema registry, OpenAPI generation |
//! | [`telemetry`] | `pactum-telemetry` | logging setup |
//! | [`config`] | `pactum-config` | layered configuration |

#![doc(html_root_url = "https://docs.rs/pactum/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use pactum_config as config;
pub use pactum_core as core;
pub use pactum_docs as docs;
pub use pactum_extract as extract;
pub use pactum_telemetry as telemetry;
pub use pactum_validate as validate;

pub use pactum_macros::Contract;

/// Prelude module for convenient imports.
///
/// ```rust
/// use pactum::prelude::*;
///
/// let codecs = CodecRegistry::standard();
/// assert_eq!(codecs.content_types().len(), 4);
/// ```
pub mod prelude {
    pub use pactum_core::{
        describe, shape_of, AggregateValidationError, BindError, BindingSource, ContractError,
        FileUpload, NegotiationError, ProblemDetail, RawRequest, Reflect, RequestShape, Schema,
        SchemaProvider, SchemaTransformer, SelfValidator, Stream, TypeInfo, UnsupportedMediaError,
        Violation, Void,
    };

    pub use pactum_macros::Contract;

    pub use pactum_validate::{validate, validate_request};

    pub use pactum_extract::{
        bind, decode_request, encode_reply, problem_response, Binder, Codec, CodecRegistry,
        ExtractionContext, MultipartConfig, Reply, SetCookie,
    };

    pub use pactum_docs::{OpenApi, OpenApiGenerator, RouteSpec, SchemaRegistry};

    pub use pactum_config::{ConfigLoader, PactumConfig};

    pub use pactum_telemetry::{init_logging, LogConfig};
}

//! # Pactum Extract
//!
//! Request binding, content negotiation and response encoding.
//!
//! The binder reads an [`ExtractionContext`] according to the request
//! type's shape:
//!
//! | Shape | Source of each field |
//! |-------|----------------------|
//! | `Empty` | nothing, `T::default()` |
//! | `WholeBody` | the decoded body |
//! | `ParamsOnly` | path, query, header, cookie, raw request |
//! | `ParamsPlusBody` | parameters, plus the body decoded into the `body` field |
//! | `MultipartForm` | parameters, plus form values and uploaded files |
//!
//! Query, header and cookie parameters fall back to their declared default
//! when absent or empty. An empty body is not an error: the value keeps its
//! default.
//!
//! ## Example
//!
//! ```rust
//! use pactum_extract::{bind, CodecRegistry, ExtractionContext};
//! use pactum_macros::Contract;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize, Contract)]
//! pub struct GetUser {
//!     #[contract(path = "id")]
//!     pub id: String,
//!     #[contract(query = "page", default = "1")]
//!     pub page: i64,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let ctx = ExtractionContext::builder()
//!     .uri("/users/42")
//!     .path_param("id", "42")
//!     .build();
//!
//! let req: GetUser = bind(&ctx, &CodecRegistry::default()).await.unwrap();
//! assert_eq!(req.id, "42");
//! assert_eq!(req.page, 1);
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
pub mod codec;
mod context;
pub mod cookie;
pub mod multipart;
mod response;
mod xml;

pub use binder::{bind, decode_request, Binder};
pub use codec::{Codec, CodecError, CodecRegistry, FormCodec, JsonCodec, TextCodec, XmlCodec};
pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use cookie::{Cookies, SameSite, SetCookie};
pub use multipart::{MultipartConfig, MultipartForm};
pub use response::{encode_reply, problem_detail_response, problem_response, Reply};

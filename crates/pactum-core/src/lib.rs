//! # Pactum Core
//!
//! Type metadata and shared values for the Pactum contract engine.
//!
//! Request and response types describe themselves through [`Reflect`],
//! usually via `#[derive(Contract)]`. The resulting [`TypeInfo`] drives
//! every other part of the engine:
//!
//! - [`describe`] returns the memoized descriptor of a type.
//! - [`classify`] / [`shape_of`] decide the [`RequestShape`] of a request type.
//! - [`coerce`] converts wire strings into typed JSON values.
//! - [`Schema`] is the JSON Schema node type shared with the docs crate.
//!
//! ## Example
//!
//! ```
//! use pactum_core::{describe, shape_of, RequestShape};
//!
//! // Standard types already implement `Reflect`.
//! assert!(describe::<Vec<u8>>().fields().is_empty());
//! assert_eq!(shape_of::<String>(), RequestShape::WholeBody);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Lets `#[derive(Contract)]` expand inside this crate's own tests.
extern crate self as pactum_core;

mod constraint;
mod convert;
mod duration;
mod error;
mod markers;
mod metadata;
mod params;
mod reflect;
mod schema;
mod shape;

pub use constraint::ConstraintSet;
pub use convert::{coerce, parse_bool, ConversionError};
pub use duration::{parse_duration, DurationParseError};
pub use error::{
    AggregateValidationError, BindError, ContractError, NegotiationError, ProblemDetail,
    UnsupportedMediaError, Violation,
};
pub use markers::{FileUpload, RawRequest, RequestHead, Stream, Void};
pub use metadata::describe;
pub use params::PathParams;
pub use reflect::{
    peel, Attachment, BindingSource, FieldDescriptor, KnownType, Primitive, Reflect,
    SchemaHooks, TypeInfo, TypeKind, TypeRef,
};
pub use schema::{Schema, SchemaProvider, SchemaTransformer, SchemaType};
pub use shape::{classify, shape_of, RequestShape};

/// Type-level validation run after constraint checks pass.
///
/// Enable with `#[contract(self_validate)]` on the deriving type.
///
/// ```
/// use pactum_core::{AggregateValidationError, SelfValidator};
///
/// struct Range {
///     start: u32,
///     end: u32,
/// }
///
/// impl SelfValidator for Range {
///     fn validate(&self) -> Result<(), AggregateValidationError> {
///         if self.start > self.end {
///             return Err(AggregateValidationError::single("start", "must not exceed end"));
///         }
///         Ok(())
///     }
/// }
///
/// assert!(Range { start: 2, end: 1 }.validate().is_err());
/// ```
pub trait SelfValidator {
    /// Checks invariants that span several fields.
    fn validate(&self) -> Result<(), AggregateValidationError>;
}

//! Error values produced by the contract engine.
//!
//! Errors are plain values. Each exposes the HTTP status it maps to and can
//! be rendered as an RFC 9457 [`ProblemDetail`]; writing that to the wire is
//! left to the surrounding HTTP layer.
//!
//! | Error | Status | Behavior |
//! |-------|--------|----------|
//! | [`BindError`] | 400 (413/415/500 by kind) | first error wins |
//! | [`AggregateValidationError`] | 400 | every violation collected |
//! | [`NegotiationError`] | 406 | no acceptable encoder |
//! | [`UnsupportedMediaError`] | 415 | no matching decoder |

use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reflect::BindingSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindErrorKind {
    /// A parameter could not be converted to its field type.
    InvalidValue,
    /// The body or multipart payload could not be decoded.
    Decode,
    /// No decoder is registered for the request content type.
    UnsupportedMediaType,
    /// The payload exceeds a configured limit.
    PayloadTooLarge,
    /// The request type declares a field the binder cannot populate.
    Configuration,
}

/// Error raised while binding a request onto a typed value.
///
/// Binding stops at the first failure.
///
/// ```
/// use pactum_core::{BindError, BindingSource};
/// use http::StatusCode;
///
/// let err = BindError::invalid_value(BindingSource::Query, "page", "invalid digit found in string");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.field(), Some("page"));
/// assert_eq!(err.to_string(), "bind query \"page\": invalid digit found in string");
/// ```
#[derive(Debug, Clone, Error)]
#[error("bind {origin}{}: {cause}", quoted(.field))]
pub struct BindError {
    origin: BindingSource,
    kind: BindErrorKind,
    field: Option<String>,
    cause: String,
}

impl BindError {
    /// A parameter value failed conversion.
    #[must_use]
    pub fn invalid_value(
        source: BindingSource,
        field: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        Self {
            origin: source,
            kind: BindErrorKind::InvalidValue,
            field: Some(field.into()),
            cause: cause.into(),
        }
    }

    /// The request payload could not be decoded.
    #[must_use]
    pub fn decode(source: BindingSource, cause: impl Into<String>) -> Self {
        Self {
            origin: source,
            kind: BindErrorKind::Decode,
            field: None,
            cause: cause.into(),
        }
    }

    /// The request content type has no registered decoder.
    #[must_use]
    pub fn unsupported_media_type(cause: impl Into<String>) -> Self {
        Self {
            origin: BindingSource::BodyMember,
            kind: BindErrorKind::UnsupportedMediaType,
            field: None,
            cause: cause.into(),
        }
    }

    /// The payload is larger than allowed.
    #[must_use]
    pub fn payload_too_large(limit: usize, actual: usize) -> Self {
        Self {
            origin: BindingSource::BodyMember,
            kind: BindErrorKind::PayloadTooLarge,
            field: None,
            cause: format!("payload too large: max {limit} bytes, got {actual} bytes"),
        }
    }

    /// The field type cannot be bound from `source`.
    #[must_use]
    pub fn configuration(
        source: BindingSource,
        field: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        Self {
            origin: source,
            kind: BindErrorKind::Configuration,
            field: Some(field.into()),
            cause: cause.into(),
        }
    }

    /// Where the failing value came from.
    pub fn binding_source(&self) -> BindingSource {
        self.origin
    }

    /// Wire name of the failing field, if the error concerns one field.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Underlying cause.
    pub fn cause(&self) -> &str {
        &self.cause
    }

    /// Returns `true` for declaration defects rather than client mistakes.
    pub fn is_configuration(&self) -> bool {
        self.kind == BindErrorKind::Configuration
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            BindErrorKind::InvalidValue | BindErrorKind::Decode => StatusCode::BAD_REQUEST,
            BindErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            BindErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            BindErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code.
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            BindErrorKind::InvalidValue => "INVALID_PARAMETER",
            BindErrorKind::Decode => "DECODE_FAILED",
            BindErrorKind::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            BindErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            BindErrorKind::Configuration => "BINDING_MISCONFIGURED",
        }
    }

    /// Renders the error as problem details.
    pub fn to_problem(&self) -> ProblemDetail {
        let problem = ProblemDetail::new(self.status_code());
        if self.is_configuration() {
            // Declaration defects are not the client's business.
            problem
        } else {
            problem.with_detail(self.to_string())
        }
    }
}

fn quoted(field: &Option<String>) -> String {
    field
        .as_deref()
        .map(|field| format!(" {field:?}"))
        .unwrap_or_default()
}

impl From<UnsupportedMediaError> for BindError {
    fn from(err: UnsupportedMediaError) -> Self {
        Self::unsupported_media_type(err.to_string())
    }
}

/// One constraint violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Dot-separated path of the offending field.
    pub field: String,
    /// Human-readable description.
    pub message: String,
    /// The offending value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl Violation {
    /// Create a violation without the offending value.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    /// Attach the offending value.
    #[must_use]
    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }
}

/// Every constraint violation found in one validation pass.
///
/// A valid value produces no error at all, so an instance returned from the
/// validator always holds at least one violation.
#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("{} constraint violation(s)", .violations.len())]
pub struct AggregateValidationError {
    violations: Vec<Violation>,
}

impl AggregateValidationError {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Error holding a single violation.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation::new(field, message)],
        }
    }

    /// Records a violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Appends every violation from `other`.
    pub fn extend(&mut self, other: AggregateValidationError) {
        self.violations.extend(other.violations);
    }

    /// Violations in discovery order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// `Ok(())` when nothing was recorded, `Err(self)` otherwise.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Renders the error as problem details listing every violation.
    pub fn to_problem(&self) -> ProblemDetail {
        ProblemDetail::new(self.status_code())
            .with_title("Validation Failed")
            .with_detail(self.to_string())
            .with_errors(self.violations.clone())
    }
}

impl FromIterator<Violation> for AggregateValidationError {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

/// No registered encoder satisfies the `Accept` header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not acceptable: {accept:?} matches none of {available:?}")]
pub struct NegotiationError {
    /// The `Accept` header as received.
    pub accept: String,
    /// Registered content types.
    pub available: Vec<String>,
}

impl NegotiationError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::NOT_ACCEPTABLE
    }

    /// Renders the error as problem details.
    pub fn to_problem(&self) -> ProblemDetail {
        ProblemDetail::new(self.status_code()).with_detail(format!(
            "supported content types: {}",
            self.available.join(", ")
        ))
    }
}

/// No registered decoder matches the request `Content-Type`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported media type {content_type:?}")]
pub struct UnsupportedMediaError {
    /// The `Content-Type` header as received.
    pub content_type: String,
    /// Registered content types.
    pub supported: Vec<String>,
}

impl UnsupportedMediaError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNSUPPORTED_MEDIA_TYPE
    }

    /// Renders the error as problem details.
    pub fn to_problem(&self) -> ProblemDetail {
        ProblemDetail::new(self.status_code()).with_detail(self.to_string())
    }
}

/// Any error surfaced while decoding a request or encoding a response.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Binding failed.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// Constraint or self validation failed.
    #[error(transparent)]
    Validation(#[from] AggregateValidationError),

    /// No acceptable response encoder.
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    /// No decoder for the request body.
    #[error(transparent)]
    UnsupportedMedia(#[from] UnsupportedMediaError),

    /// The response value could not be encoded.
    #[error("encode response: {0}")]
    Encode(String),
}

impl ContractError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Bind(err) => err.status_code(),
            Self::Validation(err) => err.status_code(),
            Self::Negotiation(err) => err.status_code(),
            Self::UnsupportedMedia(err) => err.status_code(),
            Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the error as problem details.
    pub fn to_problem(&self) -> ProblemDetail {
        match self {
            Self::Bind(err) => err.to_problem(),
            Self::Validation(err) => err.to_problem(),
            Self::Negotiation(err) => err.to_problem(),
            Self::UnsupportedMedia(err) => err.to_problem(),
            Self::Encode(_) => ProblemDetail::new(self.status_code()),
        }
    }
}

/// RFC 9457 problem details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetail {
    /// Problem type URI.
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub problem_type: String,
    /// Short summary.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// HTTP status.
    pub status: u16,
    /// Occurrence-specific explanation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
    /// Occurrence URI.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance: String,
    /// Field-level violations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Violation>,
}

impl ProblemDetail {
    /// Media type of serialized problem details.
    pub const CONTENT_TYPE: &'static str = "application/problem+json";

    /// Problem with the canonical reason phrase of `status` as title.
    pub fn new(status: StatusCode) -> Self {
        Self {
            problem_type: "about:blank".to_string(),
            title: status.canonical_reason().unwrap_or_default().to_string(),
            status: status.as_u16(),
            detail: String::new(),
            instance: String::new(),
            errors: Vec::new(),
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Set the instance.
    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = instance.into();
        self
    }

    /// Set the violations.
    #[must_use]
    pub fn with_errors(mut self, errors: Vec<Violation>) -> Self {
        self.errors = errors;
        self
    }
}

impl fmt::Display for ProblemDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            f.write_str(&self.title)
        } else {
            f.write_str(&self.detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bind_error_statuses() {
        let invalid = BindError::invalid_value(BindingSource::Path, "id", "bad");
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.error_code(), "INVALID_PARAMETER");
        assert_eq!(invalid.binding_source(), BindingSource::Path);

        let decode = BindError::decode(BindingSource::BodyMember, "expected value");
        assert_eq!(decode.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(decode.field(), None);
        assert_eq!(decode.to_string(), "bind body: expected value");

        let large = BindError::payload_too_large(10, 20);
        assert_eq!(large.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(large.cause().contains("20"));

        let config = BindError::configuration(BindingSource::Query, "tags", "unsupported type");
        assert!(config.is_configuration());
        assert_eq!(config.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(config.to_problem().detail.is_empty());
    }

    #[test]
    fn test_error_messages_and_sources() {
        use std::error::Error as _;

        let field = BindError::invalid_value(BindingSource::Header, "X-Limit", "not a number");
        assert_eq!(field.to_string(), "bind header \"X-Limit\": not a number");
        assert!(field.source().is_none());

        let agg: AggregateValidationError = vec![
            Violation::new("a", "bad"),
            Violation::new("b", "bad"),
            Violation::new("c", "bad"),
        ]
        .into_iter()
        .collect();
        assert_eq!(agg.to_string(), "3 constraint violation(s)");
        assert!(agg.source().is_none());
    }

    #[test]
    fn test_unsupported_media_converts_to_bind_error() {
        let err: BindError = UnsupportedMediaError {
            content_type: "text/xml".to_string(),
            supported: vec!["application/json".to_string()],
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(err.to_string().contains("text/xml"));
    }

    #[test]
    fn test_aggregate_into_result() {
        assert!(AggregateValidationError::new().into_result().is_ok());

        let mut agg = AggregateValidationError::new();
        agg.push(Violation::new("name", "must be at least 3 characters"));
        agg.push(Violation::new("age", "must be at least 18").with_value(json!(12)));
        let err = agg.into_result().unwrap_err();
        assert_eq!(err.len(), 2);
        assert_eq!(err.to_string(), "2 constraint violation(s)");
    }

    #[test]
    fn test_validation_problem() {
        let err = AggregateValidationError::single("body.email", "must match pattern ^.+@.+$");
        let problem = err.to_problem();

        assert_eq!(problem.status, 400);
        assert_eq!(problem.title, "Validation Failed");
        assert_eq!(problem.detail, "1 constraint violation(s)");
        assert_eq!(
            serde_json::to_value(&problem).unwrap()["errors"],
            json!([{"field": "body.email", "message": "must match pattern ^.+@.+$"}])
        );
    }

    #[test]
    fn test_negotiation_problem() {
        let err = NegotiationError {
            accept: "text/csv".to_string(),
            available: vec!["application/json".to_string()],
        };
        assert_eq!(err.status_code(), StatusCode::NOT_ACCEPTABLE);
        let problem = err.to_problem();
        assert_eq!(problem.title, "Not Acceptable");
        assert!(problem.detail.contains("application/json"));
    }

    #[test]
    fn test_contract_error_dispatch() {
        let err = ContractError::from(BindError::payload_too_large(1, 2));
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

        let err = ContractError::from(AggregateValidationError::single("x", "bad"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_problem().errors.len(), 1);

        let err = ContractError::Encode("boom".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_problem_display_prefers_detail() {
        let problem = ProblemDetail::new(StatusCode::NOT_FOUND);
        assert_eq!(problem.to_string(), "Not Found");
        assert_eq!(problem.with_detail("user 7").to_string(), "user 7");
    }
}

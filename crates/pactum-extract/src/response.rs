//! Response encoding.
//!
//! | Payload | Status | Body |
//! |---------|--------|------|
//! | [`Void`](pactum_core::Void) | `204 No Content` | empty |
//! | [`Stream`] | reply status | raw bytes, the stream's own content type |
//! | anything else | reply status (default `200`) | negotiated codec |

use std::any::Any;

use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Response, StatusCode};
use pactum_core::{describe, ContractError, ProblemDetail, Reflect, Stream, TypeKind};
use serde::Serialize;

use crate::codec::CodecRegistry;
use crate::cookie::SetCookie;

/// A response payload with optional status, headers and cookies.
///
/// # Example
///
/// ```rust
/// use pactum_extract::{cookie::SetCookie, encode_reply, CodecRegistry, Reply};
/// use http::StatusCode;
///
/// let reply = Reply::new("created".to_string())
///     .with_status(StatusCode::CREATED)
///     .with_cookie(SetCookie::new("seen", "1"));
///
/// let response = encode_reply(&CodecRegistry::default(), "", reply).unwrap();
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert_eq!(response.body().as_ref(), b"\"created\"");
/// ```
#[derive(Debug, Clone)]
pub struct Reply<T> {
    payload: T,
    status: Option<StatusCode>,
    headers: HeaderMap,
    cookies: Vec<SetCookie>,
}

impl<T> Reply<T> {
    /// Wraps a payload.
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            status: None,
            headers: HeaderMap::new(),
            cookies: Vec::new(),
        }
    }

    /// Overrides the success status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Adds a response header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Adds a `Set-Cookie` header.
    #[must_use]
    pub fn with_cookie(mut self, cookie: SetCookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Status override, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// The payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Unwraps the payload.
    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T> From<T> for Reply<T> {
    fn from(payload: T) -> Self {
        Self::new(payload)
    }
}

/// Encodes `reply` for a request that sent `accept`.
///
/// # Errors
///
/// Returns [`ContractError::Negotiation`] when no codec satisfies `accept`,
/// and [`ContractError::Encode`] when the payload cannot be serialized.
pub fn encode_reply<T>(
    codecs: &CodecRegistry,
    accept: &str,
    reply: Reply<T>,
) -> Result<Response<Bytes>, ContractError>
where
    T: Reflect + Serialize,
{
    let info = describe::<T>();
    let Reply {
        payload,
        status,
        headers,
        cookies,
    } = reply;

    let (status, content_type, body) = match info.kind() {
        TypeKind::Void => (StatusCode::NO_CONTENT, None, Bytes::new()),
        _ => {
            if let Some(stream) = (&payload as &dyn Any).downcast_ref::<Stream>() {
                (
                    status.unwrap_or(StatusCode::OK),
                    Some(stream.content_type().to_string()),
                    stream.body().clone(),
                )
            } else {
                let codec = codecs.negotiate_encoder(accept)?;
                let value = serde_json::to_value(&payload)
                    .map_err(|e| ContractError::Encode(e.to_string()))?;
                let body = codec
                    .encode(&value, &info)
                    .map_err(|e| ContractError::Encode(e.to_string()))?;
                (
                    status.unwrap_or(StatusCode::OK),
                    Some(codec.content_type().to_string()),
                    body,
                )
            }
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    let out = response.headers_mut();
    if let Some(content_type) = content_type {
        out.insert(header::CONTENT_TYPE, header_value(&content_type)?);
    }
    for (name, value) in &headers {
        out.append(name.clone(), value.clone());
    }
    for cookie in &cookies {
        out.append(header::SET_COOKIE, header_value(&cookie.to_header_value())?);
    }
    Ok(response)
}

/// Renders an error as an `application/problem+json` response.
pub fn problem_response(err: &ContractError) -> Response<Bytes> {
    let problem = err.to_problem();
    if err.status_code().is_server_error() {
        tracing::warn!(error = %err, "request failed");
    } else {
        tracing::debug!(error = %err, "request rejected");
    }
    problem_detail_response(&problem)
}

/// Serializes problem details into a response.
pub fn problem_detail_response(problem: &ProblemDetail) -> Response<Bytes> {
    let body = serde_json::to_vec(problem).map(Bytes::from).unwrap_or_default();
    let mut response = Response::new(body);
    *response.status_mut() =
        StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(ProblemDetail::CONTENT_TYPE),
    );
    response
}

fn header_value(value: &str) -> Result<HeaderValue, ContractError> {
    HeaderValue::try_from(value).map_err(|e| ContractError::Encode(e.to_string()))
}

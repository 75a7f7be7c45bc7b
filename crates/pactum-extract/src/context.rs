//! The request as the binder sees it.
//!
//! Servers adapt their own request type into an [`ExtractionContext`]; the
//! binder never touches a framework type directly.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use pactum_core::{PathParams, RawRequest, RequestHead};

use crate::cookie::Cookies;

/// One request: method, URI, headers, body and router path captures.
///
/// The query string and `Cookie` header are parsed once, when the context is
/// built.
///
/// # Example
///
/// ```rust
/// use pactum_extract::ExtractionContext;
/// use http::Method;
///
/// let ctx = ExtractionContext::builder()
///     .method(Method::GET)
///     .uri("/users/42?page=2")
///     .path_param("id", "42")
///     .header("cookie", "session=abc")
///     .build();
///
/// assert_eq!(ctx.path_param("id"), Some("42"));
/// assert_eq!(ctx.query("page"), Some("2"));
/// assert_eq!(ctx.cookie("session"), Some("abc"));
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_params: PathParams,
    query: Vec<(String, String)>,
    cookies: Cookies,
}

impl ExtractionContext {
    /// Wraps already-routed request parts.
    #[must_use]
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        path_params: PathParams,
    ) -> Self {
        let query = uri
            .query()
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default();
        let cookies = Cookies::from_headers(&headers);
        Self {
            method,
            uri,
            headers,
            body,
            path_params,
            query,
            cookies,
        }
    }

    /// Starts building a context.
    #[must_use]
    pub fn builder() -> ExtractionContextBuilder {
        ExtractionContextBuilder::new()
    }

    /// Request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request target as received.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// All headers, repeated names included.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The fully buffered body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the path captures.
    #[must_use]
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Returns a path capture by name.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    /// Returns the first query parameter with the given name.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First value of header `name`, if it is visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a cookie value by name.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name)
    }

    /// Returns the parsed `Cookie` header.
    #[must_use]
    pub fn cookies(&self) -> &Cookies {
        &self.cookies
    }

    /// Raw `Content-Type`, parameters included.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    /// Raw `Accept`.
    #[must_use]
    pub fn accept(&self) -> Option<&str> {
        self.header(header::ACCEPT.as_str())
    }

    /// True for a zero-length body.
    #[must_use]
    pub fn is_body_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Handle to this request for `raw` fields.
    #[must_use]
    pub fn raw_request(&self) -> RawRequest {
        RawRequest::new(RequestHead {
            method: self.method.clone(),
            uri: self.uri.clone(),
            headers: self.headers.clone(),
            path_params: self.path_params.clone(),
        })
    }
}

/// Builder for constructing an [`ExtractionContext`].
#[derive(Debug, Default)]
pub struct ExtractionContextBuilder {
    method: Option<Method>,
    uri: Option<Uri>,
    headers: HeaderMap,
    body: Bytes,
    path_params: PathParams,
}

impl ExtractionContextBuilder {
    /// A builder for `GET /` with no headers or body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the URI. Unparseable URIs are ignored.
    #[must_use]
    pub fn uri(mut self, uri: &str) -> Self {
        if let Ok(uri) = uri.parse() {
            self.uri = Some(uri);
        }
        self
    }

    /// Replaces every header added so far.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Adds a single header. Invalid names or values are ignored.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name),
            HeaderValue::try_from(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Buffered body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds a path capture.
    #[must_use]
    pub fn path_param(mut self, name: &str, value: &str) -> Self {
        self.path_params.push(name, value);
        self
    }

    /// Sets the path captures.
    #[must_use]
    pub fn path_params(mut self, params: PathParams) -> Self {
        self.path_params = params;
        self
    }

    /// Builds the context, defaulting to `GET /`.
    #[must_use]
    pub fn build(self) -> ExtractionContext {
        ExtractionContext::new(
            self.method.unwrap_or(Method::GET),
            self.uri.unwrap_or_else(|| Uri::from_static("/")),
            self.headers,
            self.body,
            self.path_params,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let ctx = ExtractionContext::builder().build();
        assert_eq!(ctx.method(), &Method::GET);
        assert_eq!(ctx.uri().path(), "/");
        assert!(ctx.is_body_empty());
        assert!(ctx.content_type().is_none());
    }

    #[test]
    fn test_query_is_decoded() {
        let ctx = ExtractionContext::builder()
            .uri("/search?q=hello%20world&tag=a&tag=b&empty=")
            .build();
        assert_eq!(ctx.query("q"), Some("hello world"));
        assert_eq!(ctx.query("tag"), Some("a"));
        assert_eq!(ctx.query("empty"), Some(""));
        assert_eq!(ctx.query("missing"), None);
    }

    #[test]
    fn test_headers_and_cookies() {
        let ctx = ExtractionContext::builder()
            .header("Content-Type", "application/json")
            .header("Accept", "text/plain")
            .header("Cookie", "a=1; b=2")
            .build();
        assert_eq!(ctx.content_type(), Some("application/json"));
        assert_eq!(ctx.accept(), Some("text/plain"));
        assert_eq!(ctx.cookie("b"), Some("2"));
    }

    #[test]
    fn test_raw_request_handle() {
        let ctx = ExtractionContext::builder()
            .method(Method::DELETE)
            .uri("/items/7")
            .path_param("id", "7")
            .header("X-Trace", "t-1")
            .build();
        let raw = ctx.raw_request();
        assert_eq!(raw.method(), Some(&Method::DELETE));
        assert_eq!(raw.path_param("id"), Some("7"));
        assert_eq!(raw.header("x-trace"), Some("t-1"));
    }
}

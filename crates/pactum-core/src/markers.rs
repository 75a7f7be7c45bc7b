//! Marker types with special meaning to the engine.
//!
//! - [`Void`]: no request payload, or a `204 No Content` response.
//! - [`RawRequest`]: a field that receives the request itself.
//! - [`FileUpload`]: a file part of a multipart form.
//! - [`Stream`]: a response body written as raw bytes.
//!
//! The markers that live inside bound structs ([`RawRequest`] and
//! [`FileUpload`]) serialize as `null` and deserialize from anything to their
//! empty state; the binder attaches their real contents afterwards.

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize, Serializer};

use crate::params::PathParams;
use crate::reflect::{Attachment, KnownType, Reflect, TypeInfo, TypeKind};

/// The "no payload" marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Void;

impl Reflect for Void {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Void>(TypeKind::Void)
    }
}

/// Request line, headers and path captures of the request being bound.
#[derive(Debug, Clone)]
pub struct RequestHead {
    /// HTTP method.
    pub method: Method,
    /// Request URI.
    pub uri: Uri,
    /// Request headers.
    pub headers: HeaderMap,
    /// Path captures.
    pub path_params: PathParams,
}

/// Access to the raw request from inside a bound struct.
///
/// Empty until the binder attaches the request.
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    head: Option<Arc<RequestHead>>,
}

impl RawRequest {
    /// Wraps a request head.
    pub fn new(head: RequestHead) -> Self {
        Self {
            head: Some(Arc::new(head)),
        }
    }

    /// The request head, if attached.
    pub fn head(&self) -> Option<&RequestHead> {
        self.head.as_deref()
    }

    /// HTTP method, if attached.
    pub fn method(&self) -> Option<&Method> {
        self.head().map(|h| &h.method)
    }

    /// Request URI, if attached.
    pub fn uri(&self) -> Option<&Uri> {
        self.head().map(|h| &h.uri)
    }

    /// A header value as a string, if attached and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head()?.headers.get(name)?.to_str().ok()
    }

    /// A path capture, if attached.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.head()?.path_params.get(name)
    }

    /// Returns `true` once the binder attached the request.
    pub fn is_attached(&self) -> bool {
        self.head.is_some()
    }
}

impl Reflect for RawRequest {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<RawRequest>(TypeKind::RawRequest)
    }

    fn from_attachment(attachment: &Attachment) -> Option<Self> {
        match attachment {
            Attachment::Request(raw) => Some(raw.clone()),
            _ => None,
        }
    }
}

/// A file uploaded through a multipart form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileUpload {
    field_name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl FileUpload {
    /// Create a file from a form field name and its contents.
    pub fn new(field_name: impl Into<String>, data: Bytes) -> Self {
        Self {
            field_name: field_name.into(),
            data,
            ..Self::default()
        }
    }

    /// Set the client-supplied file name.
    #[must_use]
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Set the part's content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Form field name.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Client-supplied file name.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Content type of the part.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// File contents.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// File size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the file is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Contents as UTF-8 text.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.data)
    }

    /// File extension from the file name, if any.
    pub fn extension(&self) -> Option<&str> {
        self.file_name
            .as_ref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
    }
}

impl Reflect for FileUpload {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<FileUpload>(TypeKind::Known(KnownType::File))
    }

    fn from_attachment(attachment: &Attachment) -> Option<Self> {
        match attachment {
            Attachment::File(file) => Some(file.clone()),
            Attachment::Files(files) => files.first().cloned(),
            Attachment::Request(_) => None,
        }
    }
}

/// A response body written verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stream {
    content_type: Option<String>,
    body: Bytes,
}

impl Stream {
    /// Default content type of streams.
    pub const DEFAULT_CONTENT_TYPE: &'static str = "application/octet-stream";

    /// Create a stream from raw bytes.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            content_type: None,
            body: body.into(),
        }
    }

    /// Set the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Content type, defaulting to `application/octet-stream`.
    pub fn content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or(Self::DEFAULT_CONTENT_TYPE)
    }

    /// The body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl Reflect for Stream {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Stream>(TypeKind::Known(KnownType::Stream))
    }
}

macro_rules! opaque_serde {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_unit()
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    IgnoredAny::deserialize(deserializer)?;
                    Ok(Self::default())
                }
            }
        )*
    };
}

opaque_serde!(RawRequest, FileUpload, Stream);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_serializes_to_null() {
        assert_eq!(serde_json::to_value(Void).unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn test_opaque_markers_round_trip_empty() {
        let file = FileUpload::new("avatar", Bytes::from_static(b"png"));
        let value = serde_json::to_value(&file).unwrap();
        assert!(value.is_null());

        let back: FileUpload = serde_json::from_value(serde_json::json!({"x": 1})).unwrap();
        assert_eq!(back, FileUpload::default());
    }

    #[test]
    fn test_raw_request_accessors() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trace", "abc".parse().unwrap());
        let mut path_params = PathParams::new();
        path_params.push("id", "42");

        let raw = RawRequest::new(RequestHead {
            method: Method::GET,
            uri: "/users/42".parse().unwrap(),
            headers,
            path_params,
        });

        assert!(raw.is_attached());
        assert_eq!(raw.method(), Some(&Method::GET));
        assert_eq!(raw.header("x-trace"), Some("abc"));
        assert_eq!(raw.path_param("id"), Some("42"));
        assert!(!RawRequest::default().is_attached());
    }

    #[test]
    fn test_file_upload_accessors() {
        let file = FileUpload::new("doc", Bytes::from_static(b"hello"))
            .with_file_name("notes.txt")
            .with_content_type("text/plain");

        assert_eq!(file.size(), 5);
        assert_eq!(file.text().unwrap(), "hello");
        assert_eq!(file.extension(), Some("txt"));
        assert_eq!(file.content_type(), Some("text/plain"));
    }

    #[test]
    fn test_stream_default_content_type() {
        let stream = Stream::new(Bytes::from_static(b"raw"));
        assert_eq!(stream.content_type(), "application/octet-stream");
        assert_eq!(
            stream.with_content_type("text/csv").content_type(),
            "text/csv"
        );
    }
}

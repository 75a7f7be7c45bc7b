//! Multipart form parsing for form-bound request types.
//!
//! The whole payload is read into a [`MultipartForm`] before binding: scalar
//! parts become string values and parts with a file name become
//! [`FileUpload`]s.

use std::io;

use bytes::Bytes;
use http::{header, HeaderMap};
use pactum_core::{BindError, BindingSource, FileUpload};

/// Default maximum total body size for multipart (32 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 32 * 1024 * 1024;

/// Default maximum size per part (10 MiB).
pub const DEFAULT_MAX_FIELD_SIZE: usize = 10 * 1024 * 1024;

/// Default maximum number of parts.
pub const DEFAULT_MAX_FIELDS: usize = 100;

/// Limits applied while parsing multipart payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartConfig {
    /// Maximum total body size in bytes.
    pub max_body_size: usize,
    /// Maximum size per part in bytes.
    pub max_field_size: usize,
    /// Maximum number of parts.
    pub max_fields: usize,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_field_size: DEFAULT_MAX_FIELD_SIZE,
            max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

impl MultipartConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum body size.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set the maximum part size.
    #[must_use]
    pub fn max_field_size(mut self, size: usize) -> Self {
        self.max_field_size = size;
        self
    }

    /// Set the maximum number of parts.
    #[must_use]
    pub fn max_fields(mut self, count: usize) -> Self {
        self.max_fields = count;
        self
    }
}

/// A fully read `multipart/form-data` payload.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    values: Vec<(String, String)>,
    files: Vec<FileUpload>,
}

impl MultipartForm {
    /// Reads every part of `body`.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] if the `Content-Type` has no multipart
    /// boundary, a limit in `config` is exceeded, or the payload is
    /// malformed.
    pub async fn parse(
        headers: &HeaderMap,
        body: Bytes,
        config: &MultipartConfig,
    ) -> Result<Self, BindError> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let boundary = multer::parse_boundary(content_type).map_err(|_| {
            BindError::decode(
                BindingSource::Form,
                format!("expected multipart/form-data with a boundary, got {content_type:?}"),
            )
        })?;

        if body.len() > config.max_body_size {
            return Err(BindError::payload_too_large(config.max_body_size, body.len()));
        }

        let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        let mut form = Self::default();
        let mut count = 0;
        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            count += 1;
            if count > config.max_fields {
                return Err(BindError::decode(
                    BindingSource::Form,
                    format!("too many parts (max {})", config.max_fields),
                ));
            }

            let Some(name) = field.name().map(String::from) else {
                continue;
            };
            let file_name = field.file_name().map(String::from);
            let content_type = field.content_type().map(ToString::to_string);
            let data = field.bytes().await.map_err(malformed)?;
            if data.len() > config.max_field_size {
                return Err(BindError::payload_too_large(config.max_field_size, data.len()));
            }

            match file_name {
                Some(file_name) => {
                    let mut upload = FileUpload::new(name, data).with_file_name(file_name);
                    if let Some(content_type) = content_type {
                        upload = upload.with_content_type(content_type);
                    }
                    form.files.push(upload);
                }
                None => {
                    let text = String::from_utf8(data.to_vec()).map_err(|e| {
                        BindError::invalid_value(BindingSource::Form, name.clone(), e.to_string())
                    })?;
                    form.values.push((name, text));
                }
            }
        }

        tracing::debug!(
            values = form.values.len(),
            files = form.files.len(),
            "parsed multipart form"
        );
        Ok(form)
    }

    /// First scalar value submitted under `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Files submitted under `name`, in order.
    pub fn files<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FileUpload> + 'a {
        self.files.iter().filter(move |f| f.field_name() == name)
    }

    /// Number of scalar parts.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Number of file parts.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

fn malformed(err: multer::Error) -> BindError {
    BindError::decode(BindingSource::Form, format!("multipart parse error: {err}"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use http::{HeaderValue, StatusCode};

    pub(crate) const BOUNDARY: &str = "X-PACTUM-BOUNDARY";

    pub(crate) fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(&format!("multipart/form-data; boundary={BOUNDARY}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_parse_values_and_files() {
        let body = multipart_body(&[
            ("title", None, "report"),
            ("file", Some("a.txt"), "alpha"),
            ("file", Some("b.txt"), "beta"),
        ]);
        let form = MultipartForm::parse(&headers(), Bytes::from(body), &MultipartConfig::default())
            .await
            .unwrap();

        assert_eq!(form.value("title"), Some("report"));
        assert_eq!(form.value_count(), 1);
        let files: Vec<_> = form.files("file").collect();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_name(), Some("a.txt"));
        assert_eq!(files[0].content_type(), Some("text/plain"));
        assert_eq!(files[1].text().unwrap(), "beta");
    }

    #[tokio::test]
    async fn test_missing_boundary() {
        let err = MultipartForm::parse(&HeaderMap::new(), Bytes::new(), &MultipartConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.binding_source(), BindingSource::Form);
    }

    #[tokio::test]
    async fn test_limits() {
        let body = multipart_body(&[("a", None, "1"), ("b", None, "2")]);

        let config = MultipartConfig::new().max_body_size(8);
        let err = MultipartForm::parse(&headers(), Bytes::from(body.clone()), &config)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

        let config = MultipartConfig::new().max_fields(1);
        let err = MultipartForm::parse(&headers(), Bytes::from(body), &config)
            .await
            .unwrap_err();
        assert!(err.cause().contains("too many parts"));

        let big = multipart_body(&[("file", Some("big.bin"), "0123456789")]);
        let config = MultipartConfig::new().max_field_size(4);
        let err = MultipartForm::parse(&headers(), Bytes::from(big), &config)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

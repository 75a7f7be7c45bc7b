//! Wire formats and `Accept` / `Content-Type` negotiation.
//!
//! A [`CodecRegistry`] holds an ordered list of codecs. The first one is the
//! default, used when a request names no media type.
//!
//! | Codec | Media type | Values |
//! |-------|------------|--------|
//! | [`JsonCodec`] | `application/json` | any |
//! | [`XmlCodec`] | `application/xml` | any, elements named after fields |
//! | [`FormCodec`] | `application/x-www-form-urlencoded` | flat objects |
//! | [`TextCodec`] | `text/plain` | strings |

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use mime::Mime;
use pactum_core::{coerce, peel, NegotiationError, TypeInfo, TypeKind, UnsupportedMediaError};
use serde_json::{Map, Value};
use thiserror::Error;

pub use crate::xml::XmlCodec;

/// Failure inside a codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The value cannot be written in this format.
    #[error("encode: {0}")]
    Encode(String),

    /// The payload is not valid in this format.
    #[error("decode: {0}")]
    Decode(String),
}

/// A wire format.
///
/// Values cross the codec boundary as [`serde_json::Value`] together with
/// the descriptor of the Rust type on the other side, so formats that carry
/// only strings can convert them and formats with element names can find
/// them.
pub trait Codec: Send + Sync + fmt::Debug {
    /// Media type written to `Content-Type`.
    fn content_type(&self) -> &str;

    /// Serializes a value of type `source`.
    fn encode(&self, value: &Value, source: &TypeInfo) -> Result<Bytes, CodecError>;

    /// Parses a request body for a value of type `target`.
    fn decode(&self, body: &[u8], target: &TypeInfo) -> Result<Value, CodecError>;
}

/// `application/json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &str {
        "application/json"
    }

    fn encode(&self, value: &Value, _source: &TypeInfo) -> Result<Bytes, CodecError> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, body: &[u8], _target: &TypeInfo) -> Result<Value, CodecError> {
        serde_json::from_slice(body).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// `application/x-www-form-urlencoded`.
///
/// Encodes flat objects; arrays of scalars repeat the key. Decoded values are
/// converted to the target struct's field types.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormCodec;

impl FormCodec {
    fn scalar(value: &Value) -> Result<Option<String>, CodecError> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Array(_) | Value::Object(_) => Err(CodecError::Encode(
                "form encoding supports only flat values".to_string(),
            )),
        }
    }
}

impl Codec for FormCodec {
    fn content_type(&self) -> &str {
        "application/x-www-form-urlencoded"
    }

    fn encode(&self, value: &Value, _source: &TypeInfo) -> Result<Bytes, CodecError> {
        let Value::Object(object) = value else {
            return Err(CodecError::Encode(
                "form encoding requires an object".to_string(),
            ));
        };

        let mut pairs = Vec::new();
        for (key, value) in object {
            match value {
                Value::Array(items) => {
                    for item in items {
                        if let Some(text) = Self::scalar(item)? {
                            pairs.push((key.as_str(), text));
                        }
                    }
                }
                other => {
                    if let Some(text) = Self::scalar(other)? {
                        pairs.push((key.as_str(), text));
                    }
                }
            }
        }

        serde_urlencoded::to_string(pairs)
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode(&self, body: &[u8], target: &TypeInfo) -> Result<Value, CodecError> {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_bytes(body).map_err(|e| CodecError::Decode(e.to_string()))?;

        let mut object = Map::new();
        for (key, raw) in pairs {
            let Some(field) = target.fields().iter().find(|f| f.name == key) else {
                object.insert(key, Value::String(raw));
                continue;
            };

            let info = peel(&field.field_type.info());
            if let TypeKind::Sequence(item) = info.kind() {
                let converted = coerce(&item.info(), &raw)
                    .map_err(|e| CodecError::Decode(format!("{key}: {e}")))?;
                if let Value::Array(items) = object
                    .entry(key)
                    .or_insert_with(|| Value::Array(Vec::new()))
                {
                    items.push(converted);
                }
            } else {
                let converted =
                    coerce(&info, &raw).map_err(|e| CodecError::Decode(format!("{key}: {e}")))?;
                object.entry(key).or_insert(converted);
            }
        }
        Ok(Value::Object(object))
    }
}

/// `text/plain`; the payload is a single string.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl Codec for TextCodec {
    fn content_type(&self) -> &str {
        "text/plain"
    }

    fn encode(&self, value: &Value, _source: &TypeInfo) -> Result<Bytes, CodecError> {
        match value {
            Value::String(text) => Ok(Bytes::from(text.clone())),
            _ => Err(CodecError::Encode(
                "text/plain encodes strings only".to_string(),
            )),
        }
    }

    fn decode(&self, body: &[u8], _target: &TypeInfo) -> Result<Value, CodecError> {
        std::str::from_utf8(body)
            .map(|text| Value::String(text.to_string()))
            .map_err(|e| CodecError::Decode(e.to_string()))
    }
}

/// Ordered set of codecs; index 0 is the default.
///
/// # Example
///
/// ```rust
/// use pactum_extract::{CodecRegistry, TextCodec};
///
/// let codecs = CodecRegistry::default().with(TextCodec);
///
/// let codec = codecs
///     .negotiate_encoder("application/xml;q=0.9, text/plain")
///     .unwrap();
/// assert_eq!(codec.content_type(), "text/plain");
/// assert!(codecs.negotiate_encoder("text/csv").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: Vec<Arc<dyn Codec>>,
}

impl Default for CodecRegistry {
    /// A registry holding only [`JsonCodec`].
    fn default() -> Self {
        Self::empty().with(JsonCodec)
    }
}

impl CodecRegistry {
    /// A registry without codecs.
    #[must_use]
    pub fn empty() -> Self {
        Self { codecs: Vec::new() }
    }

    /// JSON (default), XML, form and text codecs.
    #[must_use]
    pub fn standard() -> Self {
        Self::default()
            .with(XmlCodec)
            .with(FormCodec)
            .with(TextCodec)
    }

    /// Appends a codec.
    #[must_use]
    pub fn with(mut self, codec: impl Codec + 'static) -> Self {
        self.register(Arc::new(codec));
        self
    }

    /// Appends a shared codec.
    pub fn register(&mut self, codec: Arc<dyn Codec>) {
        tracing::debug!(content_type = codec.content_type(), "registered codec");
        self.codecs.push(codec);
    }

    /// The default codec.
    #[must_use]
    pub fn default_codec(&self) -> Option<Arc<dyn Codec>> {
        self.codecs.first().cloned()
    }

    /// Registered media types, in order.
    #[must_use]
    pub fn content_types(&self) -> Vec<String> {
        self.codecs
            .iter()
            .map(|c| c.content_type().to_string())
            .collect()
    }

    /// Picks the response encoder for an `Accept` header.
    ///
    /// An empty header selects the default codec. Otherwise the matching
    /// media range with the highest quality wins and ties keep the earliest
    /// range. `*/*` matches the default codec and `type/*` the first codec
    /// of that type. Ranges with `q=0` or an unparseable quality are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`NegotiationError`] when no range matches a registered
    /// codec.
    pub fn negotiate_encoder(&self, accept: &str) -> Result<Arc<dyn Codec>, NegotiationError> {
        if accept.trim().is_empty() {
            return self.default_codec().ok_or_else(|| self.not_acceptable(accept));
        }

        let mut best: Option<(f64, &Arc<dyn Codec>)> = None;
        for range in accept.split(',') {
            let Ok(media) = range.trim().parse::<Mime>() else {
                continue;
            };
            let Some(quality) = quality(&media) else {
                continue;
            };
            let Some(candidate) = self.match_range(&media) else {
                continue;
            };
            if best.map_or(true, |(q, _)| quality > q) {
                best = Some((quality, candidate));
            }
        }

        match best {
            Some((quality, codec)) => {
                tracing::debug!(
                    accept,
                    content_type = codec.content_type(),
                    quality,
                    "negotiated response encoder"
                );
                Ok(Arc::clone(codec))
            }
            None => Err(self.not_acceptable(accept)),
        }
    }

    /// Picks the request decoder for a `Content-Type` header.
    ///
    /// An empty header selects the default codec; otherwise the media type
    /// (parameters ignored) must equal a registered one.
    ///
    /// # Errors
    ///
    /// Returns an [`UnsupportedMediaError`] when no codec matches.
    pub fn decoder_for(&self, content_type: &str) -> Result<Arc<dyn Codec>, UnsupportedMediaError> {
        if content_type.trim().is_empty() {
            return self
                .default_codec()
                .ok_or_else(|| self.unsupported(content_type));
        }

        let media = content_type
            .trim()
            .parse::<Mime>()
            .map_err(|_| self.unsupported(content_type))?;
        self.codecs
            .iter()
            .find(|codec| essence_of(codec.content_type()).as_deref() == Some(media.essence_str()))
            .cloned()
            .ok_or_else(|| self.unsupported(content_type))
    }

    fn match_range(&self, media: &Mime) -> Option<&Arc<dyn Codec>> {
        if media.type_() == mime::STAR && media.subtype() == mime::STAR {
            return self.codecs.first();
        }
        if media.subtype() == mime::STAR {
            return self.codecs.iter().find(|codec| {
                codec
                    .content_type()
                    .parse::<Mime>()
                    .is_ok_and(|m| m.type_() == media.type_())
            });
        }
        self.codecs
            .iter()
            .find(|codec| essence_of(codec.content_type()).as_deref() == Some(media.essence_str()))
    }

    fn not_acceptable(&self, accept: &str) -> NegotiationError {
        NegotiationError {
            accept: accept.to_string(),
            available: self.content_types(),
        }
    }

    fn unsupported(&self, content_type: &str) -> UnsupportedMediaError {
        UnsupportedMediaError {
            content_type: content_type.to_string(),
            supported: self.content_types(),
        }
    }
}

fn essence_of(content_type: &str) -> Option<String> {
    content_type
        .parse::<Mime>()
        .ok()
        .map(|m| m.essence_str().to_string())
}

/// Quality of a media range; `None` when the range must be ignored.
fn quality(media: &Mime) -> Option<f64> {
    let Some(q) = media.get_param("q") else {
        return Some(1.0);
    };
    let q: f64 = q.as_str().parse().ok()?;
    (q > 0.0 && q <= 1.0).then_some(q)
}

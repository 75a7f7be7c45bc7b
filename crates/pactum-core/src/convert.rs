//! Conversion of wire strings into typed JSON values.
//!
//! Path captures, query parameters, headers, cookies and multipart scalars
//! all arrive as strings. [`coerce`] converts one of them into the JSON
//! representation of the field's type, which serde then deserializes into
//! the field.

use chrono::DateTime;
use serde_json::{Number, Value};
use thiserror::Error;

use crate::duration::parse_duration;
use crate::reflect::{KnownType, Primitive, TypeInfo, TypeKind};

/// Errors produced by [`coerce`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The string is not a valid value of the target type.
    #[error("{0}")]
    Invalid(String),

    /// The target type cannot be bound from a string.
    #[error("unsupported type {0}")]
    Unsupported(&'static str),
}

/// Converts `raw` into the JSON form of the type described by `info`.
///
/// ```
/// use pactum_core::{coerce, describe};
/// use serde_json::json;
///
/// assert_eq!(coerce(&describe::<i32>(), "42").unwrap(), json!(42));
/// assert_eq!(coerce(&describe::<bool>(), "T").unwrap(), json!(true));
/// assert!(coerce(&describe::<u8>(), "300").is_err());
/// ```
pub fn coerce(info: &TypeInfo, raw: &str) -> Result<Value, ConversionError> {
    match info.kind() {
        TypeKind::Primitive(primitive) => coerce_primitive(*primitive, raw),
        TypeKind::Known(KnownType::Duration) => {
            let duration =
                parse_duration(raw).map_err(|e| ConversionError::Invalid(e.to_string()))?;
            serde_json::to_value(duration).map_err(|e| ConversionError::Invalid(e.to_string()))
        }
        TypeKind::Known(KnownType::Timestamp) => DateTime::parse_from_rfc3339(raw)
            .map(|ts| Value::String(ts.to_rfc3339()))
            .map_err(|e| ConversionError::Invalid(format!("invalid timestamp {raw:?}: {e}"))),
        TypeKind::Known(KnownType::Uuid) => uuid::Uuid::parse_str(raw)
            .map(|id| Value::String(id.to_string()))
            .map_err(|e| ConversionError::Invalid(format!("invalid uuid {raw:?}: {e}"))),
        TypeKind::Optional(inner) => coerce(&inner.info(), raw),
        TypeKind::Enumeration(variants) => {
            if variants.contains(&raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(ConversionError::Invalid(format!(
                    "{raw:?} is not one of [{}]",
                    variants.join(", ")
                )))
            }
        }
        _ => Err(ConversionError::Unsupported(info.rust_name())),
    }
}

fn coerce_primitive(primitive: Primitive, raw: &str) -> Result<Value, ConversionError> {
    match primitive {
        Primitive::Str => Ok(Value::String(raw.to_string())),
        Primitive::Char => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::String(c.to_string())),
                _ => Err(ConversionError::Invalid(format!(
                    "expected a single character, got {raw:?}"
                ))),
            }
        }
        Primitive::Bool => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| ConversionError::Invalid(format!("invalid boolean {raw:?}"))),
        Primitive::Int { signed: true, bits } => {
            let value: i64 = raw
                .parse()
                .map_err(|e| ConversionError::Invalid(format!("invalid integer {raw:?}: {e}")))?;
            let limit = 1i128 << (bits - 1);
            if i128::from(value) < -limit || i128::from(value) >= limit {
                return Err(out_of_range(raw, bits));
            }
            Ok(Value::from(value))
        }
        Primitive::Int {
            signed: false,
            bits,
        } => {
            let value: u64 = raw
                .parse()
                .map_err(|e| ConversionError::Invalid(format!("invalid integer {raw:?}: {e}")))?;
            if bits < 64 && value >= (1u64 << bits) {
                return Err(out_of_range(raw, bits));
            }
            Ok(Value::from(value))
        }
        Primitive::Float { .. } => {
            let value: f64 = raw
                .parse()
                .map_err(|e| ConversionError::Invalid(format!("invalid number {raw:?}: {e}")))?;
            Number::from_f64(value)
                .map(Value::Number)
                .ok_or_else(|| ConversionError::Invalid(format!("{raw:?} is not a finite number")))
        }
    }
}

fn out_of_range(raw: &str, bits: u8) -> ConversionError {
    ConversionError::Invalid(format!("value {raw:?} out of range for {bits}-bit integer"))
}

/// Parses the boolean spellings accepted on the wire.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

//! Request type classification.
//!
//! Classification decides how the fields of a request type relate to the
//! wire. Rules are checked in a fixed priority order, so every type maps to
//! exactly one [`RequestShape`]:
//!
//! 1. [`Empty`](RequestShape::Empty): the type is the void marker.
//! 2. [`MultipartForm`](RequestShape::MultipartForm): some field is form-bound.
//! 3. [`ParamsPlusBody`](RequestShape::ParamsPlusBody): the type has a `body` struct field.
//! 4. [`ParamsOnly`](RequestShape::ParamsOnly): some field is path, query,
//!    header, cookie or raw-request bound.
//! 5. [`WholeBody`](RequestShape::WholeBody): everything else.

use std::any::TypeId;
use std::fmt;
use std::sync::OnceLock;

use dashmap::DashMap;

use crate::metadata::describe;
use crate::reflect::{BindingSource, Reflect, TypeInfo, TypeKind};

/// How a request type is laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestShape {
    /// No payload at all.
    Empty,
    /// The whole value is decoded from the body.
    WholeBody,
    /// Every field comes from path, query, headers, cookies or the raw request.
    ParamsOnly,
    /// Parameters plus a nested `body` member decoded from the body.
    ParamsPlusBody,
    /// Fields come from a multipart form.
    MultipartForm,
}

impl fmt::Display for RequestShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::WholeBody => "whole-body",
            Self::ParamsOnly => "params-only",
            Self::ParamsPlusBody => "params-plus-body",
            Self::MultipartForm => "multipart-form",
        };
        f.write_str(name)
    }
}

/// Classifies a request type from its descriptor.
pub fn classify(info: &TypeInfo) -> RequestShape {
    if matches!(info.kind(), TypeKind::Void) {
        return RequestShape::Empty;
    }

    let fields = info.fields();
    if fields.iter().any(|f| f.source == BindingSource::Form) {
        RequestShape::MultipartForm
    } else if fields.iter().any(|f| f.is_body()) {
        RequestShape::ParamsPlusBody
    } else if fields
        .iter()
        .any(|f| f.source.is_parameter() && f.source != BindingSource::Form)
    {
        RequestShape::ParamsOnly
    } else {
        RequestShape::WholeBody
    }
}

/// Memoized [`classify`] of `T`.
///
/// ```
/// use pactum_core::{shape_of, RequestShape, Void};
///
/// assert_eq!(shape_of::<Void>(), RequestShape::Empty);
/// assert_eq!(shape_of::<Vec<String>>(), RequestShape::WholeBody);
/// ```
pub fn shape_of<T: Reflect>() -> RequestShape {
    static SHAPES: OnceLock<DashMap<TypeId, RequestShape>> = OnceLock::new();
    let shapes = SHAPES.get_or_init(DashMap::new);

    *shapes.entry(TypeId::of::<T>()).or_insert_with(|| {
        let info = describe::<T>();
        let shape = classify(&info);
        tracing::debug!(type_name = info.rust_name(), %shape, "classified request type");
        shape
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::{FileUpload, RawRequest, Void};
    use crate::reflect::{FieldDescriptor, TypeRef};

    struct Payload;

    impl Reflect for Payload {
        fn type_info() -> TypeInfo {
            TypeInfo::structure::<Self>(
                Some("Payload"),
                vec![FieldDescriptor::new("name", "name", TypeRef::of::<String>())],
            )
        }
    }

    fn request(fields: Vec<FieldDescriptor>) -> TypeInfo {
        TypeInfo::structure::<()>(None, fields)
    }

    fn path(ident: &'static str) -> FieldDescriptor {
        FieldDescriptor::new(ident, ident, TypeRef::of::<String>()).bind(BindingSource::Path, ident)
    }

    fn body() -> FieldDescriptor {
        FieldDescriptor::new("body", "body", TypeRef::of::<Payload>()).bind(BindingSource::None, "body")
    }

    fn form(ident: &'static str) -> FieldDescriptor {
        FieldDescriptor::new(ident, ident, TypeRef::of::<FileUpload>()).bind(BindingSource::Form, ident)
    }

    #[test]
    fn test_void_is_empty() {
        assert_eq!(classify(&Void::type_info()), RequestShape::Empty);
        assert_eq!(classify(&<()>::type_info()), RequestShape::Empty);
    }

    #[test]
    fn test_plain_struct_is_whole_body() {
        assert_eq!(classify(&Payload::type_info()), RequestShape::WholeBody);
    }

    #[test]
    fn test_params_only() {
        assert_eq!(classify(&request(vec![path("id")])), RequestShape::ParamsOnly);

        let raw = FieldDescriptor::new("raw", "raw", TypeRef::of::<RawRequest>());
        assert_eq!(classify(&request(vec![raw])), RequestShape::ParamsOnly);
    }

    #[test]
    fn test_body_field_wins_over_params() {
        assert_eq!(
            classify(&request(vec![path("id"), body()])),
            RequestShape::ParamsPlusBody
        );
    }

    #[test]
    fn test_scalar_body_field_is_not_a_body_container() {
        let scalar = FieldDescriptor::new("body", "body", TypeRef::of::<String>())
            .bind(BindingSource::None, "body");
        assert_eq!(
            classify(&request(vec![path("id"), scalar])),
            RequestShape::ParamsOnly
        );
    }

    #[test]
    fn test_form_wins_over_everything() {
        assert_eq!(
            classify(&request(vec![path("id"), body(), form("avatar")])),
            RequestShape::MultipartForm
        );
    }

    #[test]
    fn test_shape_of_is_memoized() {
        assert_eq!(shape_of::<Payload>(), RequestShape::WholeBody);
        assert_eq!(shape_of::<Payload>(), RequestShape::WholeBody);
        assert_eq!(RequestShape::ParamsPlusBody.to_string(), "params-plus-body");
    }
}

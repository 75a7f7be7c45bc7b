//! Runtime type metadata.
//!
//! Every type that takes part in request binding, validation, or schema
//! generation implements [`Reflect`]. Its [`TypeInfo`] is the declarative
//! descriptor table the rest of the engine walks: a [`TypeKind`] for the
//! overall shape and, for structs, one [`FieldDescriptor`] per exported
//! field.
//!
//! Struct implementations are normally generated by `#[derive(Contract)]`;
//! this module provides the implementations for primitives and standard
//! containers.
//!
//! Field types are held as [`TypeRef`]s, which resolve lazily. A type that
//! refers to itself (directly or through a chain of other types) therefore
//! describes itself in finite time, and consumers decide how deep to walk.

use std::any::TypeId;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use indexmap::IndexMap;

use crate::error::AggregateValidationError;
use crate::markers::{FileUpload, RawRequest};
use crate::metadata::describe;
use crate::schema::Schema;
use crate::ConstraintSet;

/// A type whose shape is known to the contract engine.
pub trait Reflect: Sized + 'static {
    /// Builds the descriptor for this type.
    ///
    /// Prefer [`describe`](crate::describe), which memoizes the result.
    fn type_info() -> TypeInfo;

    /// Builds a value from request-level data the binder cannot express as
    /// JSON, such as the raw request handle or uploaded files.
    fn from_attachment(attachment: &Attachment) -> Option<Self> {
        let _ = attachment;
        None
    }

    /// Replaces `self` with a value built from `attachment`.
    ///
    /// Returns `false` if this type does not accept the attachment.
    fn attach(&mut self, attachment: &Attachment) -> bool {
        match Self::from_attachment(attachment) {
            Some(value) => {
                *self = value;
                true
            }
            None => false,
        }
    }

    /// Routes an attachment to the field with the given Rust identifier.
    fn attach_field(&mut self, field: &str, attachment: &Attachment) -> bool {
        let _ = (field, attachment);
        false
    }

    /// Runs type-specific validation after constraint checks pass.
    fn self_validate(&self) -> Result<(), AggregateValidationError> {
        Ok(())
    }
}

/// Request-level data attached to fields after JSON binding.
#[derive(Debug, Clone)]
pub enum Attachment {
    /// Handle to the request being bound.
    Request(RawRequest),
    /// A single uploaded file.
    File(FileUpload),
    /// Every file uploaded under one form field name.
    Files(Vec<FileUpload>),
}

/// Lazily resolved reference to a [`Reflect`] type.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: fn() -> TypeId,
    name: fn() -> &'static str,
    resolve: fn() -> Arc<TypeInfo>,
}

impl TypeRef {
    /// Reference to `T`.
    pub fn of<T: Reflect>() -> Self {
        Self {
            id: TypeId::of::<T>,
            name: std::any::type_name::<T>,
            resolve: describe::<T>,
        }
    }

    /// Identity of the referenced type.
    pub fn type_id(&self) -> TypeId {
        (self.id)()
    }

    /// Fully qualified Rust name of the referenced type.
    pub fn rust_name(&self) -> &'static str {
        (self.name)()
    }

    /// Resolves the referenced type's descriptor (memoized).
    pub fn info(&self) -> Arc<TypeInfo> {
        (self.resolve)()
    }

    /// Returns `true` for [`RawRequest`] and `Option<RawRequest>`.
    ///
    /// Decided from the type identity alone, so it is safe to call while
    /// the containing type is still being described.
    pub fn is_raw_request(&self) -> bool {
        let id = self.type_id();
        id == TypeId::of::<RawRequest>() || id == TypeId::of::<Option<RawRequest>>()
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.rust_name()).finish()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id() == other.type_id()
    }
}

/// Primitive scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// UTF-8 string.
    Str,
    /// A single character.
    Char,
    /// Boolean.
    Bool,
    /// Integer of the given signedness and width.
    Int {
        /// Whether the integer is signed.
        signed: bool,
        /// Width in bits.
        bits: u8,
    },
    /// Floating point number of the given width.
    Float {
        /// Width in bits.
        bits: u8,
    },
}

/// Well-known leaf types with fixed schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownType {
    /// Point in time (RFC 3339 on the wire).
    Timestamp,
    /// Elapsed time.
    Duration,
    /// UUID.
    Uuid,
    /// Uploaded file.
    File,
    /// Opaque response byte stream.
    Stream,
}

/// Overall shape of a type.
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// The "no payload" marker.
    Void,
    /// The raw-request-access marker.
    RawRequest,
    /// A well-known leaf type.
    Known(KnownType),
    /// A primitive scalar.
    Primitive(Primitive),
    /// A byte sequence (base64 on the wire).
    Bytes,
    /// An optional value.
    Optional(TypeRef),
    /// A homogeneous sequence.
    Sequence(TypeRef),
    /// A map.
    Map {
        /// Key type.
        key: TypeRef,
        /// Value type.
        value: TypeRef,
    },
    /// A struct with named fields.
    Struct(Vec<FieldDescriptor>),
    /// A fieldless enum serialized as one of the given strings.
    Enumeration(Vec<&'static str>),
    /// Any JSON value.
    Any,
}

/// Optional schema hooks declared by a type.
#[derive(Clone, Copy, Default)]
pub struct SchemaHooks {
    /// Replaces the inferred schema wholesale.
    pub provider: Option<fn() -> Schema>,
    /// Post-processes the inferred schema.
    pub transformer: Option<fn(Schema) -> Schema>,
}

impl fmt::Debug for SchemaHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaHooks")
            .field("provider", &self.provider.is_some())
            .field("transformer", &self.transformer.is_some())
            .finish()
    }
}

/// Descriptor of one type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    id: TypeId,
    rust_name: &'static str,
    name: Option<Cow<'static, str>>,
    kind: TypeKind,
    doc: Option<&'static str>,
    hooks: SchemaHooks,
}

impl TypeInfo {
    /// Descriptor of an anonymous type `T` with the given kind.
    pub fn new<T: 'static>(kind: TypeKind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            rust_name: std::any::type_name::<T>(),
            name: None,
            kind,
            doc: None,
            hooks: SchemaHooks::default(),
        }
    }

    /// Descriptor of a named type `T`.
    ///
    /// Named structs are registered once in the schema registry and
    /// referenced by name everywhere else.
    pub fn named<T: 'static>(name: impl Into<Cow<'static, str>>, kind: TypeKind) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new::<T>(kind)
        }
    }

    /// Descriptor of a struct `T`.
    pub fn structure<T: 'static>(name: Option<&'static str>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.map(Cow::Borrowed),
            ..Self::new::<T>(TypeKind::Struct(fields))
        }
    }

    /// Attach type-level documentation.
    #[must_use]
    pub fn with_doc(mut self, doc: &'static str) -> Self {
        self.doc = Some(doc);
        self
    }

    /// Install a schema override hook.
    #[must_use]
    pub fn with_schema_provider(mut self, provider: fn() -> Schema) -> Self {
        self.hooks.provider = Some(provider);
        self
    }

    /// Install a schema transform hook.
    #[must_use]
    pub fn with_schema_transformer(mut self, transformer: fn(Schema) -> Schema) -> Self {
        self.hooks.transformer = Some(transformer);
        self
    }

    /// Identity of the described type.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified Rust name.
    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    /// Display name, if the type is named.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The type's shape.
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Type-level documentation.
    pub fn doc(&self) -> Option<&'static str> {
        self.doc
    }

    /// Schema hooks.
    pub fn hooks(&self) -> SchemaHooks {
        self.hooks
    }

    /// Exported fields, empty for non-struct kinds.
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.kind {
            TypeKind::Struct(fields) => fields,
            _ => &[],
        }
    }

    /// Looks up a field by its Rust identifier.
    pub fn field(&self, ident: &str) -> Option<&FieldDescriptor> {
        self.fields().iter().find(|f| f.ident == ident)
    }

    /// Returns `true` for struct kinds.
    pub fn is_struct(&self) -> bool {
        matches!(self.kind, TypeKind::Struct(_))
    }
}

/// Where a field's value comes from on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingSource {
    /// Path capture.
    Path,
    /// Query string parameter.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
    /// Multipart form field.
    Form,
    /// Member of the JSON body.
    BodyMember,
    /// Handle to the raw request.
    Raw,
    /// Not bound on its own (the nested body container).
    None,
}

impl BindingSource {
    /// Returns `true` for transport-bound sources, which are excluded from
    /// payload schemas and payload validation.
    pub fn is_parameter(self) -> bool {
        !matches!(self, Self::BodyMember | Self::None)
    }

    /// Lowercase name used in messages and contract documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Form => "form",
            Self::BodyMember => "body",
            Self::Raw => "raw",
            Self::None => "none",
        }
    }
}

impl fmt::Display for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binding descriptor of one exported field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Rust identifier.
    pub ident: &'static str,
    /// Serialized (JSON) name.
    pub name: &'static str,
    /// Name on the wire for parameter sources; equals `name` otherwise.
    pub wire_name: &'static str,
    /// Binding source.
    pub source: BindingSource,
    /// Whether the field is required.
    pub required: bool,
    /// Documentation.
    pub documentation: Option<&'static str>,
    /// Constraints and annotations.
    pub constraints: ConstraintSet,
    /// Field type.
    pub field_type: TypeRef,
}

impl FieldDescriptor {
    /// Descriptor of an unannotated field: a body member, or a raw-request
    /// field when `field_type` is [`RawRequest`].
    pub fn new(ident: &'static str, name: &'static str, field_type: TypeRef) -> Self {
        let source = if field_type.is_raw_request() {
            BindingSource::Raw
        } else {
            BindingSource::BodyMember
        };
        Self {
            ident,
            name,
            wire_name: name,
            source,
            required: false,
            documentation: None,
            constraints: ConstraintSet::default(),
            field_type,
        }
    }

    /// Bind the field from `source` under `wire_name`.
    ///
    /// Path captures are always required.
    #[must_use]
    pub fn bind(mut self, source: BindingSource, wire_name: &'static str) -> Self {
        self.source = source;
        self.wire_name = wire_name;
        if source == BindingSource::Path {
            self.required = true;
        }
        self
    }

    /// Mark the field required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach documentation.
    #[must_use]
    pub fn doc(mut self, doc: &'static str) -> Self {
        self.documentation = Some(doc);
        self
    }

    /// Attach constraints.
    #[must_use]
    pub fn constraints(mut self, constraints: ConstraintSet) -> Self {
        self.constraints = constraints;
        self
    }

    /// Declared default value in wire form.
    pub fn default_value(&self) -> Option<&'static str> {
        self.constraints.default
    }

    /// Returns `true` for the nested body container of a
    /// parameters-plus-body request.
    pub fn is_body(&self) -> bool {
        self.ident == "body"
            && self.source == BindingSource::None
            && peel(&self.field_type.info()).is_struct()
    }
}

/// Strips `Option` layers off a descriptor.
pub fn peel(info: &Arc<TypeInfo>) -> Arc<TypeInfo> {
    let mut current = Arc::clone(info);
    while let TypeKind::Optional(inner) = current.kind() {
        current = inner.info();
    }
    current
}

macro_rules! reflect_primitive {
    ($($ty:ty => $prim:expr),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::new::<$ty>(TypeKind::Primitive($prim))
                }
            }
        )*
    };
}

reflect_primitive! {
    String => Primitive::Str,
    char => Primitive::Char,
    bool => Primitive::Bool,
    i8 => Primitive::Int { signed: true, bits: 8 },
    i16 => Primitive::Int { signed: true, bits: 16 },
    i32 => Primitive::Int { signed: true, bits: 32 },
    i64 => Primitive::Int { signed: true, bits: 64 },
    isize => Primitive::Int { signed: true, bits: isize::BITS as u8 },
    u8 => Primitive::Int { signed: false, bits: 8 },
    u16 => Primitive::Int { signed: false, bits: 16 },
    u32 => Primitive::Int { signed: false, bits: 32 },
    u64 => Primitive::Int { signed: false, bits: 64 },
    usize => Primitive::Int { signed: false, bits: usize::BITS as u8 },
    f32 => Primitive::Float { bits: 32 },
    f64 => Primitive::Float { bits: 64 },
}

impl Reflect for () {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<()>(TypeKind::Void)
    }
}

impl Reflect for Bytes {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Bytes>(TypeKind::Bytes)
    }
}

impl Reflect for serde_json::Value {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<serde_json::Value>(TypeKind::Any)
    }
}

impl Reflect for std::time::Duration {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<std::time::Duration>(TypeKind::Known(KnownType::Duration))
    }
}

impl Reflect for chrono::DateTime<chrono::Utc> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>(TypeKind::Known(KnownType::Timestamp))
    }
}

impl Reflect for uuid::Uuid {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<uuid::Uuid>(TypeKind::Known(KnownType::Uuid))
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>(TypeKind::Optional(TypeRef::of::<T>()))
    }

    fn from_attachment(attachment: &Attachment) -> Option<Self> {
        T::from_attachment(attachment).map(Some)
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn type_info() -> TypeInfo {
        T::type_info()
    }

    fn from_attachment(attachment: &Attachment) -> Option<Self> {
        T::from_attachment(attachment).map(Box::new)
    }

    fn self_validate(&self) -> Result<(), AggregateValidationError> {
        (**self).self_validate()
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_info() -> TypeInfo {
        if TypeId::of::<T>() == TypeId::of::<u8>() {
            TypeInfo::new::<Self>(TypeKind::Bytes)
        } else {
            TypeInfo::new::<Self>(TypeKind::Sequence(TypeRef::of::<T>()))
        }
    }

    fn from_attachment(attachment: &Attachment) -> Option<Self> {
        match attachment {
            Attachment::Files(files) => Some(
                files
                    .iter()
                    .filter_map(|file| T::from_attachment(&Attachment::File(file.clone())))
                    .collect(),
            ),
            Attachment::File(_) => T::from_attachment(attachment).map(|item| vec![item]),
            Attachment::Request(_) => None,
        }
    }
}

impl<K: Reflect, V: Reflect, S: 'static> Reflect for HashMap<K, V, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>(TypeKind::Map {
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
        })
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>(TypeKind::Map {
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
        })
    }
}

impl<K: Reflect, V: Reflect, S: 'static> Reflect for IndexMap<K, V, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::new::<Self>(TypeKind::Map {
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_kinds() {
        assert!(matches!(
            String::type_info().kind(),
            TypeKind::Primitive(Primitive::Str)
        ));
        assert!(matches!(
            u16::type_info().kind(),
            TypeKind::Primitive(Primitive::Int {
                signed: false,
                bits: 16
            })
        ));
        assert!(matches!(
            f32::type_info().kind(),
            TypeKind::Primitive(Primitive::Float { bits: 32 })
        ));
    }

    #[test]
    fn test_raw_request_fields_bind_by_type() {
        let plain = FieldDescriptor::new("request", "request", TypeRef::of::<RawRequest>());
        let optional =
            FieldDescriptor::new("request", "request", TypeRef::of::<Option<RawRequest>>());
        let text = FieldDescriptor::new("request", "request", TypeRef::of::<String>());

        assert_eq!(plain.source, BindingSource::Raw);
        assert_eq!(optional.source, BindingSource::Raw);
        assert_eq!(text.source, BindingSource::BodyMember);
    }

    #[test]
    fn test_byte_vectors_are_bytes() {
        assert!(matches!(Vec::<u8>::type_info().kind(), TypeKind::Bytes));
        assert!(matches!(
            Vec::<u16>::type_info().kind(),
            TypeKind::Sequence(_)
        ));
    }

    #[test]
    fn test_box_is_transparent() {
        assert_eq!(Box::<String>::type_info().type_id(), TypeId::of::<String>());
    }

    #[test]
    fn test_peel_strips_nested_options() {
        let info = describe::<Option<Option<i32>>>();
        let peeled = peel(&info);
        assert_eq!(peeled.type_id(), TypeId::of::<i32>());
    }

    #[test]
    fn test_type_ref_equality_by_identity() {
        assert_eq!(TypeRef::of::<String>(), TypeRef::of::<String>());
        assert_ne!(TypeRef::of::<String>(), TypeRef::of::<i32>());
        assert!(format!("{:?}", TypeRef::of::<String>()).contains("String"));
    }

    #[test]
    fn test_binding_source_parameters() {
        assert!(BindingSource::Path.is_parameter());
        assert!(BindingSource::Form.is_parameter());
        assert!(BindingSource::Raw.is_parameter());
        assert!(!BindingSource::BodyMember.is_parameter());
        assert!(!BindingSource::None.is_parameter());
        assert_eq!(BindingSource::Cookie.to_string(), "cookie");
    }

    #[test]
    fn test_path_fields_are_required() {
        let field =
            FieldDescriptor::new("id", "id", TypeRef::of::<String>()).bind(BindingSource::Path, "id");
        assert!(field.required);

        let query = FieldDescriptor::new("page", "page", TypeRef::of::<i64>())
            .bind(BindingSource::Query, "page");
        assert!(!query.required);
    }

    #[test]
    fn test_vec_attachment_collects_files() {
        let files = vec![
            FileUpload::new("docs", Bytes::from_static(b"a")),
            FileUpload::new("docs", Bytes::from_static(b"b")),
        ];
        let mut target: Vec<FileUpload> = Vec::new();
        assert!(target.attach(&Attachment::Files(files)));
        assert_eq!(target.len(), 2);

        let mut single: Option<FileUpload> = None;
        assert!(single.attach(&Attachment::Files(vec![FileUpload::new(
            "avatar",
            Bytes::from_static(b"png")
        )])));
        assert_eq!(single.unwrap().field_name(), "avatar");

        let mut text = String::new();
        assert!(!text.attach(&Attachment::Files(Vec::new())));
    }
}

//! Type-to-schema conversion.
//!
//! A [`SchemaRegistry`] turns [`TypeInfo`] descriptors into JSON Schema
//! nodes. Named structs are emitted once into a definitions table and
//! referenced everywhere else; everything else is inlined.
//!
//! | Type | Schema |
//! |------|--------|
//! | `String`, `char` | `{"type": "string"}` |
//! | `bool` | `{"type": "boolean"}` |
//! | integers | `{"type": "integer"}` |
//! | floats | `{"type": "number"}` |
//! | `Vec<u8>`, `Bytes` | `{"type": "string", "contentEncoding": "base64"}` |
//! | `Vec<T>` | `{"type": "array", "items": ...}` |
//! | `HashMap<String, V>` | `{"type": "object", "additionalProperties": ...}` |
//! | maps with other keys | `{"type": "object"}` |
//! | `DateTime<Utc>` | `{"type": "string", "format": "date-time"}` |
//! | `Duration` | `{"type": "string", "format": "duration"}` |
//! | `Uuid` | `{"type": "string", "format": "uuid"}` |
//! | `FileUpload` | `{"type": "string", "format": "binary"}` |
//! | `Void`, `Stream`, `serde_json::Value` | `{}` |
//! | fieldless enums | `{"type": "string", "enum": [...]}` |
//! | named structs | `{"$ref": "#/components/schemas/Name"}` |

use std::any::TypeId;
use std::collections::HashMap;

use indexmap::IndexMap;
use pactum_core::{
    coerce, peel, FieldDescriptor, KnownType, Primitive, Reflect, Schema, TypeInfo, TypeKind,
    TypeRef,
};
use serde_json::Value;

/// Prefix of every reference into the definitions table.
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// Converts types to schema nodes, collecting named definitions.
///
/// One registry is meant to serve one document build. Repeated conversions
/// of the same type return equal nodes and never duplicate a definition.
///
/// ```
/// use pactum_docs::SchemaRegistry;
/// use pactum_macros::Contract;
///
/// #[derive(Contract)]
/// pub struct User {
///     pub name: String,
/// }
///
/// let mut registry = SchemaRegistry::new();
/// let first = registry.type_to_schema::<User>();
/// let second = registry.type_to_schema::<User>();
///
/// assert_eq!(first, second);
/// assert_eq!(first.reference.as_deref(), Some("#/components/schemas/User"));
/// assert_eq!(registry.definitions().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    identity: HashMap<TypeId, String>,
    definitions: IndexMap<String, Schema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema node for `T`.
    pub fn type_to_schema<T: Reflect>(&mut self) -> Schema {
        self.schema_for(TypeRef::of::<T>())
    }

    /// Schema node for a lazily referenced type.
    pub fn schema_for(&mut self, ty: TypeRef) -> Schema {
        let info = ty.info();
        self.schema_of(&info)
    }

    /// Schema node for a resolved descriptor.
    pub fn schema_of(&mut self, info: &TypeInfo) -> Schema {
        match info.kind() {
            TypeKind::Void | TypeKind::RawRequest | TypeKind::Any => Schema::any(),
            TypeKind::Known(known) => known_schema(*known),
            TypeKind::Primitive(primitive) => primitive_schema(*primitive),
            TypeKind::Bytes => Schema {
                content_encoding: Some("base64".to_string()),
                ..Schema::string()
            },
            TypeKind::Optional(inner) => self.schema_for(*inner),
            TypeKind::Sequence(item) => Schema::array(self.schema_for(*item)),
            TypeKind::Map { key, value } => {
                if is_string_key(&key.info()) {
                    Schema::map(self.schema_for(*value))
                } else {
                    Schema::object()
                }
            }
            TypeKind::Enumeration(values) => Schema {
                enum_values: values.iter().map(|v| Value::from(*v)).collect(),
                ..Schema::string()
            },
            TypeKind::Struct(fields) => match info.name() {
                Some(name) => self.register(info, name, fields),
                None => self.build_struct(info, fields),
            },
        }
    }

    /// Registered definitions, in registration order.
    pub fn definitions(&self) -> &IndexMap<String, Schema> {
        &self.definitions
    }

    /// Looks up a definition by name.
    pub fn definition(&self, name: &str) -> Option<&Schema> {
        self.definitions.get(name)
    }

    /// Adds a definition that does not come from a Rust type.
    pub fn insert_definition(&mut self, name: impl Into<String>, schema: Schema) {
        self.definitions.insert(name.into(), schema);
    }

    /// Consumes the registry, returning its definitions.
    pub fn into_definitions(self) -> IndexMap<String, Schema> {
        self.definitions
    }

    /// Reference path for a definition name.
    pub fn reference_path(name: &str) -> String {
        format!("{COMPONENTS_PREFIX}{name}")
    }

    fn register(&mut self, info: &TypeInfo, name: &str, fields: &[FieldDescriptor]) -> Schema {
        if let Some(existing) = self.identity.get(&info.type_id()) {
            return Schema::reference(Self::reference_path(existing));
        }

        let name = name.to_string();
        // Installed before the fields are visited so that cycles resolve
        // to a reference.
        self.identity.insert(info.type_id(), name.clone());

        let schema = self.build_struct(info, fields);
        if self.definitions.contains_key(&name) {
            tracing::debug!(
                schema = %name,
                type_name = info.rust_name(),
                "schema name collision, replacing definition"
            );
        } else {
            tracing::debug!(schema = %name, type_name = info.rust_name(), "registered schema");
        }
        self.definitions.insert(name.clone(), schema);

        Schema::reference(Self::reference_path(&name))
    }

    fn build_struct(&mut self, info: &TypeInfo, fields: &[FieldDescriptor]) -> Schema {
        let mut schema = Schema::object();
        if let Some(doc) = info.doc() {
            schema.description = Some(doc.to_string());
        }

        for field in fields.iter().filter(|f| !f.source.is_parameter()) {
            let property = self.field_schema(field);
            if field.required {
                schema.required.push(field.name.to_string());
            }
            schema.properties.insert(field.name.to_string(), property);
        }

        let hooks = info.hooks();
        if let Some(provider) = hooks.provider {
            schema = provider();
        }
        if let Some(transformer) = hooks.transformer {
            schema = transformer(schema);
        }
        schema
    }

    /// Field type schema with documentation and constraints applied.
    pub fn field_schema(&mut self, field: &FieldDescriptor) -> Schema {
        let mut schema = self.schema_for(field.field_type);
        if let Some(doc) = field.documentation {
            schema.description = Some(doc.to_string());
        }

        let constraints = &field.constraints;
        if let Some(n) = constraints.min_length {
            schema.min_length = Some(n as u64);
        }
        if let Some(n) = constraints.max_length {
            schema.max_length = Some(n as u64);
        }
        if let Some(pattern) = constraints.pattern {
            schema.pattern = Some(pattern.to_string());
        }
        if let Some(min) = constraints.minimum {
            schema.minimum = Some(min);
        }
        if let Some(max) = constraints.maximum {
            schema.maximum = Some(max);
        }
        if let Some(n) = constraints.min_items {
            schema.min_items = Some(n as u64);
        }
        if let Some(n) = constraints.max_items {
            schema.max_items = Some(n as u64);
        }
        if !constraints.enum_values.is_empty() {
            schema.enum_values = constraints
                .enum_values
                .iter()
                .map(|v| Value::from(*v))
                .collect();
        }

        let info = peel(&field.field_type.info());
        if let Some(raw) = constraints.default {
            schema.default = Some(annotation_value(&info, raw));
        }
        if let Some(raw) = constraints.example {
            schema.example = Some(annotation_value(&info, raw));
        }
        schema
    }
}

fn known_schema(known: KnownType) -> Schema {
    match known {
        KnownType::Timestamp => Schema::string().with_format("date-time"),
        KnownType::Duration => Schema::string().with_format("duration"),
        KnownType::Uuid => Schema::string().with_format("uuid"),
        KnownType::File => Schema::string().with_format("binary"),
        KnownType::Stream => Schema::any(),
    }
}

fn primitive_schema(primitive: Primitive) -> Schema {
    match primitive {
        Primitive::Str | Primitive::Char => Schema::string(),
        Primitive::Bool => Schema::boolean(),
        Primitive::Int { .. } => Schema::integer(),
        Primitive::Float { .. } => Schema::number(),
    }
}

fn is_string_key(info: &TypeInfo) -> bool {
    matches!(
        info.kind(),
        TypeKind::Primitive(Primitive::Str | Primitive::Char) | TypeKind::Enumeration(_)
    )
}

/// `default` and `example` values typed as the field's JSON kind; strings
/// otherwise.
fn annotation_value(info: &TypeInfo, raw: &str) -> Value {
    match info.kind() {
        TypeKind::Primitive(Primitive::Bool | Primitive::Int { .. } | Primitive::Float { .. }) => {
            coerce(info, raw).unwrap_or_else(|_| Value::from(raw))
        }
        _ => Value::from(raw),
    }
}

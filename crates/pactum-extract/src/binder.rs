//! Request binding.
//!
//! Binding starts from `T::default()` in its JSON form, overlays every
//! parameter converted to its field type, merges the decoded body and
//! deserializes the result. Raw request handles and uploaded files are
//! attached to their fields afterwards.
//!
//! The first failure aborts binding.

use pactum_core::{
    coerce, describe, peel, shape_of, Attachment, BindError, BindingSource, ContractError,
    ConversionError, FieldDescriptor, FileUpload, KnownType, Reflect, RequestShape, TypeInfo,
    TypeKind,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::codec::CodecRegistry;
use crate::context::ExtractionContext;
use crate::multipart::{MultipartConfig, MultipartForm};

/// Binds requests against a codec registry and multipart limits.
#[derive(Debug, Clone, Copy)]
pub struct Binder<'a> {
    codecs: &'a CodecRegistry,
    multipart: &'a MultipartConfig,
}

static DEFAULT_MULTIPART: MultipartConfig = MultipartConfig {
    max_body_size: crate::multipart::DEFAULT_MAX_BODY_SIZE,
    max_field_size: crate::multipart::DEFAULT_MAX_FIELD_SIZE,
    max_fields: crate::multipart::DEFAULT_MAX_FIELDS,
};

impl<'a> Binder<'a> {
    /// A binder with the default multipart limits.
    #[must_use]
    pub fn new(codecs: &'a CodecRegistry) -> Self {
        Self {
            codecs,
            multipart: &DEFAULT_MULTIPART,
        }
    }

    /// Use `config` when parsing multipart payloads.
    #[must_use]
    pub fn with_multipart_config(mut self, config: &'a MultipartConfig) -> Self {
        self.multipart = config;
        self
    }

    /// Populates a `T` from the request.
    ///
    /// # Errors
    ///
    /// Returns the first [`BindError`] encountered.
    pub async fn bind<T>(&self, ctx: &ExtractionContext) -> Result<T, BindError>
    where
        T: Reflect + Default + Serialize + DeserializeOwned,
    {
        let shape = shape_of::<T>();
        if shape == RequestShape::Empty {
            return Ok(T::default());
        }

        let info = describe::<T>();
        tracing::debug!(type_name = info.rust_name(), %shape, "binding request");

        let mut target = serde_json::to_value(T::default()).map_err(|e| {
            BindError::configuration(BindingSource::None, info.rust_name(), e.to_string())
        })?;

        let form = if shape == RequestShape::MultipartForm {
            Some(MultipartForm::parse(ctx.headers(), ctx.body().clone(), self.multipart).await?)
        } else {
            None
        };

        match shape {
            RequestShape::WholeBody => {
                if let Some(decoded) = self.decode_body(ctx, &info)? {
                    merge(&mut target, decoded);
                }
            }
            RequestShape::ParamsOnly | RequestShape::ParamsPlusBody => {
                bind_parameters(ctx, &info, &mut target)?;
                if let Some(body) = info.fields().iter().find(|f| f.is_body()) {
                    let body_info = peel(&body.field_type.info());
                    if let Some(decoded) = self.decode_body(ctx, &body_info)? {
                        if let Value::Object(object) = &mut target {
                            merge(object.entry(body.name).or_insert(Value::Null), decoded);
                        }
                    }
                }
            }
            RequestShape::MultipartForm => {
                bind_parameters(ctx, &info, &mut target)?;
                if let Some(form) = &form {
                    bind_form_values(form, &info, &mut target)?;
                }
            }
            RequestShape::Empty => {}
        }

        let mut value: T = serde_json::from_value(target)
            .map_err(|e| BindError::decode(BindingSource::BodyMember, e.to_string()))?;

        attach_raw_requests(ctx, &info, &mut value)?;
        if let Some(form) = &form {
            attach_files(form, &info, &mut value)?;
        }
        Ok(value)
    }

    /// Binds a `T` and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Bind`] or [`ContractError::Validation`].
    pub async fn decode_request<T>(&self, ctx: &ExtractionContext) -> Result<T, ContractError>
    where
        T: Reflect + Default + Serialize + DeserializeOwned,
    {
        let value = self.bind::<T>(ctx).await?;
        pactum_validate::validate_request(&value)?;
        Ok(value)
    }

    /// Decodes the body for `target`; `None` for an empty body or a body
    /// that decodes to `null`.
    fn decode_body(
        &self,
        ctx: &ExtractionContext,
        target: &TypeInfo,
    ) -> Result<Option<Value>, BindError> {
        if ctx.is_body_empty() {
            // Missing bodies leave the zero value in place.
            return Ok(None);
        }

        let decoder = self.codecs.decoder_for(ctx.content_type().unwrap_or_default())?;
        decoder
            .decode(ctx.body(), target)
            .map(|value| Some(value).filter(|v| !v.is_null()))
            .map_err(|e| BindError::decode(BindingSource::BodyMember, e.to_string()))
    }
}

/// Binds `T` with the default multipart limits.
///
/// # Errors
///
/// Returns the first [`BindError`] encountered.
pub async fn bind<T>(ctx: &ExtractionContext, codecs: &CodecRegistry) -> Result<T, BindError>
where
    T: Reflect + Default + Serialize + DeserializeOwned,
{
    Binder::new(codecs).bind(ctx).await
}

/// Binds and validates `T` with the default multipart limits.
///
/// # Errors
///
/// Returns [`ContractError::Bind`] or [`ContractError::Validation`].
pub async fn decode_request<T>(
    ctx: &ExtractionContext,
    codecs: &CodecRegistry,
) -> Result<T, ContractError>
where
    T: Reflect + Default + Serialize + DeserializeOwned,
{
    Binder::new(codecs).decode_request(ctx).await
}

fn bind_parameters(
    ctx: &ExtractionContext,
    info: &TypeInfo,
    target: &mut Value,
) -> Result<(), BindError> {
    for field in info.fields() {
        let raw = match field.source {
            BindingSource::Path => ctx.path_param(field.wire_name),
            BindingSource::Query => with_default(ctx.query(field.wire_name), field),
            BindingSource::Header => with_default(ctx.header(field.wire_name), field),
            BindingSource::Cookie => with_default(ctx.cookie(field.wire_name), field),
            _ => continue,
        };
        if let Some(raw) = raw.filter(|r| !r.is_empty()) {
            set_scalar(target, field, raw)?;
        }
    }
    Ok(())
}

fn with_default<'a>(value: Option<&'a str>, field: &FieldDescriptor) -> Option<&'a str> {
    match value {
        Some(value) if !value.is_empty() => Some(value),
        _ => field.default_value(),
    }
}

fn bind_form_values(
    form: &MultipartForm,
    info: &TypeInfo,
    target: &mut Value,
) -> Result<(), BindError> {
    for field in info.fields() {
        if field.source != BindingSource::Form || is_file_field(field) {
            continue;
        }
        if let Some(raw) = form.value(field.wire_name).filter(|r| !r.is_empty()) {
            set_scalar(target, field, raw)?;
        }
    }
    Ok(())
}

fn set_scalar(target: &mut Value, field: &FieldDescriptor, raw: &str) -> Result<(), BindError> {
    let converted = coerce(&field.field_type.info(), raw).map_err(|e| match e {
        ConversionError::Unsupported(_) => {
            BindError::configuration(field.source, field.wire_name, e.to_string())
        }
        ConversionError::Invalid(_) => {
            BindError::invalid_value(field.source, field.wire_name, e.to_string())
        }
    })?;
    if let Value::Object(object) = target {
        object.insert(field.name.to_string(), converted);
    }
    Ok(())
}

/// `FileUpload`, `Option<FileUpload>` or `Vec<FileUpload>`.
fn is_file_field(field: &FieldDescriptor) -> bool {
    let info = peel(&field.field_type.info());
    match info.kind() {
        TypeKind::Known(KnownType::File) => true,
        TypeKind::Sequence(item) => {
            matches!(peel(&item.info()).kind(), TypeKind::Known(KnownType::File))
        }
        _ => false,
    }
}

fn attach_raw_requests<T: Reflect>(
    ctx: &ExtractionContext,
    info: &TypeInfo,
    value: &mut T,
) -> Result<(), BindError> {
    for field in info.fields().iter().filter(|f| f.source == BindingSource::Raw) {
        let attachment = Attachment::Request(ctx.raw_request());
        if !value.attach_field(field.ident, &attachment) {
            return Err(BindError::configuration(
                BindingSource::Raw,
                field.ident,
                "field cannot hold the raw request",
            ));
        }
    }
    Ok(())
}

fn attach_files<T: Reflect>(
    form: &MultipartForm,
    info: &TypeInfo,
    value: &mut T,
) -> Result<(), BindError> {
    for field in info.fields() {
        if field.source != BindingSource::Form || !is_file_field(field) {
            continue;
        }
        let files: Vec<FileUpload> = form.files(field.wire_name).cloned().collect();
        if files.is_empty() {
            // Missing optional files leave the zero value.
            continue;
        }
        tracing::debug!(field = field.wire_name, files = files.len(), "attaching uploads");
        if !value.attach_field(field.ident, &Attachment::Files(files)) {
            return Err(BindError::configuration(
                BindingSource::Form,
                field.wire_name,
                "field cannot hold uploaded files",
            ));
        }
    }
    Ok(())
}

/// Merges `patch` into `target`; objects merge key by key, anything else
/// replaces.
fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => merge_objects(target, patch),
        (target, patch) => *target = patch,
    }
}

fn merge_objects(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        match target.get_mut(&key) {
            Some(existing) => merge(existing, value),
            None => {
                target.insert(key, value);
            }
        }
    }
}

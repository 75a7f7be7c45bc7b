//! OpenAPI document types and generation.
//!
//! [`OpenApiGenerator`] collects [`RouteSpec`]s and builds an OpenAPI 3.1
//! document from the request and response types of each route:
//!
//! - path, query, header and cookie fields become parameters;
//! - the request body follows the request shape (multipart form fields,
//!   the `body` member, or the whole type for POST/PUT/PATCH);
//! - every route documents `400` and `500` problem responses, plus `404`
//!   when its path has a capture.
//!
//! ## OpenAPI 3.1 Compliance
//!
//! The types in this module follow the OpenAPI 3.1 specification:
//! <https://spec.openapis.org/oas/v3.1.0>

use std::collections::BTreeSet;
use std::sync::OnceLock;

use http::{Method, StatusCode};
use indexmap::IndexMap;
use pactum_core::{
    classify, BindingSource, KnownType, ProblemDetail, Reflect, RequestShape, Schema, TypeInfo,
    TypeKind, TypeRef,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DocsError, DocsResult};
use crate::registry::SchemaRegistry;

/// Definition name of the shared error response schema.
pub const PROBLEM_DETAIL_SCHEMA: &str = "ProblemDetail";

/// OpenAPI document root object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApi {
    /// OpenAPI version.
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Available servers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// API paths and operations.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    /// Tags for API grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl OpenApi {
    /// Looks up the operation registered for `method` on `path`.
    pub fn operation(&self, path: &str, method: &Method) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.operation(method))
    }

    /// Looks up a shared schema definition.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.components.as_ref().and_then(|c| c.schemas.get(name))
    }
}

/// API metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Server information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    /// Server URL.
    pub url: String,
    /// Server description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A path item containing operations for a single path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// OPTIONS operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    /// PATCH operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// TRACE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    /// The operation for `method`, if any.
    pub fn operation(&self, method: &Method) -> Option<&Operation> {
        match *method {
            Method::GET => self.get.as_ref(),
            Method::PUT => self.put.as_ref(),
            Method::POST => self.post.as_ref(),
            Method::DELETE => self.delete.as_ref(),
            Method::OPTIONS => self.options.as_ref(),
            Method::HEAD => self.head.as_ref(),
            Method::PATCH => self.patch.as_ref(),
            Method::TRACE => self.trace.as_ref(),
            _ => None,
        }
    }

    fn slot(&mut self, method: &Method) -> Option<&mut Option<Operation>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::PUT => Some(&mut self.put),
            Method::POST => Some(&mut self.post),
            Method::DELETE => Some(&mut self.delete),
            Method::OPTIONS => Some(&mut self.options),
            Method::HEAD => Some(&mut self.head),
            Method::PATCH => Some(&mut self.patch),
            Method::TRACE => Some(&mut self.trace),
            _ => None,
        }
    }
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Unique operation identifier.
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Full description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags for grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Whether deprecated.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    pub responses: IndexMap<String, Response>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// Query string parameter.
    Query,
    /// URL path parameter.
    Path,
    /// HTTP header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParameterIn {
    fn from_source(source: BindingSource) -> Option<Self> {
        match source {
            BindingSource::Path => Some(Self::Path),
            BindingSource::Query => Some(Self::Query),
            BindingSource::Header => Some(Self::Header),
            BindingSource::Cookie => Some(Self::Cookie),
            _ => None,
        }
    }
}

/// An operation parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Parameter schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Content by media type.
    pub content: IndexMap<String, MediaType>,
}

/// Media type content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Response definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Description (required).
    pub description: String,
    /// Response content by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

/// Reusable components.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    /// Reusable schemas.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
}

/// API tag for grouping operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Documentation of one route.
///
/// ```
/// use pactum_docs::RouteSpec;
/// use http::StatusCode;
///
/// let route = RouteSpec::post("/v1/users")
///     .request::<String>()
///     .response::<String>()
///     .summary("Create a user")
///     .tag("users")
///     .status(StatusCode::CREATED)
///     .error(StatusCode::CONFLICT);
///
/// assert_eq!(route.path(), "/v1/users");
/// ```
#[derive(Debug, Clone)]
pub struct RouteSpec {
    method: Method,
    path: String,
    request: Option<TypeRef>,
    response: Option<TypeRef>,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    status: Option<StatusCode>,
    errors: Vec<StatusCode>,
    deprecated: bool,
    operation_id: Option<String>,
}

impl RouteSpec {
    /// A route with no request or response type.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            request: None,
            response: None,
            summary: None,
            description: None,
            tags: Vec::new(),
            status: None,
            errors: Vec::new(),
            deprecated: false,
            operation_id: None,
        }
    }

    /// A GET route.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A POST route.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// A PUT route.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// A PATCH route.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// A DELETE route.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Set the request type.
    #[must_use]
    pub fn request<T: Reflect>(mut self) -> Self {
        self.request = Some(TypeRef::of::<T>());
        self
    }

    /// Set the response type.
    #[must_use]
    pub fn response<T: Reflect>(mut self) -> Self {
        self.response = Some(TypeRef::of::<T>());
        self
    }

    /// Set the summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the success status (default `200`).
    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Document an additional error status.
    #[must_use]
    pub fn error(mut self, status: StatusCode) -> Self {
        self.errors.push(status);
        self
    }

    /// Mark the route deprecated.
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Override the generated operation id.
    #[must_use]
    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path pattern.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Builds OpenAPI documents from route descriptions.
#[derive(Debug, Clone)]
pub struct OpenApiGenerator {
    title: Option<String>,
    version: Option<String>,
    description: Option<String>,
    openapi_version: String,
    servers: Vec<Server>,
    content_types: Vec<String>,
    tags: IndexMap<String, Option<String>>,
    routes: Vec<RouteSpec>,
}

impl Default for OpenApiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenApiGenerator {
    /// Default document version.
    pub const DEFAULT_OPENAPI_VERSION: &'static str = "3.1.0";

    /// Create a new generator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: None,
            version: None,
            description: None,
            openapi_version: Self::DEFAULT_OPENAPI_VERSION.to_string(),
            servers: Vec::new(),
            content_types: vec!["application/json".to_string()],
            tags: IndexMap::new(),
            routes: Vec::new(),
        }
    }

    /// Set the API title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the API version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the API description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the `openapi` version field.
    #[must_use]
    pub fn openapi_version(mut self, version: impl Into<String>) -> Self {
        self.openapi_version = version.into();
        self
    }

    /// Add a server.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>, description: Option<String>) -> Self {
        self.servers.push(Server {
            url: url.into(),
            description,
        });
        self
    }

    /// Media types listed for JSON request and response bodies.
    #[must_use]
    pub fn content_types<I, S>(mut self, content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_types = content_types.into_iter().map(Into::into).collect();
        self
    }

    /// Describe a tag.
    #[must_use]
    pub fn tag(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.tags.insert(name.into(), Some(description.into()));
        self
    }

    /// Add a route.
    #[must_use]
    pub fn route(mut self, route: RouteSpec) -> Self {
        self.routes.push(route);
        self
    }

    /// Add a route in place.
    pub fn add_route(&mut self, route: RouteSpec) {
        self.routes.push(route);
    }

    /// Registered routes.
    pub fn routes(&self) -> &[RouteSpec] {
        &self.routes
    }

    /// Generate the document.
    ///
    /// Each call uses a fresh [`SchemaRegistry`].
    pub fn generate(&self) -> DocsResult<OpenApi> {
        let info = Info {
            title: required(self.title.as_deref(), "title")?,
            version: required(self.version.as_deref(), "version")?,
            description: self.description.clone(),
        };

        let mut registry = SchemaRegistry::new();
        registry.insert_definition(PROBLEM_DETAIL_SCHEMA, problem_detail_schema());

        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        let mut tag_names: BTreeSet<String> = self.tags.keys().cloned().collect();

        for route in &self.routes {
            let operation = self.convert_route(route, &mut registry);
            tag_names.extend(operation.tags.iter().cloned());

            let path = openapi_path(&route.path);
            let slot = paths
                .entry(path.clone())
                .or_default()
                .slot(&route.method)
                .ok_or_else(|| DocsError::InvalidOperation {
                    method: route.method.to_string(),
                    path: route.path.clone(),
                    reason: "unsupported HTTP method".to_string(),
                })?;
            if slot.is_some() {
                tracing::debug!(method = %route.method, path = %path, "replacing duplicate route");
            }
            *slot = Some(operation);
        }

        let tags = tag_names
            .into_iter()
            .map(|name| Tag {
                description: self.tags.get(&name).cloned().flatten(),
                name,
            })
            .collect();

        Ok(OpenApi {
            openapi: self.openapi_version.clone(),
            info,
            servers: self.servers.clone(),
            paths,
            components: Some(Components {
                schemas: registry.into_definitions(),
            }),
            tags,
        })
    }

    /// Generate the document as pretty-printed JSON.
    pub fn generate_json(&self) -> DocsResult<String> {
        let spec = self.generate()?;
        serde_json::to_string_pretty(&spec).map_err(DocsError::from)
    }

    fn convert_route(&self, route: &RouteSpec, registry: &mut SchemaRegistry) -> Operation {
        let mut parameters = Vec::new();
        let mut request_body = None;

        if let Some(request) = route.request {
            let info = request.info();
            let shape = classify(&info);
            if shape != RequestShape::Empty {
                parameters = extract_parameters(&info, registry);
                request_body = match shape {
                    RequestShape::MultipartForm => Some(form_body(&info, registry)),
                    RequestShape::ParamsPlusBody => info
                        .fields()
                        .iter()
                        .find(|f| f.is_body())
                        .map(|body| self.json_body(registry.schema_for(body.field_type))),
                    RequestShape::WholeBody if accepts_body(&route.method) => {
                        Some(self.json_body(registry.schema_of(&info)))
                    }
                    _ => None,
                };
            }
        }

        for name in path_parameters(&route.path) {
            let declared = parameters
                .iter()
                .any(|p| p.location == ParameterIn::Path && p.name == name);
            if !declared {
                parameters.push(Parameter {
                    name,
                    location: ParameterIn::Path,
                    description: None,
                    required: true,
                    schema: Some(Schema::string()),
                });
            }
        }

        Operation {
            operation_id: route
                .operation_id
                .clone()
                .unwrap_or_else(|| generate_operation_id(&route.method, &route.path)),
            summary: route.summary.clone(),
            description: route.description.clone(),
            tags: route.tags.clone(),
            deprecated: route.deprecated,
            parameters,
            request_body,
            responses: self.responses(route, registry),
        }
    }

    fn responses(
        &self,
        route: &RouteSpec,
        registry: &mut SchemaRegistry,
    ) -> IndexMap<String, Response> {
        let mut status = route.status.unwrap_or(StatusCode::OK);
        let info = route
            .response
            .map(|r| r.info())
            .filter(|info| !matches!(info.kind(), TypeKind::Void));

        let success = match info {
            None => {
                if status == StatusCode::OK {
                    status = StatusCode::NO_CONTENT;
                }
                Response {
                    description: "No content".to_string(),
                    content: IndexMap::new(),
                }
            }
            Some(info) if matches!(info.kind(), TypeKind::Known(KnownType::Stream)) => Response {
                description: "Successful response".to_string(),
                content: IndexMap::from([(
                    "application/octet-stream".to_string(),
                    MediaType::default(),
                )]),
            },
            Some(info) => {
                let schema = registry.schema_of(&info);
                Response {
                    description: "Successful response".to_string(),
                    content: self.content(&schema),
                }
            }
        };

        let mut responses = IndexMap::new();
        responses.insert(status.as_str().to_string(), success);

        let mut errors: BTreeSet<StatusCode> =
            BTreeSet::from([StatusCode::BAD_REQUEST, StatusCode::INTERNAL_SERVER_ERROR]);
        if route.path.contains('{') {
            errors.insert(StatusCode::NOT_FOUND);
        }
        errors.extend(route.errors.iter().copied());

        let problem = Schema::reference(SchemaRegistry::reference_path(PROBLEM_DETAIL_SCHEMA));
        for code in errors {
            responses
                .entry(code.as_str().to_string())
                .or_insert_with(|| Response {
                    description: code.canonical_reason().unwrap_or("Error").to_string(),
                    content: IndexMap::from([(
                        ProblemDetail::CONTENT_TYPE.to_string(),
                        MediaType {
                            schema: Some(problem.clone()),
                        },
                    )]),
                });
        }
        responses
    }

    fn json_body(&self, schema: Schema) -> RequestBody {
        RequestBody {
            required: true,
            content: self.content(&schema),
        }
    }

    fn content(&self, schema: &Schema) -> IndexMap<String, MediaType> {
        self.content_types
            .iter()
            .map(|content_type| {
                (
                    content_type.clone(),
                    MediaType {
                        schema: Some(schema.clone()),
                    },
                )
            })
            .collect()
    }
}

fn required(value: Option<&str>, field: &str) -> DocsResult<String> {
    value
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DocsError::MissingField {
            field: field.to_string(),
        })
}

fn accepts_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

fn extract_parameters(info: &TypeInfo, registry: &mut SchemaRegistry) -> Vec<Parameter> {
    info.fields()
        .iter()
        .filter_map(|field| {
            let location = ParameterIn::from_source(field.source)?;
            let mut schema = registry.field_schema(field);
            schema.description = None;
            Some(Parameter {
                name: field.wire_name.to_string(),
                location,
                description: field.documentation.map(str::to_string),
                required: field.required || location == ParameterIn::Path,
                schema: Some(schema),
            })
        })
        .collect()
}

fn form_body(info: &TypeInfo, registry: &mut SchemaRegistry) -> RequestBody {
    let mut schema = Schema::object();
    for field in info.fields().iter().filter(|f| f.source == BindingSource::Form) {
        schema
            .properties
            .insert(field.wire_name.to_string(), registry.field_schema(field));
        if field.required {
            schema.required.push(field.wire_name.to_string());
        }
    }

    RequestBody {
        required: true,
        content: IndexMap::from([(
            "multipart/form-data".to_string(),
            MediaType {
                schema: Some(schema),
            },
        )]),
    }
}

/// Schema of [`ProblemDetail`] bodies.
pub fn problem_detail_schema() -> Schema {
    let violation = Schema::object()
        .property("field", Schema::string())
        .property("message", Schema::string())
        .property("value", Schema::any())
        .required_property("field")
        .required_property("message");

    Schema::object()
        .with_description("RFC 9457 problem details")
        .property("type", Schema::string())
        .property("title", Schema::string())
        .property("status", Schema::integer())
        .property("detail", Schema::string())
        .property("instance", Schema::string())
        .property("errors", Schema::array(violation))
        .required_property("status")
}

/// Strips catch-all markers: `/files/{path...}` becomes `/files/{path}`.
fn openapi_path(pattern: &str) -> String {
    pattern.replace("...", "")
}

/// Capture names in a path template like `/users/{userId}`.
fn path_parameters(path: &str) -> Vec<String> {
    static CAPTURE: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(capture) = CAPTURE.get_or_init(|| Regex::new(r"\{([^}]+)\}").ok()) else {
        return Vec::new();
    };

    capture
        .captures_iter(path)
        .filter_map(|cap| cap.get(1))
        .map(|name| name.as_str().trim_end_matches("...").to_string())
        .collect()
}

/// Operation id from method and path: `GET /v1/users/{id}` becomes
/// `getV1UsersById`.
pub fn generate_operation_id(method: &Method, path: &str) -> String {
    let mut id = method.as_str().to_ascii_lowercase();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => {
                id.push_str("By");
                id.push_str(&capitalize(name.trim_end_matches("...")));
            }
            None => id.push_str(&capitalize(segment)),
        }
    }
    id
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pactum_core::Void;
    use serde_json::json;

    #[test]
    fn test_generate_operation_id() {
        assert_eq!(
            generate_operation_id(&Method::GET, "/v1/users/{id}"),
            "getV1UsersById"
        );
        assert_eq!(generate_operation_id(&Method::POST, "/users"), "postUsers");
        assert_eq!(
            generate_operation_id(&Method::GET, "/files/{path...}"),
            "getFilesByPath"
        );
        assert_eq!(generate_operation_id(&Method::DELETE, "/"), "delete");
    }

    #[test]
    fn test_path_parameters() {
        assert_eq!(path_parameters("/users/{userId}"), vec!["userId"]);
        assert_eq!(
            path_parameters("/users/{userId}/orders/{orderId}"),
            vec!["userId", "orderId"]
        );
        assert_eq!(path_parameters("/files/{rest...}"), vec!["rest"]);
        assert!(path_parameters("/users").is_empty());
        assert_eq!(openapi_path("/files/{rest...}"), "/files/{rest}");
    }

    #[test]
    fn test_missing_title_or_version() {
        let err = OpenApiGenerator::new().version("1.0.0").generate().unwrap_err();
        assert!(matches!(err, DocsError::MissingField { ref field } if field == "title"));

        let err = OpenApiGenerator::new().title("API").version("").generate().unwrap_err();
        assert!(matches!(err, DocsError::MissingField { ref field } if field == "version"));
    }

    #[test]
    fn test_unsupported_method() {
        let err = OpenApiGenerator::new()
            .title("API")
            .version("1")
            .route(RouteSpec::new(Method::CONNECT, "/tunnel"))
            .generate()
            .unwrap_err();
        assert!(matches!(err, DocsError::InvalidOperation { .. }));
    }

    #[test]
    fn test_void_route_and_undeclared_path_params() {
        let spec = OpenApiGenerator::new()
            .title("API")
            .version("1")
            .route(
                RouteSpec::delete("/sessions/{sid}")
                    .request::<Void>()
                    .response::<Void>(),
            )
            .generate()
            .unwrap();

        let op = spec.operation("/sessions/{sid}", &Method::DELETE).unwrap();
        assert_eq!(op.operation_id, "deleteSessionsBySid");
        assert!(op.request_body.is_none());
        assert_eq!(op.parameters.len(), 1);
        assert_eq!(op.parameters[0].name, "sid");
        assert!(op.parameters[0].required);

        let codes: Vec<_> = op.responses.keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["204", "400", "404", "500"]);
        assert!(op.responses["204"].content.is_empty());
    }

    #[test]
    fn test_tags_are_collected_and_sorted() {
        let spec = OpenApiGenerator::new()
            .title("API")
            .version("1")
            .tag("users", "User management")
            .route(RouteSpec::get("/health").tag("ops"))
            .route(RouteSpec::get("/users").tag("users"))
            .generate()
            .unwrap();

        let tags = serde_json::to_value(&spec.tags).unwrap();
        assert_eq!(
            tags,
            json!([
                {"name": "ops"},
                {"name": "users", "description": "User management"}
            ])
        );
    }

    #[test]
    fn test_problem_detail_schema() {
        let spec = OpenApiGenerator::new()
            .title("API")
            .version("1")
            .generate()
            .unwrap();

        let schema = serde_json::to_value(spec.schema(PROBLEM_DETAIL_SCHEMA).unwrap()).unwrap();
        assert_eq!(schema["required"], json!(["status"]));
        assert_eq!(schema["properties"]["status"]["type"], "integer");
        assert_eq!(
            schema["properties"]["errors"]["items"]["required"],
            json!(["field", "message"])
        );
    }

    #[test]
    fn test_document_serialization() {
        let json = OpenApiGenerator::new()
            .title("Test API")
            .version("1.0.0")
            .server("https://api.example.com", Some("Production".to_string()))
            .generate_json()
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["openapi"], "3.1.0");
        assert_eq!(value["info"]["title"], "Test API");
        assert_eq!(value["servers"][0]["url"], "https://api.example.com");
        assert_eq!(value["paths"], json!({}));
    }

    #[test]
    fn test_parameter_in_serialization() {
        let param = Parameter {
            name: "id".to_string(),
            location: ParameterIn::Query,
            description: None,
            required: false,
            schema: None,
        };

        let json = serde_json::to_string(&param).unwrap();
        assert!(json.contains("\"in\":\"query\""));
    }
}

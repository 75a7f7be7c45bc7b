//! Configuration sections.
//!
//! Each section deserializes strictly and fills unset keys from its
//! defaults, then converts into the settings type of the crate it drives.

use pactum_docs::OpenApiGenerator;
use pactum_extract::multipart::{DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_FIELDS, DEFAULT_MAX_FIELD_SIZE};
use pactum_extract::MultipartConfig;
use pactum_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

/// Request binding limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    /// Maximum multipart body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Maximum size of one multipart part in bytes.
    #[serde(default = "default_max_field_size")]
    pub max_field_size: usize,

    /// Maximum number of multipart parts.
    #[serde(default = "default_max_fields")]
    pub max_fields: usize,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            max_body_size: default_max_body_size(),
            max_field_size: default_max_field_size(),
            max_fields: default_max_fields(),
        }
    }
}

impl BindingConfig {
    /// Limits for the multipart reader.
    #[must_use]
    pub fn multipart_config(&self) -> MultipartConfig {
        MultipartConfig::new()
            .max_body_size(self.max_body_size)
            .max_field_size(self.max_field_size)
            .max_fields(self.max_fields)
    }
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

fn default_max_field_size() -> usize {
    DEFAULT_MAX_FIELD_SIZE
}

fn default_max_fields() -> usize {
    DEFAULT_MAX_FIELDS
}

/// A server entry listed in the contract document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerEntry {
    /// Server base URL.
    pub url: String,

    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Contract document metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContractConfig {
    /// API title.
    #[serde(default = "default_title")]
    pub title: String,

    /// API version.
    #[serde(default = "default_version")]
    pub version: String,

    /// API description.
    #[serde(default)]
    pub description: Option<String>,

    /// OpenAPI document version.
    #[serde(default = "default_openapi_version")]
    pub openapi_version: String,

    /// Media types listed for request and response bodies.
    #[serde(default = "default_content_types")]
    pub content_types: Vec<String>,

    /// Servers listed in the document.
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_version(),
            description: None,
            openapi_version: default_openapi_version(),
            content_types: default_content_types(),
            servers: Vec::new(),
        }
    }
}

impl ContractConfig {
    /// A generator carrying this metadata and no routes.
    #[must_use]
    pub fn generator(&self) -> OpenApiGenerator {
        let mut generator = OpenApiGenerator::new()
            .title(&self.title)
            .version(&self.version)
            .openapi_version(&self.openapi_version)
            .content_types(self.content_types.iter().cloned());

        if let Some(description) = &self.description {
            generator = generator.description(description);
        }
        for server in &self.servers {
            generator = generator.server(&server.url, server.description.clone());
        }
        generator
    }
}

fn default_title() -> String {
    "Pactum Service".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_openapi_version() -> String {
    OpenApiGenerator::DEFAULT_OPENAPI_VERSION.to_string()
}

fn default_content_types() -> Vec<String> {
    vec!["application/json".to_string()]
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines.
    #[default]
    Json,
    /// Human-readable output.
    Pretty,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Whether logging is installed at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Service name reported in log output.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            service_name: default_service_name(),
        }
    }
}

impl LoggingConfig {
    /// Settings for [`pactum_telemetry::init_logging`].
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: self.enabled,
            ..base
        }
        .level(&self.level)
        .service_name(&self.service_name)
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "pactum".to_string()
}

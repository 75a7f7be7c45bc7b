//! Structured logging for Pactum.
//!
//! The engine crates emit `tracing` events; this module installs a
//! `tracing-subscriber` pipeline that renders them as JSON lines or as
//! human-readable output.
//!
//! # Example
//!
//! ```rust,no_run
//! use pactum_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development().service_name("orders"))?;
//!
//! tracing::debug!(type_name = "CreateOrder", shape = "whole-body", "binding request");
//! # Ok::<(), pactum_telemetry::TelemetryError>(())
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// When false, [`init_logging`] installs nothing.
    pub enabled: bool,

    /// Filter directive (e.g., "info", "pactum_extract=debug,warn").
    pub level: String,

    /// JSON lines instead of pretty output.
    pub json_format: bool,

    /// Emit span open and close events.
    pub span_events: bool,

    /// Source file and line on every event.
    pub file_line_info: bool,

    /// Thread id on every event.
    pub thread_ids: bool,

    /// Module path on every event.
    pub include_target: bool,

    /// Service name reported when logging starts.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Pretty output at `debug`, with span events and source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            thread_ids: false,
            include_target: true,
            service_name: "pactum".to_string(),
        }
    }

    /// JSON lines at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: "pactum".to_string(),
        }
    }

    /// Set the filter directive.
    #[must_use]
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Switch between JSON and pretty output.
    #[must_use]
    pub fn json(mut self, json: bool) -> Self {
        self.json_format = json;
        self
    }

    /// Set the service name.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Checks that the configuration can be installed.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` for an empty service name or
    /// an unparsable filter directive.
    pub fn validate(&self) -> TelemetryResult<()> {
        if self.service_name.trim().is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "service name must not be empty".to_string(),
            ));
        }
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| TelemetryError::InvalidConfig(format!("invalid log level: {e}")))
    }
}

/// Installs the global `tracing` subscriber described by `config`.
///
/// Does nothing when `config.enabled` is false.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` if the configuration does not
/// validate, and `TelemetryError::LoggingInit` if a global subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }
    config.validate()?;

    let filter = create_env_filter(&config.level)?;
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_span_events(span_events)
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_thread_ids(config.thread_ids)
        .with_target(config.include_target);
    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if config.json_format {
        fmt_layer.json().boxed()
    } else {
        fmt_layer.pretty().boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(
        service.name = %config.service_name,
        json = config.json_format,
        "logging initialized"
    );
    Ok(())
}

/// Parses a filter directive such as `"pactum_docs=trace,info"`.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` for a malformed directive.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Field names used by the engine's log events.
pub mod fields {
    /// Rust type being bound, validated, or described.
    pub const TYPE_NAME: &str = "type_name";

    /// Request shape.
    pub const SHAPE: &str = "shape";

    /// Wire name of a field.
    pub const FIELD: &str = "field";

    /// Schema definition name.
    pub const SCHEMA: &str = "schema";

    /// Negotiated or registered media type.
    pub const CONTENT_TYPE: &str = "content_type";

    /// Constraint pattern.
    pub const PATTERN: &str = "pattern";

    /// HTTP method.
    pub const HTTP_METHOD: &str = "method";

    /// Route path.
    pub const HTTP_PATH: &str = "path";

    /// Error message.
    pub const ERROR_MESSAGE: &str = "error";

    /// Reporting service.
    pub const SERVICE: &str = "service.name";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_production() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert!(config.json_format);
        assert_eq!(config.level, "info");
        assert_eq!(config.service_name, "pactum");
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert!(!config.json_format);
        assert!(config.span_events);
        assert!(config.file_line_info);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_builders() {
        let config = LogConfig::production()
            .level("pactum_extract=debug,warn")
            .json(false)
            .service_name("orders");
        assert!(!config.json_format);
        assert_eq!(config.service_name, "orders");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let unnamed = LogConfig::production().service_name(" ");
        assert!(matches!(
            unnamed.validate(),
            Err(TelemetryError::InvalidConfig(_))
        ));

        let bad_level = LogConfig::production().level("pactum=verbose");
        assert!(matches!(
            bad_level.validate(),
            Err(TelemetryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_env_filter_accepts_directives() {
        assert!(create_env_filter("info").is_ok());
        assert!(create_env_filter("pactum_docs=trace").is_ok());
    }

    #[test]
    fn test_disabled_logging() {
        let config = LogConfig {
            enabled: false,
            level: "pactum=verbose".to_string(),
            ..Default::default()
        };

        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(fields::TYPE_NAME, "type_name");
        assert_eq!(fields::SCHEMA, "schema");
        assert_eq!(fields::SERVICE, "service.name");
    }
}

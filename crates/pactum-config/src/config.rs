//! Root configuration type.

use serde::{Deserialize, Serialize};

use crate::schema::{BindingConfig, ContractConfig, LogFormat, LoggingConfig};
use crate::ConfigError;

/// Complete Pactum configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to layer a file and
/// environment variables over the defaults.
///
/// # Example
///
/// ```
/// use pactum_config::PactumConfig;
///
/// let config = PactumConfig::default();
/// assert_eq!(config.binding.max_fields, 100);
/// assert_eq!(config.contract.openapi_version, "3.1.0");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct PactumConfig {
    /// Request binding limits.
    #[serde(default)]
    pub binding: BindingConfig,

    /// Contract document metadata.
    #[serde(default)]
    pub contract: ContractConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PactumConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> PactumConfigBuilder {
        PactumConfigBuilder::new()
    }

    /// Development preset: pretty `debug` output.
    ///
    /// ```
    /// use pactum_config::{LogFormat, PactumConfig};
    ///
    /// let config = PactumConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config
    }

    /// Production preset: JSON `info` output.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field:
    /// - a binding limit of zero, or a part limit above the body limit
    /// - an empty contract title or version
    /// - an OpenAPI version outside `3.x`
    /// - no content types, or one that is not a media type
    /// - a log filter or service name the logging setup would reject
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_binding()?;
        self.validate_contract()?;

        self.logging
            .log_config()
            .validate()
            .map_err(|e| ConfigError::invalid_value("logging", e.to_string()))
    }

    fn validate_binding(&self) -> Result<(), ConfigError> {
        let binding = &self.binding;
        for (field, value) in [
            ("binding.max_body_size", binding.max_body_size),
            ("binding.max_field_size", binding.max_field_size),
            ("binding.max_fields", binding.max_fields),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid_value(field, "must be greater than zero"));
            }
        }
        if binding.max_field_size > binding.max_body_size {
            return Err(ConfigError::invalid_value(
                "binding.max_field_size",
                "must not exceed binding.max_body_size",
            ));
        }
        Ok(())
    }

    fn validate_contract(&self) -> Result<(), ConfigError> {
        let contract = &self.contract;
        if contract.title.trim().is_empty() {
            return Err(ConfigError::invalid_value("contract.title", "must not be empty"));
        }
        if contract.version.trim().is_empty() {
            return Err(ConfigError::invalid_value("contract.version", "must not be empty"));
        }
        if !contract.openapi_version.starts_with("3.") {
            return Err(ConfigError::invalid_value(
                "contract.openapi_version",
                format!("unsupported version: {}", contract.openapi_version),
            ));
        }
        if contract.content_types.is_empty() {
            return Err(ConfigError::invalid_value(
                "contract.content_types",
                "at least one media type is required",
            ));
        }
        for content_type in &contract.content_types {
            if content_type.parse::<mime::Mime>().is_err() {
                return Err(ConfigError::invalid_value(
                    "contract.content_types",
                    format!("invalid media type: {content_type}"),
                ));
            }
        }
        Ok(())
    }
}

/// Builder for [`PactumConfig`].
#[derive(Debug, Default)]
pub struct PactumConfigBuilder {
    binding: Option<BindingConfig>,
    contract: Option<ContractConfig>,
    logging: Option<LoggingConfig>,
}

impl PactumConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the binding section.
    #[must_use]
    pub fn binding(mut self, binding: BindingConfig) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Set the contract section.
    #[must_use]
    pub fn contract(mut self, contract: ContractConfig) -> Self {
        self.contract = Some(contract);
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> PactumConfig {
        PactumConfig {
            binding: self.binding.unwrap_or_default(),
            contract: self.contract.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<PactumConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_field(config: &PactumConfig) -> String {
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => field,
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_default_validates() {
        assert!(PactumConfig::default().validate().is_ok());
        assert!(PactumConfig::development().validate().is_ok());
        assert!(PactumConfig::production().validate().is_ok());
    }

    #[test]
    fn test_builder_sections() {
        let config = PactumConfig::builder()
            .binding(BindingConfig {
                max_fields: 4,
                ..Default::default()
            })
            .build();

        assert_eq!(config.binding.max_fields, 4);
        assert_eq!(config.contract, ContractConfig::default());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut config = PactumConfig::default();
        config.binding.max_fields = 0;
        assert_eq!(invalid_field(&config), "binding.max_fields");
    }

    #[test]
    fn test_part_larger_than_body_rejected() {
        let mut config = PactumConfig::default();
        config.binding.max_body_size = 1024;
        config.binding.max_field_size = 2048;
        assert_eq!(invalid_field(&config), "binding.max_field_size");
    }

    #[test]
    fn test_contract_metadata_rules() {
        let mut config = PactumConfig::default();
        config.contract.title = "  ".to_string();
        assert_eq!(invalid_field(&config), "contract.title");

        let mut config = PactumConfig::default();
        config.contract.openapi_version = "2.0".to_string();
        assert_eq!(invalid_field(&config), "contract.openapi_version");

        let mut config = PactumConfig::default();
        config.contract.content_types = vec!["json".to_string()];
        assert_eq!(invalid_field(&config), "contract.content_types");

        config.contract.content_types.clear();
        assert_eq!(invalid_field(&config), "contract.content_types");
    }

    #[test]
    fn test_bad_log_filter_rejected() {
        let result = PactumConfig::builder()
            .logging(LoggingConfig {
                level: "pactum=verbose".to_string(),
                ..Default::default()
            })
            .build_validated();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "logging"
        ));
    }
}

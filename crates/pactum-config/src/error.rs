//! Errors raised while assembling a [`PactumConfig`](crate::PactumConfig).

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required file does not exist.
    #[error("no configuration file at {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error, including unknown keys.
    #[error("malformed TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error, including unknown keys.
    #[error("malformed JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported file extension or format name.
    #[error("unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// The extension or format name that was given.
        format: String,
    },

    /// A value parsed but is out of range or inconsistent.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An override variable held an unusable value.
    #[error("${var}: {reason}")]
    EnvParseError {
        /// Variable name, prefix included.
        var: String,
        /// What was expected.
        reason: String,
    },

    /// Failed to read a `.env` file.
    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

impl ConfigError {
    /// [`ConfigError::FileNotFound`] for `path`.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// [`ConfigError::ReadError`] for `path`.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// [`ConfigError::UnsupportedFormat`].
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// [`ConfigError::InvalidValue`] for a dotted field path.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// [`ConfigError::EnvParseError`] for `var`.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_names_path() {
        let err = ConfigError::file_not_found("/etc/pactum/pactum.toml");
        assert!(err.to_string().contains("/etc/pactum/pactum.toml"));
    }

    #[test]
    fn test_invalid_value_message() {
        let err = ConfigError::invalid_value("binding.max_fields", "must be greater than zero");
        assert_eq!(err.to_string(), "binding.max_fields: must be greater than zero");
    }

    #[test]
    fn test_env_parse_error() {
        let err = ConfigError::env_parse_error("PACTUM__BINDING__MAX_FIELDS", "expected integer");
        assert_eq!(err.to_string(), "$PACTUM__BINDING__MAX_FIELDS: expected integer");
    }

    #[test]
    fn test_unsupported_format_error() {
        let err = ConfigError::unsupported_format("yaml");
        assert_eq!(err.to_string(), "unsupported configuration format: yaml");
    }
}

//! Typed configuration for Pactum services.
//!
//! [`PactumConfig`] groups the settings the engine crates take:
//!
//! - [`BindingConfig`] - multipart limits for request binding
//! - [`ContractConfig`] - metadata for the generated contract document
//! - [`LoggingConfig`] - filter, format and service name for log output
//!
//! Configuration is layered (defaults → file → environment), and unknown
//! keys in a file are rejected.
//!
//! # Example
//!
//! ```no_run
//! use pactum_config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("pactum.toml")?
//!     .with_env_prefix("PACTUM")
//!     .load()?;
//!
//! pactum_telemetry::init_logging(&config.logging.log_config())?;
//! let generator = config.contract.generator();
//! # let _ = generator;
//! # Ok(())
//! # }
//! ```
//!
//! # File format
//!
//! ```toml
//! [binding]
//! max_body_size = 33554432
//! max_field_size = 10485760
//! max_fields = 100
//!
//! [contract]
//! title = "Orders"
//! version = "1.2.0"
//! content_types = ["application/json"]
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{PactumConfig, PactumConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{BindingConfig, ContractConfig, LogFormat, LoggingConfig, ServerEntry};

//! Logging setup for Pactum services.
//!
//! The engine crates only emit `tracing` events. Applications call
//! [`init_logging`] once at startup to decide where they go:
//!
//! | Preset | Level | Output |
//! |--------|-------|--------|
//! | [`LogConfig::production`] | `info` | JSON lines |
//! | [`LogConfig::development`] | `debug` | pretty, with span events and file/line |
//!
//! Events use the field names in [`logging::fields`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

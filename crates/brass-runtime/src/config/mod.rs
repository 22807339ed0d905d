//! Configuration module for the Brass runtime.
//!
//! This module provides figment-based configuration loading and validation
//! for logging, storage and per-adapter settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, ENV_PREFIX, FileFormat, PROFILE_ENV};
pub use schema::{BrassConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, StorageConfig};
pub use validation::validate_config;

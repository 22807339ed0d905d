//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{BrassConfig, LogOutput};

/// Validates the entire configuration.
pub fn validate_config(config: &BrassConfig) -> ConfigResult<()> {
    validate_logging(config)?;
    validate_storage(config)?;
    validate_adapters(config)?;
    Ok(())
}

fn validate_logging(config: &BrassConfig) -> ConfigResult<()> {
    if config.logging.output == LogOutput::File && config.logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.output is 'file' but logging.file_path is not set",
        ));
    }
    Ok(())
}

fn validate_storage(config: &BrassConfig) -> ConfigResult<()> {
    if config.storage.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::validation("storage.data_dir must not be empty"));
    }
    Ok(())
}

/// Every adapter section must be a table.
fn validate_adapters(config: &BrassConfig) -> ConfigResult<()> {
    for (name, value) in &config.adapters {
        if value.as_dict().is_none() {
            return Err(ConfigError::validation(format!(
                "adapters.{name} must be a table"
            )));
        }
    }
    Ok(())
}

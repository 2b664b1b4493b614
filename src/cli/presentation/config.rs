//! Config presentation: effective configuration and validation results.

use crate::config::{ConfigValidationError, FlexgenConfig};
use crate::error::FlexgenError;

pub fn format_config_show(config: &FlexgenConfig) -> Result<String, FlexgenError> {
    toml::to_string_pretty(config)
        .map_err(|e| FlexgenError::ConfigError(format!("Failed to serialize config: {}", e)))
}

pub fn format_config_validation(result: &Result<(), Vec<ConfigValidationError>>) -> String {
    match result {
        Ok(()) => "Configuration is valid".to_string(),
        Err(errors) => {
            let mut s = format!("Configuration has {} error(s):", errors.len());
            for e in errors {
                s.push_str(&format!("\n  - {}", e));
            }
            s
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bindings::BindingPolicy;
use crate::time_scale::TimeScaleConfig;

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV_VAR: &str = "KEYUP_CONSOLE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtensionConfig {
    pub key_bindings: BindingPolicy,
    pub time_scale: TimeScaleConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config '{path}'{}: {source}", format_location(.location))]
    Parse {
        path: PathBuf,
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config '{path}' at {field}: {message}")]
    Invalid {
        path: PathBuf,
        field: String,
        message: String,
    },
}

fn format_location(location: &str) -> String {
    if location.is_empty() || location == "." {
        String::new()
    } else {
        format!(" at {location}")
    }
}

pub fn load_config(path: &Path) -> Result<ExtensionConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(path, &raw)
}

/// Parses and validates config text. `path` is only used in error messages.
pub fn parse_config(path: &Path, raw: &str) -> Result<ExtensionConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let config: ExtensionConfig = serde_path_to_error::deserialize(&mut deserializer).map_err(
        |error| {
            let location = error.path().to_string();
            ConfigError::Parse {
                path: path.to_path_buf(),
                location,
                source: error.into_inner(),
            }
        },
    )?;
    validate_config(path, &config)?;
    Ok(config)
}

fn validate_config(path: &Path, config: &ExtensionConfig) -> Result<(), ConfigError> {
    for (field, scale) in config.time_scale.scales() {
        if !scale.is_finite() || scale < 0.0 {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                field: format!("time_scale.{field}"),
                message: format!("scale must be a finite non-negative number, got {scale}"),
            });
        }
    }
    Ok(())
}

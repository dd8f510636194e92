use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::errors::{ConfigError, Result};

/// Key the greeting reads its time pattern from.
pub const FORMAT_KEY: &str = "format";

const CONFIG_ENV_VAR: &str = "FUNCTION_CONFIG";
const FORMAT_ENV_VAR: &str = "FORMAT";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FunctionConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Values handed to the function through its context on every invocation.
    #[serde(default)]
    pub config: HashMap<String, String>,
}

fn default_service_name() -> String {
    "greeter".to_string()
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            config: HashMap::new(),
        }
    }
}

/// Loads from `config_path` when given, otherwise from `FUNCTION_CONFIG`.
/// Neither being set yields an empty config; no format is assumed.
pub fn load_config(config_path: Option<&str>) -> Result<FunctionConfig> {
    load_config_with(
        config_path,
        std::env::var(CONFIG_ENV_VAR).ok(),
        std::env::var(FORMAT_ENV_VAR).ok(),
    )
}

fn load_config_with(
    config_path: Option<&str>,
    config_env: Option<String>,
    format_env: Option<String>,
) -> Result<FunctionConfig> {
    let mut config = match (config_path, config_env) {
        (Some(path), _) => FunctionConfig::from_file(path)?,
        (None, Some(raw)) => FunctionConfig::from_yaml(&raw)?,
        (None, None) => {
            debug!("{} not set, starting with an empty config", CONFIG_ENV_VAR);
            FunctionConfig::default()
        }
    };
    config.apply_env_overrides(format_env);
    config.validate()?;
    Ok(config)
}

impl FunctionConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            origin: path.to_string(),
            error: Box::new(e),
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: FunctionConfig = serde_yaml::from_str(raw)?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self, format: Option<String>) {
        if let Some(format) = format {
            self.config.insert(FORMAT_KEY.to_string(), format);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ConfigError::MissingField {
                field: "name".to_string(),
            }
            .into());
        }
        if self.format().is_some_and(str::is_empty) {
            return Err(ConfigError::ValidationFailed {
                reason: "format cannot be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn format(&self) -> Option<&str> {
        self.config.get(FORMAT_KEY).map(String::as_str)
    }
}

use std::collections::HashMap;

use crate::config::FunctionConfig;

/// Per-invocation access to the configuration a function was deployed with.
pub trait FunctionContext: Send + Sync {
    fn get_config(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticContext {
    values: HashMap<String, String>,
}

impl StaticContext {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Returns a copy where `overrides` shadow the existing values.
    pub fn with_overrides(&self, overrides: HashMap<String, String>) -> Self {
        let mut values = self.values.clone();
        values.extend(overrides);
        Self { values }
    }
}

impl From<&FunctionConfig> for StaticContext {
    fn from(config: &FunctionConfig) -> Self {
        Self::new(config.config.clone())
    }
}

impl FunctionContext for StaticContext {
    fn get_config(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::context::FunctionContext;
use crate::errors::{FunctionError, Result};
use crate::greeting::{GET_CURRENT_TIME, get_current_time};

pub type Handler = Arc<dyn Fn(&dyn FunctionContext, &Value) -> Result<Value> + Send + Sync>;

/// Functions a service exposes, keyed by the name callers invoke them with.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    handlers: BTreeMap<String, Handler>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(GET_CURRENT_TIME, get_current_time);
        registry
    }

    /// Registering an existing name replaces its handler.
    pub fn register<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&dyn FunctionContext, &Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.handlers.insert(name.to_string(), Arc::new(handler));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn dispatch(&self, name: &str, context: &dyn FunctionContext, data: &Value) -> Result<Value> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| FunctionError::UnknownFunction {
                name: name.to_string(),
            })?;

        debug!(function = name, "Dispatching invocation");
        handler(context, data).inspect_err(|e| {
            warn!(function = name, kind = e.kind(), "Invocation failed: {}", e);
        })
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

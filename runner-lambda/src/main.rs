use std::sync::Arc;

use greeter_core::greeting::GET_CURRENT_TIME;
use greeter_core::telemetry::init_tracing;
use greeter_core::{FunctionRegistry, StaticContext, load_config};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use tracing::info;

/// Shared across invocations; built once per cold start.
struct Handler {
    registry: FunctionRegistry,
    context: StaticContext,
}

async fn lambda_handler(handler: &Handler, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let (payload, context) = event.into_parts();
    info!(request_id = %context.request_id, "Handling {}", GET_CURRENT_TIME);
    let response = handler
        .registry
        .dispatch(GET_CURRENT_TIME, &handler.context, &payload)?;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config_path = std::env::var("FUNCTION_CONFIG_PATH").ok();
    let config = load_config(config_path.as_deref())?;
    info!(service = %config.name, "Loaded function config");

    let handler = Arc::new(Handler {
        registry: FunctionRegistry::with_defaults(),
        context: StaticContext::from(&config),
    });

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = Arc::clone(&handler);
        async move { lambda_handler(&handler, event).await }
    }))
    .await
}

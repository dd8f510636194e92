mod stdio;

use anyhow::Result;
use greeter_core::telemetry::init_tracing;
use greeter_core::{FunctionRegistry, StaticContext, load_config, run_service};
use tokio::io::{BufReader, BufWriter};
use tokio::sync::watch;
use tracing::info;

use crate::stdio::StdioService;

/// This is the entry point for serving the function as a long-running process
/// on container hosting services like AWS ECS, EKS, etc.
///
/// Requests arrive as JSON lines on stdin and responses are written as JSON
/// lines on stdout until stdin closes or Ctrl-C is received.
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref())?;
    info!(service = %config.name, "Loaded function config");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Service stopped");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut service = StdioService::new(
        FunctionRegistry::with_defaults(),
        StaticContext::from(&config),
        BufReader::new(tokio::io::stdin()),
        BufWriter::new(tokio::io::stdout()),
        shutdown_rx,
    );
    run_service(&mut service).await?;
    Ok(())
}

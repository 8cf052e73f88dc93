use account_metrics::TracingService;
use anyhow::Result;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = account_service::load_config()?;

    if let Err(e) = TracingService::init(&config.logging) {
        eprintln!("Failed to initialise logging: {e}");
    }

    info!("Starting Account Service");
    info!(
        bind = %config.server.bind,
        port = config.server.port,
        force_https = config.security.force_https,
        "Configuration loaded"
    );

    if let Err(e) = account_service::run(config).await {
        error!("Account Service stopped with an error: {:#}", e);
        return Err(e);
    }

    info!("Account Service shutdown complete");
    Ok(())
}

//! Wiring for the `account-service-server` binary.

use account_api::AppState;
use account_metrics::MetricsService;
use account_models::{Config, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use account_store::AccountRegistry;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// The configuration file to load: `$ACCOUNT_CONFIG` if set, otherwise
/// `configs/default.toml` when it exists.
pub fn config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) => Some(PathBuf::from(path)),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            default.exists().then(|| default.to_path_buf())
        }
    }
}

pub fn load_config() -> Result<Config> {
    let path = config_path();
    Config::load(path.as_deref()).context("failed to load configuration")
}

/// Connects the configured store and assembles the shared request state.
pub async fn build_state(config: Config) -> Result<AppState> {
    let store = account_store::connect(&config.database)
        .await
        .context("failed to open the account store")?;
    let registry = AccountRegistry::new(store);
    let metrics = Arc::new(MetricsService::new()?);
    info!("Account store ready");
    Ok(AppState::new(config, registry, metrics))
}

pub async fn run(config: Config) -> Result<()> {
    let state = build_state(config).await?;
    account_api::start_server(state)
        .await
        .map_err(|e| anyhow::anyhow!(e))
}

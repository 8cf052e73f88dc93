use account_metrics::MetricsService;
use account_models::Config;
use account_store::AccountRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: AccountRegistry,
    pub metrics: Arc<MetricsService>,
}

impl AppState {
    pub fn new(config: Config, registry: AccountRegistry, metrics: Arc<MetricsService>) -> Self {
        Self {
            config,
            registry,
            metrics,
        }
    }
}

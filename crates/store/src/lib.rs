pub mod memory;
pub mod migrations;
pub mod postgres;
pub mod registry;
pub mod traits;

pub use memory::MemoryAccountStore;
pub use postgres::PgAccountStore;
pub use registry::*;
pub use traits::AccountStore;

use account_models::{AccountError, DatabaseConfig, StoreBackend};
use std::sync::Arc;
use tracing::info;

/// Opens the store named by `config.url`, running migrations where needed.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn AccountStore>, AccountError> {
    match config.backend()? {
        StoreBackend::Memory => {
            info!("Using in-memory account store");
            Ok(Arc::new(MemoryAccountStore::new()))
        }
        StoreBackend::Postgres => {
            let store = PgAccountStore::connect(config).await?;
            info!("Connected to PostgreSQL account store");
            Ok(Arc::new(store))
        }
    }
}

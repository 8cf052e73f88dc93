use crate::traits::AccountStore;
use account_models::{Account, AccountError, AccountRequest};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// Account operations exposed over HTTP, on top of any [`AccountStore`].
#[derive(Clone)]
pub struct AccountRegistry {
    store: Arc<dyn AccountStore>,
}

impl AccountRegistry {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn AccountStore> {
        self.store.clone()
    }

    #[instrument(skip(self, request))]
    pub async fn create_account(&self, request: AccountRequest) -> Result<Account, AccountError> {
        let new = request.validate()?;
        let account = self.store.create(new).await?;
        info!(account_id = account.id, "Account created");
        Ok(account)
    }

    #[instrument(skip(self))]
    pub async fn list_accounts(&self, name: Option<&str>) -> Result<Vec<Account>, AccountError> {
        match name {
            Some(name) => self.store.find_by_name(name).await,
            None => self.store.all().await,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_account(&self, id: i64) -> Result<Account, AccountError> {
        self.store
            .find(id)
            .await?
            .ok_or(AccountError::AccountNotFound { id })
    }

    #[instrument(skip(self, request))]
    pub async fn update_account(
        &self,
        id: i64,
        request: AccountRequest,
    ) -> Result<Account, AccountError> {
        // An unknown id wins over a bad payload
        if self.store.find(id).await?.is_none() {
            return Err(AccountError::AccountNotFound { id });
        }
        let new = request.validate()?;
        let account = self
            .store
            .update(id, new)
            .await?
            .ok_or(AccountError::AccountNotFound { id })?;
        info!(account_id = id, "Account updated");
        Ok(account)
    }

    /// Deleting an account that does not exist is not an error.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, id: i64) -> Result<(), AccountError> {
        if self.store.delete(id).await? {
            info!(account_id = id, "Account deleted");
        }
        Ok(())
    }

    pub async fn health(&self) -> HealthStatus {
        match self.store.ping().await {
            Ok(()) => HealthStatus { status: "OK" },
            Err(e) => {
                warn!("Account store health check failed: {}", e);
                HealthStatus {
                    status: "UNAVAILABLE",
                }
            }
        }
    }
}

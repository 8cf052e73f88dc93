use crate::traits::AccountStore;
use account_models::{Account, AccountError, NewAccount};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local store used for tests and `memory://` deployments.
#[derive(Debug, Clone)]
pub struct MemoryAccountStore {
    accounts: Arc<RwLock<BTreeMap<i64, Account>>>,
    next_id: Arc<AtomicI64>,
}

impl Default for MemoryAccountStore {
    fn default() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.write().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let account = Account::from_new(id, account);
        accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn all(&self) -> Result<Vec<Account>, AccountError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().cloned().collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Account>, AccountError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Account>, AccountError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .filter(|a| a.name == name)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, account: NewAccount) -> Result<Option<Account>, AccountError> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&id) {
            Some(existing) => {
                *existing = Account::from_new(id, account);
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, AccountError> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts.remove(&id).is_some())
    }

    async fn recreate(&self) -> Result<(), AccountError> {
        let mut accounts = self.accounts.write().await;
        accounts.clear();
        self.next_id.store(1, Ordering::SeqCst);
        Ok(())
    }

    async fn ping(&self) -> Result<(), AccountError> {
        Ok(())
    }
}

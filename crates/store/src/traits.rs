use account_models::{Account, AccountError, NewAccount};
use async_trait::async_trait;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persists a new account and returns it with its assigned id.
    async fn create(&self, account: NewAccount) -> Result<Account, AccountError>;

    /// All accounts ordered by id.
    async fn all(&self) -> Result<Vec<Account>, AccountError>;

    async fn find(&self, id: i64) -> Result<Option<Account>, AccountError>;

    async fn find_by_name(&self, name: &str) -> Result<Vec<Account>, AccountError>;

    /// Replaces the mutable fields of account `id`. `None` if it does not exist.
    async fn update(&self, id: i64, account: NewAccount) -> Result<Option<Account>, AccountError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, AccountError>;

    /// Drops all accounts and recreates the schema.
    async fn recreate(&self) -> Result<(), AccountError>;

    async fn ping(&self) -> Result<(), AccountError>;
}

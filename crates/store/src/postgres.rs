//! PostgreSQL account store.

use crate::migrations;
use crate::traits::AccountStore;
use account_models::{Account, AccountError, DatabaseConfig, NewAccount};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, instrument};

const ACCOUNT_COLUMNS: &str = "id, name, email, address, phone_number, date_joined";

#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Connects to the database and brings the schema up to date.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AccountError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| AccountError::StoreUnavailable {
                reason: e.to_string(),
            })?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: PgPool) -> Result<Self, AccountError> {
        migrations::run_migrations(&pool)
            .await
            .map_err(|e| AccountError::DatabaseError {
                reason: e.to_string(),
            })?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    #[instrument(skip(self, account))]
    async fn create(&self, account: NewAccount) -> Result<Account, AccountError> {
        let query = format!(
            "INSERT INTO accounts (name, email, address, phone_number, date_joined) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ACCOUNT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Account>(&query)
            .bind(&account.name)
            .bind(&account.email)
            .bind(&account.address)
            .bind(&account.phone_number)
            .bind(account.date_joined)
            .fetch_one(&self.pool)
            .await?;
        debug!("Inserted account {}", created.id);
        Ok(created)
    }

    async fn all(&self) -> Result<Vec<Account>, AccountError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id");
        let accounts = sqlx::query_as::<_, Account>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(accounts)
    }

    async fn find(&self, id: i64) -> Result<Option<Account>, AccountError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let account = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Account>, AccountError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE name = $1 ORDER BY id");
        let accounts = sqlx::query_as::<_, Account>(&query)
            .bind(name)
            .fetch_all(&self.pool)
            .await?;
        Ok(accounts)
    }

    #[instrument(skip(self, account))]
    async fn update(&self, id: i64, account: NewAccount) -> Result<Option<Account>, AccountError> {
        let query = format!(
            "UPDATE accounts SET name = $2, email = $3, address = $4, phone_number = $5, \
             date_joined = $6 WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(&account.name)
            .bind(&account.email)
            .bind(&account.address)
            .bind(&account.phone_number)
            .bind(account.date_joined)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<bool, AccountError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn recreate(&self) -> Result<(), AccountError> {
        migrations::drop_schema(&self.pool).await?;
        migrations::run_migrations(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AccountError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AccountError::StoreUnavailable {
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

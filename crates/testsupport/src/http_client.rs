use account_models::{Account, AccountRequest, ErrorShape};
use anyhow::Result;
use reqwest::{Client, StatusCode};

/// Thin client over the account endpoints, returning raw statuses so tests
/// can assert on failures as well as successes.
pub struct AccountClient {
    client: Client,
    base_url: String,
}

impl AccountClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn create_account(&self, request: &AccountRequest) -> Result<Account> {
        let response = self
            .client
            .post(format!("{}/accounts", self.base_url))
            .json(request)
            .send()
            .await?;

        if response.status() != StatusCode::CREATED {
            let error_text = response.text().await?;
            anyhow::bail!("Create account failed: {}", error_text);
        }

        Ok(response.json().await?)
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let response = self
            .client
            .get(format!("{}/accounts", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("List accounts failed: {}", error_text);
        }

        Ok(response.json().await?)
    }

    /// `Err(shape)` carries the service's JSON error body.
    pub async fn get_account(&self, id: i64) -> Result<std::result::Result<Account, ErrorShape>> {
        let response = self
            .client
            .get(format!("{}/accounts/{}", self.base_url, id))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(Ok(response.json().await?))
        } else {
            Ok(Err(response.json().await?))
        }
    }

    pub async fn update_account(
        &self,
        id: i64,
        request: &AccountRequest,
    ) -> Result<std::result::Result<Account, ErrorShape>> {
        let response = self
            .client
            .put(format!("{}/accounts/{}", self.base_url, id))
            .json(request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(Ok(response.json().await?))
        } else {
            Ok(Err(response.json().await?))
        }
    }

    pub async fn delete_account(&self, id: i64) -> Result<StatusCode> {
        let response = self
            .client
            .delete(format!("{}/accounts/{}", self.base_url, id))
            .send()
            .await?;
        Ok(response.status())
    }

    pub async fn health(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}

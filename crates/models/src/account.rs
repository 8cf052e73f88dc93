use crate::error::AccountError;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const NAME_MAX_LEN: usize = 64;
pub const EMAIL_MAX_LEN: usize = 64;
pub const ADDRESS_MAX_LEN: usize = 256;
pub const PHONE_NUMBER_MAX_LEN: usize = 32;

const BAD_OR_NO_DATA: &str = "body of request contained bad or no data";

/// A customer account as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone_number: Option<String>,
    pub date_joined: NaiveDate,
}

impl Account {
    pub fn from_new(id: i64, new: NewAccount) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            address: new.address,
            phone_number: new.phone_number,
            date_joined: new.date_joined,
        }
    }
}

/// Validated account fields, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone_number: Option<String>,
    pub date_joined: NaiveDate,
}

impl From<&Account> for NewAccount {
    fn from(account: &Account) -> Self {
        Self {
            name: account.name.clone(),
            email: account.email.clone(),
            address: account.address.clone(),
            phone_number: account.phone_number.clone(),
            date_joined: account.date_joined,
        }
    }
}

/// Account payload as sent by clients on create and update.
///
/// Every field is optional at this stage so that a missing field can be
/// reported by name; `validate` turns it into a [`NewAccount`]. An `id`
/// in the body is accepted and ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date_joined: Option<String>,
}

impl AccountRequest {
    pub fn from_json_bytes(body: &[u8]) -> Result<Self, AccountError> {
        serde_json::from_slice(body).map_err(|_| invalid(BAD_OR_NO_DATA))
    }

    pub fn validate(self) -> Result<NewAccount, AccountError> {
        let name = required("name", self.name, NAME_MAX_LEN)?;
        let email = required("email", self.email, EMAIL_MAX_LEN)?;
        let address = required("address", self.address, ADDRESS_MAX_LEN)?;

        let phone_number = match self.phone_number {
            Some(phone) if phone.chars().count() > PHONE_NUMBER_MAX_LEN => {
                return Err(too_long("phone_number", PHONE_NUMBER_MAX_LEN));
            }
            other => other,
        };

        let date_joined = match self.date_joined.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| invalid(&format!("date_joined must be YYYY-MM-DD, got {raw}")))?,
            _ => Utc::now().date_naive(),
        };

        Ok(NewAccount {
            name,
            email,
            address,
            phone_number,
            date_joined,
        })
    }
}

impl From<&Account> for AccountRequest {
    fn from(account: &Account) -> Self {
        Self {
            id: Some(account.id),
            name: Some(account.name.clone()),
            email: Some(account.email.clone()),
            address: Some(account.address.clone()),
            phone_number: account.phone_number.clone(),
            date_joined: Some(account.date_joined.to_string()),
        }
    }
}

fn required(field: &str, value: Option<String>, max_len: usize) -> Result<String, AccountError> {
    let value = value.ok_or_else(|| invalid(&format!("missing {field}")))?;
    if value.trim().is_empty() {
        return Err(invalid(&format!("{field} must not be blank")));
    }
    if value.chars().count() > max_len {
        return Err(too_long(field, max_len));
    }
    Ok(value)
}

fn too_long(field: &str, max_len: usize) -> AccountError {
    invalid(&format!("{field} exceeds {max_len} characters"))
}

fn invalid(detail: &str) -> AccountError {
    AccountError::DataValidation {
        reason: format!("Invalid Account: {detail}"),
    }
}

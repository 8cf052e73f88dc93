use account_models::{AccountRequest, NewAccount};
use chrono::NaiveDate;

#[allow(dead_code)]
pub fn request(name: &str) -> AccountRequest {
    AccountRequest {
        id: None,
        name: Some(name.to_string()),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        address: Some("742 Evergreen Terrace".to_string()),
        phone_number: Some("555-0199".to_string()),
        date_joined: Some("2024-02-29".to_string()),
    }
}

#[allow(dead_code)]
pub fn new_account(name: &str) -> NewAccount {
    NewAccount {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        address: "742 Evergreen Terrace".to_string(),
        phone_number: None,
        date_joined: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
    }
}

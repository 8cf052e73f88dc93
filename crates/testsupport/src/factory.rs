use account_models::AccountRequest;
use chrono::{Duration, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Linus", "Barbara", "Ken", "Margaret", "Dennis", "Frances", "Edsger",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Torvalds", "Liskov", "Thompson", "Hamilton", "Ritchie",
    "Allen", "Dijkstra",
];
const STREETS: &[&str] = &[
    "Main St", "Oak Ave", "Maple Dr", "Cedar Ln", "Elm St", "Pine Rd", "Lake View Blvd",
];
const CITIES: &[&str] = &["Springfield", "Riverton", "Fairview", "Greenville", "Madison"];

/// Generates plausible, valid account payloads.
pub struct AccountFactory;

impl AccountFactory {
    pub fn build() -> AccountRequest {
        let mut rng = rand::thread_rng();
        let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Ada");
        let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Lovelace");
        let tag: u32 = rng.gen_range(1..100_000);

        let address = format!(
            "{} {}, {}",
            rng.gen_range(1..9999),
            STREETS.choose(&mut rng).copied().unwrap_or("Main St"),
            CITIES.choose(&mut rng).copied().unwrap_or("Springfield"),
        );
        let phone_number = if rng.gen_bool(0.8) {
            Some(format!(
                "{:03}-{:03}-{:04}",
                rng.gen_range(200..999),
                rng.gen_range(200..999),
                rng.gen_range(0..10_000)
            ))
        } else {
            None
        };

        AccountRequest {
            id: None,
            name: Some(format!("{first} {last}")),
            email: Some(format!(
                "{}.{}{}@example.com",
                first.to_lowercase(),
                last.to_lowercase(),
                tag
            )),
            address: Some(address),
            phone_number,
            date_joined: Some(Self::date_joined(&mut rng).to_string()),
        }
    }

    pub fn build_many(count: usize) -> Vec<AccountRequest> {
        (0..count).map(|_| Self::build()).collect()
    }

    /// A day between 2008-01-01 and today.
    fn date_joined(rng: &mut impl Rng) -> NaiveDate {
        let start = NaiveDate::from_ymd_opt(2008, 1, 1).unwrap_or_default();
        let today = Utc::now().date_naive();
        let span = (today - start).num_days().max(0);
        start + Duration::days(rng.gen_range(0..=span))
    }
}

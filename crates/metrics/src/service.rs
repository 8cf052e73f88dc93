use account_models::AccountError;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

pub struct MetricsService {
    registry: Registry,
    accounts_created_total: IntCounter,
    accounts_updated_total: IntCounter,
    accounts_deleted_total: IntCounter,
    requests_failed_total: IntCounterVec,
}

fn internal(e: prometheus::Error) -> AccountError {
    AccountError::InternalError {
        reason: e.to_string(),
    }
}

impl MetricsService {
    pub fn new() -> Result<Self, AccountError> {
        let registry = Registry::new();

        let accounts_created_total = IntCounter::new(
            "accounts_created_total",
            "Total number of accounts created",
        )
        .map_err(internal)?;

        let accounts_updated_total = IntCounter::new(
            "accounts_updated_total",
            "Total number of accounts updated",
        )
        .map_err(internal)?;

        let accounts_deleted_total = IntCounter::new(
            "accounts_deleted_total",
            "Total number of account delete requests",
        )
        .map_err(internal)?;

        let requests_failed_total = IntCounterVec::new(
            Opts::new(
                "account_requests_failed_total",
                "Total number of account requests answered with an error",
            ),
            &["status"],
        )
        .map_err(internal)?;

        registry
            .register(Box::new(accounts_created_total.clone()))
            .map_err(internal)?;
        registry
            .register(Box::new(accounts_updated_total.clone()))
            .map_err(internal)?;
        registry
            .register(Box::new(accounts_deleted_total.clone()))
            .map_err(internal)?;
        registry
            .register(Box::new(requests_failed_total.clone()))
            .map_err(internal)?;

        Ok(Self {
            registry,
            accounts_created_total,
            accounts_updated_total,
            accounts_deleted_total,
            requests_failed_total,
        })
    }

    pub fn record_account_created(&self) {
        self.accounts_created_total.inc();
    }

    pub fn record_account_updated(&self) {
        self.accounts_updated_total.inc();
    }

    pub fn record_account_deleted(&self) {
        self.accounts_deleted_total.inc();
    }

    pub fn record_failure(&self, error: &AccountError) {
        self.requests_failed_total
            .with_label_values(&[&error.http_status().to_string()])
            .inc();
    }

    pub fn accounts_created(&self) -> u64 {
        self.accounts_created_total.get()
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> Result<String, AccountError> {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();

        encoder.encode(&metric_families, &mut buffer).map_err(internal)?;

        String::from_utf8(buffer).map_err(|e| AccountError::InternalError {
            reason: e.to_string(),
        })
    }
}

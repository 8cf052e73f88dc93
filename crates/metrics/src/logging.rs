use account_models::{LogFormat, LoggingConfig};
use std::str::FromStr;
use tracing::Level;

pub struct TracingService;

impl TracingService {
    /// Installs the global subscriber. Fails if one is already set.
    pub fn init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let level = parse_level(&config.level);

        match config.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_max_level(level)
                .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
                .try_init()?,
            LogFormat::Pretty => tracing_subscriber::fmt()
                .with_max_level(level)
                .with_target(false)
                .try_init()?,
        }

        Ok(())
    }
}

/// Unknown level names fall back to `INFO`.
pub fn parse_level(level: &str) -> Level {
    Level::from_str(level.trim()).unwrap_or(Level::INFO)
}

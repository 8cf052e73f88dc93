use anyhow::{bail, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Re-runs `check` until it reports `true`, failing once `timeout` has passed.
/// An error from `check` ends the wait immediately.
pub async fn poll_until<F, Fut>(what: &str, timeout: Duration, mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + timeout;
    let mut ticks = interval(POLL_INTERVAL);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticks.tick().await;
        if check().await? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            bail!("gave up after {:?} waiting for {}", timeout, what);
        }
    }
}

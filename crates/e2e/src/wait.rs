//! Bounded waiting on browser conditions
//!
//! Every wait in the harness carries an explicit upper bound: a condition
//! that never becomes true yields `Ok(false)` once the bound expires, never a
//! hang. Recoverable browser errors during polling (an element going stale
//! mid-render, a navigation still in flight) are treated like "not yet";
//! a lost session aborts the wait immediately.

use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::browser::{Browser, Condition};
use crate::error::BrowserError;

/// How often a condition is re-checked while waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Wait up to `timeout` for `condition` to hold, polling every
/// [`DEFAULT_POLL_INTERVAL`].
pub async fn wait_until<B: Browser>(
    browser: &B,
    condition: &Condition,
    timeout: Duration,
) -> Result<bool, BrowserError> {
    wait_until_with_interval(browser, condition, timeout, DEFAULT_POLL_INTERVAL).await
}

/// Same as [`wait_until`] with an explicit poll interval.
///
/// The condition is always checked at least once, even with a zero timeout.
pub async fn wait_until_with_interval<B: Browser>(
    browser: &B,
    condition: &Condition,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<bool, BrowserError> {
    let deadline = Instant::now() + timeout;

    loop {
        match holds(browser, condition).await {
            Ok(true) => return Ok(true),
            Ok(false) => {}
            Err(e) if e.is_recoverable() => {
                debug!("Waiting for {}: {}", condition, e);
            }
            Err(e) => return Err(e),
        }

        let now = Instant::now();
        if now >= deadline {
            debug!("Gave up waiting for {} after {:?}", condition, timeout);
            return Ok(false);
        }

        sleep(poll_interval.min(deadline - now)).await;
    }
}

async fn holds<B: Browser>(browser: &B, condition: &Condition) -> Result<bool, BrowserError> {
    match condition {
        Condition::ElementPresent(selector) => {
            Ok(!browser.find_elements(selector).await?.is_empty())
        }
        Condition::UrlContains(fragment) => {
            Ok(browser.current_url().await?.contains(fragment.as_str()))
        }
    }
}

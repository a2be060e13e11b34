//! Global politeness throttle shared by every request the scraper issues.
//!
//! The storefront is fetched by several product workers at once, so a
//! per-worker sleep would multiply the effective request rate. Instead all
//! workers queue on one [`RequestThrottle`], which hands out request slots
//! spaced at least `delay` apart.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
pub struct RequestThrottle {
    delay: Duration,
    /// Earliest instant at which the next request may start.
    next_slot: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(None),
        }
    }

    /// Waits until the caller may issue a request and reserves the following
    /// slot. The lock is held while sleeping so callers are served in order.
    pub async fn acquire(&self) {
        if self.delay.is_zero() {
            return;
        }
        let mut next_slot = self.next_slot.lock().await;
        if let Some(at) = *next_slot {
            if at > Instant::now() {
                tracing::trace!(wait_ms = (at - Instant::now()).as_millis(), "throttling request");
                tokio::time::sleep_until(at).await;
            }
        }
        *next_slot = Some(Instant::now() + self.delay);
    }
}

// ── Per-target rate limiting ──
//
// Enforces a minimum spacing between request dispatches. Waiters queue on a
// fair (FIFO) tokio mutex, and the slot is held while sleeping, so requests
// leave in the order they arrived.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Minimum-interval limiter. One per target, never shared across targets.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Spacing of `1000 / per_sec` milliseconds. Non-positive or non-finite
    /// rates fall back to 5 requests per second.
    pub fn new(per_sec: f64) -> Self {
        let rate = if per_sec.is_finite() && per_sec > 0.0 {
            per_sec
        } else {
            crate::Target::DEFAULT_RATE_LIMIT
        };
        let interval =
            Duration::try_from_secs_f64(1.0 / rate).unwrap_or(Duration::from_millis(200));
        Self {
            interval,
            last_dispatch: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the next dispatch slot. Returns the dispatch instant.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_dispatch.lock().await;
        if let Some(prev) = *last {
            sleep_until(prev + self.interval).await;
        }
        let now = Instant::now();
        *last = Some(now);
        now
    }
}

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Process-wide minimum spacing between outbound translation calls
///
/// Limits how often calls start, not how many are in flight.
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until `min_interval` has passed since the previous acquisition, then
    /// stamp and return the new acquisition time.
    ///
    /// The lock is held across the sleep so callers are released one at a time.
    pub async fn acquire(&self) -> Instant {
        let mut last_call = self.last_call.lock().await;

        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }

        let now = Instant::now();
        *last_call = Some(now);
        now
    }
}

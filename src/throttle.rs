// src/throttle.rs
//! Fixed-interval gate for outbound calls.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Grants are spaced at least `interval` apart. The first grant is immediate.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    next_at: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_at: Mutex::new(None),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the gate opens, then reserve the next slot.
    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }
        let mut next_at = self.next_at.lock().await;
        if let Some(at) = *next_at {
            tokio::time::sleep_until(at).await;
        }
        *next_at = Some(Instant::now() + self.interval);
    }
}

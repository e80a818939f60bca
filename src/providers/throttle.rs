// =============================================================================
// Request Throttle: minimum spacing between upstream requests
// =============================================================================
//
// Each caller reserves the next free slot under a short lock, then sleeps
// until that slot outside the lock, so concurrent requests queue up one
// interval apart without a thread ever blocking on the sleep.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Spacing used by the upstream clients.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
    granted: AtomicU64,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(None),
            granted: AtomicU64::new(0),
        }
    }

    /// Wait until this caller may send its request.
    pub async fn acquire(&self) {
        let wait = {
            let mut next = self.next_slot.lock();
            let now = Instant::now();
            let slot = next.map_or(now, |n| n.max(now));
            *next = Some(slot + self.min_interval);
            slot - now
        };

        self.granted.fetch_add(1, Ordering::Relaxed);
        if !wait.is_zero() {
            debug!(wait_ms = wait.as_millis() as u64, "throttling upstream request");
            tokio::time::sleep(wait).await;
        }
    }

    /// Requests let through so far.
    pub fn granted(&self) -> u64 {
        self.granted.load(Ordering::Relaxed)
    }
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

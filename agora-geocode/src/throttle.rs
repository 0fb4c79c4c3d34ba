//! Minimum-interval request throttle.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Spaces request starts at least `min_interval` apart.
///
/// The read of the last start, the wait, and the write of the new start all
/// happen under one async mutex. Callers therefore start strictly in lock
/// acquisition order (tokio's mutex is FIFO), and no two callers ever compute
/// their wait from the same previous start.
///
/// Only starts are spaced. The request itself runs after `acquire` returns,
/// outside the lock, so the next caller can begin waiting while it is still
/// in flight.
#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    /// Creates a throttle with no history: the first `acquire` returns at once.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_start: Mutex::new(None),
        }
    }

    /// Returns the configured spacing.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until a request may start, then records that it started.
    ///
    /// Dropping the returned future while it waits releases the lock without
    /// recording a start.
    pub async fn acquire(&self) {
        let mut last_start = self.last_start.lock().await;

        if let Some(previous) = *last_start {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "Throttling request");
                sleep(wait).await;
            }
        }

        *last_start = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const INTERVAL: Duration = Duration::from_millis(1000);

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let throttle = RequestThrottle::new(INTERVAL);
        let start = Instant::now();
        throttle.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_acquire_waits_for_interval() {
        let throttle = RequestThrottle::new(INTERVAL);
        let start = Instant::now();

        throttle.acquire().await;
        throttle.acquire().await;

        assert!(start.elapsed() >= INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_interval_has_passed() {
        let throttle = RequestThrottle::new(INTERVAL);
        throttle.acquire().await;

        sleep(INTERVAL * 2).await;

        let start = Instant::now();
        throttle.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_wait() {
        let throttle = RequestThrottle::new(INTERVAL);
        throttle.acquire().await;

        sleep(Duration::from_millis(400)).await;

        let start = Instant::now();
        throttle.acquire().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(600) && waited < INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_are_spaced() {
        let throttle = Arc::new(RequestThrottle::new(INTERVAL));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let throttle = throttle.clone();
                tokio::spawn(async move {
                    throttle.acquire().await;
                    Instant::now()
                })
            })
            .collect();

        let mut starts = Vec::new();
        for handle in handles {
            starts.push(handle.await.unwrap());
        }
        starts.sort();

        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= INTERVAL);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_instances_share_nothing() {
        let a = RequestThrottle::new(INTERVAL);
        let b = RequestThrottle::new(INTERVAL);
        let start = Instant::now();

        a.acquire().await;
        b.acquire().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_wait_records_nothing() {
        let throttle = RequestThrottle::new(INTERVAL);
        let start = Instant::now();
        throttle.acquire().await;

        let cancelled = tokio::time::timeout(Duration::from_millis(100), throttle.acquire()).await;
        assert!(cancelled.is_err());

        // Lock was released and the abandoned call left no start behind, so
        // this waits only until one interval after the first start.
        throttle.acquire().await;
        let waited = start.elapsed();
        assert!(waited >= INTERVAL && waited < INTERVAL + Duration::from_millis(100));
    }
}

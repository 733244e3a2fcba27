//! Concurrency and rate limiting for exchange requests
//!
//! Every exchange request holds a [`RequestPermit`] for the duration of its
//! round trip. The permit comes from a semaphore bounding in-flight requests;
//! when a per-minute budget is configured, acquisition also waits on a
//! `governor` direct limiter.

use governor::{DefaultDirectRateLimiter, Quota};
use nonzero_ext::nonzero;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::{AdapterError, Result};

/// Bounded limiter shared by all tasks of a cycle
#[derive(Clone)]
pub struct RequestLimiter {
    permits: Arc<Semaphore>,
    max_in_flight: usize,
    rate: Option<Arc<DefaultDirectRateLimiter>>,
    tracker: Arc<RequestTracker>,
}

/// Proof of admission; the slot is released on drop
#[derive(Debug)]
pub struct RequestPermit {
    _permit: OwnedSemaphorePermit,
}

impl RequestLimiter {
    /// Create a limiter with `max_in_flight` concurrent requests and an
    /// optional per-minute budget (`0` disables rate limiting)
    pub fn new(max_in_flight: usize, requests_per_minute: u32) -> Self {
        let max_in_flight = max_in_flight.max(1);

        let rate = NonZeroU32::new(requests_per_minute).map(|rate| {
            let burst = u32::try_from(max_in_flight)
                .ok()
                .and_then(NonZeroU32::new)
                .unwrap_or(nonzero!(1u32));
            Arc::new(DefaultDirectRateLimiter::direct(
                Quota::per_minute(rate).allow_burst(burst.min(rate)),
            ))
        });

        if rate.is_none() {
            tracing::debug!("Request rate limiting disabled");
        }

        Self {
            permits: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
            rate,
            tracker: Arc::new(RequestTracker::default()),
        }
    }

    /// Wait for a free slot (and rate budget), then admit one request
    pub async fn acquire(&self) -> Result<RequestPermit> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AdapterError::Configuration("request limiter closed".to_string()))?;

        if let Some(rate) = &self.rate {
            rate.until_ready().await;
        }

        Ok(RequestPermit { _permit: permit })
    }

    /// Configured maximum of concurrent requests
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Requests currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.max_in_flight - self.permits.available_permits()
    }

    /// Shared request outcome counters
    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }
}

/// Request outcome counters for monitoring
#[derive(Debug, Default)]
pub struct RequestTracker {
    total: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
}

impl RequestTracker {
    /// Record the outcome of one request
    pub fn record<T>(&self, outcome: &Result<T>) {
        self.total.fetch_add(1, Ordering::Relaxed);
        match outcome {
            Ok(_) => {}
            Err(AdapterError::Timeout { .. }) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                self.timed_out.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Snapshot the counters
    pub fn stats(&self) -> RequestStats {
        RequestStats {
            total: self.total.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
        }
    }
}

/// Request statistics for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestStats {
    /// Total requests attempted
    pub total: u64,
    /// Requests that ended in any error
    pub failed: u64,
    /// Subset of failures caused by timeouts
    pub timed_out: u64,
}

impl RequestStats {
    /// Calculate success rate
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.total - self.failed) as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_bounds_in_flight_requests() {
        let limiter = RequestLimiter::new(2, 0);

        let first = limiter.acquire().await.unwrap();
        let _second = limiter.acquire().await.unwrap();
        assert_eq!(limiter.in_flight(), 2);

        // Third request must wait until a permit is released
        let pending = tokio::time::timeout(Duration::from_millis(50), limiter.acquire()).await;
        assert!(pending.is_err(), "third permit should not be granted");

        drop(first);
        let third = tokio::time::timeout(Duration::from_millis(50), limiter.acquire()).await;
        assert!(third.is_ok());
    }

    #[test]
    fn test_waiter_is_woken_on_release() {
        let limiter = RequestLimiter::new(1, 0);
        let held = tokio_test::block_on(limiter.acquire()).unwrap();

        let mut waiter = tokio_test::task::spawn(limiter.acquire());
        tokio_test::assert_pending!(waiter.poll());

        drop(held);
        assert!(waiter.is_woken());
        let _permit = tokio_test::assert_ready_ok!(waiter.poll());
        assert_eq!(limiter.in_flight(), 1);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_clamped() {
        let limiter = RequestLimiter::new(0, 1200);
        assert_eq!(limiter.max_in_flight(), 1);
        let _permit = limiter.acquire().await.unwrap();
        assert_eq!(limiter.in_flight(), 1);
    }

    #[test]
    fn test_tracker_counts_outcomes() {
        let tracker = RequestTracker::default();
        tracker.record::<()>(&Ok(()));
        tracker.record::<()>(&Err(AdapterError::Timeout {
            endpoint: "klines".into(),
            timeout_ms: 10,
        }));
        tracker.record::<()>(&Err(AdapterError::status("klines", 500, "")));

        let stats = tracker.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.timed_out, 1);
        assert!((stats.success_rate() - 1.0 / 3.0).abs() < 1e-12);
    }
}

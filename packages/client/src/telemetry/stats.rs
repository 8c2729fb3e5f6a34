//! Transport statistics

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Counters shared by every request issued through one transport.
#[derive(Debug)]
pub struct TransportStats {
    /// Attempts put on the wire
    pub requests_total: AtomicU64,
    /// Attempts that produced a well-formed HTTP response
    pub requests_successful: AtomicU64,
    /// Attempts that failed before a response was read
    pub requests_failed: AtomicU64,
    /// Retries issued by the blocking wrapper
    pub retries: AtomicU64,
    pub connections_marked_dead: AtomicU64,
    pub connections_resurrected: AtomicU64,
    pub sniffs: AtomicU64,
    pub pool_rebuilds: AtomicU64,
    pub created_at: Instant,
}

impl Default for TransportStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            requests_successful: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            connections_marked_dead: AtomicU64::new(0),
            connections_resurrected: AtomicU64::new(0),
            sniffs: AtomicU64::new(0),
            pool_rebuilds: AtomicU64::new(0),
            created_at: Instant::now(),
        }
    }

    #[inline]
    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_success(&self) {
        self.requests_successful.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failure(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dead(&self) {
        self.connections_marked_dead.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_resurrections(&self, count: u64) {
        self.connections_resurrected.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_sniff(&self) {
        self.sniffs.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rebuild(&self) {
        self.pool_rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    /// Share of attempts that produced an HTTP response.
    #[must_use]
    pub fn success_ratio(&self) -> f64 {
        let total = self.requests_total.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            let successful = self.requests_successful.load(Ordering::Relaxed);
            #[allow(clippy::cast_precision_loss)]
            {
                successful as f64 / total as f64
            }
        }
    }

    #[must_use]
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    #[must_use]
    pub fn snapshot(&self) -> TransportStatsSnapshot {
        TransportStatsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_successful: self.requests_successful.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            connections_marked_dead: self.connections_marked_dead.load(Ordering::Relaxed),
            connections_resurrected: self.connections_resurrected.load(Ordering::Relaxed),
            sniffs: self.sniffs.load(Ordering::Relaxed),
            pool_rebuilds: self.pool_rebuilds.load(Ordering::Relaxed),
            age: self.age(),
        }
    }
}

/// Point-in-time copy of [`TransportStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransportStatsSnapshot {
    pub requests_total: u64,
    pub requests_successful: u64,
    pub requests_failed: u64,
    pub retries: u64,
    pub connections_marked_dead: u64,
    pub connections_resurrected: u64,
    pub sniffs: u64,
    pub pool_rebuilds: u64,
    pub age: Duration,
}

//! Retry policy with exponential backoff and jitter
//!
//! Decides whether a failed attempt may be repeated and how long to wait
//! before the next one. With no initial delay configured retries are
//! immediate.

use std::time::Duration;

use fastrand::Rng;

use crate::config::TransportSettings;
use crate::error::Error;

/// Retry policy derived from transport settings
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Whether failures are retried at all
    pub enabled: bool,
    /// Retries allowed after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub backoff_multiplier: f64,
    /// Jitter factor (0.0 to 1.0) to prevent thundering herd
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&TransportSettings::default())
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_settings(settings: &TransportSettings) -> Self {
        Self {
            enabled: settings.retry_on_failure,
            max_retries: settings.max_retries,
            initial_delay: settings.retry_delay,
            max_delay: settings.max_retry_delay,
            backoff_multiplier: 2.0,
            jitter_factor: settings.retry_jitter,
        }
    }

    /// Single attempt only.
    #[inline]
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            enabled: false,
            max_retries: 0,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter_factor: 0.0,
        }
    }

    /// Total attempts a blocking request may make.
    #[inline]
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        if self.enabled {
            self.max_retries.saturating_add(1)
        } else {
            1
        }
    }

    /// Returns true if the failure of attempt `retries_done + 1` should be
    /// followed by another attempt.
    #[inline]
    #[must_use]
    pub fn should_retry(&self, error: &Error, retries_done: u32) -> bool {
        self.enabled && retries_done < self.max_retries && error.is_retryable()
    }

    /// Delay before retry number `retry` (1-based).
    ///
    /// `initial_delay × multiplier^(retry − 1)`, capped at `max_delay`, with
    /// symmetric jitter of `jitter_factor × delay`.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn calculate_delay(&self, retry: u32) -> Duration {
        if retry == 0 || self.initial_delay.is_zero() {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let max_ms = self.max_delay.as_millis() as f64;
        let base_ms = self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped = base_ms.min(max_ms);

        let jitter_range = capped * self.jitter_factor;
        let jitter = Rng::new().f64() * jitter_range - (jitter_range / 2.0);

        let delay = (capped + jitter).clamp(0.0, max_ms);
        Duration::from_millis(delay as u64)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;

    use super::*;
    use crate::error;

    fn policy(delay_ms: u64, jitter: f64) -> RetryPolicy {
        let settings = TransportSettings::default()
            .with_retry_delay(Duration::from_millis(delay_ms), Duration::from_secs(1))
            .with_retry_jitter(jitter);
        RetryPolicy::from_settings(&settings)
    }

    #[test]
    fn defaults_retry_three_times_immediately() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.calculate_delay(1), Duration::ZERO);
        assert_eq!(policy.calculate_delay(3), Duration::ZERO);
    }

    #[test]
    fn api_errors_are_never_retried() {
        let policy = RetryPolicy::default();
        let api = error::api(StatusCode::NOT_FOUND, None);
        assert!(!policy.should_retry(&api, 0));

        let network = error::request("connection refused");
        assert!(policy.should_retry(&network, 0));
        assert!(policy.should_retry(&network, 2));
        assert!(!policy.should_retry(&network, 3));
    }

    #[test]
    fn disabled_policy_never_retries() {
        let policy = RetryPolicy::no_retry();
        let err = error::invalid_json_response("eof", Bytes::new());
        assert_eq!(policy.max_attempts(), 1);
        assert!(!policy.should_retry(&err, 0));
    }

    #[test]
    fn delays_grow_and_are_capped() {
        let policy = policy(100, 0.0);
        assert_eq!(policy.calculate_delay(0), Duration::ZERO);
        assert_eq!(policy.calculate_delay(1), Duration::from_millis(100));
        assert_eq!(policy.calculate_delay(2), Duration::from_millis(200));
        assert_eq!(policy.calculate_delay(3), Duration::from_millis(400));
        assert_eq!(policy.calculate_delay(10), Duration::from_secs(1));
    }

    #[test]
    fn jitter_stays_within_range() {
        let policy = policy(100, 0.5);
        for _ in 0..100 {
            let delay = policy.calculate_delay(1);
            assert!(delay >= Duration::from_millis(75), "{delay:?}");
            assert!(delay <= Duration::from_millis(125), "{delay:?}");
        }
    }
}

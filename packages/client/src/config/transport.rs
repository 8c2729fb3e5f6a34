//! Transport settings
//!
//! Every tunable of the transport lives here: reload cadence, resurrection
//! backoff base, retry behaviour and per-attempt timeouts.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::validation::{ConfigResult, ConfigValidator, ConfigurationError};

/// Protocol scheme used to reach the cluster nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// Name of the node-info field carrying this scheme's address.
    #[must_use]
    pub fn address_field(self) -> String {
        format!("{}_address", self.as_str())
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => Err(ConfigurationError::InvalidParameter(format!(
                "unsupported scheme '{other}'"
            ))),
        }
    }
}

/// Which selection policy a freshly built pool uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorKind {
    #[default]
    RoundRobin,
    Random,
}

/// Runtime transport configuration
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Retry transient failures in the blocking request wrapper
    pub retry_on_failure: bool,
    /// Sniff and rebuild the pool after this many requests (0 disables)
    pub reload_after: u64,
    /// Informational only; resurrection uses `base_connection_timeout` doubling
    pub resurrect_after: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base time a connection stays dead after its first failure
    pub base_connection_timeout: Duration,
    /// Timeout applied to each outbound attempt
    pub request_timeout: Duration,
    /// Delay before the first retry; zero retries immediately
    pub retry_delay: Duration,
    /// Upper bound for the exponentially growing retry delay
    pub max_retry_delay: Duration,
    /// Jitter factor (0.0 to 1.0) applied to retry delays
    pub retry_jitter: f64,
    pub selector: SelectorKind,
    /// Sniff the cluster once when the transport is built
    pub sniff_on_start: bool,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            retry_on_failure: true,
            reload_after: 10_000,
            resurrect_after: Duration::from_secs(60),
            max_retries: 3,
            base_connection_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(15),
            retry_delay: Duration::ZERO,
            max_retry_delay: Duration::from_secs(30),
            retry_jitter: 0.1,
            selector: SelectorKind::RoundRobin,
            sniff_on_start: false,
        }
    }
}

impl TransportSettings {
    #[must_use]
    pub fn with_retry_on_failure(mut self, enabled: bool) -> Self {
        self.retry_on_failure = enabled;
        self
    }

    #[must_use]
    pub fn with_reload_after(mut self, requests: u64) -> Self {
        self.reload_after = requests;
        self
    }

    #[must_use]
    pub fn with_resurrect_after(mut self, after: Duration) -> Self {
        self.resurrect_after = after;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub fn with_base_connection_timeout(mut self, timeout: Duration) -> Self {
        self.base_connection_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration, max: Duration) -> Self {
        self.retry_delay = delay;
        self.max_retry_delay = max;
        self
    }

    #[must_use]
    pub fn with_retry_jitter(mut self, jitter: f64) -> Self {
        self.retry_jitter = jitter;
        self
    }

    #[must_use]
    pub fn with_selector(mut self, selector: SelectorKind) -> Self {
        self.selector = selector;
        self
    }

    #[must_use]
    pub fn with_sniff_on_start(mut self, enabled: bool) -> Self {
        self.sniff_on_start = enabled;
        self
    }

    /// Validate transport settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `request_timeout` or `base_connection_timeout` is zero or absurdly large
    /// - `retry_jitter` is outside [0.0, 1.0]
    /// - `retry_delay` exceeds `max_retry_delay`
    pub fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::validate_timeout(self.request_timeout, "request_timeout")?;
        ConfigValidator::validate_timeout(
            self.base_connection_timeout,
            "base_connection_timeout",
        )?;
        ConfigValidator::validate_ratio(self.retry_jitter, "retry_jitter")?;

        if self.retry_delay > self.max_retry_delay {
            return Err(ConfigurationError::Conflict(
                "retry_delay cannot exceed max_retry_delay".to_string(),
            ));
        }

        Ok(())
    }
}

//! Settings validation
//!
//! Common validation helpers shared by the transport settings and the
//! transport builder.

use std::time::Duration;

/// Configuration validation result type
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid timeout value: {0}")]
    InvalidTimeout(String),

    #[error("Invalid configuration parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration conflict: {0}")]
    Conflict(String),
}

/// Common configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate timeout duration
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidTimeout` if:
    /// - The timeout duration is zero
    /// - The timeout duration exceeds 24 hours
    pub fn validate_timeout(timeout: Duration, name: &str) -> ConfigResult<()> {
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot be zero"
            )));
        }

        if timeout > Duration::from_secs(86_400) {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot exceed 24 hours"
            )));
        }

        Ok(())
    }

    /// Validate a ratio in the closed range [0.0, 1.0]
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidParameter` when the value is NaN
    /// or outside the range.
    pub fn validate_ratio(value: f64, name: &str) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigurationError::InvalidParameter(format!(
                "{name} must be between 0.0 and 1.0, got {value}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeouts_are_rejected() {
        let err = ConfigValidator::validate_timeout(Duration::ZERO, "request_timeout")
            .expect_err("zero must be rejected");
        assert!(err.to_string().contains("request_timeout"));
    }

    #[test]
    fn ratios_outside_unit_range_are_rejected() {
        assert!(ConfigValidator::validate_ratio(0.5, "jitter").is_ok());
        assert!(ConfigValidator::validate_ratio(1.5, "jitter").is_err());
        assert!(ConfigValidator::validate_ratio(f64::NAN, "jitter").is_err());
    }
}

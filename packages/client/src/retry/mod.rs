//! Retry logic with exponential backoff and jitter

pub mod policy;

pub use policy::RetryPolicy;

//! Transport configuration
//!
//! Settings with documented defaults, fluent setters and validation.

pub mod transport;
pub mod validation;

pub use transport::{Scheme, SelectorKind, TransportSettings};
pub use validation::{ConfigResult, ConfigValidator, ConfigurationError};

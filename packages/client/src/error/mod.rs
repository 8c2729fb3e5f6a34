pub mod classification;
pub mod constructors;
pub mod helpers;
pub mod types;

// Re-export main types and constructor functions
pub use constructors::*;
pub use helpers::{OperationCanceled, RendezvousClosed, TimedOut};
pub use types::{Error, Inner, Kind, Result};

impl From<crate::config::ConfigurationError> for Error {
    fn from(error: crate::config::ConfigurationError) -> Self {
        builder(error)
    }
}

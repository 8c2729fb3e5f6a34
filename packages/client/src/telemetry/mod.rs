//! Telemetry for the transport

pub mod stats;

pub use stats::{TransportStats, TransportStatsSnapshot};

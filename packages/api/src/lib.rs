//! eskit public API
//!
//! A blocking cluster client over a self-healing HTTP transport: round-robin
//! node selection, dead-node backoff and resurrection, periodic node
//! discovery and retries.
//!
//! ```no_run
//! use eskit::{Client, Params};
//!
//! # fn main() -> eskit::Result<()> {
//! let client = Client::builder()
//!     .hosts(["localhost:9200", "localhost:9201"])
//!     .max_retries(3)
//!     .build()?;
//!
//! let hits = client.get("books/_search", Params::new())?.json()?;
//! println!("{hits}");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod builder;

pub use builder::{Client, ClientBuilder};

pub use eskit_client::config::{Scheme, SelectorKind, TransportSettings};
pub use eskit_client::connection::{ConnectionInfo, HealthState, HostAddress};
pub use eskit_client::error::{Error, Kind, Result};
pub use eskit_client::http::{HttpResult, HttpSend, RawResponse, Request, RequestMethod, Response};
pub use eskit_client::params::{self, Params};
pub use eskit_client::telemetry::TransportStatsSnapshot;
pub use eskit_client::{RequestHandle, StatusCode, Transport, TransportBuilder};

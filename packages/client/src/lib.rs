//! # eskit transport
//!
//! Resilient HTTP transport for a cluster of interchangeable nodes, modelled
//! on Elasticsearch's node discovery.
//!
//! ## Features
//!
//! - **Connection pool** with per-connection health tracking
//! - **Dead-node resurrection** after an exponentially growing backoff window
//! - **Round-robin or random selection** among alive connections
//! - **Sniffing** of the cluster's node list, on demand or every N requests
//! - **Retries** of transient failures, never of server rejections
//! - **Async and blocking APIs** over the same pool
//!
//! ## Usage
//!
//! ```no_run
//! use eskit_client::{Request, Scheme, Transport};
//!
//! let transport = Transport::new(Scheme::Http, ["localhost:9200"])?;
//! let response = transport.request(Request::get("_cluster/health"))?;
//! println!("{}", response.json()?["status"]);
//! # Ok::<(), eskit_client::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod params;
pub mod retry;
pub mod sniff;
pub mod telemetry;
pub mod transport;

pub mod prelude;

pub use crate::prelude::*;

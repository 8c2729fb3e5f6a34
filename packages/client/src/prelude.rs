//! Types most callers need

pub use crate::config::{Scheme, SelectorKind, TransportSettings};
pub use crate::connection::{ConnectionInfo, ConnectionRef, HealthState, HostAddress};
pub use crate::error::{Error, Kind, Result};
pub use crate::http::{HttpResult, HttpSend, RawResponse, Request, RequestMethod, Response};
pub use crate::params::Params;
pub use crate::telemetry::TransportStatsSnapshot;
pub use crate::transport::{RequestHandle, Transport, TransportBuilder};

pub use ::http::StatusCode;

//! HTTP request and response model plus the sender seam
//!
//! Callers describe a [`Request`]; the transport resolves it against a host
//! into an [`OutboundRequest`], hands it to an [`HttpSend`] and turns the
//! [`RawResponse`] into an [`HttpResult`] or, on the blocking path, a
//! [`Response`].

pub mod method;
pub mod request;
pub mod response;
pub mod sender;

pub use method::RequestMethod;
pub use request::{OutboundRequest, Request};
pub use response::{HttpResult, RawResponse, Response};
pub use sender::{HttpSend, HyperSender};

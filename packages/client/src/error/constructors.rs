use bytes::Bytes;
use http::StatusCode;

use super::types::{Error, Kind};
use crate::connection::HostAddress;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Creates an `Error` for a host that failed validation.
pub fn invalid_connection<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::InvalidConnection).with(e.into())
}

/// Creates an `Error` for an empty, unbuildable pool.
pub fn no_connections_available() -> Error {
    Error::new(Kind::NoConnectionsAvailable)
}

/// Creates an `Error` for a network or transport failure.
pub fn request<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Request).with(e.into())
}

/// Creates an `Error` for an attempt that exceeded the request timeout.
pub fn timeout(host: HostAddress) -> Error {
    Error::new(Kind::Request)
        .with(super::helpers::TimedOut)
        .with_host(host)
}

/// Creates an `Error` for a response that was not recognisable as HTTP.
pub fn invalid_http_response<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::InvalidHttpResponse).with(e.into())
}

/// Creates an `Error` for a body that failed to parse as JSON.
pub fn invalid_json_response<E: Into<BoxError>>(e: E, body: Bytes) -> Error {
    Error::new(Kind::InvalidJsonResponse)
        .with(e.into())
        .with_body(body)
}

pub fn missing_required_parameter(name: &str) -> Error {
    Error::new(Kind::MissingRequiredParameter(name.to_string()))
}

pub fn empty_required_parameter(name: &str) -> Error {
    Error::new(Kind::EmptyRequiredParameter(name.to_string()))
}

/// Creates an `Error` for an API rejection (valid HTTP, non-2xx status).
pub fn api(status: StatusCode, body: Option<serde_json::Value>) -> Error {
    let error = Error::new(Kind::Api(status)).with_status(status);
    match body {
        Some(json) => error.with_json(json),
        None => error,
    }
}

/// Creates an `Error` for invalid configuration or construction input.
pub fn builder<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder).with(e.into())
}

pub fn unknown<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Unknown).with(e.into())
}

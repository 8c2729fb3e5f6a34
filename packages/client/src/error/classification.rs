use std::error::Error as StdError;
use std::io;

use http::StatusCode;

use super::helpers::TimedOut;
use super::types::{Error, Kind};

impl Error {
    /// Returns true if a host failed validation.
    #[must_use]
    pub fn is_invalid_connection(&self) -> bool {
        matches!(self.inner.kind, Kind::InvalidConnection)
    }

    /// Returns true if no connection could be selected.
    #[must_use]
    pub fn is_no_connections(&self) -> bool {
        matches!(self.inner.kind, Kind::NoConnectionsAvailable)
    }

    /// Returns true if the error is a network or transport failure.
    #[must_use]
    pub fn is_request(&self) -> bool {
        matches!(self.inner.kind, Kind::Request)
    }

    #[must_use]
    pub fn is_invalid_http_response(&self) -> bool {
        matches!(self.inner.kind, Kind::InvalidHttpResponse)
    }

    #[must_use]
    pub fn is_invalid_json(&self) -> bool {
        matches!(self.inner.kind, Kind::InvalidJsonResponse)
    }

    /// Returns true if the server answered with a non-2xx status.
    #[must_use]
    pub fn is_api(&self) -> bool {
        matches!(self.inner.kind, Kind::Api(_))
    }

    #[must_use]
    pub fn is_builder(&self) -> bool {
        matches!(self.inner.kind, Kind::Builder)
    }

    /// Returns true if the error is related to a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        let mut source = self.source();

        while let Some(err) = source {
            if err.is::<TimedOut>() {
                return true;
            }
            if let Some(io) = err.downcast_ref::<io::Error>() {
                if io.kind() == io::ErrorKind::TimedOut {
                    return true;
                }
            }
            source = err.source();
        }

        false
    }

    /// Returns true if the failure says something about the health of the
    /// node it was sent to, i.e. the node could not produce an HTTP answer.
    #[must_use]
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self.inner.kind,
            Kind::Request | Kind::InvalidHttpResponse
        )
    }

    /// Returns true if the blocking wrapper may attempt the request again.
    ///
    /// Server rejections and caller mistakes are final; everything that may
    /// be transient is not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match &self.inner.kind {
            Kind::Request
            | Kind::InvalidHttpResponse
            | Kind::InvalidJsonResponse
            | Kind::Unknown => true,
            Kind::InvalidConnection
            | Kind::NoConnectionsAvailable
            | Kind::MissingRequiredParameter(_)
            | Kind::EmptyRequiredParameter(_)
            | Kind::Api(_)
            | Kind::Builder => false,
        }
    }

    /// Returns the status code, if the error carries a response.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self.inner.kind {
            Kind::Api(code) => Some(code),
            _ => self.inner.status,
        }
    }
}

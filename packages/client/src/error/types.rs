use std::error::Error as StdError;
use std::fmt;

use bytes::Bytes;
use http::StatusCode;

use crate::connection::HostAddress;

/// A Result alias where the Err case is `eskit_client::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents every failure the transport can surface to a caller.
pub struct Error {
    pub inner: Box<Inner>,
}

pub struct Inner {
    pub kind: Kind,
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    /// Host the failing attempt was sent to, when one was selected.
    pub host: Option<HostAddress>,
    /// Status of a partial or rejected response.
    pub status: Option<StatusCode>,
    /// Raw body of a partial or rejected response.
    pub body: Option<Bytes>,
    /// Structured body of an API rejection.
    pub json: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// Host address failed to validate or resolve to an endpoint.
    InvalidConnection,
    /// The pool is empty and could not be rebuilt.
    NoConnectionsAvailable,
    /// Network or transport failure, including timeouts.
    Request,
    /// A response arrived but was not recognisable as HTTP.
    InvalidHttpResponse,
    /// A body was present but could not be parsed as JSON.
    InvalidJsonResponse,
    MissingRequiredParameter(String),
    EmptyRequiredParameter(String),
    /// A valid HTTP response with a non-2xx status.
    Api(StatusCode),
    /// Invalid settings or construction input.
    Builder,
    Unknown,
}

impl Error {
    pub fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(Inner {
                kind,
                source: None,
                host: None,
                status: None,
                body: None,
                json: None,
            }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub fn with<E: Into<Box<dyn StdError + Send + Sync>>>(mut self, source: E) -> Error {
        self.inner.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: HostAddress) -> Self {
        self.inner.host = Some(host);
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.inner.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.inner.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_json(mut self, json: serde_json::Value) -> Self {
        self.inner.json = Some(json);
        self
    }

    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.inner.kind
    }

    /// Host the failing attempt was sent to, if any.
    #[must_use]
    pub fn host(&self) -> Option<&HostAddress> {
        self.inner.host.as_ref()
    }

    /// Raw body carried by the failure, if any.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.inner.body.as_ref()
    }

    /// Parsed body of an API rejection.
    #[must_use]
    pub fn json(&self) -> Option<&serde_json::Value> {
        self.inner.json.as_ref()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("eskit_client::Error");

        f.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        if let Some(ref host) = self.inner.host {
            f.field("host", &host.as_str());
        }

        if let Some(ref status) = self.inner.status {
            f.field("status", status);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.kind {
            Kind::InvalidConnection => {
                f.write_str("invalid connection: host has no usable address")?;
            }
            Kind::NoConnectionsAvailable => f.write_str("no connections available")?,
            Kind::Request => f.write_str("error sending request")?,
            Kind::InvalidHttpResponse => f.write_str("did not get a valid HTTP response")?,
            Kind::InvalidJsonResponse => f.write_str("invalid JSON response")?,
            Kind::MissingRequiredParameter(name) => {
                write!(f, "missing a required parameter: {name}")?;
            }
            Kind::EmptyRequiredParameter(name) => {
                write!(f, "required parameter is present but empty: {name}")?;
            }
            Kind::Api(status) => write!(f, "API returned an error ({status})")?,
            Kind::Builder => f.write_str("invalid transport configuration")?,
            Kind::Unknown => f.write_str("unknown transport error")?,
        }

        if let Some(ref host) = self.inner.host {
            write!(f, " [{}]", host.as_str())?;
        }

        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}

//! Request description and the outbound form handed to a sender

use bytes::Bytes;
use http::Method;
use serde::Serialize;
use url::Url;

use super::method::RequestMethod;
use crate::connection::{ConnectionRef, HostAddress};
use crate::error::{self, Result};
use crate::params::{self, Params};

/// What the caller wants sent: method, path, parameters, optional body and
/// optionally the connection to pin it to.
#[derive(Debug, Clone)]
pub struct Request {
    method: RequestMethod,
    path: String,
    params: Params,
    body: Option<String>,
    connection: Option<ConnectionRef>,
}

impl Request {
    #[must_use]
    pub fn new(method: RequestMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Params::new(),
            body: None,
            connection: None,
        }
    }

    #[must_use]
    pub fn head(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Head, path)
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Post, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Put, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(RequestMethod::Delete, path)
    }

    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Attach a raw text body. An empty string counts as no body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = (!body.is_empty()).then_some(body);
        self
    }

    /// Serialize `value` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns a `builder` error if `value` cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = serde_json::to_string(value).map_err(error::builder)?;
        Ok(self.with_body(body))
    }

    /// Pin the request to a specific connection instead of asking the pool.
    #[must_use]
    pub fn on_connection(mut self, connection: ConnectionRef) -> Self {
        self.connection = Some(connection);
        self
    }

    #[must_use]
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    #[must_use]
    pub fn connection(&self) -> Option<&ConnectionRef> {
        self.connection.as_ref()
    }

    /// Method that goes on the wire once the body is taken into account.
    #[must_use]
    pub fn wire_method(&self) -> RequestMethod {
        self.method.on_wire(self.body.is_some())
    }

    /// Full URL for this request against `host`.
    ///
    /// # Errors
    ///
    /// Returns a `builder` error if the parameters cannot be encoded.
    pub fn url_for(&self, host: &HostAddress) -> Result<Url> {
        let mut url = host.endpoint(&self.path);
        if !self.params.is_empty() {
            let query = params::to_query_string(&self.params)?;
            url.set_query(Some(&query));
        }
        Ok(url)
    }

    /// Resolve into the exact request a sender puts on the wire.
    ///
    /// # Errors
    ///
    /// Returns a `builder` error if the parameters cannot be encoded.
    pub fn to_outbound(&self, host: &HostAddress) -> Result<OutboundRequest> {
        let wire = self.wire_method();
        if wire != self.method {
            tracing::debug!(
                path = %self.path,
                "GET request carries a body, sending as POST"
            );
        }
        Ok(OutboundRequest {
            method: wire.to_http(),
            url: self.url_for(host)?,
            body: self.body.as_ref().map(|b| Bytes::copy_from_slice(b.as_bytes())),
        })
    }
}

/// Fully resolved request handed to an [`HttpSend`](super::HttpSend).
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Bytes>,
}

impl OutboundRequest {
    /// Content type to declare for the body, if there is one.
    #[must_use]
    pub fn content_type(&self) -> Option<&'static str> {
        self.body.as_ref().map(|_| "application/json")
    }
}

//! Request methods and their on-the-wire form

use std::fmt;
use std::str::FromStr;

use http::Method;

use crate::error::{self, Error};

/// Methods the transport knows how to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Head,
    Get,
    Post,
    Put,
    Delete,
}

impl RequestMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RequestMethod::Head => "HEAD",
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
        }
    }

    /// Method actually put on the wire.
    ///
    /// A GET carrying a body is sent as POST: intermediaries commonly drop
    /// or reject GET bodies, and the cluster treats both the same.
    #[must_use]
    pub fn on_wire(self, has_body: bool) -> RequestMethod {
        match self {
            RequestMethod::Get if has_body => RequestMethod::Post,
            other => other,
        }
    }

    #[must_use]
    pub fn to_http(self) -> Method {
        match self {
            RequestMethod::Head => Method::HEAD,
            RequestMethod::Get => Method::GET,
            RequestMethod::Post => Method::POST,
            RequestMethod::Put => Method::PUT,
            RequestMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HEAD" => Ok(RequestMethod::Head),
            "GET" => Ok(RequestMethod::Get),
            "POST" => Ok(RequestMethod::Post),
            "PUT" => Ok(RequestMethod::Put),
            "DELETE" => Ok(RequestMethod::Delete),
            other => Err(error::builder(format!("unsupported method '{other}'"))),
        }
    }
}

impl From<RequestMethod> for Method {
    fn from(method: RequestMethod) -> Self {
        method.to_http()
    }
}

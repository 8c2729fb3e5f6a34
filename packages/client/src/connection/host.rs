//! Host addresses
//!
//! A `HostAddress` is the validated endpoint a connection talks to. Parsing
//! accepts the forms found in configuration and in node-info responses:
//! `host:port`, `scheme://host:port[/prefix]`, `hostname/ip:port` and
//! `inet[/ip:port]`.

use std::fmt;

use url::Url;

use crate::config::Scheme;
use crate::error::{self, Result};

/// Endpoint of a single cluster node.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HostAddress {
    url: Url,
}

impl HostAddress {
    /// Parse a host string, applying `scheme` when the input carries none.
    ///
    /// # Errors
    ///
    /// Returns an `invalid-connection` error when the input does not parse
    /// or does not name a usable http(s) endpoint.
    pub fn parse(input: &str, scheme: Scheme) -> Result<Self> {
        let normalized = normalize(input);
        if normalized.is_empty() {
            return Err(error::invalid_connection(format!(
                "empty host address '{input}'"
            )));
        }

        let with_scheme = if normalized.contains("://") {
            normalized.to_string()
        } else {
            format!("{}://{}", scheme.as_str(), normalized)
        };

        let url = Url::parse(&with_scheme).map_err(|e| {
            error::invalid_connection(format!("cannot parse host '{input}': {e}"))
        })?;

        let host = HostAddress { url };
        host.validate()?;
        Ok(host)
    }

    /// Wrap an already parsed URL without validating it.
    ///
    /// The pool validates on `add`, so an unusable URL is rejected there.
    #[must_use]
    pub fn from_url(url: Url) -> Self {
        HostAddress { url }
    }

    /// Returns true if the URL names an http(s) endpoint with a host and port.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https")
            && !self.url.cannot_be_a_base()
            && self.url.host_str().is_some_and(|h| !h.is_empty())
            && self.url.port_or_known_default().is_some()
    }

    /// # Errors
    ///
    /// Returns an `invalid-connection` error when `is_valid` is false.
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(error::invalid_connection(format!(
                "host '{}' has no usable address",
                self.url
            ))
            .with_host(self.clone()))
        }
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.url.port_or_known_default()
    }

    /// `host:port` of this address.
    #[must_use]
    pub fn authority(&self) -> String {
        match (self.host(), self.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            _ => String::new(),
        }
    }

    /// URL for `path` relative to this host, keeping any path prefix.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> Url {
        let mut url = self.url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        let path = path.trim_start_matches('/');
        url.set_path(&format!("{prefix}/{path}"));
        url.set_query(None);
        url.set_fragment(None);
        url
    }
}

/// Strip the legacy node-info wrappers (`inet[...]`, `hostname/ip:port`).
fn normalize(input: &str) -> &str {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("inet[")
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed);

    if trimmed.contains("://") {
        return trimmed;
    }

    match trimmed.split_once('/') {
        // "hostname/10.0.0.1:9200" publishes the bound ip after the slash
        Some((name, rest)) if !name.contains(':') && rest.contains(':') => rest,
        Some(("", rest)) => rest,
        _ => trimmed,
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str().trim_end_matches('/'))
    }
}

impl fmt::Debug for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostAddress").field(&self.url.as_str()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_port_gets_the_transport_scheme() {
        let host = HostAddress::parse("10.0.0.1:9200", Scheme::Http).expect("valid");
        assert_eq!(host.scheme(), "http");
        assert_eq!(host.authority(), "10.0.0.1:9200");
        assert_eq!(host.to_string(), "http://10.0.0.1:9200");
    }

    #[test]
    fn explicit_scheme_wins() {
        let host = HostAddress::parse("https://search.local:9243", Scheme::Http).expect("valid");
        assert_eq!(host.scheme(), "https");
        assert_eq!(host.port(), Some(9243));
    }

    #[test]
    fn default_port_is_derived_from_scheme() {
        let host = HostAddress::parse("http://search.local", Scheme::Http).expect("valid");
        assert_eq!(host.authority(), "search.local:80");
    }

    #[test]
    fn legacy_node_info_forms_are_accepted() {
        let inet = HostAddress::parse("inet[/10.0.0.2:9200]", Scheme::Http).expect("valid");
        assert_eq!(inet.authority(), "10.0.0.2:9200");

        let named = HostAddress::parse("node-1/10.0.0.3:9201", Scheme::Http).expect("valid");
        assert_eq!(named.authority(), "10.0.0.3:9201");
    }

    #[test]
    fn path_prefix_is_kept_when_building_endpoints() {
        let host = HostAddress::parse("http://proxy.local:8080/es/", Scheme::Http).expect("valid");
        assert_eq!(
            host.endpoint("/_nodes/http").as_str(),
            "http://proxy.local:8080/es/_nodes/http"
        );
        let plain = HostAddress::parse("localhost:9200", Scheme::Http).expect("valid");
        assert_eq!(plain.endpoint("").as_str(), "http://localhost:9200/");
    }

    #[test]
    fn unusable_addresses_are_rejected() {
        assert!(HostAddress::parse("", Scheme::Http).is_err());
        assert!(HostAddress::parse("http://", Scheme::Http).is_err());
        let err = HostAddress::parse("ftp://files.local:21", Scheme::Http).expect_err("ftp");
        assert!(err.is_invalid_connection());

        let unix = HostAddress::from_url(Url::parse("unix:/tmp/es.sock").expect("url"));
        assert!(!unix.is_valid());
    }
}

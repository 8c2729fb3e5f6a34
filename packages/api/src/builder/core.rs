//! Core `Client` and `ClientBuilder`
//!
//! The client is a thin, cloneable wrapper over a [`Transport`]; every call
//! goes through the transport's pool, health tracking and retry policy.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use eskit_client::config::{Scheme, SelectorKind, TransportSettings};
use eskit_client::http::HttpSend;
use eskit_client::telemetry::TransportStatsSnapshot;
use eskit_client::{Result, Transport, TransportBuilder};

/// Cluster client.
#[derive(Clone)]
pub struct Client {
    pub(crate) transport: Transport,
}

impl Client {
    /// Client over `hosts` with default settings.
    ///
    /// # Errors
    ///
    /// Returns `invalid-connection` if a host is unusable.
    pub fn new<I, S>(hosts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ClientBuilder::new().hosts(hosts).build()
    }

    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    #[must_use]
    pub fn from_transport(transport: Transport) -> Self {
        Self { transport }
    }

    /// Register another host.
    ///
    /// # Errors
    ///
    /// Returns `invalid-connection` if the host is unusable.
    pub fn add_host(&self, host: &str) -> Result<()> {
        self.transport.add_host(host)
    }

    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    #[must_use]
    pub fn stats(&self) -> TransportStatsSnapshot {
        self.transport.stats().snapshot()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport)
            .finish()
    }
}

/// Fluent construction of a [`Client`].
#[must_use = "builders do nothing unless built"]
#[derive(Debug, Default)]
pub struct ClientBuilder {
    inner: TransportBuilder,
    settings: TransportSettings,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.inner = self.inner.scheme(scheme);
        self
    }

    pub fn host(mut self, host: impl AsRef<str>) -> Self {
        self.inner = self.inner.host(host);
        self
    }

    pub fn hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.inner = self.inner.hosts(hosts);
        self
    }

    /// Replace all transport settings at once.
    pub fn settings(mut self, settings: TransportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.settings = self.settings.with_max_retries(retries);
        self
    }

    pub fn retry_on_failure(mut self, enabled: bool) -> Self {
        self.settings = self.settings.with_retry_on_failure(enabled);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.settings = self.settings.with_request_timeout(timeout);
        self
    }

    pub fn reload_after(mut self, requests: u64) -> Self {
        self.settings = self.settings.with_reload_after(requests);
        self
    }

    pub fn sniff_on_start(mut self, enabled: bool) -> Self {
        self.settings = self.settings.with_sniff_on_start(enabled);
        self
    }

    pub fn selector(mut self, selector: SelectorKind) -> Self {
        self.settings = self.settings.with_selector(selector);
        self
    }

    /// Use a custom sender instead of the default hyper client.
    pub fn sender(mut self, sender: impl HttpSend + 'static) -> Self {
        self.inner = self.inner.shared_sender(Arc::new(sender));
        self
    }

    /// Dispatch on an existing tokio runtime.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.inner = self.inner.runtime(handle);
        self
    }

    /// # Errors
    ///
    /// Returns `invalid-connection` for an unusable host and `builder` for
    /// invalid settings.
    pub fn build(self) -> Result<Client> {
        let transport = self.inner.settings(self.settings).build()?;
        tracing::debug!(hosts = transport.hosts().len(), "client ready");
        Ok(Client { transport })
    }
}

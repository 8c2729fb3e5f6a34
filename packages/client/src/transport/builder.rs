//! Transport construction and validation

use std::sync::Arc;

use tokio::runtime::Handle;

use super::core::Transport;
use super::runtime::RuntimeHost;
use super::state::TransportCore;
use crate::config::{Scheme, TransportSettings};
use crate::connection::HostAddress;
use crate::error::Result;
use crate::http::{HttpSend, HyperSender};

/// Collects everything a [`Transport`] needs and validates it at `build()`.
#[must_use = "builders do nothing unless built"]
#[derive(Debug, Default)]
pub struct TransportBuilder {
    scheme: Scheme,
    hosts: Vec<String>,
    settings: TransportSettings,
    sender: Option<Arc<dyn HttpSend>>,
    runtime: Option<Handle>,
}

impl TransportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheme applied to hosts given without one, and used to pick the
    /// address field when sniffing.
    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn host(mut self, host: impl AsRef<str>) -> Self {
        self.hosts.push(host.as_ref().to_string());
        self
    }

    pub fn hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.hosts
            .extend(hosts.into_iter().map(|h| h.as_ref().to_string()));
        self
    }

    pub fn settings(mut self, settings: TransportSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the default hyper sender.
    pub fn sender(mut self, sender: impl HttpSend + 'static) -> Self {
        self.sender = Some(Arc::new(sender));
        self
    }

    pub fn shared_sender(mut self, sender: Arc<dyn HttpSend>) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Dispatch attempts on an existing runtime instead of starting one.
    ///
    /// The blocking API needs a multi-thread runtime here: it may be called
    /// from one of its workers, but a current-thread runtime is refused.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// # Errors
    ///
    /// - `builder` if the settings fail validation or no runtime can be started
    /// - `invalid-connection` if a host address is unusable
    pub fn build(self) -> Result<Transport> {
        self.settings.validate()?;

        let mut hosts: Vec<HostAddress> = Vec::with_capacity(self.hosts.len());
        for raw in &self.hosts {
            let host = HostAddress::parse(raw, self.scheme)?;
            if !hosts.contains(&host) {
                hosts.push(host);
            }
        }

        let runtime = match self.runtime {
            Some(handle) => RuntimeHost::borrowed(handle),
            None => RuntimeHost::owned()?,
        };
        let sender = self
            .sender
            .unwrap_or_else(|| Arc::new(HyperSender::new()));
        let sniff_on_start = self.settings.sniff_on_start;

        tracing::debug!(
            scheme = %self.scheme,
            hosts = hosts.len(),
            sender = sender.name(),
            "building transport"
        );

        let transport = Transport::from_parts(
            TransportCore::new(self.scheme, hosts, self.settings, sender),
            runtime,
        );

        if sniff_on_start {
            transport.sniff_connections_blocking()?;
        }
        Ok(transport)
    }
}

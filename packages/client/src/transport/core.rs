//! Transport: request orchestration over the connection pool
//!
//! Two layers. The async layer dispatches one attempt per call on the
//! transport's runtime and returns a cancellable [`RequestHandle`]. The
//! blocking layer waits on that attempt through a single-slot rendezvous
//! and loops over attempts according to the retry policy, asking the pool
//! for a fresh connection each time unless the request is pinned.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::bounded;

use super::builder::TransportBuilder;
use super::handle::RequestHandle;
use super::runtime::RuntimeHost;
use super::state::TransportCore;
use crate::config::{Scheme, TransportSettings};
use crate::connection::{Connection, ConnectionInfo, ConnectionRef, HostAddress};
use crate::error::{self, RendezvousClosed, Result};
use crate::http::{HttpResult, Request, Response};
use crate::retry::RetryPolicy;
use crate::telemetry::TransportStats;

/// Resilient HTTP transport for a cluster of interchangeable nodes.
///
/// Cheap to clone; clones share the pool, statistics and runtime.
#[derive(Clone)]
pub struct Transport {
    core: Arc<TransportCore>,
    runtime: Arc<RuntimeHost>,
}

impl Transport {
    pub(crate) fn from_parts(core: TransportCore, runtime: RuntimeHost) -> Self {
        Self {
            core: Arc::new(core),
            runtime: Arc::new(runtime),
        }
    }

    #[must_use]
    pub fn builder() -> TransportBuilder {
        TransportBuilder::new()
    }

    /// Transport over `hosts` with default settings.
    ///
    /// # Errors
    ///
    /// Returns `invalid-connection` if any host fails to parse, or a
    /// `builder` error if the runtime cannot be started.
    pub fn new<I, S>(scheme: Scheme, hosts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TransportBuilder::new().scheme(scheme).hosts(hosts).build()
    }

    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.core.scheme
    }

    #[must_use]
    pub fn settings(&self) -> &TransportSettings {
        &self.core.settings
    }

    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.core.policy
    }

    #[must_use]
    pub fn stats(&self) -> &TransportStats {
        &self.core.stats
    }

    /// Register a host by address string.
    ///
    /// # Errors
    ///
    /// Returns `invalid-connection` if the address is unusable.
    pub fn add_host(&self, host: &str) -> Result<()> {
        let host = HostAddress::parse(host, self.core.scheme)?;
        self.add_host_address(host)
    }

    /// # Errors
    ///
    /// Returns `invalid-connection` if the address is unusable.
    pub fn add_host_address(&self, host: HostAddress) -> Result<()> {
        let connection = Connection::new(host, self.core.settings.base_connection_timeout);
        self.add_connection(connection)
    }

    /// Register a prepared connection. Hosts already known are ignored.
    ///
    /// # Errors
    ///
    /// Returns `invalid-connection` if the connection's host is unusable.
    pub fn add_connection(&self, connection: Connection) -> Result<()> {
        self.core.add_connection(connection)
    }

    /// Current host list.
    #[must_use]
    pub fn hosts(&self) -> Vec<HostAddress> {
        self.core.hosts()
    }

    /// Health snapshot of every pooled connection.
    #[must_use]
    pub fn connections(&self) -> Vec<ConnectionInfo> {
        self.core.connection_infos()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.core.alive_count()
    }

    #[must_use]
    pub fn dead_count(&self) -> usize {
        self.core.dead_count()
    }

    /// Rebuild the pool from the current host list without sniffing.
    pub fn reload_connections(&self) {
        self.core.reload();
    }

    /// Next connection from the pool, sniffing first once the reload
    /// threshold has been reached. Blocks while a sniff runs.
    ///
    /// # Errors
    ///
    /// Returns `no-connections-available` when there are no hosts.
    pub fn get_connection(&self) -> Result<ConnectionRef> {
        let core = Arc::clone(&self.core);
        self.wait(async move { core.acquire().await })
    }

    /// Async form of [`get_connection`](Self::get_connection).
    ///
    /// # Errors
    ///
    /// Returns `no-connections-available` when there are no hosts.
    pub async fn get_connection_async(&self) -> Result<ConnectionRef> {
        self.core.acquire().await
    }

    /// Discover the cluster's nodes and rebuild the pool.
    ///
    /// Returns the discovered hosts; an empty list means discovery failed
    /// and the previous host list was kept.
    pub async fn sniff_connections(&self) -> Vec<HostAddress> {
        self.core.sniff_connections().await
    }

    /// Blocking form of [`sniff_connections`](Self::sniff_connections).
    ///
    /// # Errors
    ///
    /// Returns an error only if the calling thread may not block.
    pub fn sniff_connections_blocking(&self) -> Result<Vec<HostAddress>> {
        let core = Arc::clone(&self.core);
        self.wait(async move { Ok(core.sniff_connections().await) })
    }

    /// Dispatch a single attempt and return a handle to it.
    ///
    /// The outcome is a success for any well-formed HTTP response, whatever
    /// its status; transport failures are errors.
    pub fn request_async(&self, request: Request) -> RequestHandle {
        let core = Arc::clone(&self.core);
        RequestHandle::new(self.runtime.spawn(async move { core.execute(request).await }))
    }

    /// Dispatch a single attempt and hand its outcome to `callback`.
    pub fn request_with_callback<F>(&self, request: Request, callback: F) -> RequestHandle<()>
    where
        F: FnOnce(Result<HttpResult>) + Send + 'static,
    {
        let core = Arc::clone(&self.core);
        RequestHandle::new(self.runtime.spawn(async move {
            callback(core.execute(request).await);
            Ok::<_, error::Error>(())
        }))
    }

    /// Send `request`, blocking until it succeeds or fails for good.
    ///
    /// 2xx responses are returned. Non-2xx responses fail immediately as
    /// `api-error` and are never retried. Other failures are retried with a
    /// fresh connection while the retry policy allows, and the last failure
    /// is returned once it no longer does.
    ///
    /// # Errors
    ///
    /// The final failure as described above, or a `builder` error when
    /// called from a thread driving a current-thread runtime. Calls from a
    /// multi-thread runtime worker are allowed.
    pub fn request(&self, request: Request) -> Result<Response> {
        self.runtime.block(|| self.request_blocking(request))?
    }

    fn request_blocking(&self, request: Request) -> Result<Response> {
        let policy = &self.core.policy;
        let mut retries: u32 = 0;

        loop {
            let (tx, rx) = bounded(1);
            let _handle = self.request_with_callback(request.clone(), move |outcome| {
                let _ = tx.send(outcome);
            });
            let outcome = rx
                .recv()
                .map_err(|_| error::unknown(RendezvousClosed))
                .and_then(|attempt| attempt)
                .and_then(HttpResult::into_response);

            let error = match outcome {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            if !policy.should_retry(&error, retries) {
                if error.is_retryable() && policy.enabled {
                    tracing::warn!(
                        retries,
                        error = %error,
                        "max retries reached, giving up"
                    );
                }
                return Err(error);
            }

            retries += 1;
            self.core.stats.record_retry();
            tracing::warn!(
                retry = retries,
                max_retries = policy.max_retries,
                error = %error,
                "request failed, retrying"
            );

            let delay = policy.calculate_delay(retries);
            if delay > Duration::ZERO {
                std::thread::sleep(delay);
            }
        }
    }

    /// Run `future` on the transport runtime and wait for it.
    fn wait<T, F>(&self, future: F) -> Result<T>
    where
        T: Send + 'static,
        F: std::future::Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = bounded(1);
        self.runtime.spawn(async move {
            let _ = tx.send(future.await);
        });
        self.runtime
            .block(|| rx.recv().map_err(|_| error::unknown(RendezvousClosed)))??
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("scheme", &self.core.scheme)
            .field("hosts", &self.core.hosts())
            .field("sender", &self.core.sender)
            .finish_non_exhaustive()
    }
}

//! Shared transport state and single-attempt execution
//!
//! Host list, pool, request counter and pool generation sit behind one
//! mutex. The lock is never held across an await: every pool operation is
//! a short critical section, and network I/O happens outside it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::config::{Scheme, TransportSettings};
use crate::connection::selector;
use crate::connection::{Connection, ConnectionInfo, ConnectionPool, ConnectionRef, HostAddress};
use crate::error::{self, Result};
use crate::http::{HttpResult, HttpSend, Request};
use crate::retry::RetryPolicy;
use crate::sniff::Sniffer;
use crate::telemetry::TransportStats;

pub(crate) struct PoolState {
    pub(crate) hosts: Vec<HostAddress>,
    pub(crate) pool: ConnectionPool,
    /// Connections handed out since the last rebuild
    pub(crate) counter: u64,
    /// Bumped on every rebuild so stale health feedback can be recognised
    pub(crate) generation: u64,
}

/// Outcome of an attempt as it bears on the health of its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Health {
    Healthy,
    Dead,
}

pub(crate) struct TransportCore {
    pub(crate) scheme: Scheme,
    pub(crate) settings: TransportSettings,
    pub(crate) policy: RetryPolicy,
    pub(crate) sender: Arc<dyn HttpSend>,
    pub(crate) stats: TransportStats,
    state: Mutex<PoolState>,
    sniffing: AtomicBool,
}

impl TransportCore {
    pub(crate) fn new(
        scheme: Scheme,
        hosts: Vec<HostAddress>,
        settings: TransportSettings,
        sender: Arc<dyn HttpSend>,
    ) -> Self {
        let pool = ConnectionPool::with_selector(selector::from_kind(settings.selector));
        Self {
            scheme,
            policy: RetryPolicy::from_settings(&settings),
            settings,
            sender,
            stats: TransportStats::new(),
            state: Mutex::new(PoolState {
                hosts,
                pool,
                counter: 0,
                generation: 0,
            }),
            sniffing: AtomicBool::new(false),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the pool with fresh connections for the current host list.
    pub(crate) fn rebuild(&self, state: &mut PoolState) {
        let mut pool = ConnectionPool::with_selector(selector::from_kind(self.settings.selector));
        for host in &state.hosts {
            let connection = Connection::new(host.clone(), self.settings.base_connection_timeout);
            if let Err(e) = pool.add(connection) {
                tracing::warn!(host = %host, error = %e, "skipping unusable host");
            }
        }
        state.pool = pool;
        state.counter = 0;
        state.generation = state.generation.wrapping_add(1);
        self.stats.record_rebuild();
        tracing::debug!(
            connections = state.pool.len(),
            generation = state.generation,
            "rebuilt connection pool"
        );
    }

    /// Register a host, adding it to both the host list and the live pool.
    pub(crate) fn add_connection(&self, connection: Connection) -> Result<()> {
        let mut state = self.lock();
        if state.hosts.contains(connection.host()) {
            return Ok(());
        }
        let host = connection.host().clone();
        state.pool.add(connection)?;
        state.hosts.push(host);
        Ok(())
    }

    pub(crate) fn hosts(&self) -> Vec<HostAddress> {
        self.lock().hosts.clone()
    }

    pub(crate) fn connection_infos(&self) -> Vec<ConnectionInfo> {
        self.lock().pool.infos()
    }

    pub(crate) fn alive_count(&self) -> usize {
        self.lock().pool.alive_count()
    }

    pub(crate) fn dead_count(&self) -> usize {
        self.lock().pool.dead_count()
    }

    pub(crate) fn reload(&self) {
        let mut state = self.lock();
        self.rebuild(&mut state);
    }

    /// Take the next connection, building the pool first if it is empty.
    ///
    /// `count` decides whether the hand-out counts toward the reload
    /// threshold; the sniffer's own request does not.
    fn take_connection(&self, count: bool) -> Result<ConnectionRef> {
        let mut state = self.lock();
        if state.pool.is_empty() {
            self.rebuild(&mut state);
        }

        let revived = state.pool.revive_at(Instant::now());
        if revived > 0 {
            self.stats.record_resurrections(revived as u64);
        }

        let generation = state.generation;
        let reference = state
            .pool
            .select_alive()
            .map(|c| ConnectionRef::pooled(c.host().clone(), generation, c.id()))
            .ok_or_else(error::no_connections_available)?;
        if count {
            state.counter += 1;
        }
        Ok(reference)
    }

    /// Connection for the sniffer's discovery request.
    pub(crate) fn sniff_connection(&self) -> Result<ConnectionRef> {
        self.take_connection(false)
    }

    fn reload_due(&self) -> bool {
        let mut state = self.lock();
        if state.pool.is_empty() {
            self.rebuild(&mut state);
        }
        self.settings.reload_after != 0 && state.counter >= self.settings.reload_after
    }

    /// Next connection for a request, sniffing first once the reload
    /// threshold has been reached.
    pub(crate) async fn acquire(self: &Arc<Self>) -> Result<ConnectionRef> {
        if self.reload_due() {
            tracing::debug!(
                reload_after = self.settings.reload_after,
                "reload threshold reached, sniffing cluster"
            );
            self.sniff_connections().await;
        }
        self.take_connection(true)
    }

    /// Discover the cluster's nodes and rebuild the pool.
    ///
    /// A non-empty result replaces the host list; the pool is rebuilt
    /// either way. Returns the discovered hosts, or nothing if another
    /// sniff is already running.
    pub(crate) async fn sniff_connections(self: &Arc<Self>) -> Vec<HostAddress> {
        if self
            .sniffing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("sniff already in progress, skipping");
            return Vec::new();
        }
        let _guard = SniffGuard(&self.sniffing);

        let hosts = Sniffer::new(Arc::clone(self)).hosts().await;
        self.stats.record_sniff();

        let mut state = self.lock();
        if hosts.is_empty() {
            tracing::warn!("sniff returned no hosts, keeping current host list");
        } else {
            tracing::info!(hosts = hosts.len(), "sniffed cluster hosts");
            state.hosts.clone_from(&hosts);
        }
        self.rebuild(&mut state);
        hosts
    }

    /// One attempt on the pinned connection, or on the next one from the
    /// pool.
    pub(crate) async fn execute(self: &Arc<Self>, request: Request) -> Result<HttpResult> {
        let connection = match request.connection() {
            Some(pinned) => pinned.clone(),
            None => self.acquire().await?,
        };
        self.send_on(&connection, &request).await
    }

    /// Send `request` to `connection` and report the outcome's bearing on
    /// the connection's health.
    pub(crate) async fn send_on(
        &self,
        connection: &ConnectionRef,
        request: &Request,
    ) -> Result<HttpResult> {
        let host = connection.host().clone();
        let outbound = request.to_outbound(&host)?;

        tracing::debug!(
            method = %outbound.method,
            url = %outbound.url,
            sender = self.sender.name(),
            "sending request"
        );
        self.stats.record_request();

        let sent = tokio::time::timeout(self.settings.request_timeout, self.sender.send(outbound)).await;
        let outcome = match sent {
            Ok(Ok(raw)) => HttpResult::from_raw(raw, host.clone()),
            Ok(Err(e)) => Err(e.with_host(host.clone())),
            Err(_elapsed) => Err(error::timeout(host.clone())),
        };

        match &outcome {
            Ok(_) => {
                self.stats.record_success();
                self.report(connection, Health::Healthy);
            }
            Err(e) => {
                self.stats.record_failure();
                if e.is_connection_failure() {
                    tracing::warn!(host = %host, error = %e, "request failed on connection");
                    self.report(connection, Health::Dead);
                }
            }
        }
        outcome
    }

    fn report(&self, connection: &ConnectionRef, health: Health) {
        let Some(slot) = connection.slot() else {
            return;
        };
        let mut state = self.lock();
        if state.generation != slot.generation {
            tracing::trace!(
                host = %connection.host(),
                "ignoring health feedback for a rebuilt pool"
            );
            return;
        }
        let Some(target) = state.pool.get_mut(slot.id) else {
            return;
        };
        match health {
            Health::Healthy => target.mark_healthy(),
            Health::Dead => {
                target.mark_dead();
                self.stats.record_dead();
                tracing::warn!(
                    host = %target.host(),
                    failures = target.failures(),
                    backoff = ?target.current_timeout(),
                    "marked connection dead"
                );
            }
        }
    }
}

struct SniffGuard<'a>(&'a AtomicBool);

impl Drop for SniffGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

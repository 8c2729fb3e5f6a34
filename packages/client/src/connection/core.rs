//! Per-connection health state machine
//!
//! A connection is `Healthy` (no failures), `Degraded` (alive again after
//! failing) or `Dead` (waiting out its backoff window). The dead-since
//! timestamp is set exactly while the connection is dead, and the failure
//! count only drops back to zero on `mark_healthy`.

use std::fmt;
use std::time::{Duration, Instant};

use super::host::HostAddress;

/// Largest exponent applied to the base timeout.
const MAX_BACKOFF_EXPONENT: u32 = 31;

/// Observable health of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Degraded,
    Dead,
}

/// One candidate node plus its observed health.
#[derive(Debug, Clone)]
pub struct Connection {
    id: usize,
    host: HostAddress,
    failures: u32,
    dead_since: Option<Instant>,
    base_timeout: Duration,
}

impl Connection {
    #[must_use]
    pub fn new(host: HostAddress, base_timeout: Duration) -> Self {
        Self {
            id: 0,
            host,
            failures: 0,
            dead_since: None,
            base_timeout,
        }
    }

    /// Position of this connection inside its pool.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    #[must_use]
    pub fn host(&self) -> &HostAddress {
        &self.host
    }

    #[must_use]
    pub fn failures(&self) -> u32 {
        self.failures
    }

    #[must_use]
    pub fn dead_since(&self) -> Option<Instant> {
        self.dead_since
    }

    #[must_use]
    pub fn base_timeout(&self) -> Duration {
        self.base_timeout
    }

    /// Returns true if the host URL names a usable endpoint
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.host.is_valid()
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead_since.is_some()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    #[must_use]
    pub fn state(&self) -> HealthState {
        match (self.dead_since, self.failures) {
            (Some(_), _) => HealthState::Dead,
            (None, 0) => HealthState::Healthy,
            (None, _) => HealthState::Degraded,
        }
    }

    /// Current resurrection timeout: `base × 2^(failures − 1)`.
    ///
    /// Only meaningful once the connection has failed; with no failures the
    /// base timeout is returned.
    #[must_use]
    pub fn current_timeout(&self) -> Duration {
        let exponent = self
            .failures
            .saturating_sub(1)
            .min(MAX_BACKOFF_EXPONENT);
        self.base_timeout.saturating_mul(1u32 << exponent)
    }

    /// Instant after which the connection becomes resurrectable.
    #[must_use]
    pub fn resurrection_deadline(&self) -> Option<Instant> {
        self.dead_since
            .and_then(|since| since.checked_add(self.current_timeout()))
    }

    /// Returns true if the connection has been dead strictly longer than its
    /// current timeout.
    #[must_use]
    pub fn is_resurrectable(&self) -> bool {
        self.is_resurrectable_at(Instant::now())
    }

    #[must_use]
    pub fn is_resurrectable_at(&self, now: Instant) -> bool {
        self.resurrection_deadline()
            .is_some_and(|deadline| now > deadline)
    }

    /// Marks the connection dead now and counts the failure.
    pub fn mark_dead(&mut self) {
        self.mark_dead_at(Instant::now());
    }

    pub fn mark_dead_at(&mut self, at: Instant) {
        self.dead_since = Some(at);
        self.failures = self.failures.saturating_add(1);
    }

    /// Makes the connection eligible for selection again, keeping its
    /// failure count.
    pub fn mark_alive(&mut self) {
        self.dead_since = None;
    }

    /// Records a successful request on this connection.
    pub fn mark_healthy(&mut self) {
        self.dead_since = None;
        self.failures = 0;
    }

    /// Brings a dead connection back if its window elapsed or `force` is set.
    ///
    /// Returns true if the connection went from dead to alive.
    pub fn resurrect(&mut self, force: bool) -> bool {
        self.resurrect_at(Instant::now(), force)
    }

    pub fn resurrect_at(&mut self, now: Instant, force: bool) -> bool {
        if self.is_dead() && (force || self.is_resurrectable_at(now)) {
            self.mark_alive();
            true
        } else {
            false
        }
    }

    /// Point-in-time view for diagnostics.
    #[must_use]
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            host: self.host.clone(),
            state: self.state(),
            failures: self.failures,
            dead_for: self.dead_since.map(|since| since.elapsed()),
        }
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host
    }
}

impl Eq for Connection {}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Connection host: {} ", self.host)?;
        match self.dead_since {
            Some(since) => write!(
                f,
                "dead for {:?}, {} failures",
                since.elapsed(),
                self.failures
            )?,
            None => f.write_str("alive")?,
        }
        f.write_str(">")
    }
}

/// Snapshot of a connection's health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub host: HostAddress,
    pub state: HealthState,
    pub failures: u32,
    pub dead_for: Option<Duration>,
}

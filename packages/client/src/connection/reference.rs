//! References to pooled or detached connections

use std::fmt;

use super::host::HostAddress;

/// Handle to a connection handed out by the transport.
///
/// It names the host plus the pool generation and slot the connection was
/// taken from, so the outcome of a request can be reported back to the
/// right connection. Health feedback for a generation that has since been
/// rebuilt is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRef {
    host: HostAddress,
    slot: Option<PoolSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PoolSlot {
    pub(crate) generation: u64,
    pub(crate) id: usize,
}

impl ConnectionRef {
    pub(crate) fn pooled(host: HostAddress, generation: u64, id: usize) -> Self {
        Self {
            host,
            slot: Some(PoolSlot { generation, id }),
        }
    }

    /// Targets `host` directly, outside the pool; no health is tracked.
    #[must_use]
    pub fn detached(host: HostAddress) -> Self {
        Self { host, slot: None }
    }

    #[must_use]
    pub fn host(&self) -> &HostAddress {
        &self.host
    }

    /// Returns true if the connection was taken from the pool.
    #[must_use]
    pub fn is_pooled(&self) -> bool {
        self.slot.is_some()
    }

    pub(crate) fn slot(&self) -> Option<PoolSlot> {
        self.slot
    }
}

impl fmt::Display for ConnectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            Some(slot) => write!(f, "{} (#{} gen {})", self.host, slot.id, slot.generation),
            None => write!(f, "{} (detached)", self.host),
        }
    }
}

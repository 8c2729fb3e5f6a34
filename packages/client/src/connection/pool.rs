//! Connection pool with dead-node resurrection
//!
//! The pool owns every connection in insertion order and hands out alive
//! ones through its selector. Dead connections come back once their backoff
//! window elapses, and if every connection is dead one is forced back so a
//! non-empty pool always yields a connection.

use std::time::Instant;

use super::core::{Connection, ConnectionInfo};
use super::selector::{RoundRobinSelector, Selector};
use crate::error::{self, Result};

#[derive(Debug)]
pub struct ConnectionPool {
    connections: Vec<Connection>,
    selector: Box<dyn Selector>,
}

impl Default for ConnectionPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionPool {
    /// Empty pool with round-robin selection.
    #[must_use]
    pub fn new() -> Self {
        Self::with_selector(Box::new(RoundRobinSelector::default()))
    }

    #[must_use]
    pub fn with_selector(selector: Box<dyn Selector>) -> Self {
        Self {
            connections: Vec::new(),
            selector,
        }
    }

    /// Appends a connection after validating its host.
    ///
    /// # Errors
    ///
    /// Returns an `invalid-connection` error, leaving the pool untouched,
    /// when the host has no usable address.
    pub fn add(&mut self, mut connection: Connection) -> Result<()> {
        if !connection.is_valid() {
            return Err(error::invalid_connection(format!(
                "attempted to add a connection with no valid URL: {connection}"
            ))
            .with_host(connection.host().clone()));
        }
        connection.set_id(self.connections.len());
        self.connections.push(connection);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    #[must_use]
    pub fn get(&self, id: usize) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut Connection> {
        self.connections.get_mut(id)
    }

    pub fn alive_connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(|c| c.is_alive())
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive_connections().count()
    }

    /// Dead connections ordered by the time they died, oldest first.
    #[must_use]
    pub fn dead_connections(&self) -> Vec<&Connection> {
        let mut dead: Vec<&Connection> =
            self.connections.iter().filter(|c| c.is_dead()).collect();
        dead.sort_by_key(|c| c.dead_since());
        dead
    }

    #[must_use]
    pub fn dead_count(&self) -> usize {
        self.connections.len() - self.alive_count()
    }

    #[must_use]
    pub fn infos(&self) -> Vec<ConnectionInfo> {
        self.connections.iter().map(Connection::info).collect()
    }

    /// Resurrects every dead connection whose window has elapsed.
    ///
    /// Dead connections are walked in order of resurrection deadline, so the
    /// walk stops at the first one still inside its window: every later one
    /// has a later deadline. Returns the number of resurrected connections.
    pub fn resurrect_connections(&mut self, now: Instant) -> usize {
        let mut candidates: Vec<(Instant, usize)> = self
            .connections
            .iter()
            .enumerate()
            .filter_map(|(idx, c)| c.resurrection_deadline().map(|d| (d, idx)))
            .collect();
        candidates.sort_unstable();

        let mut resurrected = 0;
        for (_, idx) in candidates {
            let Some(connection) = self.connections.get_mut(idx) else {
                continue;
            };
            if !connection.resurrect_at(now, false) {
                break;
            }
            tracing::info!(
                host = %connection.host(),
                failures = connection.failures(),
                "resurrected dead connection"
            );
            resurrected += 1;
        }
        resurrected
    }

    /// Forces the least-failed dead connection back, oldest death first on
    /// ties. Returns its id, or None if nothing is dead.
    pub fn force_resurrect(&mut self) -> Option<usize> {
        let idx = self
            .connections
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_dead())
            .min_by_key(|(_, c)| (c.failures(), c.dead_since()))
            .map(|(idx, _)| idx)?;

        let connection = self.connections.get_mut(idx)?;
        connection.resurrect(true);
        tracing::warn!(
            host = %connection.host(),
            failures = connection.failures(),
            "all connections dead, forcing resurrection"
        );
        Some(idx)
    }

    /// Resurrects every connection that is due, then forces one back if
    /// none is alive. Returns how many connections came back.
    pub fn revive_at(&mut self, now: Instant) -> usize {
        let mut revived = self.resurrect_connections(now);
        if !self.connections.is_empty() && self.alive_count() == 0 && self.force_resurrect().is_some() {
            revived += 1;
        }
        revived
    }

    /// Returns the next connection to use, or None only for an empty pool.
    pub fn next_connection(&mut self) -> Option<&Connection> {
        self.next_connection_at(Instant::now())
    }

    pub fn next_connection_at(&mut self, now: Instant) -> Option<&Connection> {
        self.revive_at(now);
        self.select_alive()
    }

    /// Asks the selector for one of the currently alive connections without
    /// resurrecting anything.
    pub fn select_alive(&mut self) -> Option<&Connection> {
        let alive: Vec<usize> = self
            .connections
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_alive())
            .map(|(idx, _)| idx)
            .collect();

        let pick = self.selector.select(alive.len());
        let idx = alive.get(pick).or_else(|| alive.first()).copied()?;
        self.connections.get(idx)
    }
}

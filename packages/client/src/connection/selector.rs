//! Selection strategies over the alive connections

use std::fmt;

use fastrand::Rng;

use crate::config::SelectorKind;

/// Picks the next alive connection.
///
/// `alive` is recomputed by the pool on every call, so implementations must
/// cope with it shrinking or growing between calls. The returned index must
/// lie in `[0, alive)` whenever `alive > 0`.
pub trait Selector: Send + fmt::Debug {
    fn select(&mut self, alive: usize) -> usize;
}

/// Cycles through the alive connections in order.
#[derive(Debug, Default, Clone)]
pub struct RoundRobinSelector {
    current: usize,
}

impl Selector for RoundRobinSelector {
    fn select(&mut self, alive: usize) -> usize {
        if self.current >= alive {
            self.current = 0;
        }
        let result = self.current;
        self.current += 1;
        result
    }
}

/// Picks a uniformly random alive connection.
#[derive(Debug)]
pub struct RandomSelector {
    rng: Rng,
}

impl RandomSelector {
    #[must_use]
    pub fn new() -> Self {
        Self { rng: Rng::new() }
    }

    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Rng::with_seed(seed),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl Selector for RandomSelector {
    fn select(&mut self, alive: usize) -> usize {
        if alive == 0 {
            return 0;
        }
        self.rng.usize(..alive)
    }
}

/// Build the selector a fresh pool should use.
#[must_use]
pub fn from_kind(kind: SelectorKind) -> Box<dyn Selector> {
    match kind {
        SelectorKind::RoundRobin => Box::new(RoundRobinSelector::default()),
        SelectorKind::Random => Box::new(RandomSelector::new()),
    }
}

//! Connections, their health and the pool that selects among them

pub mod core;
pub mod host;
pub mod pool;
pub mod reference;
pub mod selector;

pub use self::core::{Connection, ConnectionInfo, HealthState};
pub use host::HostAddress;
pub use pool::ConnectionPool;
pub use reference::ConnectionRef;
pub use selector::{RandomSelector, RoundRobinSelector, Selector};

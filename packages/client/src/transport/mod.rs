//! Request orchestration: connection selection, health feedback, reload,
//! sniffing and retries

pub mod builder;
pub mod core;
pub mod handle;
mod runtime;
pub(crate) mod state;

pub use self::core::Transport;
pub use builder::TransportBuilder;
pub use handle::RequestHandle;

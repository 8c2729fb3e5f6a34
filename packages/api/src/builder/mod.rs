//! Client API modules
//!
//! `core` holds the client and its builder, `methods` the request calls.

pub mod core;
pub mod methods;

pub use self::core::{Client, ClientBuilder};

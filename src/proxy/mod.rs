//! Proxy module
//!
//! This module implements the forwarding side of the application: one
//! listener per rule, one relay per accepted connection, and the manager
//! that starts, stops and reloads the whole rule set.

mod forwarder;
mod handler;
mod listener;
mod manager;

pub use forwarder::{proxy_data, Direction, TransferStats, BUFFER_SIZE};
pub use handler::handle_connection;
pub use listener::{spawn_listener, ListenerHandle, ListenerState};
pub use manager::ProxyManager;

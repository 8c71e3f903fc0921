//! tcpproxy: configuration-driven TCP forwarder
//!
//! Every configured rule binds a local listening address and relays each
//! accepted connection to a fixed destination, byte for byte, in both
//! directions. The whole rule set can be replaced at runtime.
//!
//! # Main Features
//!
//! - Any number of independent forwarding rules, each with its own listener
//! - Full-duplex relaying with half-close propagation
//! - YAML or JSON rule files found on the platform's configuration paths
//! - Stop-and-replace reload of the rule set
//!
//! # Example
//!
//! ```no_run
//! use tcpproxy::{ProxyManager, Result};
//! use tcpproxy::config::{Rule, RuleSet};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let rules = RuleSet::new(vec![
//!         Rule::new("web", ":8080", "127.0.0.1:80"),
//!     ])?;
//!
//!     let manager = ProxyManager::new(rules);
//!     manager.start().await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     manager.stop_all().await;
//!
//!     Ok(())
//! }
//! ```

// Public modules
pub mod common;
pub mod config;
pub mod proxy;

// Re-export commonly used structures and functions for convenience
pub use common::{init_logger, ProxyError, Result};
pub use config::{Rule, RuleSet};
pub use proxy::{ListenerState, ProxyManager};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

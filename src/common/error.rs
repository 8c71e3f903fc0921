//! Error handling module
//!
//! This module defines the error types and result type aliases used in the application.

use thiserror::Error;
use std::io;

/// TCP proxy error type
#[derive(Error, Debug)]
pub enum ProxyError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No forwarding rules configured
    #[error("no proxies setting: the rule set is empty")]
    EmptyRuleSet,

    /// Two rules in one rule set share a name
    #[error("Duplicate rule name: '{0}'")]
    DuplicateRule(String),

    /// Listener could not be bound for a rule
    #[error("Error listening on {addr} for proxy '{name}': {source}")]
    Bind {
        /// Rule name
        name: String,
        /// Listen address as configured
        addr: String,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Destination could not be dialed
    #[error("Failed to connect to destination {addr}: {source}")]
    Dial {
        /// Destination address as configured
        addr: String,
        /// Underlying cause
        #[source]
        source: io::Error,
    },
}

impl From<config::ConfigError> for ProxyError {
    fn from(err: config::ConfigError) -> Self {
        ProxyError::Config(err.to_string())
    }
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `ProxyError`.
pub type Result<T> = std::result::Result<T, ProxyError>;

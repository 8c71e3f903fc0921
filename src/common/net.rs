//! Network utility functions
//!
//! Rule addresses are kept as `host:port` strings and resolved only when a
//! listener binds or a relay dials. The one rewrite applied here is the
//! `:port` shorthand, which the system resolver does not understand.

/// Host used for a `:port` listen address
const LISTEN_ALL_HOST: &str = "0.0.0.0";

/// Host used for a `:port` destination address
const LOCAL_HOST: &str = "127.0.0.1";

/// Expand `:port` to a bindable address on all interfaces
///
/// # Arguments
///
/// * `addr` - Listen address as written in the rule
pub fn listen_addr(addr: &str) -> String {
    expand_port_only(addr, LISTEN_ALL_HOST)
}

/// Expand `:port` to a dialable address on the local host
///
/// # Arguments
///
/// * `addr` - Destination address as written in the rule
pub fn dial_addr(addr: &str) -> String {
    expand_port_only(addr, LOCAL_HOST)
}

fn expand_port_only(addr: &str, host: &str) -> String {
    let trimmed = addr.trim();
    match trimmed.strip_prefix(':') {
        Some(port) => format!("{}:{}", host, port),
        None => trimmed.to_string(),
    }
}

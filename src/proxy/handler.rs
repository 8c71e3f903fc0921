//! Connection handler module
//!
//! This module handles individual client connections: dial the rule's
//! destination, then relay until both directions are done.

use log::debug;
use tokio::net::TcpStream;

use crate::common::net::dial_addr;
use crate::common::{ProxyError, Result};
use super::forwarder::{proxy_data, TransferStats};

/// Handle a single client connection
///
/// A failed dial is terminal for this connection: the client stream is
/// dropped (closed) without any bytes exchanged, and nothing is retried.
///
/// # Parameters
///
/// * `client_stream` - Accepted client TCP stream
/// * `destination` - Destination address as configured on the rule
///
/// # Returns
///
/// Byte counts for the relay, or a `Dial` error.
pub async fn handle_connection(
    client_stream: TcpStream,
    destination: &str,
) -> Result<TransferStats> {
    let target_stream = TcpStream::connect(dial_addr(destination))
        .await
        .map_err(|source| ProxyError::Dial {
            addr: destination.to_string(),
            source,
        })?;

    client_stream.set_nodelay(true).ok();
    target_stream.set_nodelay(true).ok();

    if let (Ok(client), Ok(target)) = (client_stream.peer_addr(), target_stream.peer_addr()) {
        debug!("Relaying {} <-> {}", client, target);
    }

    Ok(proxy_data(client_stream, target_stream).await)
}

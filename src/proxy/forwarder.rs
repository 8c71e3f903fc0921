//! Data forwarding module
//!
//! This module copies bytes between two established streams, one task per
//! direction, with half-close propagation: when one direction reaches
//! end-of-stream the matching write side is shut down and the other
//! direction keeps running until it finishes too.

use log::debug;
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read buffer size per direction
pub const BUFFER_SIZE: usize = 8192;

/// Direction of a copy task, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Client to destination
    ClientToTarget,
    /// Destination to client
    TargetToClient,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientToTarget => write!(f, "Client to target"),
            Self::TargetToClient => write!(f, "Target to client"),
        }
    }
}

/// Bytes moved by one relay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Bytes copied from the client to the destination
    pub client_to_target: u64,
    /// Bytes copied from the destination to the client
    pub target_to_client: u64,
}

/// Forward data between two streams
///
/// Both directions run as separate tasks. The function returns once both
/// have finished, at which point both streams have been dropped.
///
/// # Parameters
///
/// * `client_stream` - Accepted client stream
/// * `target_stream` - Dialed destination stream
///
/// # Returns
///
/// Byte counts for each direction.
pub async fn proxy_data<C, T>(client_stream: C, target_stream: T) -> TransferStats
where
    C: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (client_reader, client_writer) = tokio::io::split(client_stream);
    let (target_reader, target_writer) = tokio::io::split(target_stream);

    let client_to_target = tokio::spawn(copy_half(
        client_reader,
        target_writer,
        Direction::ClientToTarget,
    ));
    let target_to_client = tokio::spawn(copy_half(
        target_reader,
        client_writer,
        Direction::TargetToClient,
    ));

    // Wait for both directions; a finished side has already half-closed its peer
    let (up, down) = tokio::join!(client_to_target, target_to_client);

    TransferStats {
        client_to_target: up.unwrap_or_else(|e| {
            debug!("{} task failed: {}", Direction::ClientToTarget, e);
            0
        }),
        target_to_client: down.unwrap_or_else(|e| {
            debug!("{} task failed: {}", Direction::TargetToClient, e);
            0
        }),
    }
}

/// Copy one direction until end-of-stream or error, then shut down the writer
async fn copy_half<R, W>(mut reader: R, mut writer: W, direction: Direction) -> u64
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total_bytes: u64 = 0;

    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => {
                if let Err(e) = writer.write_all(&buffer[..n]).await {
                    debug!("{} write failed: {}", direction, e);
                    break;
                }
                total_bytes += n as u64;
            }
            Err(e) => {
                debug!("{} read failed: {}", direction, e);
                break;
            }
        }
    }

    // Half-close: the peer sees end-of-input, the opposite direction stays open
    if let Err(e) = writer.shutdown().await {
        debug!("{} shutdown failed: {}", direction, e);
    }

    debug!("{} transferred {} bytes total", direction, total_bytes);
    total_bytes
}

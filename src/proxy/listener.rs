//! Rule listener module
//!
//! One listener task per rule: bind the rule's listen address, accept
//! connections until cancelled, and hand each connection to its own relay
//! task. Cancelling the token is the only way to stop the loop; the
//! listening socket is closed (dropped) as soon as the loop exits.

use log::{debug, error, info};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::common::net::listen_addr;
use crate::common::{ProxyError, Result};
use crate::config::Rule;
use super::handler::handle_connection;

/// Pause after a failed accept that was not caused by cancellation
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Lifecycle state of a rule's listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Bind in progress
    Binding,
    /// Bound to the given local address and accepting connections
    Accepting(SocketAddr),
    /// Listening socket released, either after cancellation or a failed bind
    Closed,
}

impl ListenerState {
    /// Local address while accepting
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match self {
            Self::Accepting(addr) => Some(*addr),
            _ => None,
        }
    }
}

/// Handle to a running rule listener
///
/// Owned by the proxy manager, keyed by rule name.
#[derive(Debug)]
pub struct ListenerHandle {
    cancel: CancellationToken,
    state: watch::Receiver<ListenerState>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Signal the listener to close its socket and leave the accept loop
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Latest published state
    pub fn state(&self) -> ListenerState {
        *self.state.borrow()
    }

    /// A receiver that observes future state changes
    pub fn subscribe(&self) -> watch::Receiver<ListenerState> {
        self.state.clone()
    }

    /// Wait until the listener task has finished and released its socket
    pub async fn closed(self) {
        if let Err(e) = self.task.await {
            error!("Listener task error: {}", e);
        }
    }
}

/// Spawn the listener task for a rule
///
/// Returns immediately; binding happens inside the task. A bind failure is
/// reported and leaves the handle in [`ListenerState::Closed`].
pub fn spawn_listener(rule: Rule) -> ListenerHandle {
    let cancel = CancellationToken::new();
    let (state_tx, state_rx) = watch::channel(ListenerState::Binding);

    let token = cancel.clone();
    let task = tokio::spawn(async move {
        if let Err(e) = run_listener(&rule, token, &state_tx).await {
            error!("{}", e);
        }
        state_tx.send_replace(ListenerState::Closed);
    });

    ListenerHandle {
        cancel,
        state: state_rx,
        task,
    }
}

/// Bind the rule's listen address
async fn bind(rule: &Rule) -> Result<(TcpListener, SocketAddr)> {
    let bind_err = |source| ProxyError::Bind {
        name: rule.name().to_string(),
        addr: rule.listen().to_string(),
        source,
    };

    let listener = TcpListener::bind(listen_addr(rule.listen()))
        .await
        .map_err(bind_err)?;
    let local_addr = listener.local_addr().map_err(bind_err)?;

    Ok((listener, local_addr))
}

/// Run the accept loop for a rule until `cancel` fires
///
/// # Parameters
///
/// * `rule` - The forwarding rule
/// * `cancel` - Cancellation token owned by the proxy manager
/// * `state` - Where lifecycle transitions are published
///
/// # Errors
///
/// Returns a `Bind` error if the listen address cannot be bound. Accept
/// errors are reported and never end the loop.
async fn run_listener(
    rule: &Rule,
    cancel: CancellationToken,
    state: &watch::Sender<ListenerState>,
) -> Result<()> {
    info!(
        "Starting proxy '{}': {} -> {}",
        rule.name(),
        rule.listen(),
        rule.destination()
    );

    // Name resolution can be slow; a cancelled rule must not wait for it
    let (listener, local_addr) = tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            info!("Proxy '{}' cancelled before binding {}", rule.name(), rule.listen());
            return Ok(());
        }

        bound = bind(rule) => bound?,
    };
    state.send_replace(ListenerState::Accepting(local_addr));
    debug!("Proxy '{}' listening on {}", rule.name(), local_addr);

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            accepted = listener.accept() => {
                match accepted {
                    Ok((client_stream, client_addr)) => {
                        debug!("Accepted connection from {} for proxy '{}'", client_addr, rule.name());

                        let name = rule.name().to_string();
                        let destination = rule.destination().to_string();
                        tokio::spawn(async move {
                            match handle_connection(client_stream, &destination).await {
                                Ok(stats) => debug!(
                                    "Proxy '{}' connection from {} closed ({} bytes up, {} bytes down)",
                                    name, client_addr, stats.client_to_target, stats.target_to_client
                                ),
                                Err(e) => error!("Proxy '{}': {}", name, e),
                            }
                        });
                    }
                    Err(e) => {
                        if cancel.is_cancelled() {
                            break;
                        }
                        error!("Error accepting connection for proxy '{}': {}", rule.name(), e);

                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(ACCEPT_ERROR_BACKOFF) => {}
                        }
                    }
                }
            }
        }
    }

    drop(listener);
    info!("Stopping proxy '{}' ({})", rule.name(), rule.listen());
    Ok(())
}

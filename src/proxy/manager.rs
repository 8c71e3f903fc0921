//! Proxy manager
//!
//! The [`ProxyManager`] owns the active rule set and one listener handle per
//! running rule. It is the only place rules are started, stopped or
//! replaced.
//!
//! Locking:
//!
//! - `active_config` (reader/writer): read by [`ProxyManager::start`],
//!   replaced by [`ProxyManager::reload`].
//! - `listeners` (mutex): filled by `start`, drained by
//!   [`ProxyManager::stop_all`]. It is held while `stop_all` waits for the
//!   listener tasks to exit, so no `start` can rebind before the previous
//!   sockets are gone.
//! - `reload_lock` (mutex): serialises whole reloads so two of them cannot
//!   interleave their stop and start phases.
//!
//! `start` takes `active_config` before `listeners`; nothing takes them in
//! the opposite order.

use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::common::{ProxyError, Result};
use crate::config::RuleSet;
use super::listener::{spawn_listener, ListenerHandle, ListenerState};

/// Owner of the running rule set
#[derive(Debug)]
pub struct ProxyManager {
    /// Rule set currently considered authoritative
    active_config: RwLock<Arc<RuleSet>>,
    /// Running listeners keyed by rule name
    listeners: Mutex<HashMap<String, ListenerHandle>>,
    /// Held for the whole of a reload
    reload_lock: Mutex<()>,
}

impl ProxyManager {
    /// Create a manager for `rules`; nothing runs until [`start`](Self::start)
    pub fn new(rules: RuleSet) -> Self {
        Self {
            active_config: RwLock::new(Arc::new(rules)),
            listeners: Mutex::new(HashMap::new()),
            reload_lock: Mutex::new(()),
        }
    }

    /// Start a listener for every rule in the active rule set
    ///
    /// Listeners bind asynchronously; a rule that fails to bind is reported
    /// and simply does not run, without affecting the others. A rule that
    /// is already running is stopped first so a name never maps to two
    /// listeners.
    ///
    /// # Errors
    ///
    /// [`ProxyError::EmptyRuleSet`] if there are no rules. Callers should
    /// treat this as fatal.
    pub async fn start(&self) -> Result<()> {
        let config = self.active_config.read().await;

        if config.is_empty() {
            error!("no proxies setting");
            return Err(ProxyError::EmptyRuleSet);
        }

        info!("Starting proxies...");
        let mut listeners = self.listeners.lock().await;

        for rule in config.iter() {
            if let Some(previous) = listeners.remove(rule.name()) {
                warn!("Proxy '{}' is already running, restarting it", rule.name());
                previous.cancel();
                previous.closed().await;
            }

            listeners.insert(rule.name().to_string(), spawn_listener(rule.clone()));
        }

        Ok(())
    }

    /// Cancel every running listener and wait for their sockets to close
    ///
    /// In-flight connections are left to finish on their own. Calling this
    /// with nothing running is a no-op.
    pub async fn stop_all(&self) {
        let mut listeners = self.listeners.lock().await;

        if listeners.is_empty() {
            debug!("No active proxies to stop");
            return;
        }

        info!("Stopping all active proxies...");
        let stopping: Vec<(String, ListenerHandle)> = listeners.drain().collect();

        for (_, handle) in &stopping {
            handle.cancel();
        }

        for (name, handle) in stopping {
            handle.closed().await;
            debug!("Proxy '{}' released its listener", name);
        }
    }

    /// Replace the rule set: stop everything, swap, start the new rules
    ///
    /// # Errors
    ///
    /// Whatever [`start`](Self::start) returns for the new rule set. The old
    /// rules have already been stopped at that point.
    pub async fn reload(&self, rules: RuleSet) -> Result<()> {
        let _reload = self.reload_lock.lock().await;

        info!("Reloading configuration with {} rule(s)", rules.len());
        self.stop_all().await;

        {
            let mut config = self.active_config.write().await;
            *config = Arc::new(rules);
        }

        self.start().await
    }

    /// Snapshot of the active rule set
    pub async fn active_rules(&self) -> Arc<RuleSet> {
        Arc::clone(&*self.active_config.read().await)
    }

    /// Names of rules that currently hold a listener handle, sorted
    pub async fn running_rules(&self) -> Vec<String> {
        let listeners = self.listeners.lock().await;
        let mut names: Vec<String> = listeners.keys().cloned().collect();
        names.sort();
        names
    }

    /// Latest listener state of a rule, `None` if it is not running
    pub async fn listener_state(&self, name: &str) -> Option<ListenerState> {
        let listeners = self.listeners.lock().await;
        listeners.get(name).map(ListenerHandle::state)
    }

    /// Wait until a rule's listener has either bound or given up
    ///
    /// Returns `None` if the rule is not running.
    pub async fn wait_for_listener(&self, name: &str) -> Option<ListenerState> {
        let mut state = {
            let listeners = self.listeners.lock().await;
            listeners.get(name)?.subscribe()
        };

        let settled = state
            .wait_for(|s| *s != ListenerState::Binding)
            .await
            .map(|current| *current)
            .ok();
        Some(settled.unwrap_or_else(|| *state.borrow()))
    }
}

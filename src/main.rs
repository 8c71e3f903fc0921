//! tcpproxy Command Line Tool
//!
//! This binary loads the forwarding rules, starts one listener per rule and
//! keeps running until interrupted. On Unix, `SIGHUP` reloads the rule file.

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use tcpproxy::common::{init_logger, ProxyError, Result};
use tcpproxy::config::{defaults, load_from_file, load_rule_set, CONFIG_FILE_ENV, LOG_LEVEL_ENV};
use tcpproxy::{ProxyManager, APP_NAME, VERSION};

/// tcpproxy: configuration-driven TCP forwarder
#[derive(Parser, Debug)]
#[clap(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Rule file (YAML or JSON); searched on the default config paths if omitted
    #[clap(short, long, env = CONFIG_FILE_ENV)]
    config: Option<PathBuf>,

    /// Log level
    #[clap(long, env = LOG_LEVEL_ENV, default_value = defaults::LOG_LEVEL_STR)]
    log_level: String,

    /// Validate the rule file, print it and exit
    #[clap(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(&args.log_level);

    info!("Starting {} v{}", APP_NAME, VERSION);

    let (rules, config_path) = load_rule_set(args.config.as_deref())?;

    if args.check {
        let rendered = serde_json::to_string_pretty(&rules)
            .map_err(|e| ProxyError::Config(format!("Failed to render rules: {}", e)))?;
        println!("{}", rendered);
        return Ok(());
    }

    let manager = ProxyManager::new(rules);
    manager.start().await?;

    let mut hangup = Hangup::new()?;

    info!("Proxy service ready, press Ctrl+C to stop");

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
                break;
            }

            _ = hangup.recv() => {
                info!("Reloading configuration from {}", config_path.display());
                match load_from_file(&config_path) {
                    Ok(rules) => {
                        manager.reload(rules).await?;
                        info!("Configuration reloaded successfully");
                    }
                    Err(e) => error!("Keeping current rules, reload failed: {}", e),
                }
            }
        }
    }

    info!("Shutting down");
    manager.stop_all().await;

    Ok(())
}

/// Source of reload requests
///
/// On Unix this is `SIGHUP`; elsewhere it never fires.
struct Hangup {
    #[cfg(unix)]
    signal: tokio::signal::unix::Signal,
}

impl Hangup {
    #[cfg(unix)]
    fn new() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            signal: signal(SignalKind::hangup())?,
        })
    }

    #[cfg(not(unix))]
    fn new() -> Result<Self> {
        Ok(Self {})
    }

    /// Resolves on the next reload request
    #[cfg(unix)]
    async fn recv(&mut self) {
        if self.signal.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) {
        std::future::pending::<()>().await;
    }
}

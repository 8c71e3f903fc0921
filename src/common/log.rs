//! Logging helpers
//!
//! Diagnostics go through the `log` facade; `env_logger` is the backend.

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence; `level` is used when it is unset.
/// Calling this more than once is harmless: later calls are ignored.
///
/// # Parameters
///
/// * `level` - Default log level (error, warn, info, debug, trace)
pub fn init_logger(level: &str) {
    let env = env_logger::Env::default()
        .filter_or("RUST_LOG", level);

    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

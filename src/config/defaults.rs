//! Default configuration values
//!
//! Single source of truth for names, environment variables and default
//! search locations used by the loader and the command line.

use std::env;
use std::path::{Path, PathBuf};

use directories::BaseDirs;

/// Environment variable holding an explicit configuration file path
pub const CONFIG_FILE_ENV: &str = "TCPPROXY_CONFIG";

/// Environment variable holding the default log level
pub const LOG_LEVEL_ENV: &str = "TCPPROXY_LOG_LEVEL";

/// Application directory under the platform configuration root
pub const APP_DIR: &str = "tcpproxy";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "tcpproxy.yml";

/// Default log level as string
pub const LOG_LEVEL_STR: &str = "info";

/// XDG system configuration directory used when `XDG_CONFIG_DIRS` is unset
const XDG_CONFIG_DIRS_FALLBACK: &str = "/etc/xdg";

/// Relative path of the configuration file below a configuration root
pub fn config_subpath() -> PathBuf {
    Path::new(APP_DIR).join(DEFAULT_CONFIG_FILE)
}

/// Candidate configuration file paths, most specific first
///
/// - Linux and other Unix: `$XDG_CONFIG_HOME` (or `~/.config`), then each
///   entry of `$XDG_CONFIG_DIRS` (or `/etc/xdg`)
/// - macOS: `~/.config`
/// - Windows: the user profile directory
pub fn config_file_candidates() -> Vec<PathBuf> {
    let subpath = config_subpath();
    let base_dirs = BaseDirs::new();

    if cfg!(target_os = "windows") {
        return base_dirs
            .map(|dirs| vec![dirs.home_dir().join(&subpath)])
            .unwrap_or_default();
    }

    if cfg!(target_os = "macos") {
        return base_dirs
            .map(|dirs| vec![dirs.home_dir().join(".config").join(&subpath)])
            .unwrap_or_default();
    }

    let mut candidates = Vec::new();

    if let Some(dirs) = base_dirs {
        candidates.push(dirs.config_dir().join(&subpath));
    }

    let system_dirs = env::var("XDG_CONFIG_DIRS")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| XDG_CONFIG_DIRS_FALLBACK.to_string());

    candidates.extend(
        env::split_paths(&system_dirs)
            .filter(|dir| dir.is_absolute())
            .map(|dir| dir.join(&subpath)),
    );

    candidates
}

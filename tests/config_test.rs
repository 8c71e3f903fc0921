//! Configuration tests
//!
//! Loading rule files from disk and locating them on the default paths.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use tcpproxy::config::{load_from_file, load_rule_set, resolve_config_path, ConfigValidator};
use tcpproxy::{ProxyError, ProxyManager};

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Restores an environment variable when dropped
struct EnvGuard {
    key: &'static str,
    previous: Option<String>,
}

impl EnvGuard {
    fn set(key: &'static str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        let previous = env::var(key).ok();
        env::set_var(key, value);
        Self { key, previous }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.previous {
            Some(value) => env::set_var(self.key, value),
            None => env::remove_var(self.key),
        }
    }
}

#[test]
fn test_load_json_rules() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "rules.json", r#"{
        "proxies": [
            { "name": "api", "source": ":9000", "destination": "127.0.0.1:8000" }
        ]
    }"#);

    let rules = load_from_file(&path).unwrap();

    assert_eq!(rules.len(), 1);
    let api = rules.get("api").unwrap();
    assert_eq!(api.listen(), ":9000");
    assert_eq!(api.destination(), "127.0.0.1:8000");
}

#[test]
fn test_unknown_field_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "rules.yml", r#"
proxies:
  - name: api
    source: ":9000"
    destination: "127.0.0.1:8000"
    timeout: 30
"#);

    assert!(matches!(load_from_file(&path), Err(ProxyError::Config(_))));
}

#[test]
fn test_warnings_do_not_fail_load() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "rules.yml", r#"
proxies:
  - name: one
    source: ":7000"
    destination: "127.0.0.1:7001"
  - name: two
    source: "0.0.0.0:7000"
    destination: "127.0.0.1:7002"
"#);

    let rules = load_from_file(&path).unwrap();

    assert_eq!(rules.len(), 2);
    assert!(!rules.check_warnings().is_empty());
}

#[test]
#[serial]
fn test_default_path_from_xdg_config_home() {
    let dir = TempDir::new().unwrap();
    let expected = write(dir.path(), "tcpproxy/tcpproxy.yml", r#"
proxies:
  - name: home
    source: ":6000"
    destination: "127.0.0.1:6001"
"#);
    let _home = EnvGuard::set("XDG_CONFIG_HOME", dir.path());

    if cfg!(target_os = "linux") {
        assert_eq!(resolve_config_path(None).unwrap(), expected);

        let (rules, path) = load_rule_set(None).unwrap();
        assert_eq!(path, expected);
        assert!(rules.get("home").is_some());
    }
}

#[test]
#[serial]
fn test_default_path_from_xdg_config_dirs() {
    let home = TempDir::new().unwrap();
    let system = TempDir::new().unwrap();
    let expected = write(system.path(), "tcpproxy/tcpproxy.yml", "proxies: []\n");

    let _home = EnvGuard::set("XDG_CONFIG_HOME", home.path());
    let _dirs = EnvGuard::set("XDG_CONFIG_DIRS", system.path());

    if cfg!(target_os = "linux") {
        assert_eq!(resolve_config_path(None).unwrap(), expected);
    }
}

#[test]
fn test_explicit_path_wins_and_must_exist() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "custom.yml", "proxies: []\n");

    assert_eq!(resolve_config_path(Some(&path)).unwrap(), path);

    let missing = dir.path().join("missing.yml");
    assert!(matches!(
        resolve_config_path(Some(&missing)),
        Err(ProxyError::Config(_))
    ));
}

#[tokio::test]
async fn test_invalid_reload_file_keeps_running_rules() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "rules.yml", r#"
proxies:
  - name: keep
    source: "127.0.0.1:0"
    destination: "127.0.0.1:1"
"#);

    let manager = ProxyManager::new(load_from_file(&path).unwrap());
    manager.start().await.unwrap();
    assert!(manager.wait_for_listener("keep").await.unwrap().local_addr().is_some());

    write(dir.path(), "rules.yml", r#"
proxies:
  - name: dup
    source: "127.0.0.1:0"
    destination: "127.0.0.1:1"
  - name: dup
    source: "127.0.0.1:0"
    destination: "127.0.0.1:2"
"#);

    // A rejected file never reaches the manager
    let reloaded = load_from_file(&path);
    assert!(matches!(reloaded, Err(ProxyError::DuplicateRule(_))));

    assert_eq!(manager.running_rules().await, vec!["keep"]);
    assert!(manager.listener_state("keep").await.unwrap().local_addr().is_some());

    manager.stop_all().await;
}

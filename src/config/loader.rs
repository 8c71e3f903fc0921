//! Configuration loading functionality
//!
//! Locates the rule file and turns it into a validated [`RuleSet`]. The
//! format (YAML or JSON) is picked from the file extension by the `config`
//! crate.

use std::path::{Path, PathBuf};

use config::{Config, File};
use log::{debug, info, warn};

use crate::common::{ProxyError, Result};
use crate::config::defaults;
use crate::config::types::{RuleFile, RuleSet};
use crate::config::validator::ConfigValidator;

/// Resolve the configuration file to use
///
/// An explicit path wins and must exist. Otherwise the first existing
/// platform default is used.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ProxyError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        return Ok(path.to_path_buf());
    }

    let candidates = defaults::config_file_candidates();
    for candidate in &candidates {
        debug!("Looking for configuration file at {}", candidate.display());
        if candidate.is_file() {
            return Ok(candidate.clone());
        }
    }

    let searched = candidates
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(ProxyError::Config(format!(
        "No configuration file found (searched: {})",
        if searched.is_empty() { "<none>" } else { &searched }
    )))
}

/// Load and validate a rule set from a file
///
/// Validation warnings are logged; they do not fail the load.
pub fn load_from_file(path: &Path) -> Result<RuleSet> {
    debug!("Loading rules from {}", path.display());

    let settings = Config::builder()
        .add_source(File::from(path.to_path_buf()))
        .build()
        .map_err(|e| ProxyError::Config(format!(
            "Failed to read config file {}: {}", path.display(), e
        )))?;

    let file: RuleFile = settings
        .try_deserialize()
        .map_err(|e| ProxyError::Config(format!(
            "Failed to parse config file {}: {}", path.display(), e
        )))?;

    let rules = RuleSet::new(file.proxies)?;

    for warning in rules.check_warnings() {
        warn!("{}", warning);
    }

    debug!("Loaded {} rule(s) from {}", rules.len(), path.display());
    Ok(rules)
}

/// Locate the configuration file and load it
///
/// Returns the path actually used so a reload can read the same file again.
pub fn load_rule_set(explicit: Option<&Path>) -> Result<(RuleSet, PathBuf)> {
    let path = resolve_config_path(explicit)?;
    info!("Using config file: {}", path.display());

    let rules = load_from_file(&path)?;
    Ok((rules, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "tcpproxy.yml", r#"
proxies:
  - name: web
    source: ":8080"
    destination: "10.0.0.5:80"
  - name: db
    source: "127.0.0.1:5433"
    destination: "10.0.0.6:5432"
"#);

        let rules = load_from_file(&path).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.rules()[0].name(), "web");
        assert_eq!(rules.rules()[0].listen(), ":8080");
        assert_eq!(rules.rules()[1].destination(), "10.0.0.6:5432");
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "rules.json", r#"{
            "proxies": [
                {"name": "ssh", "listen": ":2222", "destination": "10.0.0.9:22"}
            ]
        }"#);

        let rules = load_from_file(&path).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.get("ssh").unwrap().listen(), ":2222");
    }

    #[test]
    fn test_load_duplicate_names() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "dup.yml", r#"
proxies:
  - name: web
    source: ":8080"
    destination: "10.0.0.5:80"
  - name: web
    source: ":8081"
    destination: "10.0.0.6:80"
"#);

        assert!(matches!(load_from_file(&path), Err(ProxyError::DuplicateRule(_))));
    }

    #[test]
    fn test_load_without_proxies_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty.json", "{}");

        let rules = load_from_file(&path).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_load_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.json", r#"{"proxies": [{"name": "x"}]}"#);

        assert!(matches!(load_from_file(&path), Err(ProxyError::Config(_))));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.yml");

        let err = resolve_config_path(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("missing.yml"));
    }

    #[test]
    fn test_load_rule_set_returns_path() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "tcpproxy.yml", r#"
proxies:
  - name: web
    source: ":8080"
    destination: "10.0.0.5:80"
"#);

        let (rules, used) = load_rule_set(Some(&path)).unwrap();
        assert_eq!(used, path);
        assert_eq!(rules.len(), 1);
    }
}

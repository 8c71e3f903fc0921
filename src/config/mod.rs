//! Configuration module
//!
//! This module handles the forwarding rule configuration: the rule types,
//! their validation, default file locations, and loading from disk.

pub mod defaults;
mod loader;
mod types;
mod validator;

pub use self::loader::{load_from_file, load_rule_set, resolve_config_path};
pub use self::types::{Rule, RuleSet};
pub use self::validator::{validate_rules, ConfigValidator};
pub use self::defaults::{CONFIG_FILE_ENV, LOG_LEVEL_ENV};

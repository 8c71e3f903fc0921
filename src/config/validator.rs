//! Configuration validator
//!
//! Hard errors make a rule list unusable as a [`RuleSet`](super::RuleSet).
//! Warnings point at rule sets that will load but probably misbehave.

use std::collections::HashSet;

use crate::common::{ProxyError, Result};
use crate::common::net::listen_addr;
use crate::config::types::{Rule, RuleSet};

/// Validate a rule list
///
/// Fails on blank names or addresses and on duplicate rule names.
pub fn validate_rules(rules: &[Rule]) -> Result<()> {
    let mut names = HashSet::with_capacity(rules.len());

    for rule in rules {
        validate_rule(rule)?;

        if !names.insert(rule.name()) {
            return Err(ProxyError::DuplicateRule(rule.name().to_string()));
        }
    }

    Ok(())
}

fn validate_rule(rule: &Rule) -> Result<()> {
    if rule.name().trim().is_empty() {
        return Err(ProxyError::Config(
            "Rule name must not be empty".to_string()
        ));
    }

    if rule.listen().trim().is_empty() {
        return Err(ProxyError::Config(format!(
            "Rule '{}' has an empty source address",
            rule.name()
        )));
    }

    if rule.destination().trim().is_empty() {
        return Err(ProxyError::Config(format!(
            "Rule '{}' has an empty destination address",
            rule.name()
        )));
    }

    Ok(())
}

/// Configuration validator trait
pub trait ConfigValidator {
    /// Check configuration for warnings
    fn check_warnings(&self) -> Vec<String>;
}

impl ConfigValidator for RuleSet {
    fn check_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut listeners: Vec<(String, &str)> = Vec::with_capacity(self.len());

        for rule in self {
            let listen = listen_addr(rule.listen());

            if let Some((_, other)) = listeners.iter().find(|(addr, _)| *addr == listen) {
                warnings.push(format!(
                    "Rules '{}' and '{}' both listen on {}; only one of them can bind",
                    other,
                    rule.name(),
                    listen
                ));
            }

            if rule.listen().trim() == rule.destination().trim() {
                warnings.push(format!(
                    "Rule '{}' forwards {} to itself",
                    rule.name(),
                    rule.listen()
                ));
            }

            listeners.push((listen, rule.name()));
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_rejected() {
        assert!(matches!(
            validate_rules(&[Rule::new(" ", ":80", "10.0.0.1:80")]),
            Err(ProxyError::Config(_))
        ));
        assert!(matches!(
            validate_rules(&[Rule::new("web", "", "10.0.0.1:80")]),
            Err(ProxyError::Config(_))
        ));
        assert!(matches!(
            validate_rules(&[Rule::new("web", ":80", "")]),
            Err(ProxyError::Config(_))
        ));
    }

    #[test]
    fn test_empty_list_is_valid() {
        assert!(validate_rules(&[]).is_ok());
    }

    #[test]
    fn test_shared_listen_address_warns() {
        let rules = RuleSet::new(vec![
            Rule::new("a", ":8080", "10.0.0.1:80"),
            Rule::new("b", "0.0.0.0:8080", "10.0.0.2:80"),
        ])
        .unwrap();

        let warnings = rules.check_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'a'"));
        assert!(warnings[0].contains("'b'"));
    }

    #[test]
    fn test_self_forward_warns() {
        let rules = RuleSet::new(vec![
            Rule::new("loop", "127.0.0.1:9000", "127.0.0.1:9000"),
        ])
        .unwrap();

        assert_eq!(rules.check_warnings().len(), 1);
    }

    #[test]
    fn test_clean_rule_set_has_no_warnings() {
        let rules = RuleSet::new(vec![
            Rule::new("a", ":8080", "10.0.0.1:80"),
            Rule::new("b", ":8081", "10.0.0.2:80"),
        ])
        .unwrap();

        assert!(rules.check_warnings().is_empty());
    }
}

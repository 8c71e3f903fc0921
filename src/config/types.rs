//! Configuration types
//!
//! A [`RuleSet`] is the immutable, validated list of forwarding rules the
//! proxy manager runs. It can only be obtained through [`RuleSet::new`] (or
//! the loader, which calls it), so a value of this type never contains two
//! rules with the same name.

use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::config::validator::validate_rules;

/// A single forwarding rule: accept on `listen`, forward to `destination`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    /// Rule name, unique within a rule set
    name: String,

    /// Listen address (`host:port` or `:port`)
    #[serde(rename = "source", alias = "listen")]
    listen: String,

    /// Destination address (`host:port`)
    destination: String,
}

impl Rule {
    /// Create a new rule
    pub fn new(
        name: impl Into<String>,
        listen: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            listen: listen.into(),
            destination: destination.into(),
        }
    }

    /// Rule name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Listen address as configured
    pub fn listen(&self) -> &str {
        &self.listen
    }

    /// Destination address as configured
    pub fn destination(&self) -> &str {
        &self.destination
    }
}

/// Ordered, validated collection of forwarding rules
///
/// Serializes to the same document shape the loader reads:
///
/// ```yaml
/// proxies:
///   - name: web
///     source: ":8080"
///     destination: "10.0.0.5:80"
/// ```
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RuleSet {
    proxies: Vec<Rule>,
}

impl RuleSet {
    /// Build a rule set, rejecting duplicate names and blank fields
    ///
    /// An empty list is accepted here; starting a proxy manager on it is
    /// what fails.
    pub fn new(rules: Vec<Rule>) -> Result<Self> {
        validate_rules(&rules)?;
        Ok(Self { proxies: rules })
    }

    /// Rule set without any rules
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rules in configuration order
    pub fn rules(&self) -> &[Rule] {
        &self.proxies
    }

    /// Look up a rule by name
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.proxies.iter().find(|rule| rule.name == name)
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Whether the rule set has no rules
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Iterate over the rules in configuration order
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.proxies.iter()
    }
}

impl TryFrom<Vec<Rule>> for RuleSet {
    type Error = crate::common::ProxyError;

    fn try_from(rules: Vec<Rule>) -> Result<Self> {
        Self::new(rules)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Raw document shape, before validation
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RuleFile {
    #[serde(default)]
    pub(crate) proxies: Vec<Rule>,
}

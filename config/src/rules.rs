//! Mutual exclusivity between features
//!
//! An [`ExclusivityRule`] names features that cannot be built together. When
//! more than one member ends up enabled the rule's winner is kept, the others
//! are dropped and an advisory is produced. Rules are plain data so new
//! conflicts only need a new table entry.

use crate::{ConfigError, Feature, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Features that may not be enabled together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExclusivityRule {
    /// Member features
    pub members: Vec<Feature>,
    /// Member kept when the rule fires; `None` leaves the conflict undecided
    pub winner: Option<Feature>,
    /// Advisory shown when the rule fires
    pub advisory: String,
}

impl ExclusivityRule {
    /// Create a rule with a designated winner
    pub fn new(
        members: impl IntoIterator<Item = Feature>,
        winner: Feature,
        advisory: impl Into<String>,
    ) -> Self {
        Self {
            members: members.into_iter().collect(),
            winner: Some(winner),
            advisory: advisory.into(),
        }
    }

    /// Create a rule without a tie-break
    pub fn undecided(members: impl IntoIterator<Item = Feature>, advisory: impl Into<String>) -> Self {
        Self {
            members: members.into_iter().collect(),
            winner: None,
            advisory: advisory.into(),
        }
    }

    /// Members of this rule that are in `enabled`, in declared member order
    pub fn enabled_members(&self, enabled: &BTreeSet<Feature>) -> Vec<Feature> {
        self.members
            .iter()
            .copied()
            .filter(|f| enabled.contains(f))
            .collect()
    }

    /// Whether the rule is violated by `enabled`
    pub fn is_violated(&self, enabled: &BTreeSet<Feature>) -> bool {
        self.enabled_members(enabled).len() > 1
    }

    /// Get a human-readable description of this rule
    pub fn describe(&self) -> String {
        let names: Vec<_> = self.members.iter().map(|f| f.name()).collect();
        match self.winner {
            Some(winner) => format!("at most one of: {} (prefer {})", names.join(", "), winner),
            None => format!("at most one of: {}", names.join(", ")),
        }
    }

    /// Check the rule is well formed
    pub fn validate(&self) -> Result<()> {
        if self.members.len() < 2 {
            return Err(ConfigError::InvalidRule(format!(
                "rule needs at least two members: {}",
                self.describe()
            )));
        }

        let mut seen = HashSet::new();
        for member in &self.members {
            if !seen.insert(member) {
                return Err(ConfigError::InvalidRule(format!(
                    "duplicate member {} in rule: {}",
                    member,
                    self.describe()
                )));
            }
        }

        if let Some(winner) = self.winner {
            if !self.members.contains(&winner) {
                return Err(ConfigError::InvalidRule(format!(
                    "winner {} is not a member of rule: {}",
                    winner,
                    self.describe()
                )));
            }
        }

        Ok(())
    }
}

/// Ordered collection of exclusivity rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    rules: Vec<ExclusivityRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl RuleSet {
    /// Create a rule set; rules fire in the given order
    pub fn new(rules: Vec<ExclusivityRule>) -> Self {
        Self { rules }
    }

    /// Rule set with no rules
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Iterate over rules
    pub fn iter(&self) -> impl Iterator<Item = &ExclusivityRule> {
        self.rules.iter()
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validate every rule in the set
    pub fn validate(&self) -> Result<()> {
        self.rules.iter().try_for_each(ExclusivityRule::validate)
    }
}

/// The built-in rule table
pub fn default_rules() -> Vec<ExclusivityRule> {
    vec![
        // A +python3/dyn build segfaults in the Python library lookup when
        // python2 support is linked in as well.
        ExclusivityRule::new(
            [Feature::Python, Feature::Python3],
            Feature::Python3,
            "Vim will not link against both Python and Python3 simultaneously. Proceeding with Python3.",
        ),
        ExclusivityRule::new(
            [Feature::Lua, Feature::Luajit],
            Feature::Lua,
            "Vim will not link against both Luajit & Lua simultaneously. Proceeding with Lua.",
        ),
    ]
}

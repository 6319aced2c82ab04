//! Replacement rules and rule sets.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// An ordered `(old, new)` text substitution.
///
/// `old` is never empty; `new` may be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRule {
    old: String,
    new: String,
}

impl ReplacementRule {
    /// Create a rule, rejecting an empty `old` text.
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Result<Self> {
        let rule = Self {
            old: old.into(),
            new: new.into(),
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Parse an `old=new` pair. The first `=` separates the two texts.
    pub fn parse(spec: &str) -> Result<Self> {
        let (old, new) = spec
            .split_once('=')
            .ok_or_else(|| Error::InvalidRule(format!("expected old=new, got {:?}", spec)))?;
        Self::new(old, new)
    }

    /// Text to find.
    pub fn old(&self) -> &str {
        &self.old
    }

    /// Replacement text.
    pub fn new_text(&self) -> &str {
        &self.new
    }

    /// Apply the rule to a plain string (all non-overlapping occurrences).
    pub fn apply_to_str(&self, text: &str) -> String {
        text.replace(&self.old, &self.new)
    }

    fn validate(&self) -> Result<()> {
        if self.old.is_empty() {
            return Err(Error::InvalidRule(format!(
                "text to replace is empty (replacement {:?})",
                self.new
            )));
        }
        Ok(())
    }
}

/// An immutable, validated, ordered list of rules.
///
/// Rules compose sequentially: each rule sees the output of the previous
/// one, both in document content and in filenames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    rules: Vec<ReplacementRule>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a rule set, validating every rule.
    pub fn new(rules: Vec<ReplacementRule>) -> Result<Self> {
        for (i, rule) in rules.iter().enumerate() {
            rule.validate()
                .map_err(|e| Error::InvalidRule(format!("rule {}: {}", i + 1, e)))?;
        }
        Ok(Self { rules })
    }

    /// Build a rule set from `(old, new)` pairs.
    pub fn from_pairs<I, O, N>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (O, N)>,
        O: Into<String>,
        N: Into<String>,
    {
        let rules = pairs
            .into_iter()
            .map(|(old, new)| ReplacementRule {
                old: old.into(),
                new: new.into(),
            })
            .collect();
        Self::new(rules)
    }

    /// Parse a JSON array of `{"old": .., "new": ..}` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Vec<ReplacementRule> = serde_json::from_str(json)?;
        Self::new(rules)
    }

    /// Parse `old=new` lines. Blank lines and `#` comments are skipped.
    pub fn from_lines(text: &str) -> Result<Self> {
        let mut rules = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let rule = ReplacementRule::parse(line)
                .map_err(|e| Error::InvalidRule(format!("line {}: {}", number + 1, e)))?;
            rules.push(rule);
        }
        Ok(Self { rules })
    }

    /// Load rules from a file: JSON when the extension is `.json`,
    /// `old=new` lines otherwise.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_lines(&text)
        }
    }

    /// Append rules from another set, keeping order.
    pub fn extend(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
    }

    /// Rules in application order.
    pub fn rules(&self) -> &[ReplacementRule] {
        &self.rules
    }

    /// Iterate over rules in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, ReplacementRule> {
        self.rules.iter()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule, in order, to a string.
    pub fn apply_to_str(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, rule| rule.apply_to_str(&acc))
    }

    /// Derive an output filename by applying every rule to `name`.
    ///
    /// The name is normalized to NFC first so rules match names coming from
    /// file systems that store decomposed characters.
    pub fn derive_filename(&self, name: &str) -> String {
        let normalized: String = name.nfc().collect();
        self.apply_to_str(&normalized)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a ReplacementRule;
    type IntoIter = std::slice::Iter<'a, ReplacementRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

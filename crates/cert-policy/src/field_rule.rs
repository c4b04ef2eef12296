//! Inbound field rules
//!
//! A [`FieldRule`] constrains every occurrence of one field in a request:
//! presence, occurrence count, length and the values themselves through an
//! ordered list of [`Pattern`]s. Deny patterns win over allow patterns, and a
//! value must hit at least one allow pattern. A rule without patterns admits
//! nothing.

use crate::field::FieldId;
use crate::pattern::Pattern;
use serde::{Deserialize, Serialize};

/// Result of evaluating one rule or one group of rules
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Verdict {
    /// Nothing to object to
    #[default]
    Allow,
    /// Rejected, with human-readable reasons
    Deny(Vec<String>),
}

impl Verdict {
    /// Whether this verdict rejects
    #[must_use]
    pub const fn is_denied(&self) -> bool {
        matches!(self, Self::Deny(_))
    }

    /// Reasons attached to a denial (empty when allowed)
    #[must_use]
    pub fn reasons(&self) -> &[String] {
        match self {
            Self::Allow => &[],
            Self::Deny(reasons) => reasons,
        }
    }

    /// Build a verdict from collected reasons
    #[must_use]
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        if reasons.is_empty() {
            Self::Allow
        } else {
            Self::Deny(reasons)
        }
    }

    /// Fold another verdict into this one, keeping all reasons
    pub fn merge(&mut self, other: Self) {
        if let Self::Deny(more) = other {
            match self {
                Self::Allow => *self = Self::Deny(more),
                Self::Deny(reasons) => reasons.extend(more),
            }
        }
    }
}

const fn default_max_occurrences() -> usize {
    1
}

const fn default_min_length() -> usize {
    1
}

const fn default_max_length() -> usize {
    128
}

/// Constraints on one inbound field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    /// Field this rule governs
    pub field: FieldId,
    /// The field must be present at least once
    #[serde(default)]
    pub mandatory: bool,
    /// Maximum number of occurrences
    #[serde(default = "default_max_occurrences")]
    pub max_occurrences: usize,
    /// Minimum value length in characters
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Maximum value length in characters
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Ordered patterns; empty means no value is acceptable
    #[serde(default)]
    pub patterns: Vec<Pattern>,
}

impl FieldRule {
    /// Create an optional rule with default bounds and no patterns
    #[must_use]
    pub fn new(field: FieldId) -> Self {
        Self {
            field,
            mandatory: false,
            max_occurrences: default_max_occurrences(),
            min_length: default_min_length(),
            max_length: default_max_length(),
            patterns: Vec::new(),
        }
    }

    /// Evaluate all occurrences of the field
    ///
    /// Every violation is reported; one rejected value rejects the field.
    #[must_use]
    pub fn evaluate<S: AsRef<str>>(&self, values: &[S]) -> Verdict {
        let mut reasons = Vec::new();

        if values.is_empty() {
            if self.mandatory {
                reasons.push(format!(
                    "{} is mandatory but was not found in the request",
                    self.field
                ));
            }
            return Verdict::from_reasons(reasons);
        }

        if values.len() > self.max_occurrences {
            reasons.push(format!(
                "{} occurs {} times, but only {} occurrences are permitted",
                self.field,
                values.len(),
                self.max_occurrences
            ));
        }

        for value in values {
            if let Err(reason) = self.check_value(value.as_ref()) {
                reasons.push(reason);
            }
        }

        Verdict::from_reasons(reasons)
    }

    fn check_value(&self, value: &str) -> Result<(), String> {
        let length = value.chars().count();
        if length < self.min_length {
            return Err(format!(
                "value \"{value}\" for {} is shorter than the minimum of {} characters",
                self.field, self.min_length
            ));
        }
        if length > self.max_length {
            return Err(format!(
                "value \"{value}\" for {} is longer than the maximum of {} characters",
                self.field, self.max_length
            ));
        }

        if let Some(pattern) = self
            .patterns
            .iter()
            .find(|p| p.is_deny() && p.is_match(value, false))
        {
            return Err(format!(
                "value \"{value}\" for {} matches the disallowed pattern \"{}\"",
                self.field, pattern.expression
            ));
        }

        let allowed = self
            .patterns
            .iter()
            .any(|p| !p.is_deny() && p.is_match(value, false));
        if !allowed {
            return Err(format!(
                "value \"{value}\" for {} does not match any allowed pattern",
                self.field
            ));
        }

        Ok(())
    }
}

/// Evaluate every rule that targets `field` against its values
///
/// Returns `None` when no rule targets the field.
#[must_use]
pub fn evaluate_field<S: AsRef<str>>(
    rules: &[FieldRule],
    field: &FieldId,
    values: &[S],
) -> Option<Verdict> {
    let mut matched = false;
    let mut verdict = Verdict::Allow;
    for rule in rules.iter().filter(|rule| &rule.field == field) {
        matched = true;
        verdict.merge(rule.evaluate(values));
    }
    matched.then_some(verdict)
}

//! Outbound identity rules
//!
//! Outbound rules write the identity that ends up in the certificate. Each
//! rule resolves its value template, then adds, replaces or clears one
//! subject RDN or SAN kind in an [`IdentityState`]. Rules run in declaration
//! order and are independent of each other.

use crate::field::FieldId;
use crate::field_rule::Verdict;
use crate::placeholder::{resolve, AttributeSources};
use cert_extensions::{ExtensionError, SanKind, SubjectAlternativeNames};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Rule that writes one outbound field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundFieldRule {
    /// Field to write
    pub field: FieldId,
    /// Value template; may contain placeholders or be empty
    #[serde(default)]
    pub value: String,
    /// Failure to produce the value denies the request
    #[serde(default)]
    pub mandatory: bool,
    /// Overwrite existing values; with an empty value, clear the field
    #[serde(default)]
    pub force: bool,
}

impl OutboundFieldRule {
    /// Create a non-mandatory, non-forcing rule
    #[must_use]
    pub fn new(field: FieldId, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            mandatory: false,
            force: false,
        }
    }

    /// Apply the rule to `identity`
    ///
    /// A rule that cannot produce a usable value denies when mandatory and is
    /// skipped otherwise.
    pub fn apply(&self, identity: &mut IdentityState, sources: &AttributeSources<'_>) -> Verdict {
        if !self.field.is_known() {
            return self.unusable(format!("{} is not a known field", self.field));
        }

        let value = match resolve(&self.value, sources) {
            Ok(value) => value,
            Err(e) => {
                return self.unusable(format!("could not build a value for {}: {e}", self.field))
            }
        };

        if value.is_empty() {
            if self.force {
                identity.clear(&self.field);
            }
            return Verdict::Allow;
        }

        if let Some(max) = self.field.max_length() {
            let length = value.chars().count();
            if length > max {
                return self.unusable(format!(
                    "value \"{value}\" for {} is longer than the maximum of {max} characters",
                    self.field
                ));
            }
        }

        // a subject field already holding exactly this value needs no write;
        // with several values a forced rule still collapses them
        let unchanged = identity.contains(&self.field, &value)
            && (self.field.san_kind().is_some()
                || identity.subject_values(&self.field).count() == 1);
        if unchanged || (identity.has_value(&self.field) && !self.force) {
            return Verdict::Allow;
        }

        match identity.set(&self.field, value) {
            Ok(()) => Verdict::Allow,
            Err(e) => self.unusable(format!("could not set {}: {e}", self.field)),
        }
    }

    fn unusable(&self, reason: String) -> Verdict {
        if self.mandatory {
            Verdict::Deny(vec![reason])
        } else {
            debug!(field = %self.field, %reason, "skipping outbound rule");
            Verdict::Allow
        }
    }
}

/// Apply `rules` in order, collecting every denial
pub fn apply_rules(
    rules: &[OutboundFieldRule],
    identity: &mut IdentityState,
    sources: &AttributeSources<'_>,
) -> Verdict {
    let mut verdict = Verdict::Allow;
    for rule in rules {
        verdict.merge(rule.apply(identity, sources));
    }
    verdict
}

/// The identity being assembled for the certificate
///
/// Subject RDNs are single-valued from the point of view of outbound rules:
/// setting a field replaces all of its values. SAN kinds are multi-valued and
/// setting appends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityState {
    subject: Vec<(FieldId, String)>,
    san: SubjectAlternativeNames,
    changed_fields: BTreeSet<FieldId>,
    san_changed: bool,
}

impl IdentityState {
    /// Start from the inbound identity
    #[must_use]
    pub fn new(subject: Vec<(FieldId, String)>, san: SubjectAlternativeNames) -> Self {
        Self {
            subject,
            san,
            changed_fields: BTreeSet::new(),
            san_changed: false,
        }
    }

    /// Current subject RDNs
    #[must_use]
    pub fn subject(&self) -> &[(FieldId, String)] {
        &self.subject
    }

    /// Current Subject Alternative Names
    #[must_use]
    pub const fn san(&self) -> &SubjectAlternativeNames {
        &self.san
    }

    /// Values of a subject field
    pub fn subject_values<'a>(&'a self, field: &'a FieldId) -> impl Iterator<Item = &'a str> + 'a {
        self.subject
            .iter()
            .filter(move |(f, _)| f == field)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the field holds a non-empty value
    #[must_use]
    pub fn has_value(&self, field: &FieldId) -> bool {
        match field.san_kind() {
            Some(kind) => self.san.has_kind(kind),
            None => self.subject_values(field).any(|value| !value.is_empty()),
        }
    }

    /// Whether the exact `(field, value)` pair is present
    #[must_use]
    pub fn contains(&self, field: &FieldId, value: &str) -> bool {
        match field.san_kind() {
            Some(kind) => self.san.contains(kind, value),
            None => self.subject_values(field).any(|v| v == value),
        }
    }

    /// Set a subject field or add a SAN entry
    ///
    /// # Errors
    ///
    /// Returns an [`ExtensionError`] if a SAN value is not valid for its kind.
    pub fn set(&mut self, field: &FieldId, value: String) -> Result<(), ExtensionError> {
        match field.san_kind() {
            Some(kind) => {
                self.add_san(kind, &value)?;
            }
            None => self.replace_subject(field, value),
        }
        Ok(())
    }

    /// Add a SAN entry unless it is already present
    ///
    /// # Errors
    ///
    /// Returns an [`ExtensionError`] if `value` is not valid for `kind`.
    pub fn add_san(&mut self, kind: SanKind, value: &str) -> Result<bool, ExtensionError> {
        let added = self.san.add(kind, value)?;
        self.san_changed |= added;
        Ok(added)
    }

    /// Clear a field: subject fields become present and empty, SAN kinds are
    /// removed
    pub fn clear(&mut self, field: &FieldId) {
        match field.san_kind() {
            Some(kind) => self.san_changed |= self.san.remove_kind(kind) > 0,
            None => self.replace_subject(field, String::new()),
        }
    }

    fn replace_subject(&mut self, field: &FieldId, value: String) {
        match self.subject.iter().position(|(f, _)| f == field) {
            Some(first) => {
                self.subject[first].1 = value;
                let mut index = 0;
                self.subject.retain(|(f, _)| {
                    let keep = index <= first || f != field;
                    index += 1;
                    keep
                });
            }
            None => self.subject.push((field.clone(), value)),
        }
        self.changed_fields.insert(field.clone());
    }

    /// Subject fields written by outbound rules, with their final value
    #[must_use]
    pub fn changed_properties(&self) -> BTreeMap<FieldId, String> {
        self.changed_fields
            .iter()
            .map(|field| {
                let value = self.subject_values(field).next().unwrap_or_default();
                (field.clone(), value.to_string())
            })
            .collect()
    }

    /// Whether the SAN differs from the inbound one
    #[must_use]
    pub const fn san_changed(&self) -> bool {
        self.san_changed
    }

    /// Whether neither subject nor SAN carries any identity
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.san.is_empty() && self.subject.iter().all(|(_, value)| value.is_empty())
    }
}

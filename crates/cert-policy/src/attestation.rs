//! Hardware key attestation rules
//!
//! The attestation chain is verified by the host. What reaches the engine is
//! the `yk` attribute map of the attested key. Rules are checked in order and
//! the first rule whose conditions all hold decides.

use crate::field_rule::Verdict;
use crate::pattern::PatternAction;
use crate::placeholder::AttributeMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Attribute names of an attestation record
pub mod keys {
    /// Device form factor, e.g. `UsbAKeychain`
    pub const FORM_FACTOR: &str = "FormFactor";
    /// Dotted firmware version, e.g. `5.4.3`
    pub const FIRMWARE_VERSION: &str = "FirmwareVersion";
    /// PIN policy of the key slot
    pub const PIN_POLICY: &str = "PinPolicy";
    /// Touch policy of the key slot
    pub const TOUCH_POLICY: &str = "TouchPolicy";
    /// PIV slot holding the key
    pub const SLOT: &str = "Slot";
}

/// Parse a dotted numeric version
#[must_use]
pub fn parse_version(version: &str) -> Option<Vec<u32>> {
    let parts: Option<Vec<u32>> = version.trim().split('.').map(|p| p.parse().ok()).collect();
    parts.filter(|p| !p.is_empty())
}

/// Compare dotted versions, padding the shorter one with zeros
#[must_use]
pub fn compare_versions(a: &[u32], b: &[u32]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// One attestation rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationRule {
    /// What a matching rule does
    #[serde(default)]
    pub action: PatternAction,
    /// Acceptable form factors; empty accepts any
    #[serde(default)]
    pub form_factor: Vec<String>,
    /// Acceptable PIN policies; empty accepts any
    #[serde(default)]
    pub pin_policy: Vec<String>,
    /// Acceptable touch policies; empty accepts any
    #[serde(default)]
    pub touch_policy: Vec<String>,
    /// Acceptable slots; empty accepts any
    #[serde(default)]
    pub slot: Vec<String>,
    /// Lowest acceptable firmware, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_firmware_version: Option<String>,
    /// Highest acceptable firmware, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_firmware_version: Option<String>,
}

impl AttestationRule {
    /// Whether every condition of the rule holds for `record`
    #[must_use]
    pub fn matches(&self, record: &AttributeMap) -> bool {
        let listed = |allowed: &[String], key: &str| {
            allowed.is_empty()
                || record.get(key).is_some_and(|value| {
                    allowed.iter().any(|a| a.eq_ignore_ascii_case(value))
                })
        };

        listed(&self.form_factor, keys::FORM_FACTOR)
            && listed(&self.pin_policy, keys::PIN_POLICY)
            && listed(&self.touch_policy, keys::TOUCH_POLICY)
            && listed(&self.slot, keys::SLOT)
            && self.firmware_in_range(record)
    }

    fn firmware_in_range(&self, record: &AttributeMap) -> bool {
        if self.minimum_firmware_version.is_none() && self.maximum_firmware_version.is_none() {
            return true;
        }
        let Some(firmware) = record.get(keys::FIRMWARE_VERSION).and_then(parse_version) else {
            return false;
        };
        let bound_holds = |bound: &Option<String>, rejected: Ordering| match bound {
            None => true,
            Some(bound) => parse_version(bound)
                .is_some_and(|bound| compare_versions(&firmware, &bound) != rejected),
        };
        bound_holds(&self.minimum_firmware_version, Ordering::Less)
            && bound_holds(&self.maximum_firmware_version, Ordering::Greater)
    }
}

/// Evaluate attestation rules against an optional record
///
/// No rules admits everything. With rules present, a missing record or a
/// record no rule matches is denied.
#[must_use]
pub fn evaluate_attestation(rules: &[AttestationRule], record: Option<&AttributeMap>) -> Verdict {
    if rules.is_empty() {
        return Verdict::Allow;
    }
    let Some(record) = record else {
        return Verdict::Deny(vec![
            "the policy requires key attestation, but none was supplied".to_string(),
        ]);
    };

    match rules.iter().position(|rule| rule.matches(record)) {
        Some(index) if rules[index].action == PatternAction::Allow => Verdict::Allow,
        Some(index) => Verdict::Deny(vec![format!(
            "the attested key matches attestation rule {} which denies the request",
            index + 1
        )]),
        None => Verdict::Deny(vec![
            "the attested key does not match any attestation rule".to_string(),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_compare() {
        let v = |s| parse_version(s).unwrap();
        assert_eq!(compare_versions(&v("5.4"), &v("5.4.0")), Ordering::Equal);
        assert_eq!(compare_versions(&v("5.4.3"), &v("5.7")), Ordering::Less);
        assert_eq!(compare_versions(&v("10.0"), &v("9.9.9")), Ordering::Greater);
        assert!(parse_version("5.x").is_none());
        assert!(parse_version("").is_none());
    }

    #[test]
    fn test_firmware_range_is_inclusive() {
        let rule = AttestationRule {
            minimum_firmware_version: Some("5.4.3".into()),
            maximum_firmware_version: Some("5.7.0".into()),
            ..AttestationRule::default()
        };
        let record = |fw: &str| -> AttributeMap { [(keys::FIRMWARE_VERSION, fw)].into_iter().collect() };
        assert!(rule.matches(&record("5.4.3")));
        assert!(rule.matches(&record("5.7")));
        assert!(!rule.matches(&record("5.2.7")));
        assert!(!rule.matches(&AttributeMap::new()));
    }
}

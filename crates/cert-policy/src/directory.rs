//! Directory service checks
//!
//! The directory lookup itself happens before evaluation; the engine only
//! sees the resolved [`DirectoryObject`]. Group and organizational unit
//! lists are fail-closed: a deny entry always wins, and a non-empty allow
//! list must be satisfied.

use crate::field_rule::Verdict;
use crate::placeholder::AttributeMap;
use cert_extensions::SecurityIdentifier;
use serde::{Deserialize, Serialize};

/// A directory account resolved for the requester
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryObject {
    /// Distinguished name of the account
    pub distinguished_name: String,
    /// Attributes exposed as the `ad` placeholder source
    #[serde(default)]
    pub attributes: AttributeMap,
    /// Distinguished names of the groups the account is a member of
    #[serde(default)]
    pub member_of: Vec<String>,
    /// Whether the account is disabled
    #[serde(default)]
    pub disabled: bool,
    /// `objectSid` of the account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_sid: Option<SecurityIdentifier>,
}

impl DirectoryObject {
    /// Whether the account sits in `ou` or below it
    #[must_use]
    pub fn is_in_organizational_unit(&self, ou: &str) -> bool {
        let dn = self.distinguished_name.to_lowercase();
        let ou = ou.trim().to_lowercase();
        !ou.is_empty() && (dn == ou || dn.ends_with(&format!(",{ou}")))
    }

    /// Whether the account is a member of `group`
    #[must_use]
    pub fn is_member_of(&self, group: &str) -> bool {
        let group = group.trim();
        self.member_of
            .iter()
            .any(|member| member.eq_ignore_ascii_case(group))
    }
}

/// Handling of the security identifier extension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SidExtensionMode {
    /// Attach the account SID to the certificate
    Add,
    /// Leave the extension alone
    #[default]
    Ignore,
    /// Deny requests that bring their own SID extension
    Deny,
}

/// Directory service section of a policy document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryServicesPolicy {
    /// Groups of which the account must be a member of at least one
    #[serde(default)]
    pub allowed_security_groups: Vec<String>,
    /// Groups whose members are refused
    #[serde(default)]
    pub disallowed_security_groups: Vec<String>,
    /// OUs of which the account must sit in at least one
    #[serde(default)]
    pub allowed_organizational_units: Vec<String>,
    /// OUs whose accounts are refused
    #[serde(default)]
    pub disallowed_organizational_units: Vec<String>,
    /// Admit disabled accounts
    #[serde(default)]
    pub permit_disabled_accounts: bool,
    /// Security identifier extension handling
    #[serde(default)]
    pub security_identifier_extension: SidExtensionMode,
}

impl DirectoryServicesPolicy {
    /// Evaluate the account against this section
    #[must_use]
    pub fn evaluate(&self, object: &DirectoryObject) -> Verdict {
        let mut reasons = Vec::new();
        let dn = &object.distinguished_name;

        if object.disabled && !self.permit_disabled_accounts {
            reasons.push(format!("the account {dn} is disabled"));
        }

        for group in &self.disallowed_security_groups {
            if object.is_member_of(group) {
                reasons.push(format!("the account {dn} is a member of the forbidden group {group}"));
            }
        }
        if !self.allowed_security_groups.is_empty()
            && !self
                .allowed_security_groups
                .iter()
                .any(|group| object.is_member_of(group))
        {
            reasons.push(format!("the account {dn} is not a member of any permitted group"));
        }

        for ou in &self.disallowed_organizational_units {
            if object.is_in_organizational_unit(ou) {
                reasons.push(format!("the account {dn} is located in the forbidden OU {ou}"));
            }
        }
        if !self.allowed_organizational_units.is_empty()
            && !self
                .allowed_organizational_units
                .iter()
                .any(|ou| object.is_in_organizational_unit(ou))
        {
            reasons.push(format!("the account {dn} is not located in any permitted OU"));
        }

        Verdict::from_reasons(reasons)
    }
}

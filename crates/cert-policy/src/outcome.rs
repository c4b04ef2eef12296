//! Validation outcome
//!
//! The outcome is threaded through every validation stage. The first denial
//! sticks: later denials add reasons but never change the decision code, and
//! nothing turns a denial back into success except audit-only finalization.

use crate::field::FieldId;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Decision of a validation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DecisionCode {
    /// Issue the certificate
    #[default]
    Success,
    /// Identity is missing or malformed
    InvalidName,
    /// Key algorithm or size is not acceptable
    KeyLengthViolation,
    /// Refused by policy
    PolicyDenied,
    /// Requested validity is not acceptable
    InvalidTime,
}

impl DecisionCode {
    /// Status code reported to the CA
    #[must_use]
    pub const fn status_code(self) -> u32 {
        match self {
            Self::Success => 0x0000_0000,
            Self::InvalidName => 0x800B_0114,
            Self::KeyLengthViolation => 0x8009_4811,
            Self::PolicyDenied => 0x8009_4012,
            Self::InvalidTime => 0x8007_076D,
        }
    }

    /// Stable textual identifier
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InvalidName => "InvalidName",
            Self::KeyLengthViolation => "KeyLengthViolation",
            Self::PolicyDenied => "PolicyDenied",
            Self::InvalidTime => "InvalidTime",
        }
    }

    /// Whether this is [`DecisionCode::Success`]
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for DecisionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated result of validating one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    decision: DecisionCode,
    reasons: Vec<String>,
    properties: BTreeMap<FieldId, String>,
    extensions: BTreeMap<String, Vec<u8>>,
}

impl ValidationOutcome {
    /// A fresh, successful outcome
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current decision
    #[must_use]
    pub const fn decision(&self) -> DecisionCode {
        self.decision
    }

    /// Whether a stage has denied the request
    #[must_use]
    pub const fn is_denied(&self) -> bool {
        !self.decision.is_success()
    }

    /// Reasons in the order they were recorded
    #[must_use]
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// Subject properties to set on the certificate
    #[must_use]
    pub const fn properties(&self) -> &BTreeMap<FieldId, String> {
        &self.properties
    }

    /// Extensions to attach, keyed by dotted OID; empty bytes remove the
    /// extension
    #[must_use]
    pub const fn extensions(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.extensions
    }

    /// Record a denial; the first decision code wins
    pub fn deny(&mut self, code: DecisionCode, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(decision = %code, %reason, "request denied");
        if !self.is_denied() {
            self.decision = code;
        }
        self.reasons.push(reason);
    }

    /// Record several denial reasons under one code
    pub fn deny_all<I>(&mut self, code: DecisionCode, reasons: I)
    where
        I: IntoIterator<Item = String>,
    {
        for reason in reasons {
            self.deny(code, reason);
        }
    }

    /// Set an outbound property
    pub fn set_property(&mut self, field: FieldId, value: impl Into<String>) {
        self.properties.insert(field, value.into());
    }

    /// Attach an extension
    pub fn add_extension(&mut self, oid: impl Into<String>, value: Vec<u8>) {
        self.extensions.insert(oid.into(), value);
    }

    /// Close the outcome
    ///
    /// In audit mode a denial is logged and reset to success, keeping the
    /// reasons and outputs. Otherwise a denial drops all properties and
    /// extensions so nothing partial is issued.
    #[must_use]
    pub fn finish(mut self, audit_only: bool) -> Self {
        if !self.is_denied() {
            return self;
        }
        if audit_only {
            warn!(
                decision = %self.decision,
                reasons = self.reasons.len(),
                "audit mode: issuing despite denial"
            );
            self.decision = DecisionCode::Success;
        } else {
            self.properties.clear();
            self.extensions.clear();
        }
        self
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 P47H Team <https://p47h.com>

//! # cert-policy
//!
//! Enrollment policy engine for certificate authorities. A
//! [`PolicyDocument`] describes what one certificate template accepts and
//! how the issued identity is rewritten; [`RequestValidator`] applies it to
//! one parsed [`CertificateRequest`] and returns a [`ValidationOutcome`].
//!
//! This crate provides:
//! - Pattern matching (regex, CIDR, exact) with allow/deny actions
//! - Inbound field rules (presence, occurrences, length, patterns)
//! - `{source:attribute}` placeholders over subject, SAN, directory and
//!   attestation attributes
//! - Outbound subject and SAN rules
//! - Directory, attestation, key and process checks
//! - SAN, SID, CDP and AIA extension output through `cert-extensions`
//!
//! Evaluation is synchronous and holds no shared state; one validator can
//! serve concurrent requests.
//!
//! ## Security
//!
//! - Strict limits on document size to prevent algorithmic DoS
//!   - MAX_RULES_PER_SECTION = 256
//!   - MAX_PATTERNS_PER_RULE = 256
//!   - MAX_EXPRESSION_LENGTH = 4096
//! - Fail-closed defaults: a rule without patterns admits nothing, a
//!   non-empty allow list must be satisfied, and malformed patterns never
//!   match during inbound validation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod attestation;
pub mod builder;
mod cidr;
pub mod directory;
pub mod error;
pub mod field;
pub mod field_rule;
pub mod outbound;
pub mod outcome;
pub mod pattern;
pub mod placeholder;
pub mod policy;
pub mod request;
pub mod validator;

pub use attestation::{evaluate_attestation, AttestationRule};
pub use builder::{FieldRuleBuilder, OutboundFieldRuleBuilder, PolicyDocumentBuilder};
pub use directory::{DirectoryObject, DirectoryServicesPolicy, SidExtensionMode};
/// Re-export commonly used types
pub use error::{PolicyError, Result};
pub use field::FieldId;
pub use field_rule::{FieldRule, Verdict};
pub use outbound::{IdentityState, OutboundFieldRule};
pub use outcome::{DecisionCode, ValidationOutcome};
pub use pattern::{MatchError, Pattern, PatternAction, TreatAs};
pub use placeholder::{resolve, AttributeMap, AttributeSource, AttributeSources, PlaceholderError};
pub use policy::PolicyDocument;
pub use request::{CertificateRequest, KeyAlgorithm, PublicKeyInfo};
pub use validator::{EvaluationContext, RequestPolicy, RequestValidator};

/// Maximum number of rules or URIs per document section (DoS mitigation)
pub const MAX_RULES_PER_SECTION: usize = 256;

/// Maximum number of patterns per field rule (DoS mitigation)
pub const MAX_PATTERNS_PER_RULE: usize = 256;

/// Maximum length of a pattern expression, outbound value or URI in bytes
pub const MAX_EXPRESSION_LENGTH: usize = 4096;

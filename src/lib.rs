// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 P47H Team <https://p47h.com>

//! # certguard
//!
//! Policy engine for certificate enrollment.
//!
//! This crate provides a unified API over the workspace members:
//!
//! - **Policy Engine**: pattern rules for inbound subject and SAN fields,
//!   placeholder-driven outbound rules and the request validator
//! - **Extensions**: DER codec for the SAN, CRL Distribution Points,
//!   Authority Information Access and security identifier extensions
//! - **Utilities**: TOML/YAML policy files and a template-keyed policy cache
//!
//! ## Quick Start
//!
//! ```rust
//! use certguard::policy::{
//!     CertificateRequest, DecisionCode, EvaluationContext, FieldId, KeyAlgorithm, Pattern,
//!     PolicyDocumentBuilder, PublicKeyInfo,
//! };
//!
//! let policy = PolicyDocumentBuilder::new()
//!     .key_algorithm(KeyAlgorithm::Rsa)
//!     .key_length(2048, 4096)
//!     .subject_rule_with(FieldId::CommonName, |rule| {
//!         rule.mandatory().pattern(Pattern::regex(r"^[a-z0-9-]+\.adcslabor\.de$"))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let request = CertificateRequest::new(PublicKeyInfo::rsa(2048))
//!     .with_subject(FieldId::CommonName, "intranet.adcslabor.de");
//!
//! let outcome = policy.evaluate(&request, &EvaluationContext::new("WebServer", 1_700_000_000));
//! assert_eq!(outcome.decision(), DecisionCode::Success);
//! ```
//!
//! ## Architecture
//!
//! This facade crate re-exports the following modules:
//!
//! - [`policy`] - Enrollment policy engine (from `cert-policy`)
//! - [`extensions`] - X.509 extension codec (from `cert-extensions`)
//! - [`utils`] - Policy files, cache and clock (from `app-utils`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Policy engine module.
///
/// Re-exports `cert_policy` for rule evaluation and request validation.
pub mod policy {
    pub use cert_policy::*;
}

/// Extension codec module.
///
/// Re-exports `cert_extensions` for SAN, CDP, AIA and SID encoding.
pub mod extensions {
    pub use cert_extensions::*;
}

/// Host utilities module.
///
/// Re-exports `app_utils` for policy loading and caching.
pub mod utils {
    pub use app_utils::*;
}

// Convenience re-exports at root level
pub use cert_policy::{DecisionCode, PolicyDocument, RequestValidator, ValidationOutcome};

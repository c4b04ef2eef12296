//! Parsed certificate request
//!
//! The host hands the engine a request that has already been read from the
//! CA database: subject RDNs, the decoded SAN, public key facts and the
//! process information the client reported.

use crate::field::FieldId;
use cert_extensions::{ExtensionError, SanKind, SecurityIdentifier, SubjectAlternativeNames};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public key algorithm family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyAlgorithm {
    /// RSA
    Rsa,
    /// Elliptic curve
    Ecc,
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rsa => "RSA",
            Self::Ecc => "ECC",
        })
    }
}

/// Algorithm and size of the request's public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyInfo {
    /// Algorithm family
    pub algorithm: KeyAlgorithm,
    /// Key size in bits
    pub length: u32,
}

impl PublicKeyInfo {
    /// RSA key of `length` bits
    #[must_use]
    pub const fn rsa(length: u32) -> Self {
        Self {
            algorithm: KeyAlgorithm::Rsa,
            length,
        }
    }

    /// EC key of `length` bits
    #[must_use]
    pub const fn ecc(length: u32) -> Self {
        Self {
            algorithm: KeyAlgorithm::Ecc,
            length,
        }
    }
}

/// An inbound certificate request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequest {
    /// Subject RDNs as stored by the CA, in order
    #[serde(default)]
    pub subject: Vec<(FieldId, String)>,

    /// Subject RDNs read from the CSR itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_subject: Option<Vec<(FieldId, String)>>,

    /// Requested Subject Alternative Names
    #[serde(default)]
    pub subject_alternative_names: SubjectAlternativeNames,

    /// Public key facts
    pub key: PublicKeyInfo,

    /// Name of the process that created the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,

    /// Cryptographic provider that generated the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crypto_provider: Option<String>,

    /// Requested expiration, Unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_not_after: Option<u64>,

    /// SID carried in the request's own security identifier extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_identifier: Option<SecurityIdentifier>,
}

impl CertificateRequest {
    /// Create a request with only key information
    #[must_use]
    pub fn new(key: PublicKeyInfo) -> Self {
        Self {
            subject: Vec::new(),
            inline_subject: None,
            subject_alternative_names: SubjectAlternativeNames::new(),
            key,
            process_name: None,
            crypto_provider: None,
            requested_not_after: None,
            security_identifier: None,
        }
    }

    /// Append a subject RDN
    #[must_use]
    pub fn with_subject(mut self, field: impl Into<FieldId>, value: impl Into<String>) -> Self {
        self.subject.push((field.into(), value.into()));
        self
    }

    /// Append an RDN to the subject read from the CSR
    #[must_use]
    pub fn with_inline_subject(
        mut self,
        field: impl Into<FieldId>,
        value: impl Into<String>,
    ) -> Self {
        self.inline_subject
            .get_or_insert_with(Vec::new)
            .push((field.into(), value.into()));
        self
    }

    /// Append a Subject Alternative Name
    ///
    /// # Errors
    ///
    /// Returns an [`ExtensionError`] if `value` is not valid for `kind`.
    pub fn with_san(mut self, kind: SanKind, value: impl AsRef<str>) -> Result<Self, ExtensionError> {
        self.subject_alternative_names.add(kind, value)?;
        Ok(self)
    }

    /// Replace the SAN with the decoded content of a raw SAN extension
    ///
    /// # Errors
    ///
    /// Returns an [`ExtensionError`] if the extension bytes are malformed.
    pub fn with_san_extension(mut self, der: &[u8]) -> Result<Self, ExtensionError> {
        self.subject_alternative_names = SubjectAlternativeNames::from_der(der)?;
        Ok(self)
    }

    /// Set the requesting process
    #[must_use]
    pub fn with_process_name(mut self, name: impl Into<String>) -> Self {
        self.process_name = Some(name.into());
        self
    }

    /// Set the key provider
    #[must_use]
    pub fn with_crypto_provider(mut self, provider: impl Into<String>) -> Self {
        self.crypto_provider = Some(provider.into());
        self
    }

    /// Set the requested expiration
    #[must_use]
    pub const fn with_requested_not_after(mut self, not_after: u64) -> Self {
        self.requested_not_after = Some(not_after);
        self
    }

    /// Set the SID found in the request
    #[must_use]
    pub fn with_security_identifier(mut self, sid: SecurityIdentifier) -> Self {
        self.security_identifier = Some(sid);
        self
    }

    /// Subject to validate: the inline subject when asked for and present
    #[must_use]
    pub fn effective_subject(&self, read_inline: bool) -> &[(FieldId, String)] {
        match (&self.inline_subject, read_inline) {
            (Some(inline), true) => inline,
            _ => &self.subject,
        }
    }
}

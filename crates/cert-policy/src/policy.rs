//! Policy documents
//!
//! A [`PolicyDocument`] holds everything the validator needs for one
//! certificate template: key constraints, inbound field rules, outbound
//! rules, directory and attestation sections and the revocation pointers to
//! stamp into issued certificates.
//!
//! ## Security Constraints
//!
//! Every document, whether deserialized or built, passes
//! [`PolicyDocument::validate`]:
//! - `MAX_RULES_PER_SECTION` (256): rules per section
//! - `MAX_PATTERNS_PER_RULE` (256): patterns per field rule
//! - `MAX_EXPRESSION_LENGTH` (4096): bytes per pattern, outbound value or URI

use crate::attestation::{parse_version, AttestationRule};
use crate::directory::DirectoryServicesPolicy;
use crate::error::{PolicyError, Result};
use crate::field::FieldId;
use crate::field_rule::FieldRule;
use crate::outbound::OutboundFieldRule;
use crate::outcome::ValidationOutcome;
use crate::request::{CertificateRequest, KeyAlgorithm};
use crate::validator::{EvaluationContext, RequestValidator};
use crate::{MAX_EXPRESSION_LENGTH, MAX_PATTERNS_PER_RULE, MAX_RULES_PER_SECTION};
use serde::{Deserialize, Serialize};

/// Policy for one certificate template
///
/// Fields are private to enforce validation through deserialization or
/// [`crate::PolicyDocumentBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyDocumentRaw", rename_all = "camelCase")]
pub struct PolicyDocument {
    pub(crate) audit_only: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) key_algorithm: Option<KeyAlgorithm>,
    pub(crate) minimum_key_length: u32,
    pub(crate) maximum_key_length: u32,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) allowed_processes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) disallowed_processes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) allowed_crypto_providers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) disallowed_crypto_providers: Vec<String>,

    pub(crate) read_subject_from_request: bool,
    pub(crate) supplement_dns_names: bool,
    pub(crate) supplement_unqualified_names: bool,
    pub(crate) permit_empty_identities: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) subject_rules: Vec<FieldRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) subject_alternative_name_rules: Vec<FieldRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) outbound_subject: Vec<OutboundFieldRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) outbound_subject_alternative_name: Vec<OutboundFieldRule>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) directory_services: Option<DirectoryServicesPolicy>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) attestation_rules: Vec<AttestationRule>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) crl_distribution_points: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) authority_information_access: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) online_certificate_status_protocol: Vec<String>,
}

/// Raw document as read from disk, converted through `TryFrom`
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PolicyDocumentRaw {
    audit_only: bool,
    key_algorithm: Option<KeyAlgorithm>,
    minimum_key_length: u32,
    maximum_key_length: u32,
    allowed_processes: Vec<String>,
    disallowed_processes: Vec<String>,
    allowed_crypto_providers: Vec<String>,
    disallowed_crypto_providers: Vec<String>,
    read_subject_from_request: bool,
    supplement_dns_names: bool,
    supplement_unqualified_names: bool,
    permit_empty_identities: bool,
    subject_rules: Vec<FieldRule>,
    subject_alternative_name_rules: Vec<FieldRule>,
    outbound_subject: Vec<OutboundFieldRule>,
    outbound_subject_alternative_name: Vec<OutboundFieldRule>,
    directory_services: Option<DirectoryServicesPolicy>,
    attestation_rules: Vec<AttestationRule>,
    crl_distribution_points: Vec<String>,
    authority_information_access: Vec<String>,
    online_certificate_status_protocol: Vec<String>,
}

impl TryFrom<PolicyDocumentRaw> for PolicyDocument {
    type Error = PolicyError;

    fn try_from(raw: PolicyDocumentRaw) -> Result<Self> {
        let document = Self {
            audit_only: raw.audit_only,
            key_algorithm: raw.key_algorithm,
            minimum_key_length: raw.minimum_key_length,
            maximum_key_length: raw.maximum_key_length,
            allowed_processes: raw.allowed_processes,
            disallowed_processes: raw.disallowed_processes,
            allowed_crypto_providers: raw.allowed_crypto_providers,
            disallowed_crypto_providers: raw.disallowed_crypto_providers,
            read_subject_from_request: raw.read_subject_from_request,
            supplement_dns_names: raw.supplement_dns_names,
            supplement_unqualified_names: raw.supplement_unqualified_names,
            permit_empty_identities: raw.permit_empty_identities,
            subject_rules: raw.subject_rules,
            subject_alternative_name_rules: raw.subject_alternative_name_rules,
            outbound_subject: raw.outbound_subject,
            outbound_subject_alternative_name: raw.outbound_subject_alternative_name,
            directory_services: raw.directory_services,
            attestation_rules: raw.attestation_rules,
            crl_distribution_points: raw.crl_distribution_points,
            authority_information_access: raw.authority_information_access,
            online_certificate_status_protocol: raw.online_certificate_status_protocol,
        };
        document.validate()?;
        Ok(document)
    }
}

fn check_section_len(section: &'static str, len: usize) -> Result<()> {
    if len > MAX_RULES_PER_SECTION {
        return Err(PolicyError::TooManyRules {
            section,
            max: MAX_RULES_PER_SECTION,
            attempted: len,
        });
    }
    Ok(())
}

fn check_expression(expression: &str) -> Result<()> {
    if expression.len() > MAX_EXPRESSION_LENGTH {
        return Err(PolicyError::ExpressionTooLong {
            max: MAX_EXPRESSION_LENGTH,
            length: expression.len(),
        });
    }
    Ok(())
}

// unknown fields are accepted here and handled at evaluation time
fn check_section_field(section: &'static str, field: &FieldId, san: bool) -> Result<()> {
    if field.is_known() && field.san_kind().is_some() != san {
        return Err(PolicyError::InvalidRule(format!("{field} cannot be used in {section}")));
    }
    Ok(())
}

fn check_field_rules(section: &'static str, rules: &[FieldRule], san: bool) -> Result<()> {
    check_section_len(section, rules.len())?;
    for rule in rules {
        check_section_field(section, &rule.field, san)?;
        if rule.min_length > rule.max_length {
            return Err(PolicyError::InvalidRule(format!(
                "{}: minLength {} exceeds maxLength {}",
                rule.field, rule.min_length, rule.max_length
            )));
        }
        if rule.patterns.len() > MAX_PATTERNS_PER_RULE {
            return Err(PolicyError::TooManyRules {
                section: "patterns",
                max: MAX_PATTERNS_PER_RULE,
                attempted: rule.patterns.len(),
            });
        }
        for pattern in &rule.patterns {
            check_expression(&pattern.expression)?;
        }
    }
    Ok(())
}

fn check_outbound_rules(
    section: &'static str,
    rules: &[OutboundFieldRule],
    san: bool,
) -> Result<()> {
    check_section_len(section, rules.len())?;
    for rule in rules {
        check_section_field(section, &rule.field, san)?;
        check_expression(&rule.value)?;
    }
    Ok(())
}

fn check_uris(section: &'static str, uris: &[String]) -> Result<()> {
    check_section_len(section, uris.len())?;
    for uri in uris {
        if uri.trim().is_empty() {
            return Err(PolicyError::InvalidRule(format!("{section} contains an empty URI")));
        }
        check_expression(uri)?;
    }
    Ok(())
}

impl PolicyDocument {
    /// Validate limits and internal consistency
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::TooManyRules` or `PolicyError::ExpressionTooLong`
    /// when a limit is exceeded, and `PolicyError::InvalidRule` for
    /// inconsistent settings (key bounds, length bounds, firmware versions,
    /// fields in the wrong section, empty URIs).
    pub fn validate(&self) -> Result<()> {
        if self.maximum_key_length != 0 && self.minimum_key_length > self.maximum_key_length {
            return Err(PolicyError::InvalidRule(format!(
                "minimumKeyLength {} exceeds maximumKeyLength {}",
                self.minimum_key_length, self.maximum_key_length
            )));
        }

        check_field_rules("subjectRules", &self.subject_rules, false)?;
        check_field_rules(
            "subjectAlternativeNameRules",
            &self.subject_alternative_name_rules,
            true,
        )?;
        check_outbound_rules("outboundSubject", &self.outbound_subject, false)?;
        check_outbound_rules(
            "outboundSubjectAlternativeName",
            &self.outbound_subject_alternative_name,
            true,
        )?;

        check_section_len("attestationRules", self.attestation_rules.len())?;
        for rule in &self.attestation_rules {
            for version in [
                &rule.minimum_firmware_version,
                &rule.maximum_firmware_version,
            ]
            .into_iter()
            .flatten()
            {
                if parse_version(version).is_none() {
                    return Err(PolicyError::InvalidRule(format!(
                        "invalid firmware version \"{version}\""
                    )));
                }
            }
        }

        check_uris("crlDistributionPoints", &self.crl_distribution_points)?;
        check_uris(
            "authorityInformationAccess",
            &self.authority_information_access,
        )?;
        check_uris(
            "onlineCertificateStatusProtocol",
            &self.online_certificate_status_protocol,
        )?;

        Ok(())
    }

    // ===== Accessors =====

    /// Log denials but issue anyway
    #[must_use]
    pub const fn audit_only(&self) -> bool {
        self.audit_only
    }

    /// Required key algorithm, if any
    #[must_use]
    pub const fn key_algorithm(&self) -> Option<KeyAlgorithm> {
        self.key_algorithm
    }

    /// Minimum key size in bits, 0 for none
    #[must_use]
    pub const fn minimum_key_length(&self) -> u32 {
        self.minimum_key_length
    }

    /// Maximum key size in bits, 0 for none
    #[must_use]
    pub const fn maximum_key_length(&self) -> u32 {
        self.maximum_key_length
    }

    /// Processes permitted to request
    #[must_use]
    pub fn allowed_processes(&self) -> &[String] {
        &self.allowed_processes
    }

    /// Processes refused
    #[must_use]
    pub fn disallowed_processes(&self) -> &[String] {
        &self.disallowed_processes
    }

    /// Key providers permitted
    #[must_use]
    pub fn allowed_crypto_providers(&self) -> &[String] {
        &self.allowed_crypto_providers
    }

    /// Key providers refused
    #[must_use]
    pub fn disallowed_crypto_providers(&self) -> &[String] {
        &self.disallowed_crypto_providers
    }

    /// Validate the subject found in the CSR instead of the stored one
    #[must_use]
    pub const fn read_subject_from_request(&self) -> bool {
        self.read_subject_from_request
    }

    /// Copy DNS-shaped common names into the SAN
    #[must_use]
    pub const fn supplement_dns_names(&self) -> bool {
        self.supplement_dns_names
    }

    /// Also copy common names without a dot
    #[must_use]
    pub const fn supplement_unqualified_names(&self) -> bool {
        self.supplement_unqualified_names
    }

    /// Issue certificates that carry no identity at all
    #[must_use]
    pub const fn permit_empty_identities(&self) -> bool {
        self.permit_empty_identities
    }

    /// Inbound subject rules
    #[must_use]
    pub fn subject_rules(&self) -> &[FieldRule] {
        &self.subject_rules
    }

    /// Inbound SAN rules
    #[must_use]
    pub fn subject_alternative_name_rules(&self) -> &[FieldRule] {
        &self.subject_alternative_name_rules
    }

    /// Outbound subject rules
    #[must_use]
    pub fn outbound_subject(&self) -> &[OutboundFieldRule] {
        &self.outbound_subject
    }

    /// Outbound SAN rules
    #[must_use]
    pub fn outbound_subject_alternative_name(&self) -> &[OutboundFieldRule] {
        &self.outbound_subject_alternative_name
    }

    /// Directory service section
    #[must_use]
    pub const fn directory_services(&self) -> Option<&DirectoryServicesPolicy> {
        self.directory_services.as_ref()
    }

    /// Attestation rules
    #[must_use]
    pub fn attestation_rules(&self) -> &[AttestationRule] {
        &self.attestation_rules
    }

    /// CRL distribution point URIs
    #[must_use]
    pub fn crl_distribution_points(&self) -> &[String] {
        &self.crl_distribution_points
    }

    /// CA issuer URIs
    #[must_use]
    pub fn authority_information_access(&self) -> &[String] {
        &self.authority_information_access
    }

    /// OCSP responder URIs
    #[must_use]
    pub fn online_certificate_status_protocol(&self) -> &[String] {
        &self.online_certificate_status_protocol
    }

    /// Validate a request against this document
    ///
    /// Delegates to [`RequestValidator`].
    #[must_use]
    pub fn evaluate(
        &self,
        request: &CertificateRequest,
        context: &EvaluationContext<'_>,
    ) -> ValidationOutcome {
        RequestValidator::new(self).validate(request, context)
    }

    /// Load a document from TOML
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::TomlError` if parsing or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize the document to TOML
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::SerializationError` if TOML serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| PolicyError::SerializationError(e.to_string()))
    }
}

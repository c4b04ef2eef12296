//! Builder pattern for ergonomic policy construction

use crate::attestation::AttestationRule;
use crate::directory::DirectoryServicesPolicy;
use crate::error::{PolicyError, Result};
use crate::field::FieldId;
use crate::field_rule::FieldRule;
use crate::outbound::OutboundFieldRule;
use crate::pattern::Pattern;
use crate::policy::PolicyDocument;
use crate::request::KeyAlgorithm;
use crate::{MAX_EXPRESSION_LENGTH, MAX_PATTERNS_PER_RULE};

/// Builder for [`FieldRule`]
///
/// # Examples
///
/// ```
/// use cert_policy::{FieldId, FieldRuleBuilder, Pattern};
///
/// let rule = FieldRuleBuilder::new(FieldId::CommonName)
///     .mandatory()
///     .max_length(64)
///     .pattern(Pattern::regex(r"^[-_a-zA-Z0-9]*\.adcslabor\.de$"))
///     .pattern(Pattern::regex(".*(porn|gambling).*").deny())
///     .build()
///     .unwrap();
///
/// assert!(rule.evaluate(&["intpornranet.adcslabor.de"]).is_denied());
/// ```
#[derive(Debug)]
pub struct FieldRuleBuilder {
    rule: FieldRule,
}

impl FieldRuleBuilder {
    /// Start an optional rule for `field`
    #[must_use]
    pub fn new(field: impl Into<FieldId>) -> Self {
        Self {
            rule: FieldRule::new(field.into()),
        }
    }

    /// Require the field
    #[must_use]
    pub const fn mandatory(mut self) -> Self {
        self.rule.mandatory = true;
        self
    }

    /// Set the maximum number of occurrences
    #[must_use]
    pub const fn max_occurrences(mut self, max: usize) -> Self {
        self.rule.max_occurrences = max;
        self
    }

    /// Set the minimum value length
    #[must_use]
    pub const fn min_length(mut self, min: usize) -> Self {
        self.rule.min_length = min;
        self
    }

    /// Set the maximum value length
    #[must_use]
    pub const fn max_length(mut self, max: usize) -> Self {
        self.rule.max_length = max;
        self
    }

    /// Append a pattern
    #[must_use]
    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.rule.patterns.push(pattern);
        self
    }

    /// Build the rule
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidRule` for inverted length bounds,
    /// `PolicyError::TooManyRules` for too many patterns and
    /// `PolicyError::ExpressionTooLong` for oversized expressions.
    pub fn build(self) -> Result<FieldRule> {
        let rule = self.rule;
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
        if let Some(pattern) = rule
            .patterns
            .iter()
            .find(|p| p.expression.len() > MAX_EXPRESSION_LENGTH)
        {
            return Err(PolicyError::ExpressionTooLong {
                max: MAX_EXPRESSION_LENGTH,
                length: pattern.expression.len(),
            });
        }
        Ok(rule)
    }
}

/// Builder for [`OutboundFieldRule`]
///
/// ```
/// use cert_policy::{FieldId, OutboundFieldRuleBuilder};
///
/// let rule = OutboundFieldRuleBuilder::new(FieldId::OrganizationName)
///     .value("{sdn:commonName}")
///     .force()
///     .build();
/// assert!(rule.force && !rule.mandatory);
/// ```
#[derive(Debug)]
pub struct OutboundFieldRuleBuilder {
    rule: OutboundFieldRule,
}

impl OutboundFieldRuleBuilder {
    /// Start a rule for `field` with an empty value
    #[must_use]
    pub fn new(field: impl Into<FieldId>) -> Self {
        Self {
            rule: OutboundFieldRule::new(field.into(), String::new()),
        }
    }

    /// Set the value template
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.rule.value = value.into();
        self
    }

    /// Deny the request if the value cannot be produced
    #[must_use]
    pub const fn mandatory(mut self) -> Self {
        self.rule.mandatory = true;
        self
    }

    /// Overwrite or clear existing values
    #[must_use]
    pub const fn force(mut self) -> Self {
        self.rule.force = true;
        self
    }

    /// Build the rule
    #[must_use]
    pub fn build(self) -> OutboundFieldRule {
        self.rule
    }
}

/// Builder for [`PolicyDocument`]
///
/// ```
/// use cert_policy::{FieldId, KeyAlgorithm, Pattern, PolicyDocumentBuilder};
///
/// let policy = PolicyDocumentBuilder::new()
///     .key_algorithm(KeyAlgorithm::Rsa)
///     .key_length(2048, 4096)
///     .subject_rule_with(FieldId::CommonName, |rule| {
///         rule.mandatory().pattern(Pattern::regex(r"\.adcslabor\.de$"))
///     })
///     .outbound_subject_with(FieldId::CountryName, |rule| rule.value("DE").force())
///     .build()
///     .unwrap();
///
/// assert_eq!(policy.subject_rules().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct PolicyDocumentBuilder {
    document: PolicyDocument,
    error: Option<PolicyError>,
}

impl PolicyDocumentBuilder {
    /// Start from an empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log denials but issue anyway
    #[must_use]
    pub const fn audit_only(mut self, enabled: bool) -> Self {
        self.document.audit_only = enabled;
        self
    }

    /// Require a key algorithm
    #[must_use]
    pub const fn key_algorithm(mut self, algorithm: KeyAlgorithm) -> Self {
        self.document.key_algorithm = Some(algorithm);
        self
    }

    /// Set key size bounds in bits; 0 leaves a bound open
    #[must_use]
    pub const fn key_length(mut self, minimum: u32, maximum: u32) -> Self {
        self.document.minimum_key_length = minimum;
        self.document.maximum_key_length = maximum;
        self
    }

    /// Permit a requesting process
    #[must_use]
    pub fn allow_process(mut self, name: impl Into<String>) -> Self {
        self.document.allowed_processes.push(name.into());
        self
    }

    /// Refuse a requesting process
    #[must_use]
    pub fn disallow_process(mut self, name: impl Into<String>) -> Self {
        self.document.disallowed_processes.push(name.into());
        self
    }

    /// Permit a key provider
    #[must_use]
    pub fn allow_crypto_provider(mut self, name: impl Into<String>) -> Self {
        self.document.allowed_crypto_providers.push(name.into());
        self
    }

    /// Refuse a key provider
    #[must_use]
    pub fn disallow_crypto_provider(mut self, name: impl Into<String>) -> Self {
        self.document.disallowed_crypto_providers.push(name.into());
        self
    }

    /// Validate the subject read from the CSR
    #[must_use]
    pub const fn read_subject_from_request(mut self, enabled: bool) -> Self {
        self.document.read_subject_from_request = enabled;
        self
    }

    /// Copy DNS-shaped common names into the SAN
    #[must_use]
    pub const fn supplement_dns_names(mut self, enabled: bool) -> Self {
        self.document.supplement_dns_names = enabled;
        self
    }

    /// Also copy common names without a dot
    #[must_use]
    pub const fn supplement_unqualified_names(mut self, enabled: bool) -> Self {
        self.document.supplement_unqualified_names = enabled;
        self
    }

    /// Issue certificates without any identity
    #[must_use]
    pub const fn permit_empty_identities(mut self, enabled: bool) -> Self {
        self.document.permit_empty_identities = enabled;
        self
    }

    /// Add a pre-constructed subject rule
    #[must_use]
    pub fn subject_rule(mut self, rule: FieldRule) -> Self {
        self.document.subject_rules.push(rule);
        self
    }

    /// Add a subject rule using a builder function
    #[must_use]
    pub fn subject_rule_with<F>(self, field: impl Into<FieldId>, f: F) -> Self
    where
        F: FnOnce(FieldRuleBuilder) -> FieldRuleBuilder,
    {
        match f(FieldRuleBuilder::new(field)).build() {
            Ok(rule) => self.subject_rule(rule),
            Err(e) => self.fail(e),
        }
    }

    /// Add a pre-constructed SAN rule
    #[must_use]
    pub fn san_rule(mut self, rule: FieldRule) -> Self {
        self.document.subject_alternative_name_rules.push(rule);
        self
    }

    /// Add a SAN rule using a builder function
    #[must_use]
    pub fn san_rule_with<F>(self, field: impl Into<FieldId>, f: F) -> Self
    where
        F: FnOnce(FieldRuleBuilder) -> FieldRuleBuilder,
    {
        match f(FieldRuleBuilder::new(field)).build() {
            Ok(rule) => self.san_rule(rule),
            Err(e) => self.fail(e),
        }
    }

    /// Add an outbound subject rule
    #[must_use]
    pub fn outbound_subject(mut self, rule: OutboundFieldRule) -> Self {
        self.document.outbound_subject.push(rule);
        self
    }

    /// Add an outbound subject rule using a builder function
    #[must_use]
    pub fn outbound_subject_with<F>(self, field: impl Into<FieldId>, f: F) -> Self
    where
        F: FnOnce(OutboundFieldRuleBuilder) -> OutboundFieldRuleBuilder,
    {
        let rule = f(OutboundFieldRuleBuilder::new(field)).build();
        self.outbound_subject(rule)
    }

    /// Add an outbound SAN rule
    #[must_use]
    pub fn outbound_san(mut self, rule: OutboundFieldRule) -> Self {
        self.document.outbound_subject_alternative_name.push(rule);
        self
    }

    /// Add an outbound SAN rule using a builder function
    #[must_use]
    pub fn outbound_san_with<F>(self, field: impl Into<FieldId>, f: F) -> Self
    where
        F: FnOnce(OutboundFieldRuleBuilder) -> OutboundFieldRuleBuilder,
    {
        let rule = f(OutboundFieldRuleBuilder::new(field)).build();
        self.outbound_san(rule)
    }

    /// Set the directory service section
    #[must_use]
    pub fn directory_services(mut self, section: DirectoryServicesPolicy) -> Self {
        self.document.directory_services = Some(section);
        self
    }

    /// Add an attestation rule
    #[must_use]
    pub fn attestation_rule(mut self, rule: AttestationRule) -> Self {
        self.document.attestation_rules.push(rule);
        self
    }

    /// Add a CRL distribution point URI
    #[must_use]
    pub fn crl_distribution_point(mut self, uri: impl Into<String>) -> Self {
        self.document.crl_distribution_points.push(uri.into());
        self
    }

    /// Add a CA issuer URI
    #[must_use]
    pub fn ca_issuer(mut self, uri: impl Into<String>) -> Self {
        self.document.authority_information_access.push(uri.into());
        self
    }

    /// Add an OCSP responder URI
    #[must_use]
    pub fn ocsp(mut self, uri: impl Into<String>) -> Self {
        self.document
            .online_certificate_status_protocol
            .push(uri.into());
        self
    }

    fn fail(mut self, error: PolicyError) -> Self {
        self.error.get_or_insert(error);
        self
    }

    /// Build the document
    ///
    /// # Errors
    ///
    /// Returns the first error of a rule built through a `*_with` method, or
    /// any error of [`PolicyDocument::validate`].
    pub fn build(self) -> Result<PolicyDocument> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.document.validate()?;
        Ok(self.document)
    }
}

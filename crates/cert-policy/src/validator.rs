//! Request validation
//!
//! [`RequestValidator`] runs a request through the stages of a
//! [`PolicyDocument`] in a fixed order:
//!
//! 1. key algorithm and size
//! 2. requesting process and key provider
//! 3. requested validity
//! 4. inbound subject and SAN rules
//! 5. directory service checks
//! 6. attestation rules
//! 7. outbound subject and SAN rules, DNS name supplementation
//! 8. empty identity check
//! 9. output properties and extensions (SAN, SID, CDP, AIA)
//!
//! Each stage takes the outcome of the previous one and passes an already
//! denied outcome through untouched.

use crate::attestation::evaluate_attestation;
use crate::directory::{DirectoryObject, SidExtensionMode};
use crate::field::FieldId;
use crate::field_rule::{evaluate_field, FieldRule, Verdict};
use crate::outbound::{apply_rules, IdentityState};
use crate::outcome::{DecisionCode, ValidationOutcome};
use crate::placeholder::{resolve, AttributeMap, AttributeSource, AttributeSources};
use crate::policy::PolicyDocument;
use crate::request::CertificateRequest;
use cert_extensions::general_name::is_valid_dns_name;
use cert_extensions::oid::{
    AUTHORITY_INFO_ACCESS, CRL_DISTRIBUTION_POINTS, NTDS_CA_SECURITY_EXT, SUBJECT_ALT_NAME,
};
use cert_extensions::{
    build_authority_information_access, build_crl_distribution_points,
    build_security_identifier_extension, SanKind, SubjectAlternativeNames,
};
use tracing::{debug, debug_span, info};

/// Facts about the evaluation that do not come from the request
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationContext<'a> {
    /// Certificate template name, for logging
    pub template: &'a str,
    /// Resolved directory account of the requester
    pub directory: Option<&'a DirectoryObject>,
    /// Verified attestation attributes of the key
    pub attestation: Option<&'a AttributeMap>,
    /// Current time, Unix seconds
    pub current_time: u64,
    /// Latest expiration the CA will issue, Unix seconds
    pub ca_max_not_after: Option<u64>,
}

impl<'a> EvaluationContext<'a> {
    /// Context with only a template name and the current time
    #[must_use]
    pub const fn new(template: &'a str, current_time: u64) -> Self {
        Self {
            template,
            directory: None,
            attestation: None,
            current_time,
            ca_max_not_after: None,
        }
    }

    /// Attach the directory account
    #[must_use]
    pub const fn with_directory(mut self, directory: &'a DirectoryObject) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Attach attestation attributes
    #[must_use]
    pub const fn with_attestation(mut self, attestation: &'a AttributeMap) -> Self {
        self.attestation = Some(attestation);
        self
    }

    /// Set the CA expiration ceiling
    #[must_use]
    pub const fn with_ca_max_not_after(mut self, not_after: u64) -> Self {
        self.ca_max_not_after = Some(not_after);
        self
    }
}

/// Anything that can decide on a certificate request
pub trait RequestPolicy {
    /// Validate `request` and produce the final outcome
    fn validate(
        &self,
        request: &CertificateRequest,
        context: &EvaluationContext<'_>,
    ) -> ValidationOutcome;
}

/// Evaluates requests against one policy document
#[derive(Debug, Clone, Copy)]
pub struct RequestValidator<'p> {
    policy: &'p PolicyDocument,
}

impl<'p> RequestValidator<'p> {
    /// Create a validator for `policy`
    #[must_use]
    pub const fn new(policy: &'p PolicyDocument) -> Self {
        Self { policy }
    }

    /// Run all stages and finalize the outcome
    #[must_use]
    pub fn validate(
        &self,
        request: &CertificateRequest,
        context: &EvaluationContext<'_>,
    ) -> ValidationOutcome {
        let span = debug_span!("validate", template = context.template);
        let _guard = span.enter();

        let policy = self.policy;
        let inbound_subject = request.effective_subject(policy.read_subject_from_request);
        let inbound_san = &request.subject_alternative_names;

        let mut outcome = ValidationOutcome::new();
        outcome = self.check_key(outcome, request);
        outcome = self.check_process(outcome, request);
        outcome = self.check_validity(outcome, request, context);
        outcome = self.check_inbound_subject(outcome, inbound_subject);
        outcome = self.check_inbound_san(outcome, inbound_san);
        outcome = self.check_directory(outcome, request, context);
        outcome = self.check_attestation(outcome, context);

        let sdn = subject_attributes(inbound_subject);
        let san = san_attributes(inbound_san);
        let mut sources = AttributeSources::new()
            .with(AttributeSource::Subject, &sdn)
            .with(AttributeSource::SubjectAlternativeName, &san);
        if let Some(directory) = context.directory {
            sources = sources.with(AttributeSource::Directory, &directory.attributes);
        }
        if let Some(attestation) = context.attestation {
            sources = sources.with(AttributeSource::Attestation, attestation);
        }

        let mut identity = IdentityState::new(inbound_subject.to_vec(), inbound_san.clone());
        outcome = self.apply_outbound(outcome, &mut identity, &sources);
        outcome = self.supplement_dns_names(outcome, &mut identity);
        outcome = self.check_identity_present(outcome, &identity);
        outcome = self.emit_identity(outcome, &identity);
        outcome = self.emit_security_identifier(outcome, context);
        outcome = self.emit_revocation_pointers(outcome, &sources);

        let outcome = outcome.finish(policy.audit_only);
        info!(
            template = context.template,
            decision = %outcome.decision(),
            status_code = outcome.decision().status_code(),
            reasons = outcome.reasons().len(),
            "request evaluated"
        );
        outcome
    }

    fn check_key(
        &self,
        mut outcome: ValidationOutcome,
        request: &CertificateRequest,
    ) -> ValidationOutcome {
        if outcome.is_denied() {
            return outcome;
        }
        let policy = self.policy;
        let key = request.key;
        debug!(algorithm = %key.algorithm, length = key.length, "checking key");

        if let Some(required) = policy.key_algorithm {
            if key.algorithm != required {
                outcome.deny(
                    DecisionCode::KeyLengthViolation,
                    format!("key algorithm {} does not match the required {required}", key.algorithm),
                );
                return outcome;
            }
        }
        if policy.minimum_key_length != 0 && key.length < policy.minimum_key_length {
            outcome.deny(
                DecisionCode::KeyLengthViolation,
                format!(
                    "key length {} is below the minimum of {}",
                    key.length, policy.minimum_key_length
                ),
            );
        }
        if policy.maximum_key_length != 0 && key.length > policy.maximum_key_length {
            outcome.deny(
                DecisionCode::KeyLengthViolation,
                format!(
                    "key length {} is above the maximum of {}",
                    key.length, policy.maximum_key_length
                ),
            );
        }
        outcome
    }

    fn check_process(
        &self,
        mut outcome: ValidationOutcome,
        request: &CertificateRequest,
    ) -> ValidationOutcome {
        if outcome.is_denied() {
            return outcome;
        }
        let policy = self.policy;
        let checks = [
            (
                "process",
                request.process_name.as_deref(),
                &policy.allowed_processes,
                &policy.disallowed_processes,
            ),
            (
                "cryptographic provider",
                request.crypto_provider.as_deref(),
                &policy.allowed_crypto_providers,
                &policy.disallowed_crypto_providers,
            ),
        ];
        for (what, value, allowed, disallowed) in checks {
            if let Err(reason) = check_name_lists(what, value, allowed, disallowed) {
                outcome.deny(DecisionCode::PolicyDenied, reason);
            }
        }
        outcome
    }

    fn check_validity(
        &self,
        mut outcome: ValidationOutcome,
        request: &CertificateRequest,
        context: &EvaluationContext<'_>,
    ) -> ValidationOutcome {
        if outcome.is_denied() {
            return outcome;
        }
        let Some(not_after) = request.requested_not_after else {
            return outcome;
        };
        debug!(not_after, "checking requested validity");

        if not_after <= context.current_time {
            outcome.deny(
                DecisionCode::InvalidTime,
                format!("the requested expiration {not_after} is not in the future"),
            );
        } else if let Some(ceiling) = context.ca_max_not_after {
            if not_after > ceiling {
                outcome.deny(
                    DecisionCode::InvalidTime,
                    format!("the requested expiration {not_after} is later than the CA permits ({ceiling})"),
                );
            }
        }
        outcome
    }

    fn check_inbound_subject(
        &self,
        outcome: ValidationOutcome,
        subject: &[(FieldId, String)],
    ) -> ValidationOutcome {
        if outcome.is_denied() {
            return outcome;
        }
        debug!(fields = subject.len(), "checking inbound subject");
        let occurrences: Vec<(&FieldId, &str)> =
            subject.iter().map(|(f, v)| (f, v.as_str())).collect();
        check_inbound_fields(outcome, &self.policy.subject_rules, &occurrences)
    }

    fn check_inbound_san(
        &self,
        outcome: ValidationOutcome,
        san: &SubjectAlternativeNames,
    ) -> ValidationOutcome {
        if outcome.is_denied() {
            return outcome;
        }
        debug!(entries = san.len(), "checking inbound subject alternative names");
        let fields: Vec<FieldId> = san.iter().map(|entry| entry.kind().into()).collect();
        let occurrences: Vec<(&FieldId, &str)> = fields
            .iter()
            .zip(san.iter())
            .map(|(field, entry)| (field, entry.value()))
            .collect();
        check_inbound_fields(
            outcome,
            &self.policy.subject_alternative_name_rules,
            &occurrences,
        )
    }

    fn check_directory(
        &self,
        mut outcome: ValidationOutcome,
        request: &CertificateRequest,
        context: &EvaluationContext<'_>,
    ) -> ValidationOutcome {
        if outcome.is_denied() {
            return outcome;
        }
        let Some(section) = &self.policy.directory_services else {
            return outcome;
        };
        let Some(object) = context.directory else {
            outcome.deny(
                DecisionCode::PolicyDenied,
                "the policy requires a directory account, but none was resolved",
            );
            return outcome;
        };
        debug!(dn = %object.distinguished_name, "checking directory account");

        if let Verdict::Deny(reasons) = section.evaluate(object) {
            outcome.deny_all(DecisionCode::PolicyDenied, reasons);
        }
        if section.security_identifier_extension == SidExtensionMode::Deny
            && request.security_identifier.is_some()
        {
            outcome.deny(
                DecisionCode::PolicyDenied,
                "the request carries a security identifier extension",
            );
        }
        outcome
    }

    fn check_attestation(
        &self,
        mut outcome: ValidationOutcome,
        context: &EvaluationContext<'_>,
    ) -> ValidationOutcome {
        if outcome.is_denied() || self.policy.attestation_rules.is_empty() {
            return outcome;
        }
        debug!(rules = self.policy.attestation_rules.len(), "checking attestation");
        if let Verdict::Deny(reasons) =
            evaluate_attestation(&self.policy.attestation_rules, context.attestation)
        {
            outcome.deny_all(DecisionCode::PolicyDenied, reasons);
        }
        outcome
    }

    fn apply_outbound(
        &self,
        mut outcome: ValidationOutcome,
        identity: &mut IdentityState,
        sources: &AttributeSources<'_>,
    ) -> ValidationOutcome {
        if outcome.is_denied() {
            return outcome;
        }
        let policy = self.policy;
        debug!(
            subject_rules = policy.outbound_subject.len(),
            san_rules = policy.outbound_subject_alternative_name.len(),
            "applying outbound rules"
        );
        let mut verdict = apply_rules(&policy.outbound_subject, identity, sources);
        verdict.merge(apply_rules(
            &policy.outbound_subject_alternative_name,
            identity,
            sources,
        ));
        if let Verdict::Deny(reasons) = verdict {
            outcome.deny_all(DecisionCode::PolicyDenied, reasons);
        }
        outcome
    }

    fn supplement_dns_names(
        &self,
        outcome: ValidationOutcome,
        identity: &mut IdentityState,
    ) -> ValidationOutcome {
        let policy = self.policy;
        if outcome.is_denied() || !policy.supplement_dns_names {
            return outcome;
        }
        let names: Vec<String> = identity
            .subject_values(&FieldId::CommonName)
            .filter(|name| {
                is_valid_dns_name(name)
                    && !name.starts_with("*.")
                    && (policy.supplement_unqualified_names || name.contains('.'))
            })
            .map(str::to_string)
            .collect();

        for name in names {
            match identity.add_san(SanKind::DnsName, &name) {
                Ok(true) => debug!(%name, "supplemented dNSName from commonName"),
                Ok(false) => {}
                Err(e) => debug!(%name, error = %e, "could not supplement dNSName"),
            }
        }
        outcome
    }

    fn check_identity_present(
        &self,
        mut outcome: ValidationOutcome,
        identity: &IdentityState,
    ) -> ValidationOutcome {
        if outcome.is_denied() || self.policy.permit_empty_identities {
            return outcome;
        }
        if identity.is_empty() {
            outcome.deny(
                DecisionCode::InvalidName,
                "the resulting certificate would carry no identity",
            );
        }
        outcome
    }

    fn emit_identity(
        &self,
        mut outcome: ValidationOutcome,
        identity: &IdentityState,
    ) -> ValidationOutcome {
        if outcome.is_denied() {
            return outcome;
        }
        for (field, value) in identity.changed_properties() {
            outcome.set_property(field, value);
        }
        if identity.san_changed() {
            match identity.san().to_der() {
                Ok(der) => outcome.add_extension(SUBJECT_ALT_NAME.to_string(), der),
                Err(e) => outcome.deny(
                    DecisionCode::PolicyDenied,
                    format!("could not encode the subject alternative names: {e}"),
                ),
            }
        }
        outcome
    }

    fn emit_security_identifier(
        &self,
        mut outcome: ValidationOutcome,
        context: &EvaluationContext<'_>,
    ) -> ValidationOutcome {
        if outcome.is_denied() {
            return outcome;
        }
        let adds_sid = self
            .policy
            .directory_services
            .as_ref()
            .is_some_and(|section| section.security_identifier_extension == SidExtensionMode::Add);
        if !adds_sid {
            return outcome;
        }
        let Some(sid) = context.directory.and_then(|object| object.object_sid.as_ref()) else {
            debug!("directory account has no objectSid, not adding the SID extension");
            return outcome;
        };
        match build_security_identifier_extension(sid) {
            Ok(der) => outcome.add_extension(NTDS_CA_SECURITY_EXT.to_string(), der),
            Err(e) => outcome.deny(
                DecisionCode::PolicyDenied,
                format!("could not encode the security identifier extension: {e}"),
            ),
        }
        outcome
    }

    fn emit_revocation_pointers(
        &self,
        mut outcome: ValidationOutcome,
        sources: &AttributeSources<'_>,
    ) -> ValidationOutcome {
        if outcome.is_denied() {
            return outcome;
        }
        let policy = self.policy;

        let resolved = resolve_uris(&policy.crl_distribution_points, sources).and_then(|cdp| {
            let ca_issuers = resolve_uris(&policy.authority_information_access, sources)?;
            let ocsp = resolve_uris(&policy.online_certificate_status_protocol, sources)?;
            Ok((cdp, ca_issuers, ocsp))
        });
        let (cdp, ca_issuers, ocsp) = match resolved {
            Ok(uris) => uris,
            Err(reason) => {
                outcome.deny(DecisionCode::PolicyDenied, reason);
                return outcome;
            }
        };

        if !cdp.is_empty() {
            debug!(uris = cdp.len(), "adding CRL distribution points");
            match build_crl_distribution_points(&cdp) {
                Ok(der) => outcome.add_extension(CRL_DISTRIBUTION_POINTS.to_string(), der),
                Err(e) => outcome.deny(
                    DecisionCode::PolicyDenied,
                    format!("could not encode the CRL distribution points: {e}"),
                ),
            }
        }
        if !ca_issuers.is_empty() || !ocsp.is_empty() {
            debug!(
                ca_issuers = ca_issuers.len(),
                ocsp = ocsp.len(),
                "adding authority information access"
            );
            match build_authority_information_access(&ca_issuers, &ocsp) {
                Ok(der) => outcome.add_extension(AUTHORITY_INFO_ACCESS.to_string(), der),
                Err(e) => outcome.deny(
                    DecisionCode::PolicyDenied,
                    format!("could not encode the authority information access: {e}"),
                ),
            }
        }
        outcome
    }
}

impl RequestPolicy for RequestValidator<'_> {
    fn validate(
        &self,
        request: &CertificateRequest,
        context: &EvaluationContext<'_>,
    ) -> ValidationOutcome {
        RequestValidator::validate(self, request, context)
    }
}

/// Evaluate inbound occurrences against field rules
///
/// Fields with occurrences but no rule are refused; rules for absent fields
/// still run so mandatory fields are enforced.
fn check_inbound_fields(
    mut outcome: ValidationOutcome,
    rules: &[FieldRule],
    occurrences: &[(&FieldId, &str)],
) -> ValidationOutcome {
    let mut fields: Vec<&FieldId> = Vec::new();
    for field in occurrences
        .iter()
        .map(|(field, _)| *field)
        .chain(rules.iter().map(|rule| &rule.field))
    {
        if !fields.contains(&field) {
            fields.push(field);
        }
    }

    for field in fields {
        let values: Vec<&str> = occurrences
            .iter()
            .filter(|(f, _)| *f == field)
            .map(|(_, value)| *value)
            .collect();
        match evaluate_field(rules, field, &values) {
            None => outcome.deny(
                DecisionCode::PolicyDenied,
                format!("{field} is not permitted by policy"),
            ),
            Some(Verdict::Deny(reasons)) => outcome.deny_all(DecisionCode::PolicyDenied, reasons),
            Some(Verdict::Allow) => {}
        }
    }
    outcome
}

fn check_name_lists(
    what: &str,
    value: Option<&str>,
    allowed: &[String],
    disallowed: &[String],
) -> Result<(), String> {
    let listed = |list: &[String], value: &str| list.iter().any(|v| v.eq_ignore_ascii_case(value));

    if let Some(value) = value {
        if listed(disallowed, value) {
            return Err(format!("the {what} \"{value}\" is not permitted"));
        }
    }
    if allowed.is_empty() {
        return Ok(());
    }
    match value {
        Some(value) if listed(allowed, value) => Ok(()),
        Some(value) => Err(format!("the {what} \"{value}\" is not on the permitted list")),
        None => Err(format!("the request does not name its {what}")),
    }
}

fn resolve_uris(templates: &[String], sources: &AttributeSources<'_>) -> Result<Vec<String>, String> {
    templates
        .iter()
        .map(|template| {
            resolve(template, sources)
                .map_err(|e| format!("could not build the URI \"{template}\": {e}"))
        })
        .collect()
}

fn subject_attributes(subject: &[(FieldId, String)]) -> AttributeMap {
    subject
        .iter()
        .map(|(field, value)| (field.as_str(), value.as_str()))
        .collect()
}

fn san_attributes(san: &SubjectAlternativeNames) -> AttributeMap {
    san.iter()
        .map(|entry| (entry.kind().as_str(), entry.value()))
        .collect()
}

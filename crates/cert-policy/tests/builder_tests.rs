//! Integration tests for PolicyDocumentBuilder, FieldRuleBuilder and
//! OutboundFieldRuleBuilder

use cert_policy::{
    AttestationRule, DirectoryServicesPolicy, FieldId, FieldRuleBuilder, KeyAlgorithm,
    OutboundFieldRuleBuilder, Pattern, PolicyDocument, PolicyDocumentBuilder, PolicyError,
    TreatAs, MAX_EXPRESSION_LENGTH, MAX_PATTERNS_PER_RULE,
};

#[test]
fn test_field_rule_builder() {
    let rule = FieldRuleBuilder::new(FieldId::CommonName)
        .mandatory()
        .max_occurrences(2)
        .min_length(3)
        .max_length(64)
        .pattern(Pattern::regex(r"\.adcslabor\.de$"))
        .pattern(Pattern::exact("bad.adcslabor.de").deny())
        .build()
        .unwrap();

    assert_eq!(rule.field, FieldId::CommonName);
    assert!(rule.mandatory);
    assert_eq!(rule.max_occurrences, 2);
    assert_eq!((rule.min_length, rule.max_length), (3, 64));
    assert_eq!(rule.patterns.len(), 2);
    assert_eq!(rule.patterns[1].treat_as, TreatAs::ExactMatch);
    assert!(rule.patterns[1].is_deny());
}

#[test]
fn test_field_rule_builder_defaults() {
    let rule = FieldRuleBuilder::new("title").build().unwrap();
    assert_eq!(rule.field, FieldId::Title);
    assert!(!rule.mandatory);
    assert_eq!(rule.max_occurrences, 1);
    assert_eq!((rule.min_length, rule.max_length), (1, 128));
    assert!(rule.patterns.is_empty());
}

#[test]
fn test_field_rule_builder_inverted_lengths() {
    let result = FieldRuleBuilder::new(FieldId::CommonName)
        .min_length(10)
        .max_length(5)
        .build();
    assert!(matches!(result, Err(PolicyError::InvalidRule(_))));
}

#[test]
fn test_field_rule_builder_limits() {
    let mut builder = FieldRuleBuilder::new(FieldId::CommonName);
    for i in 0..=MAX_PATTERNS_PER_RULE {
        builder = builder.pattern(Pattern::exact(format!("host{i}")));
    }
    assert!(matches!(
        builder.build(),
        Err(PolicyError::TooManyRules { attempted: 257, .. })
    ));

    let result = FieldRuleBuilder::new(FieldId::CommonName)
        .pattern(Pattern::regex("a".repeat(MAX_EXPRESSION_LENGTH + 1)))
        .build();
    assert!(matches!(
        result,
        Err(PolicyError::ExpressionTooLong { length: 4097, .. })
    ));
}

#[test]
fn test_outbound_rule_builder() {
    let rule = OutboundFieldRuleBuilder::new(FieldId::DnsName)
        .value("{sdn:commonName}")
        .mandatory()
        .build();
    assert_eq!(rule.field, FieldId::DnsName);
    assert_eq!(rule.value, "{sdn:commonName}");
    assert!(rule.mandatory);
    assert!(!rule.force);

    let clear = OutboundFieldRuleBuilder::new(FieldId::OrganizationName)
        .force()
        .build();
    assert!(clear.value.is_empty());
}

#[test]
fn test_policy_document_builder() {
    let policy = PolicyDocumentBuilder::new()
        .audit_only(true)
        .key_algorithm(KeyAlgorithm::Ecc)
        .key_length(256, 521)
        .allow_process("certreq.exe")
        .disallow_process("powershell.exe")
        .allow_crypto_provider("Microsoft Platform Crypto Provider")
        .disallow_crypto_provider("Microsoft Base Cryptographic Provider v1.0")
        .read_subject_from_request(true)
        .supplement_dns_names(true)
        .supplement_unqualified_names(true)
        .permit_empty_identities(true)
        .subject_rule_with(FieldId::CommonName, |rule| rule.pattern(Pattern::regex(".*")))
        .san_rule_with(FieldId::UserPrincipalName, |rule| {
            rule.pattern(Pattern::regex_ignore_case("@adcslabor\\.de$"))
        })
        .outbound_subject_with(FieldId::CountryName, |rule| rule.value("DE").force())
        .outbound_san_with(FieldId::Rfc822Name, |rule| rule.value("{ad:mail}"))
        .directory_services(DirectoryServicesPolicy::default())
        .attestation_rule(AttestationRule::default())
        .crl_distribution_point("http://pki.adcslabor.de/ca.crl")
        .ca_issuer("http://pki.adcslabor.de/ca.crt")
        .ocsp("http://ocsp.adcslabor.de/")
        .build()
        .unwrap();

    assert!(policy.audit_only());
    assert_eq!(policy.key_algorithm(), Some(KeyAlgorithm::Ecc));
    assert_eq!(
        (policy.minimum_key_length(), policy.maximum_key_length()),
        (256, 521)
    );
    assert_eq!(policy.allowed_processes(), ["certreq.exe"]);
    assert_eq!(policy.disallowed_processes(), ["powershell.exe"]);
    assert_eq!(policy.allowed_crypto_providers().len(), 1);
    assert_eq!(policy.disallowed_crypto_providers().len(), 1);
    assert!(policy.read_subject_from_request());
    assert!(policy.supplement_dns_names());
    assert!(policy.supplement_unqualified_names());
    assert!(policy.permit_empty_identities());
    assert_eq!(policy.subject_rules().len(), 1);
    assert_eq!(policy.subject_alternative_name_rules().len(), 1);
    assert_eq!(policy.outbound_subject()[0].value, "DE");
    assert_eq!(
        policy.outbound_subject_alternative_name()[0].field,
        FieldId::Rfc822Name
    );
    assert!(policy.directory_services().is_some());
    assert_eq!(policy.attestation_rules().len(), 1);
    assert_eq!(policy.crl_distribution_points().len(), 1);
    assert_eq!(policy.authority_information_access().len(), 1);
    assert_eq!(policy.online_certificate_status_protocol().len(), 1);
}

#[test]
fn test_policy_builder_keeps_first_rule_error() {
    let result = PolicyDocumentBuilder::new()
        .subject_rule_with(FieldId::CommonName, |rule| rule.min_length(9).max_length(3))
        .san_rule_with(FieldId::DnsName, |rule| {
            rule.pattern(Pattern::regex("a".repeat(MAX_EXPRESSION_LENGTH + 1)))
        })
        .build();
    assert!(matches!(result, Err(PolicyError::InvalidRule(_))));
}

#[test]
fn test_policy_builder_validates_document() {
    let result = PolicyDocumentBuilder::new().key_length(4096, 2048).build();
    assert!(matches!(result, Err(PolicyError::InvalidRule(_))));

    let result = PolicyDocumentBuilder::new()
        .subject_rule_with(FieldId::IpAddress, |rule| rule)
        .build();
    assert!(matches!(result, Err(PolicyError::InvalidRule(_))));

    let result = PolicyDocumentBuilder::new().crl_distribution_point("").build();
    assert!(matches!(result, Err(PolicyError::InvalidRule(_))));
}

#[test]
fn test_built_document_matches_loaded_document() {
    let built = PolicyDocumentBuilder::new()
        .key_algorithm(KeyAlgorithm::Rsa)
        .key_length(2048, 0)
        .subject_rule_with(FieldId::CommonName, |rule| {
            rule.mandatory().pattern(Pattern::cidr("10.0.0.0/8").deny())
        })
        .build()
        .unwrap();

    let loaded = PolicyDocument::from_toml(
        r#"
keyAlgorithm = "RSA"
minimumKeyLength = 2048

[[subjectRules]]
field = "commonName"
mandatory = true
patterns = [{ expression = "10.0.0.0/8", treatAs = "Cidr", action = "Deny" }]
"#,
    )
    .unwrap();

    assert_eq!(built, loaded);
}

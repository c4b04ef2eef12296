//! Tests for outbound identity rules

use cert_extensions::{SanKind, SubjectAlternativeNames};
use cert_policy::outbound::apply_rules;
use cert_policy::{
    AttributeMap, AttributeSource, AttributeSources, FieldId, IdentityState, OutboundFieldRule,
    OutboundFieldRuleBuilder, Verdict,
};

fn identity_with_cn(cn: &str) -> IdentityState {
    IdentityState::new(
        vec![(FieldId::CommonName, cn.to_string())],
        SubjectAlternativeNames::new(),
    )
}

fn values(identity: &IdentityState, field: FieldId) -> Vec<String> {
    identity
        .subject_values(&field)
        .map(str::to_string)
        .collect()
}

#[test]
fn test_value_from_inbound_subject() {
    let sdn: AttributeMap = [("commonName", "intranet.adcslabor.de")].into_iter().collect();
    let sources = AttributeSources::new().with(AttributeSource::Subject, &sdn);
    let mut identity = identity_with_cn("intranet.adcslabor.de");

    let rule = OutboundFieldRuleBuilder::new(FieldId::OrganizationName)
        .value("{sdn:commonName}")
        .force()
        .build();

    assert_eq!(rule.apply(&mut identity, &sources), Verdict::Allow);
    assert_eq!(
        values(&identity, FieldId::OrganizationName),
        vec!["intranet.adcslabor.de"]
    );
}

#[test]
fn test_identical_san_rules_add_one_entry() {
    let rules: Vec<OutboundFieldRule> = (0..3)
        .map(|_| {
            OutboundFieldRuleBuilder::new(FieldId::DnsName)
                .value("test.intranet.adcslabor.de")
                .force()
                .build()
        })
        .collect();
    let mut identity = identity_with_cn("x");

    let verdict = apply_rules(&rules, &mut identity, &AttributeSources::new());
    assert_eq!(verdict, Verdict::Allow);
    assert_eq!(identity.san().len(), 1);
    assert!(identity
        .san()
        .contains(SanKind::DnsName, "test.intranet.adcslabor.de"));
}

#[test]
fn test_empty_value_with_force_clears() {
    let mut identity = identity_with_cn("intranet.adcslabor.de");
    let rule = OutboundFieldRuleBuilder::new(FieldId::CommonName).force().build();

    rule.apply(&mut identity, &AttributeSources::new());
    assert_eq!(values(&identity, FieldId::CommonName), vec![""]);
    assert_eq!(
        identity.changed_properties().get(&FieldId::CommonName),
        Some(&String::new())
    );
}

#[test]
fn test_empty_value_with_force_on_absent_field() {
    let mut identity = identity_with_cn("x");
    let rule = OutboundFieldRuleBuilder::new(FieldId::Title).force().build();
    rule.apply(&mut identity, &AttributeSources::new());
    assert_eq!(values(&identity, FieldId::Title), vec![""]);
}

#[test]
fn test_empty_value_without_force_is_noop() {
    let mut identity = identity_with_cn("intranet.adcslabor.de");
    let rule = OutboundFieldRuleBuilder::new(FieldId::CommonName).build();
    rule.apply(&mut identity, &AttributeSources::new());
    assert_eq!(
        values(&identity, FieldId::CommonName),
        vec!["intranet.adcslabor.de"]
    );
    assert!(identity.changed_properties().is_empty());
}

#[test]
fn test_existing_value_kept_without_force() {
    let mut identity = identity_with_cn("original");
    let keep = OutboundFieldRuleBuilder::new(FieldId::CommonName)
        .value("replacement")
        .build();
    keep.apply(&mut identity, &AttributeSources::new());
    assert_eq!(values(&identity, FieldId::CommonName), vec!["original"]);

    let replace = OutboundFieldRuleBuilder::new(FieldId::CommonName)
        .value("replacement")
        .force()
        .build();
    replace.apply(&mut identity, &AttributeSources::new());
    assert_eq!(values(&identity, FieldId::CommonName), vec!["replacement"]);
}

#[test]
fn test_san_without_force_only_fills_empty_kind() {
    let mut san = SubjectAlternativeNames::new();
    san.add(SanKind::DnsName, "a.adcslabor.de").unwrap();
    let mut identity = IdentityState::new(Vec::new(), san);

    let rule = OutboundFieldRuleBuilder::new(FieldId::DnsName)
        .value("b.adcslabor.de")
        .build();
    rule.apply(&mut identity, &AttributeSources::new());
    assert_eq!(identity.san().len(), 1);
    assert!(!identity.san_changed());

    let forced = OutboundFieldRuleBuilder::new(FieldId::DnsName)
        .value("b.adcslabor.de")
        .force()
        .build();
    forced.apply(&mut identity, &AttributeSources::new());
    assert_eq!(identity.san().len(), 2);
    assert!(identity.san_changed());
}

#[test]
fn test_unresolvable_value_mandatory_denies() {
    let mut identity = identity_with_cn("x");
    let rule = OutboundFieldRuleBuilder::new(FieldId::Title)
        .value("{ad:title}")
        .mandatory()
        .build();
    let verdict = rule.apply(&mut identity, &AttributeSources::new());
    assert!(verdict.is_denied());
    assert!(values(&identity, FieldId::Title).is_empty());
}

#[test]
fn test_unresolvable_value_optional_is_skipped() {
    let mut identity = identity_with_cn("x");
    let rule = OutboundFieldRuleBuilder::new(FieldId::Title)
        .value("{ad:title}")
        .build();
    assert_eq!(
        rule.apply(&mut identity, &AttributeSources::new()),
        Verdict::Allow
    );
    assert!(values(&identity, FieldId::Title).is_empty());
}

#[test]
fn test_unknown_field() {
    let mut identity = identity_with_cn("x");
    let optional = OutboundFieldRuleBuilder::new("favouriteColour")
        .value("blue")
        .build();
    assert_eq!(
        optional.apply(&mut identity, &AttributeSources::new()),
        Verdict::Allow
    );

    let mandatory = OutboundFieldRuleBuilder::new("favouriteColour")
        .value("blue")
        .mandatory()
        .build();
    let verdict = mandatory.apply(&mut identity, &AttributeSources::new());
    assert!(verdict.reasons()[0].contains("favouriteColour"));
}

#[test]
fn test_value_longer_than_field_limit() {
    let mut identity = identity_with_cn("x");
    let optional = OutboundFieldRuleBuilder::new(FieldId::CountryName)
        .value("DEU")
        .build();
    assert_eq!(
        optional.apply(&mut identity, &AttributeSources::new()),
        Verdict::Allow
    );
    assert!(values(&identity, FieldId::CountryName).is_empty());

    let mandatory = OutboundFieldRuleBuilder::new(FieldId::CountryName)
        .value("DEU")
        .mandatory()
        .build();
    assert!(mandatory
        .apply(&mut identity, &AttributeSources::new())
        .is_denied());
}

#[test]
fn test_invalid_san_value() {
    let mut identity = identity_with_cn("x");
    let rule = OutboundFieldRuleBuilder::new(FieldId::IpAddress)
        .value("not-an-address")
        .mandatory()
        .build();
    assert!(rule
        .apply(&mut identity, &AttributeSources::new())
        .is_denied());
    assert!(identity.san().is_empty());
}

#[test]
fn test_rules_apply_in_order() {
    let rules = vec![
        OutboundFieldRuleBuilder::new(FieldId::CommonName)
            .value("first")
            .force()
            .build(),
        OutboundFieldRuleBuilder::new(FieldId::CommonName)
            .value("second")
            .force()
            .build(),
    ];
    let mut identity = identity_with_cn("x");
    apply_rules(&rules, &mut identity, &AttributeSources::new());
    assert_eq!(values(&identity, FieldId::CommonName), vec!["second"]);
}

#[test]
fn test_force_collapses_repeated_subject_values() {
    let mut identity = IdentityState::new(
        vec![
            (FieldId::OrganizationalUnitName, "PKI".to_string()),
            (FieldId::OrganizationalUnitName, "Users".to_string()),
        ],
        SubjectAlternativeNames::new(),
    );
    let rule = OutboundFieldRuleBuilder::new(FieldId::OrganizationalUnitName)
        .value("PKI")
        .force()
        .build();

    assert_eq!(rule.apply(&mut identity, &AttributeSources::new()), Verdict::Allow);
    assert_eq!(values(&identity, FieldId::OrganizationalUnitName), vec!["PKI"]);
}

//! Property-based tests for matching, field rules, outbound rules and
//! placeholder resolution
//!
//! These tests ensure that:
//! - malformed CIDR input never panics and yields `match_on_error`
//! - a rule without patterns denies every value
//! - applying the same outbound rule N times equals applying it once
//! - resolution never panics on arbitrary templates

use cert_extensions::{SanKind, SubjectAlternativeNames};
use cert_policy::outbound::apply_rules;
use cert_policy::{
    resolve, AttributeMap, AttributeSource, AttributeSources, FieldId, FieldRule, IdentityState,
    OutboundFieldRuleBuilder, Pattern, PatternAction, TreatAs,
};
use proptest::prelude::*;

fn arb_treat_as() -> impl Strategy<Value = TreatAs> {
    prop_oneof![
        Just(TreatAs::RegEx),
        Just(TreatAs::RegExIgnoreCase),
        Just(TreatAs::Cidr),
        Just(TreatAs::ExactMatch),
        Just(TreatAs::ExactMatchIgnoreCase),
        Just(TreatAs::Unsupported),
    ]
}

fn arb_host() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9-]{0,20}\\.adcslabor\\.de").unwrap()
}

// =============================================================================
// PATTERN MATCHER
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// An expression without a prefix length is never a network
    #[test]
    fn prop_cidr_without_prefix_returns_match_on_error(
        expression in "[^/]{0,40}",
        term in "\\PC{0,40}",
        match_on_error in any::<bool>(),
    ) {
        let pattern = Pattern::cidr(expression);
        prop_assert_eq!(pattern.is_match(&term, match_on_error), match_on_error);
    }

    /// A term that is not an address falls back to `match_on_error`
    #[test]
    fn prop_cidr_non_address_term_returns_match_on_error(
        term in "[g-z]{1,20}",
        match_on_error in any::<bool>(),
    ) {
        let pattern = Pattern::cidr("192.168.0.0/16");
        prop_assert_eq!(pattern.is_match(&term, match_on_error), match_on_error);
    }

    /// Every address inside a network matches it
    #[test]
    fn prop_cidr_contains_host_addresses(c in any::<u8>(), d in any::<u8>()) {
        let pattern = Pattern::cidr("192.168.0.0/16");
        let address = format!("192.168.{c}.{d}");
        prop_assert!(pattern.is_match(&address, false));
    }

    /// Matching never panics, whatever the expression, term or type
    #[test]
    fn prop_matching_never_panics(
        expression in "\\PC{0,60}",
        term in "\\PC{0,60}",
        treat_as in arb_treat_as(),
    ) {
        let pattern = Pattern { expression, treat_as, action: PatternAction::Allow };
        let _ = pattern.try_match(&term);
        let _ = pattern.is_match(&term, true);
    }

    /// Exact matching is reflexive
    #[test]
    fn prop_exact_match_is_reflexive(term in "\\PC{1,60}") {
        prop_assert!(Pattern::exact(term.clone()).is_match(&term, false));
        prop_assert!(Pattern::exact_ignore_case(term.clone()).is_match(&term, false));
    }

    /// Case-insensitive exact matching ignores ASCII case
    #[test]
    fn prop_exact_ignore_case_ascii(term in "[a-zA-Z0-9.-]{1,40}") {
        let pattern = Pattern::exact_ignore_case(term.to_ascii_uppercase());
        prop_assert!(pattern.is_match(&term.to_ascii_lowercase(), false));
    }
}

// =============================================================================
// FIELD RULES
// =============================================================================

proptest! {
    /// A rule without patterns denies every value
    #[test]
    fn prop_empty_patterns_deny(value in "\\PC{1,128}", mandatory in any::<bool>()) {
        let rule = FieldRule { mandatory, ..FieldRule::new(FieldId::CommonName) };
        prop_assert!(rule.evaluate(&[value]).is_denied());
    }

    /// A value is never admitted once a deny pattern matches it
    #[test]
    fn prop_deny_wins(host in arb_host()) {
        let rule = FieldRule {
            patterns: vec![
                Pattern::regex(".*"),
                Pattern::exact(host.clone()).deny(),
            ],
            ..FieldRule::new(FieldId::CommonName)
        };
        prop_assert!(rule.evaluate(&[host]).is_denied());
    }
}

// =============================================================================
// OUTBOUND RULES
// =============================================================================

proptest! {
    /// Applying the same SAN rule many times adds the value once
    #[test]
    fn prop_outbound_san_deduplicates(host in arb_host(), times in 1usize..16) {
        let rule = OutboundFieldRuleBuilder::new(FieldId::DnsName)
            .value(host.clone())
            .force()
            .build();
        let rules = vec![rule; times];
        let mut identity = IdentityState::new(Vec::new(), SubjectAlternativeNames::new());

        let verdict = apply_rules(&rules, &mut identity, &AttributeSources::new());
        prop_assert!(!verdict.is_denied());
        prop_assert_eq!(identity.san().len(), 1);
        prop_assert!(identity.san().contains(SanKind::DnsName, &host));
    }

    /// Forcing a subject field leaves exactly one value
    #[test]
    fn prop_outbound_force_replaces_all(values in proptest::collection::vec("[a-z]{1,10}", 1..6)) {
        let subject = values
            .iter()
            .map(|v| (FieldId::OrganizationalUnitName, v.clone()))
            .collect();
        let mut identity = IdentityState::new(subject, SubjectAlternativeNames::new());
        let rule = OutboundFieldRuleBuilder::new(FieldId::OrganizationalUnitName)
            .value("PKI")
            .force()
            .build();

        let verdict = rule.apply(&mut identity, &AttributeSources::new());
        prop_assert!(!verdict.is_denied());
        let result: Vec<&str> = identity
            .subject_values(&FieldId::OrganizationalUnitName)
            .collect();
        prop_assert_eq!(result, vec!["PKI"]);
    }
}

// =============================================================================
// PLACEHOLDERS
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Resolution never panics on arbitrary templates
    #[test]
    fn prop_resolve_never_panics(template in "\\PC{0,80}") {
        let sdn: AttributeMap = [("commonName", "x")].into_iter().collect();
        let sources = AttributeSources::new().with(AttributeSource::Subject, &sdn);
        let _ = resolve(&template, &sources);
    }

    /// Templates without braces resolve to themselves
    #[test]
    fn prop_literal_templates_unchanged(template in "[^{}]{0,80}") {
        prop_assert_eq!(resolve(&template, &AttributeSources::new()).unwrap(), template);
    }

    /// Every placeholder occurrence is substituted with the same value
    #[test]
    fn prop_repeated_placeholders(value in "[a-zA-Z0-9 ]{0,20}", times in 1usize..5) {
        let ad: AttributeMap = [("sn", value.as_str())].into_iter().collect();
        let sources = AttributeSources::new().with(AttributeSource::Directory, &ad);
        let template = vec!["{ad:sn}"; times].join("-");
        let expected = vec![value.as_str(); times].join("-");
        prop_assert_eq!(resolve(&template, &sources).unwrap(), expected);
    }
}

//! Fuzz target for YamlParser::parse
//!
//! This target tests YAML policy parsing with arbitrary strings to verify:
//! - serde_yaml handles malformed YAML without panicking
//! - every accepted document passes PolicyDocument::validate
//! - no memory exhaustion from deeply nested YAML
//!
//! Limits to verify:
//! - MAX_RULES_PER_SECTION = 256
//! - MAX_PATTERNS_PER_RULE = 256
//! - MAX_EXPRESSION_LENGTH = 4096

#![no_main]

use app_utils::{Error, PolicyParser, YamlParser};
use cert_policy::{MAX_EXPRESSION_LENGTH, MAX_PATTERNS_PER_RULE, MAX_RULES_PER_SECTION};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let parser = YamlParser;

    match parser.parse(data) {
        Ok(policy) => {
            let rules = policy
                .subject_rules()
                .iter()
                .chain(policy.subject_alternative_name_rules());

            for rule in rules {
                assert!(
                    rule.patterns.len() <= MAX_PATTERNS_PER_RULE,
                    "Pattern count exceeds MAX_PATTERNS_PER_RULE"
                );
                for pattern in &rule.patterns {
                    assert!(
                        pattern.expression.len() <= MAX_EXPRESSION_LENGTH,
                        "Expression exceeds MAX_EXPRESSION_LENGTH"
                    );
                }
            }
            assert!(
                policy.subject_rules().len() <= MAX_RULES_PER_SECTION,
                "Rule count exceeds MAX_RULES_PER_SECTION"
            );

            // validate() already ran during deserialization
            assert!(policy.validate().is_ok(), "Parsed policy failed validation");
        }
        Err(Error::YamlParseError(_)) => {
            // malformed YAML or a rejected document
        }
        Err(e) => panic!("Unexpected error type: {:?}", e),
    }
});

//! Fuzz target for PolicyDocument::from_toml
//!
//! Deserialization must never panic, and every document it accepts must
//! satisfy the section and expression limits.

#![no_main]

use cert_policy::{PolicyDocument, MAX_RULES_PER_SECTION};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(policy) = PolicyDocument::from_toml(data) {
        assert!(policy.subject_rules().len() <= MAX_RULES_PER_SECTION);
        assert!(policy.outbound_subject().len() <= MAX_RULES_PER_SECTION);
        assert!(policy.validate().is_ok(), "parsed document failed validation");

        // A document that loaded must survive a TOML round trip
        if let Ok(serialized) = policy.to_toml() {
            let reloaded = PolicyDocument::from_toml(&serialized).expect("reload");
            assert_eq!(reloaded, policy);
        }
    }
});

//! Fuzz target for Pattern matching
//!
//! The first line of the input is the expression, the rest the term. Every
//! pattern type must return without panicking, and `is_match` must agree
//! with `try_match` or fall back to `match_on_error`.

#![no_main]

use cert_policy::{Pattern, PatternAction, TreatAs};
use libfuzzer_sys::fuzz_target;

const TYPES: [TreatAs; 6] = [
    TreatAs::RegEx,
    TreatAs::RegExIgnoreCase,
    TreatAs::Cidr,
    TreatAs::ExactMatch,
    TreatAs::ExactMatchIgnoreCase,
    TreatAs::Unsupported,
];

fuzz_target!(|data: &str| {
    let (expression, term) = data.split_once('\n').unwrap_or((data, ""));

    for treat_as in TYPES {
        let pattern = Pattern {
            expression: expression.to_string(),
            treat_as,
            action: PatternAction::Allow,
        };
        match pattern.try_match(term) {
            Ok(matched) => {
                assert_eq!(pattern.is_match(term, !matched), matched);
            }
            Err(_) => {
                assert!(pattern.is_match(term, true));
                assert!(!pattern.is_match(term, false));
            }
        }
    }
});

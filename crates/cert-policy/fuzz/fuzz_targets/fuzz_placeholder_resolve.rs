//! Fuzz target for placeholder resolution
//!
//! Resolution must never panic. A successful resolution of a template with
//! no placeholders returns the template unchanged.

#![no_main]

use cert_policy::placeholder::has_placeholders;
use cert_policy::{resolve, AttributeMap, AttributeSource, AttributeSources};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let sdn: AttributeMap = [("commonName", "intranet.adcslabor.de")].into_iter().collect();
    let ad: AttributeMap = [("sn", "Ruediger"), ("givenName", "Rudi")].into_iter().collect();
    let sources = AttributeSources::new()
        .with(AttributeSource::Subject, &sdn)
        .with(AttributeSource::Directory, &ad);

    let result = resolve(data, &sources);
    if !has_placeholders(data) {
        assert_eq!(result.as_deref(), Ok(data));
    }
});

#![no_main]

use cert_extensions::SubjectAlternativeNames;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must re-encode and decode to the same set
    if let Ok(san) = SubjectAlternativeNames::from_der(data) {
        if let Ok(bytes) = san.to_der() {
            let again = SubjectAlternativeNames::from_der(&bytes).expect("re-decode");
            assert_eq!(again, san);
        }
    }
});

//! Property-based tests for the SAN codec

use cert_extensions::{SanKind, SubjectAlternativeNames};
use proptest::prelude::*;
use std::net::{Ipv4Addr, Ipv6Addr};

fn dns_name() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9]([a-z0-9-]{0,14}[a-z0-9])?", 1..5).prop_map(|l| l.join("."))
}

fn entry() -> impl Strategy<Value = (SanKind, String)> {
    prop_oneof![
        dns_name().prop_map(|v| (SanKind::DnsName, v)),
        any::<u32>().prop_map(|v| (SanKind::IpAddress, Ipv4Addr::from(v).to_string())),
        any::<u128>().prop_map(|v| (SanKind::IpAddress, Ipv6Addr::from(v).to_string())),
        ("[a-z]{1,10}", dns_name())
            .prop_map(|(user, host)| (SanKind::Rfc822Name, format!("{user}@{host}"))),
        ("[a-z]{1,10}", dns_name())
            .prop_map(|(user, host)| (SanKind::UserPrincipalName, format!("{user}@{host}"))),
        dns_name().prop_map(|host| (SanKind::UniformResourceIdentifier, format!("https://{host}/"))),
    ]
}

proptest! {
    #[test]
    fn prop_encoded_names_decode_to_the_same_set(entries in prop::collection::vec(entry(), 0..8)) {
        let mut san = SubjectAlternativeNames::new();
        for (kind, value) in &entries {
            san.add(*kind, value).unwrap();
        }
        let decoded = SubjectAlternativeNames::from_der(&san.to_der().unwrap()).unwrap();
        prop_assert_eq!(decoded, san);
    }

    #[test]
    fn prop_decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..128)) {
        let _ = SubjectAlternativeNames::from_der(&bytes);
    }
}

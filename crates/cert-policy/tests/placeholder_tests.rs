//! Tests for `{source:attribute}` placeholder resolution

use cert_policy::{resolve, AttributeMap, AttributeSource, AttributeSources, PlaceholderError};

fn directory() -> AttributeMap {
    [
        ("sn", "Ostermeier"),
        ("givenName", "Rudi"),
        ("department", "PKI {ad:sn}"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_multiple_tokens_with_literals() {
    let ad = directory();
    let sources = AttributeSources::new().with(AttributeSource::Directory, &ad);
    assert_eq!(
        resolve("{ad:sn}, {ad:givenName}", &sources).unwrap(),
        "Ostermeier, Rudi"
    );
}

#[test]
fn test_repeated_reference_uses_same_value() {
    let ad = directory();
    let sources = AttributeSources::new().with(AttributeSource::Directory, &ad);
    assert_eq!(
        resolve("{ad:sn}-{AD:SN}", &sources).unwrap(),
        "Ostermeier-Ostermeier"
    );
}

#[test]
fn test_substituted_values_are_not_rescanned() {
    let ad = directory();
    let sources = AttributeSources::new().with(AttributeSource::Directory, &ad);
    assert_eq!(
        resolve("{ad:department}", &sources).unwrap(),
        "PKI {ad:sn}"
    );
}

#[test]
fn test_template_without_placeholders_is_unchanged() {
    let sources = AttributeSources::new();
    assert_eq!(resolve("plain value", &sources).unwrap(), "plain value");
    assert_eq!(resolve("{not a token}", &sources).unwrap(), "{not a token}");
    assert_eq!(resolve("", &sources).unwrap(), "");
}

#[test]
fn test_missing_attribute_reports_original_name() {
    let ad = directory();
    let sources = AttributeSources::new().with(AttributeSource::Directory, &ad);
    let err = resolve("{ad:EmployeeID}", &sources).unwrap_err();
    assert_eq!(
        err,
        PlaceholderError::AttributeNotFound {
            origin: AttributeSource::Directory,
            attribute: "EmployeeID".to_string(),
        }
    );
    assert!(err.to_string().contains("EmployeeID"));
}

#[test]
fn test_unknown_source() {
    let sources = AttributeSources::new();
    assert_eq!(
        resolve("{ldap:cn}", &sources),
        Err(PlaceholderError::UnknownSource("ldap".to_string()))
    );
}

#[test]
fn test_invalid_attribute_name() {
    let ad = directory();
    let sources = AttributeSources::new().with(AttributeSource::Directory, &ad);
    assert_eq!(
        resolve("{ad:given name}", &sources),
        Err(PlaceholderError::InvalidAttributeName("given name".to_string()))
    );
    assert!(matches!(
        resolve("{ad:}", &sources),
        Err(PlaceholderError::InvalidAttributeName(_))
    ));
}

#[test]
fn test_unavailable_source() {
    let sources = AttributeSources::new();
    assert_eq!(
        resolve("{yk:FormFactor}", &sources),
        Err(PlaceholderError::SourceUnavailable(AttributeSource::Attestation))
    );
}

#[test]
fn test_source_prefixes() {
    for source in AttributeSource::ALL {
        assert_eq!(AttributeSource::from_prefix(source.prefix()), Some(source));
    }
    assert_eq!(
        AttributeSource::from_prefix("SDN"),
        Some(AttributeSource::Subject)
    );
    assert_eq!(AttributeSource::from_prefix("x"), None);
}

//! GeneralName entries and their per-kind validation.
//!
//! A [`GeneralNameEntry`] always holds its value as text: DNS names, email
//! addresses, UPNs and URIs verbatim, IP addresses in canonical textual form.
//! Conversion to and from the RFC 5280 `GeneralName` CHOICE happens at the
//! codec boundary.

use crate::error::{ExtensionError, Result};
use crate::oid::USER_PRINCIPAL_NAME;
use crate::uri::encode_uri;
use der::asn1::{Ia5String, OctetString};
use der::{Any, Tag, Tagged};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use x509_cert::ext::pkix::name::{GeneralName, OtherName};

/// Maximum length of a DNS name (RFC 1035)
const MAX_DNS_NAME_LENGTH: usize = 253;

/// Maximum length of a single DNS label
const MAX_DNS_LABEL_LENGTH: usize = 63;

/// Maximum length of the local part of an email address (RFC 5321)
const MAX_EMAIL_LOCAL_PART_LENGTH: usize = 64;

/// The GeneralName kinds this codec can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SanKind {
    /// `dNSName` (implicit tag 2)
    #[serde(rename = "dNSName")]
    DnsName,
    /// `iPAddress` (implicit tag 7)
    #[serde(rename = "iPAddress")]
    IpAddress,
    /// `rfc822Name` (implicit tag 1)
    #[serde(rename = "rfc822Name")]
    Rfc822Name,
    /// `userPrincipalName` carried as `otherName` (tag 0)
    #[serde(rename = "userPrincipalName")]
    UserPrincipalName,
    /// `uniformResourceIdentifier` (implicit tag 6)
    #[serde(rename = "uniformResourceIdentifier")]
    UniformResourceIdentifier,
}

impl SanKind {
    /// All supported kinds, in a stable order.
    pub const ALL: [SanKind; 5] = [
        SanKind::DnsName,
        SanKind::IpAddress,
        SanKind::Rfc822Name,
        SanKind::UserPrincipalName,
        SanKind::UniformResourceIdentifier,
    ];

    /// Canonical attribute name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SanKind::DnsName => "dNSName",
            SanKind::IpAddress => "iPAddress",
            SanKind::Rfc822Name => "rfc822Name",
            SanKind::UserPrincipalName => "userPrincipalName",
            SanKind::UniformResourceIdentifier => "uniformResourceIdentifier",
        }
    }

    /// Looks up a kind by its attribute name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for SanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed alternative name.
///
/// Values are validated and normalized on construction: IP addresses are
/// stored in canonical form and URIs with a recognized scheme are
/// percent-encoded, so two entries compare equal exactly when they encode
/// to the same DER.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GeneralNameEntryRaw")]
pub struct GeneralNameEntry {
    kind: SanKind,
    value: String,
}

#[derive(Debug, Deserialize)]
struct GeneralNameEntryRaw {
    kind: SanKind,
    value: String,
}

impl TryFrom<GeneralNameEntryRaw> for GeneralNameEntry {
    type Error = ExtensionError;

    fn try_from(raw: GeneralNameEntryRaw) -> Result<Self> {
        Self::new(raw.kind, raw.value)
    }
}

impl GeneralNameEntry {
    /// Creates a validated entry.
    ///
    /// # Errors
    ///
    /// Returns the kind-specific `Invalid*` error if `value` is not
    /// acceptable for `kind`.
    pub fn new(kind: SanKind, value: impl AsRef<str>) -> Result<Self> {
        let value = value.as_ref();
        let value = match kind {
            SanKind::DnsName => {
                if !is_valid_dns_name(value) {
                    return Err(ExtensionError::InvalidDnsName(value.to_string()));
                }
                value.to_string()
            }
            SanKind::IpAddress => value
                .parse::<IpAddr>()
                .map_err(|_| ExtensionError::InvalidIpAddress(value.to_string()))?
                .to_string(),
            SanKind::Rfc822Name => {
                if !is_valid_email_address(value) {
                    return Err(ExtensionError::InvalidEmailAddress(value.to_string()));
                }
                value.to_string()
            }
            SanKind::UserPrincipalName => {
                if !is_valid_user_principal_name(value) {
                    return Err(ExtensionError::InvalidUserPrincipalName(value.to_string()));
                }
                value.to_string()
            }
            SanKind::UniformResourceIdentifier => {
                let encoded = encode_uri(value);
                if encoded.is_empty() || !encoded.is_ascii() {
                    return Err(ExtensionError::InvalidUri(value.to_string()));
                }
                encoded.into_owned()
            }
        };
        Ok(Self { kind, value })
    }

    /// Kind of this entry
    #[must_use]
    pub const fn kind(&self) -> SanKind {
        self.kind
    }

    /// Textual value of this entry
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    pub(crate) fn to_general_name(&self) -> Result<GeneralName> {
        let name = match self.kind {
            SanKind::DnsName => GeneralName::DnsName(Ia5String::new(self.value.as_str())?),
            SanKind::Rfc822Name => GeneralName::Rfc822Name(Ia5String::new(self.value.as_str())?),
            SanKind::UniformResourceIdentifier => {
                GeneralName::UniformResourceIdentifier(Ia5String::new(self.value.as_str())?)
            }
            SanKind::IpAddress => {
                let octets = match self
                    .value
                    .parse::<IpAddr>()
                    .map_err(|_| ExtensionError::InvalidIpAddress(self.value.clone()))?
                {
                    IpAddr::V4(ip) => ip.octets().to_vec(),
                    IpAddr::V6(ip) => ip.octets().to_vec(),
                };
                GeneralName::IpAddress(OctetString::new(octets)?)
            }
            SanKind::UserPrincipalName => GeneralName::OtherName(OtherName {
                type_id: USER_PRINCIPAL_NAME,
                value: Any::new(Tag::Utf8String, self.value.as_bytes())?,
            }),
        };
        Ok(name)
    }

    /// Converts a decoded `GeneralName`. Values are taken as found, without
    /// the syntax checks applied by [`GeneralNameEntry::new`], so that a
    /// decoded extension re-encodes to the same bytes.
    pub(crate) fn from_general_name(name: &GeneralName) -> Result<Self> {
        let (kind, value) = match name {
            GeneralName::DnsName(dns) => (SanKind::DnsName, dns.to_string()),
            GeneralName::Rfc822Name(email) => (SanKind::Rfc822Name, email.to_string()),
            GeneralName::UniformResourceIdentifier(uri) => {
                (SanKind::UniformResourceIdentifier, uri.to_string())
            }
            GeneralName::IpAddress(octets) => (SanKind::IpAddress, ip_from_octets(octets.as_bytes())?),
            GeneralName::OtherName(other) => {
                if other.type_id != USER_PRINCIPAL_NAME {
                    return Err(ExtensionError::UnsupportedOtherName(other.type_id.to_string()));
                }
                if other.value.tag() != Tag::Utf8String {
                    return Err(ExtensionError::InvalidUserPrincipalName(format!(
                        "unexpected tag {}",
                        other.value.tag()
                    )));
                }
                let upn = std::str::from_utf8(other.value.value()).map_err(|_| {
                    ExtensionError::InvalidUserPrincipalName("not valid UTF-8".to_string())
                })?;
                (SanKind::UserPrincipalName, upn.to_string())
            }
            GeneralName::DirectoryName(_) => {
                return Err(ExtensionError::UnsupportedGeneralName {
                    kind: "directoryName",
                })
            }
            GeneralName::EdiPartyName(_) => {
                return Err(ExtensionError::UnsupportedGeneralName {
                    kind: "ediPartyName",
                })
            }
            GeneralName::RegisteredId(_) => {
                return Err(ExtensionError::UnsupportedGeneralName {
                    kind: "registeredID",
                })
            }
        };
        Ok(Self { kind, value })
    }
}

impl fmt::Display for GeneralNameEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind, self.value)
    }
}

fn ip_from_octets(octets: &[u8]) -> Result<String> {
    match octets.len() {
        4 => {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(octets);
            Ok(Ipv4Addr::from(buf).to_string())
        }
        16 => {
            let mut buf = [0u8; 16];
            buf.copy_from_slice(octets);
            Ok(Ipv6Addr::from(buf).to_string())
        }
        len => Err(ExtensionError::InvalidIpAddressLength(len)),
    }
}

/// Checks that `name` is a syntactically plausible host name.
///
/// A single leading `*.` wildcard label and a trailing root dot are
/// accepted. Labels are 1..=63 characters of letters, digits, `-` and `_`
/// and must not begin or end with `-`.
#[must_use]
pub fn is_valid_dns_name(name: &str) -> bool {
    let name = name.strip_prefix("*.").unwrap_or(name);
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() || name.len() > MAX_DNS_NAME_LENGTH {
        return false;
    }
    name.split('.').all(is_valid_dns_label)
}

fn is_valid_dns_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_DNS_LABEL_LENGTH
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Checks that `address` is a plain `local@domain` email address.
#[must_use]
pub fn is_valid_email_address(address: &str) -> bool {
    let Some((local, domain)) = address.rsplit_once('@') else {
        return false;
    };
    if local.is_empty()
        || local.len() > MAX_EMAIL_LOCAL_PART_LENGTH
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
    {
        return false;
    }
    let local_ok = local.bytes().all(|b| {
        b.is_ascii_graphic()
            && !matches!(
                b,
                b'@' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b',' | b';' | b':' | b'\\' | b'"'
            )
    });
    local_ok && !domain.starts_with("*.") && is_valid_dns_name(domain)
}

/// Checks that `upn` is of the form `user@realm`.
///
/// The user part may contain any non-whitespace characters; the realm must
/// be a valid DNS name.
#[must_use]
pub fn is_valid_user_principal_name(upn: &str) -> bool {
    let Some((user, realm)) = upn.rsplit_once('@') else {
        return false;
    };
    !user.is_empty()
        && !user.chars().any(|c| c.is_whitespace() || c.is_control())
        && !realm.starts_with("*.")
        && is_valid_dns_name(realm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dns_name_validation() {
        assert!(is_valid_dns_name("intranet.adcslabor.de"));
        assert!(is_valid_dns_name("*.adcslabor.de"));
        assert!(is_valid_dns_name("host_01.example.com."));
        assert!(is_valid_dns_name("localhost"));
        assert!(!is_valid_dns_name(""));
        assert!(!is_valid_dns_name("a..b"));
        assert!(!is_valid_dns_name("-bad.example.com"));
        assert!(!is_valid_dns_name("bad-.example.com"));
        assert!(!is_valid_dns_name("space here.example.com"));
        assert!(!is_valid_dns_name("sub.*.example.com"));
        assert!(!is_valid_dns_name(&"a".repeat(64)));
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email_address("rudi@adcslabor.de"));
        assert!(is_valid_email_address("first.last+tag@example.com"));
        assert!(!is_valid_email_address("no-at-sign"));
        assert!(!is_valid_email_address("@example.com"));
        assert!(!is_valid_email_address("a b@example.com"));
        assert!(!is_valid_email_address(".dot@example.com"));
        assert!(!is_valid_email_address("rudi@*.example.com"));
    }

    #[test]
    fn test_upn_validation() {
        assert!(is_valid_user_principal_name("rudi@intra.adcslabor.de"));
        assert!(is_valid_user_principal_name("Müller@intra.adcslabor.de"));
        assert!(!is_valid_user_principal_name("rudi"));
        assert!(!is_valid_user_principal_name("ru di@intra.adcslabor.de"));
    }

    #[test]
    fn test_ip_address_is_normalized() {
        let entry = GeneralNameEntry::new(SanKind::IpAddress, "2001:0db8:0000::1").unwrap();
        assert_eq!(entry.value(), "2001:db8::1");
        assert!(GeneralNameEntry::new(SanKind::IpAddress, "300.1.1.1").is_err());
    }

    #[test]
    fn test_uri_is_encoded_on_construction() {
        let entry =
            GeneralNameEntry::new(SanKind::UniformResourceIdentifier, "http://a.b/c d").unwrap();
        assert_eq!(entry.value(), "http://a.b/c%20d");
    }

    #[test]
    fn test_non_ascii_uri_with_unknown_scheme_is_rejected() {
        let result = GeneralNameEntry::new(SanKind::UniformResourceIdentifier, "urn:straße");
        assert!(matches!(result, Err(ExtensionError::InvalidUri(_))));
    }

    #[test]
    fn test_kind_lookup_ignores_case() {
        assert_eq!(SanKind::from_name("dnsname"), Some(SanKind::DnsName));
        assert_eq!(SanKind::from_name("UserPrincipalName"), Some(SanKind::UserPrincipalName));
        assert_eq!(SanKind::from_name("directoryName"), None);
    }

    #[test]
    fn test_ip_octets_of_wrong_length_are_rejected() {
        assert!(matches!(
            ip_from_octets(&[1, 2, 3]),
            Err(ExtensionError::InvalidIpAddressLength(3))
        ));
    }
}

//! Identity field identifiers
//!
//! Policy documents name fields by string (`"commonName"`, `"dNSName"`).
//! Those names are resolved once, at load time, into [`FieldId`]. Names that
//! are not in the table become [`FieldId::Unknown`] so rules can still decide
//! between "deny if mandatory" and "ignore".

use cert_extensions::SanKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A subject RDN or Subject Alternative Name kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldId {
    /// `commonName` (CN)
    CommonName,
    /// `countryName` (C)
    CountryName,
    /// `localityName` (L)
    LocalityName,
    /// `stateOrProvinceName` (ST)
    StateOrProvinceName,
    /// `streetAddress`
    StreetAddress,
    /// `organizationName` (O)
    OrganizationName,
    /// `organizationalUnitName` (OU)
    OrganizationalUnitName,
    /// `title`
    Title,
    /// `givenName`
    GivenName,
    /// `initials`
    Initials,
    /// `surname`
    Surname,
    /// `domainComponent` (DC)
    DomainComponent,
    /// `emailAddress` (PKCS#9)
    EmailAddress,
    /// `serialNumber`
    SerialNumber,
    /// `unstructuredName` (PKCS#9)
    UnstructuredName,
    /// `unstructuredAddress` (PKCS#9)
    UnstructuredAddress,
    /// SAN `dNSName`
    DnsName,
    /// SAN `iPAddress`
    IpAddress,
    /// SAN `rfc822Name`
    Rfc822Name,
    /// SAN `userPrincipalName`
    UserPrincipalName,
    /// SAN `uniformResourceIdentifier`
    UniformResourceIdentifier,
    /// Any name not in the table, spelled as it appeared
    Unknown(String),
}

/// Subject RDN fields, in the order they are usually written
pub const SUBJECT_FIELDS: [FieldId; 16] = [
    FieldId::CommonName,
    FieldId::CountryName,
    FieldId::LocalityName,
    FieldId::StateOrProvinceName,
    FieldId::StreetAddress,
    FieldId::OrganizationName,
    FieldId::OrganizationalUnitName,
    FieldId::Title,
    FieldId::GivenName,
    FieldId::Initials,
    FieldId::Surname,
    FieldId::DomainComponent,
    FieldId::EmailAddress,
    FieldId::SerialNumber,
    FieldId::UnstructuredName,
    FieldId::UnstructuredAddress,
];

/// Subject Alternative Name fields
pub const SAN_FIELDS: [FieldId; 5] = [
    FieldId::DnsName,
    FieldId::IpAddress,
    FieldId::Rfc822Name,
    FieldId::UserPrincipalName,
    FieldId::UniformResourceIdentifier,
];

impl FieldId {
    /// Resolve a field name (case-insensitive)
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        SUBJECT_FIELDS
            .iter()
            .chain(SAN_FIELDS.iter())
            .find(|field| field.as_str().eq_ignore_ascii_case(name))
            .cloned()
            .unwrap_or_else(|| Self::Unknown(name.to_string()))
    }

    /// Canonical name of the field
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::CommonName => "commonName",
            Self::CountryName => "countryName",
            Self::LocalityName => "localityName",
            Self::StateOrProvinceName => "stateOrProvinceName",
            Self::StreetAddress => "streetAddress",
            Self::OrganizationName => "organizationName",
            Self::OrganizationalUnitName => "organizationalUnitName",
            Self::Title => "title",
            Self::GivenName => "givenName",
            Self::Initials => "initials",
            Self::Surname => "surname",
            Self::DomainComponent => "domainComponent",
            Self::EmailAddress => "emailAddress",
            Self::SerialNumber => "serialNumber",
            Self::UnstructuredName => "unstructuredName",
            Self::UnstructuredAddress => "unstructuredAddress",
            Self::DnsName => SanKind::DnsName.as_str(),
            Self::IpAddress => SanKind::IpAddress.as_str(),
            Self::Rfc822Name => SanKind::Rfc822Name.as_str(),
            Self::UserPrincipalName => SanKind::UserPrincipalName.as_str(),
            Self::UniformResourceIdentifier => SanKind::UniformResourceIdentifier.as_str(),
            Self::Unknown(name) => name,
        }
    }

    /// Maximum permitted value length in characters, `None` for unknown fields
    #[must_use]
    pub const fn max_length(&self) -> Option<usize> {
        let max = match self {
            Self::CountryName => 2,
            Self::Initials => 5,
            Self::GivenName => 16,
            Self::StreetAddress => 30,
            Self::Surname => 40,
            Self::CommonName
            | Self::OrganizationName
            | Self::OrganizationalUnitName
            | Self::Title
            | Self::SerialNumber
            | Self::UnstructuredName
            | Self::UnstructuredAddress => 64,
            Self::LocalityName
            | Self::StateOrProvinceName
            | Self::DomainComponent
            | Self::EmailAddress => 128,
            Self::IpAddress => 45,
            Self::DnsName => 253,
            Self::Rfc822Name => 256,
            Self::UserPrincipalName => 1024,
            Self::UniformResourceIdentifier => 2048,
            Self::Unknown(_) => return None,
        };
        Some(max)
    }

    /// SAN kind this field maps to, if it is a SAN field
    #[must_use]
    pub const fn san_kind(&self) -> Option<SanKind> {
        match self {
            Self::DnsName => Some(SanKind::DnsName),
            Self::IpAddress => Some(SanKind::IpAddress),
            Self::Rfc822Name => Some(SanKind::Rfc822Name),
            Self::UserPrincipalName => Some(SanKind::UserPrincipalName),
            Self::UniformResourceIdentifier => Some(SanKind::UniformResourceIdentifier),
            _ => None,
        }
    }

    /// Whether this is a subject RDN field
    #[must_use]
    pub const fn is_subject_field(&self) -> bool {
        !matches!(self, Self::Unknown(_)) && self.san_kind().is_none()
    }

    /// Whether this field is in the table
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<SanKind> for FieldId {
    fn from(kind: SanKind) -> Self {
        match kind {
            SanKind::DnsName => Self::DnsName,
            SanKind::IpAddress => Self::IpAddress,
            SanKind::Rfc822Name => Self::Rfc822Name,
            SanKind::UserPrincipalName => Self::UserPrincipalName,
            SanKind::UniformResourceIdentifier => Self::UniformResourceIdentifier,
        }
    }
}

impl From<String> for FieldId {
    fn from(name: String) -> Self {
        match Self::from_name(&name) {
            Self::Unknown(_) => Self::Unknown(name),
            known => known,
        }
    }
}

impl From<&str> for FieldId {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<FieldId> for String {
    fn from(field: FieldId) -> Self {
        match field {
            FieldId::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

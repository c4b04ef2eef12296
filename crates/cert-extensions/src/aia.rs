//! Authority Information Access extension builder.

use crate::error::{ExtensionError, Result};
use crate::general_name::{GeneralNameEntry, SanKind};
use crate::oid::{AD_CA_ISSUERS, AD_OCSP};
use const_oid::ObjectIdentifier;
use der::Encode;
use x509_cert::ext::pkix::{AccessDescription, AuthorityInfoAccessSyntax};

/// Access method of one AIA location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMethod {
    /// OCSP responder (`1.3.6.1.5.5.7.48.1`)
    Ocsp,
    /// Issuing CA certificate (`1.3.6.1.5.5.7.48.2`)
    CaIssuers,
}

impl AccessMethod {
    /// OID of this access method
    #[must_use]
    pub const fn oid(&self) -> ObjectIdentifier {
        match self {
            AccessMethod::Ocsp => AD_OCSP,
            AccessMethod::CaIssuers => AD_CA_ISSUERS,
        }
    }
}

/// Builder for the AIA extension value.
///
/// Locations are encoded in the order they were added.
///
/// ```
/// use cert_extensions::AuthorityInformationAccess;
///
/// let mut aia = AuthorityInformationAccess::new();
/// aia.add_ca_issuer("http://pki.example.com/ca.crt").unwrap();
/// aia.add_ocsp("http://ocsp.example.com").unwrap();
/// assert_eq!(aia.len(), 2);
/// assert!(aia.to_der().unwrap().starts_with(&[0x30]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AuthorityInformationAccess {
    locations: Vec<(AccessMethod, GeneralNameEntry)>,
}

impl AuthorityInformationAccess {
    /// Creates an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an OCSP responder location.
    ///
    /// # Errors
    ///
    /// Returns `ExtensionError::EmptyUri` for an empty string and
    /// `ExtensionError::InvalidUri` if the URI cannot be encoded.
    pub fn add_ocsp(&mut self, uri: &str) -> Result<()> {
        self.add(AccessMethod::Ocsp, uri)
    }

    /// Adds a CA issuers location.
    ///
    /// # Errors
    ///
    /// Same as [`AuthorityInformationAccess::add_ocsp`].
    pub fn add_ca_issuer(&mut self, uri: &str) -> Result<()> {
        self.add(AccessMethod::CaIssuers, uri)
    }

    /// Adds a location with an explicit access method.
    ///
    /// # Errors
    ///
    /// Same as [`AuthorityInformationAccess::add_ocsp`].
    pub fn add(&mut self, method: AccessMethod, uri: &str) -> Result<()> {
        if uri.trim().is_empty() {
            return Err(ExtensionError::EmptyUri);
        }
        let entry = GeneralNameEntry::new(SanKind::UniformResourceIdentifier, uri)?;
        self.locations.push((method, entry));
        Ok(())
    }

    /// Number of locations
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether no location was added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Encodes the extension value.
    ///
    /// # Errors
    ///
    /// Returns `ExtensionError::EmptyUriList` if no location was added.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        if self.locations.is_empty() {
            return Err(ExtensionError::EmptyUriList);
        }
        let descriptions = self
            .locations
            .iter()
            .map(|(method, entry)| {
                Ok(AccessDescription {
                    access_method: method.oid(),
                    access_location: entry.to_general_name()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(AuthorityInfoAccessSyntax(descriptions).to_der()?)
    }
}

/// Builds an AIA extension value from CA issuer and OCSP URI lists.
///
/// CA issuer locations are written first, then OCSP locations.
///
/// # Errors
///
/// Returns `ExtensionError::EmptyUriList` if both lists are empty and
/// `ExtensionError::EmptyUri` if any URI is empty.
pub fn build_authority_information_access<S: AsRef<str>>(
    ca_issuers: &[S],
    ocsp: &[S],
) -> Result<Vec<u8>> {
    let mut aia = AuthorityInformationAccess::new();
    for uri in ca_issuers {
        aia.add_ca_issuer(uri.as_ref())?;
    }
    for uri in ocsp {
        aia.add_ocsp(uri.as_ref())?;
    }
    aia.to_der()
}

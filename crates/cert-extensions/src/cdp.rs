//! CRL Distribution Points extension builder.

use crate::error::{ExtensionError, Result};
use crate::general_name::{GeneralNameEntry, SanKind};
use der::Encode;
use x509_cert::ext::pkix::crl::dp::DistributionPoint;
use x509_cert::ext::pkix::name::DistributionPointName;
use x509_cert::ext::pkix::CrlDistributionPoints as CrlDistributionPointsExt;

/// Builder for the CDP extension value.
///
/// Each URI becomes its own `DistributionPoint { distributionPoint:
/// fullName: [uri] }`, in insertion order. Identical URIs are kept once.
#[derive(Debug, Clone, Default)]
pub struct CrlDistributionPoints {
    uris: Vec<GeneralNameEntry>,
}

impl CrlDistributionPoints {
    /// Creates an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a distribution point URI.
    ///
    /// # Errors
    ///
    /// Returns `ExtensionError::EmptyUri` for an empty string and
    /// `ExtensionError::InvalidUri` if the URI cannot be encoded.
    pub fn add_uri(&mut self, uri: &str) -> Result<()> {
        if uri.trim().is_empty() {
            return Err(ExtensionError::EmptyUri);
        }
        let entry = GeneralNameEntry::new(SanKind::UniformResourceIdentifier, uri)?;
        if !self.uris.contains(&entry) {
            self.uris.push(entry);
        }
        Ok(())
    }

    /// Number of distribution points
    #[must_use]
    pub fn len(&self) -> usize {
        self.uris.len()
    }

    /// Whether no URI was added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    /// Encodes the extension value.
    ///
    /// # Errors
    ///
    /// Returns `ExtensionError::EmptyUriList` if no URI was added.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        if self.uris.is_empty() {
            return Err(ExtensionError::EmptyUriList);
        }
        let points = self
            .uris
            .iter()
            .map(|entry| {
                Ok(DistributionPoint {
                    distribution_point: Some(DistributionPointName::FullName(vec![
                        entry.to_general_name()?,
                    ])),
                    reasons: None,
                    crl_issuer: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CrlDistributionPointsExt(points).to_der()?)
    }
}

/// Builds a CDP extension value from a URI list.
///
/// # Errors
///
/// Returns `ExtensionError::EmptyUriList` for an empty list and
/// `ExtensionError::EmptyUri` if any URI is empty.
pub fn build_crl_distribution_points<S: AsRef<str>>(uris: &[S]) -> Result<Vec<u8>> {
    let mut cdp = CrlDistributionPoints::new();
    for uri in uris {
        cdp.add_uri(uri.as_ref())?;
    }
    cdp.to_der()
}

//! Subject Alternative Name extension.
//!
//! [`SubjectAlternativeNames`] is an insertion-ordered set of
//! [`GeneralNameEntry`] values. Decoding keeps the extension's entries as
//! they are, repeats included. An absent or empty extension decodes to an
//! empty set, and an empty set encodes to zero bytes: the extension is
//! dropped rather than written as an empty SEQUENCE.

use crate::error::Result;
use crate::general_name::{GeneralNameEntry, SanKind};
use der::{Decode, Encode};
use serde::{Deserialize, Serialize};
use x509_cert::ext::pkix::SubjectAltName;

/// Ordered list of alternative names; [`add`](Self::add) skips duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<GeneralNameEntry>", into = "Vec<GeneralNameEntry>")]
pub struct SubjectAlternativeNames {
    entries: Vec<GeneralNameEntry>,
}

impl SubjectAlternativeNames {
    /// Creates an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the DER value of a SAN extension.
    ///
    /// Empty input yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns `ExtensionError::Der` for malformed input and
    /// `ExtensionError::UnsupportedGeneralName` / `UnsupportedOtherName` for
    /// names this codec cannot represent.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let mut names = Self::new();
        if bytes.is_empty() {
            return Ok(names);
        }
        let san = SubjectAltName::from_der(bytes)?;
        for name in &san.0 {
            names
                .entries
                .push(GeneralNameEntry::from_general_name(name)?);
        }
        Ok(names)
    }

    /// Encodes the set as the DER value of a SAN extension.
    ///
    /// An empty set encodes to an empty byte vector.
    ///
    /// # Errors
    ///
    /// Returns `ExtensionError::Der` if an entry cannot be represented.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        let names = self
            .entries
            .iter()
            .map(GeneralNameEntry::to_general_name)
            .collect::<Result<Vec<_>>>()?;
        Ok(SubjectAltName(names).to_der()?)
    }

    /// Validates and adds a name.
    ///
    /// Returns `Ok(false)` if an identical entry is already present.
    ///
    /// # Errors
    ///
    /// Returns the kind-specific validation error if `value` is not
    /// acceptable for `kind`.
    pub fn add(&mut self, kind: SanKind, value: impl AsRef<str>) -> Result<bool> {
        let entry = GeneralNameEntry::new(kind, value)?;
        Ok(self.push(entry))
    }

    /// Adds an already validated entry, returning `false` for duplicates.
    pub fn push(&mut self, entry: GeneralNameEntry) -> bool {
        if self.entries.contains(&entry) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Checks for an entry with exactly this kind and value
    #[must_use]
    pub fn contains(&self, kind: SanKind, value: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.kind() == kind && entry.value() == value)
    }

    /// Checks whether any entry of `kind` is present
    #[must_use]
    pub fn has_kind(&self, kind: SanKind) -> bool {
        self.entries.iter().any(|entry| entry.kind() == kind)
    }

    /// Values of all entries of `kind`, in insertion order
    pub fn values(&self, kind: SanKind) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.kind() == kind)
            .map(GeneralNameEntry::value)
    }

    /// Removes every entry of `kind`, returning how many were removed
    pub fn remove_kind(&mut self, kind: SanKind) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.kind() != kind);
        before - self.entries.len()
    }

    /// Iterates over all entries in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, GeneralNameEntry> {
        self.entries.iter()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<GeneralNameEntry>> for SubjectAlternativeNames {
    fn from(entries: Vec<GeneralNameEntry>) -> Self {
        let mut names = Self::new();
        for entry in entries {
            names.push(entry);
        }
        names
    }
}

impl From<SubjectAlternativeNames> for Vec<GeneralNameEntry> {
    fn from(names: SubjectAlternativeNames) -> Self {
        names.entries
    }
}

impl<'a> IntoIterator for &'a SubjectAlternativeNames {
    type Item = &'a GeneralNameEntry;
    type IntoIter = std::slice::Iter<'a, GeneralNameEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

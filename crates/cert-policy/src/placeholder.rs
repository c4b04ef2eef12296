//! `{source:attribute}` placeholder resolution
//!
//! Outbound values may reference attributes from four sources:
//!
//! | Prefix | Source |
//! |--------|--------|
//! | `sdn`  | inbound subject RDNs |
//! | `san`  | inbound Subject Alternative Names |
//! | `ad`   | directory object attributes |
//! | `yk`   | hardware attestation attributes |
//!
//! The grammar is flat. A template is scanned once into literal and
//! placeholder segments; substituted values are never rescanned. Braces that
//! do not enclose a `source:attribute` pair are kept as literal text.
//!
//! ```
//! use cert_policy::{resolve, AttributeMap, AttributeSource, AttributeSources};
//!
//! let ad: AttributeMap = [("sn", "Ostermeier"), ("givenName", "Rudi")].into_iter().collect();
//! let sources = AttributeSources::new().with(AttributeSource::Directory, &ad);
//!
//! let value = resolve("{ad:SN}, {ad:givenname}", &sources).unwrap();
//! assert_eq!(value, "Ostermeier, Rudi");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Where a placeholder takes its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeSource {
    /// `sdn`: inbound subject
    Subject,
    /// `san`: inbound Subject Alternative Names
    SubjectAlternativeName,
    /// `ad`: directory object
    Directory,
    /// `yk`: hardware attestation
    Attestation,
}

impl AttributeSource {
    /// All sources, in index order
    pub const ALL: [Self; 4] = [
        Self::Subject,
        Self::SubjectAlternativeName,
        Self::Directory,
        Self::Attestation,
    ];

    /// Placeholder prefix of this source
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Subject => "sdn",
            Self::SubjectAlternativeName => "san",
            Self::Directory => "ad",
            Self::Attestation => "yk",
        }
    }

    /// Look up a source by prefix (case-insensitive)
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|source| source.prefix().eq_ignore_ascii_case(prefix))
    }
}

impl fmt::Display for AttributeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Case-insensitive attribute name to value map
///
/// Building a map from an iterator keeps the first value seen for a name,
/// which is what multi-valued sources such as the SAN need. [`insert`]
/// replaces.
///
/// [`insert`]: AttributeMap::insert
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct AttributeMap {
    // lowercase name -> (original name, value)
    entries: BTreeMap<String, (String, String)>,
}

impl AttributeMap {
    /// Create an empty map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries
            .insert(name.to_lowercase(), (name, value.into()));
    }

    /// Set `name` to `value` unless the name is already present
    pub fn insert_if_absent(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries
            .entry(name.to_lowercase())
            .or_insert_with(|| (name, value.into()));
    }

    /// Value of `name`, ignoring case
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_lowercase())
            .map(|(_, value)| value.as_str())
    }

    /// Iterate `(name, value)` pairs with names as inserted
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of attributes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no attributes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert_if_absent(name, value);
        }
        map
    }
}

impl From<BTreeMap<String, String>> for AttributeMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<AttributeMap> for BTreeMap<String, String> {
    fn from(map: AttributeMap) -> Self {
        map.entries.into_values().collect()
    }
}

/// The attribute maps available to one evaluation
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeSources<'a> {
    maps: [Option<&'a AttributeMap>; 4],
}

impl<'a> AttributeSources<'a> {
    /// No sources
    #[must_use]
    pub const fn new() -> Self {
        Self { maps: [None; 4] }
    }

    /// Make `map` available as `source`
    #[must_use]
    pub fn with(mut self, source: AttributeSource, map: &'a AttributeMap) -> Self {
        self.maps[source as usize] = Some(map);
        self
    }

    /// Map registered for `source`
    #[must_use]
    pub const fn get(&self, source: AttributeSource) -> Option<&'a AttributeMap> {
        self.maps[source as usize]
    }
}

/// Why a placeholder could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
    /// Prefix is not one of `sdn`, `san`, `ad`, `yk`
    #[error("unknown attribute source \"{0}\"")]
    UnknownSource(String),

    /// Attribute name contains characters outside `[A-Za-z0-9-]`
    #[error("attribute name \"{0}\" contains invalid characters")]
    InvalidAttributeName(String),

    /// No map was supplied for the source
    #[error("attribute source \"{0}\" is not available for this request")]
    SourceUnavailable(AttributeSource),

    /// The source has no such attribute
    #[error("attribute \"{attribute}\" was not found in source \"{origin}\"")]
    AttributeNotFound {
        /// Source that was searched
        origin: AttributeSource,
        /// Attribute name as written in the template
        attribute: String,
    },
}

/// One piece of a scanned template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'t> {
    Literal(&'t str),
    Placeholder { source: &'t str, attribute: &'t str },
}

/// Split `template` into literal and placeholder segments
pub(crate) fn scan(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(open) = template[cursor..].find('{').map(|i| cursor + i) {
        let body_start = open + 1;
        let Some(end) = template[body_start..]
            .find(|c: char| c == '{' || c == '}')
            .map(|i| body_start + i)
        else {
            break;
        };

        // `{` again before any `}`: the first brace is literal
        if template.as_bytes()[end] == b'{' {
            cursor = end;
            continue;
        }

        cursor = end + 1;
        if let Some((source, attribute)) = template[body_start..end].split_once(':') {
            if literal_start < open {
                segments.push(Segment::Literal(&template[literal_start..open]));
            }
            segments.push(Segment::Placeholder { source, attribute });
            literal_start = cursor;
        }
    }

    if literal_start < template.len() {
        segments.push(Segment::Literal(&template[literal_start..]));
    }
    segments
}

/// Whether `template` contains at least one placeholder
#[must_use]
pub fn has_placeholders(template: &str) -> bool {
    scan(template)
        .iter()
        .any(|segment| matches!(segment, Segment::Placeholder { .. }))
}

fn is_valid_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Expand every placeholder in `template`
///
/// # Errors
///
/// Returns the first [`PlaceholderError`] met while scanning left to right.
pub fn resolve(template: &str, sources: &AttributeSources<'_>) -> Result<String, PlaceholderError> {
    let mut out = String::with_capacity(template.len());
    for segment in scan(template) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder { source, attribute } => {
                let origin = AttributeSource::from_prefix(source)
                    .ok_or_else(|| PlaceholderError::UnknownSource(source.to_string()))?;
                if !is_valid_attribute_name(attribute) {
                    return Err(PlaceholderError::InvalidAttributeName(attribute.to_string()));
                }
                let map = sources
                    .get(origin)
                    .ok_or(PlaceholderError::SourceUnavailable(origin))?;
                let value = map.get(attribute).ok_or_else(|| {
                    PlaceholderError::AttributeNotFound {
                        origin,
                        attribute: attribute.to_string(),
                    }
                })?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}

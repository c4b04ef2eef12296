//! Policy document parsing and serialization
//!
//! Documents are read as TOML or YAML. Both formats go through the same
//! validating deserializer, so a YAML document is held to the same limits
//! as a TOML one.

use crate::error::{Error, Result};
use cert_policy::{PolicyDocument, PolicyError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Trait for policy parsers (extensible to further formats)
pub trait PolicyParser {
    /// Parse and validate a policy from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed or the document fails
    /// validation.
    fn parse(&self, input: &str) -> Result<PolicyDocument>;
}

/// TOML parser implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlParser;

impl PolicyParser for TomlParser {
    fn parse(&self, input: &str) -> Result<PolicyDocument> {
        Ok(PolicyDocument::from_toml(input)?)
    }
}

/// YAML parser implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl PolicyParser for YamlParser {
    fn parse(&self, input: &str) -> Result<PolicyDocument> {
        from_yaml(input)
    }
}

/// On-disk document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.toml`
    Toml,
    /// `.yaml` or `.yml`
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension, ignoring case
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Policy parser for this format
    #[must_use]
    pub fn parser(self) -> &'static dyn PolicyParser {
        match self {
            Self::Toml => &TomlParser,
            Self::Yaml => &YamlParser,
        }
    }

    /// Deserialize any document in this format
    ///
    /// # Errors
    ///
    /// Returns a TOML or YAML parse error.
    pub fn deserialize<T: DeserializeOwned>(self, input: &str) -> Result<T> {
        match self {
            Self::Toml => toml::from_str(input).map_err(|e| Error::Policy(PolicyError::TomlError(e))),
            Self::Yaml => from_yaml(input),
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Load and validate a policy file
///
/// # Errors
///
/// Returns an error for unknown extensions, unreadable files and invalid
/// documents.
pub fn load_policy(path: impl AsRef<Path>) -> Result<PolicyDocument> {
    let path = path.as_ref();
    let format = DocumentFormat::from_path(path)?;
    format.parser().parse(&read_file(path)?)
}

/// Load any TOML or YAML document, e.g. a request or directory record
///
/// # Errors
///
/// Returns an error for unknown extensions, unreadable files and documents
/// that do not deserialize into `T`.
pub fn load_document<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let format = DocumentFormat::from_path(path)?;
    format.deserialize(&read_file(path)?)
}

/// Serialize a value to YAML
///
/// # Errors
///
/// Returns [`Error::YamlParseError`] if serialization fails.
pub fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| Error::YamlParseError(e.to_string()))
}

/// Deserialize from YAML
///
/// # Errors
///
/// Returns [`Error::YamlParseError`] if the input is malformed or fails
/// validation.
pub fn from_yaml<'a, T: Deserialize<'a>>(input: &'a str) -> Result<T> {
    serde_yaml::from_str(input).map_err(|e| Error::YamlParseError(e.to_string()))
}

//! Error types for cert-extensions

use thiserror::Error;

/// Result type used by the extension codec.
pub type Result<T> = std::result::Result<T, ExtensionError>;

/// Errors raised while validating, encoding or decoding extension values.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// dNSName value is not a plausible host name
    #[error("invalid DNS name: {0}")]
    InvalidDnsName(String),

    /// rfc822Name value is not an email address
    #[error("invalid email address: {0}")]
    InvalidEmailAddress(String),

    /// userPrincipalName value is not of the form `user@realm`
    #[error("invalid user principal name: {0}")]
    InvalidUserPrincipalName(String),

    /// iPAddress value is neither an IPv4 nor an IPv6 address
    #[error("invalid IP address: {0}")]
    InvalidIpAddress(String),

    /// iPAddress octets have a length other than 4 or 16
    #[error("invalid IP address length: {0} bytes")]
    InvalidIpAddressLength(usize),

    /// uniformResourceIdentifier value cannot be represented as IA5String
    #[error("invalid URI: {0}")]
    InvalidUri(String),

    /// A GeneralName choice this codec does not handle
    #[error("unsupported GeneralName in extension: {kind}")]
    UnsupportedGeneralName {
        /// Name of the GeneralName choice
        kind: &'static str,
    },

    /// An OtherName with a type id other than userPrincipalName
    #[error("unsupported otherName type: {0}")]
    UnsupportedOtherName(String),

    /// A builder was handed an empty URI
    #[error("URI must not be empty")]
    EmptyUri,

    /// A builder was handed no URIs at all
    #[error("at least one URI is required")]
    EmptyUriList,

    /// Security identifier string is not of the form `S-1-...`
    #[error("invalid security identifier: {0}")]
    InvalidSecurityIdentifier(String),

    /// Underlying DER failure
    #[error(transparent)]
    Der(#[from] der::Error),
}

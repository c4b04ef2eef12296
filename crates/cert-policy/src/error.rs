//! Error types for cert-policy

use cert_extensions::ExtensionError;
use thiserror::Error;

/// Result type alias for policy operations
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Errors that can occur while building or loading a policy document
///
/// Evaluation itself never fails with a `PolicyError`: violations are
/// reported through [`crate::ValidationOutcome`].
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Invalid rule or inconsistent document setting
    #[error("Invalid policy rule: {0}")]
    InvalidRule(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    // ===== DoS Prevention Errors =====
    /// A rule section exceeds the maximum number of rules
    #[error("Section '{section}' exceeds maximum {max} rules (attempted: {attempted})")]
    TooManyRules {
        /// Document section holding the rules
        section: &'static str,
        /// Maximum allowed rules
        max: usize,
        /// Attempted number of rules
        attempted: usize,
    },

    /// A pattern or outbound value exceeds the maximum length
    #[error("Expression exceeds maximum {max} characters (length: {length})")]
    ExpressionTooLong {
        /// Maximum allowed length
        max: usize,
        /// Actual expression length
        length: usize,
    },

    /// Extension encoding error
    #[error(transparent)]
    Extension(#[from] ExtensionError),
}

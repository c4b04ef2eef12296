//! Pattern matching for field values
//!
//! A [`Pattern`] is one regex, CIDR or exact-match expression with an
//! allow/deny action. Matching never fails towards the caller: malformed
//! expressions and unparsable terms collapse to the caller supplied
//! `match_on_error` value in [`Pattern::is_match`].
//!
//! ```
//! use cert_policy::Pattern;
//!
//! let pattern = Pattern::cidr("192.168.0.0/16");
//! assert!(pattern.is_match("192.168.1.1", false));
//! assert!(!pattern.is_match("not-an-ip", false));
//! assert!(pattern.is_match("not-an-ip", true));
//! ```

use crate::cidr;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Compiled regex size ceiling
const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// How a pattern expression is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreatAs {
    /// Regular expression, case-sensitive
    #[default]
    RegEx,
    /// Regular expression, case-insensitive
    RegExIgnoreCase,
    /// `address/prefix` network range
    Cidr,
    /// Literal equality, case-sensitive
    ExactMatch,
    /// Literal equality, case-insensitive
    ExactMatchIgnoreCase,
    /// Anything else found in a policy document
    #[serde(other)]
    Unsupported,
}

/// What a matching pattern does to the value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternAction {
    /// A match admits the value
    #[default]
    Allow,
    /// A match rejects the value
    Deny,
}

/// Why a pattern could not be evaluated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Expression is not a valid regular expression
    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),

    /// Expression is not `address/prefix`
    #[error("invalid CIDR expression '{0}'")]
    InvalidCidr(String),

    /// Term is not an IP address
    #[error("'{0}' is not an IP address")]
    InvalidAddress(String),

    /// Term and network are of different address families
    #[error("address family does not match the network")]
    AddressFamilyMismatch,

    /// `treatAs` value this engine does not know
    #[error("unsupported pattern type")]
    Unsupported,
}

/// A single match expression with its action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    /// Expression text
    pub expression: String,
    /// Interpretation of `expression`
    #[serde(default)]
    pub treat_as: TreatAs,
    /// Effect of a match
    #[serde(default)]
    pub action: PatternAction,
}

impl Pattern {
    /// Create an allow pattern
    #[must_use]
    pub fn new(expression: impl Into<String>, treat_as: TreatAs) -> Self {
        Self {
            expression: expression.into(),
            treat_as,
            action: PatternAction::Allow,
        }
    }

    /// Case-sensitive regex pattern
    #[must_use]
    pub fn regex(expression: impl Into<String>) -> Self {
        Self::new(expression, TreatAs::RegEx)
    }

    /// Case-insensitive regex pattern
    #[must_use]
    pub fn regex_ignore_case(expression: impl Into<String>) -> Self {
        Self::new(expression, TreatAs::RegExIgnoreCase)
    }

    /// CIDR range pattern
    #[must_use]
    pub fn cidr(expression: impl Into<String>) -> Self {
        Self::new(expression, TreatAs::Cidr)
    }

    /// Case-sensitive literal pattern
    #[must_use]
    pub fn exact(expression: impl Into<String>) -> Self {
        Self::new(expression, TreatAs::ExactMatch)
    }

    /// Case-insensitive literal pattern
    #[must_use]
    pub fn exact_ignore_case(expression: impl Into<String>) -> Self {
        Self::new(expression, TreatAs::ExactMatchIgnoreCase)
    }

    /// Turn this into a deny pattern
    #[must_use]
    pub const fn deny(mut self) -> Self {
        self.action = PatternAction::Deny;
        self
    }

    /// Whether a match denies the value
    #[must_use]
    pub fn is_deny(&self) -> bool {
        self.action == PatternAction::Deny
    }

    /// Check `term` against this pattern
    ///
    /// Any evaluation failure yields `match_on_error`.
    #[must_use]
    pub fn is_match(&self, term: &str, match_on_error: bool) -> bool {
        self.try_match(term).unwrap_or(match_on_error)
    }

    /// Check `term` against this pattern, reporting evaluation failures
    ///
    /// # Errors
    ///
    /// Returns a [`MatchError`] for malformed expressions, unparsable
    /// addresses, address family mismatches and unsupported pattern types.
    pub fn try_match(&self, term: &str) -> Result<bool, MatchError> {
        match self.treat_as {
            TreatAs::RegEx => regex_match(&self.expression, term, false),
            TreatAs::RegExIgnoreCase => regex_match(&self.expression, term, true),
            TreatAs::Cidr => cidr::contains(&self.expression, term),
            TreatAs::ExactMatch => Ok(self.expression == term),
            TreatAs::ExactMatchIgnoreCase => {
                Ok(self.expression.to_lowercase() == term.to_lowercase())
            }
            TreatAs::Unsupported => Err(MatchError::Unsupported),
        }
    }

    /// Check the expression itself without a term
    ///
    /// Used by policy linting; evaluation does not require it.
    ///
    /// # Errors
    ///
    /// Returns the [`MatchError`] the expression would produce at evaluation.
    pub fn check_expression(&self) -> Result<(), MatchError> {
        match self.treat_as {
            TreatAs::RegEx | TreatAs::RegExIgnoreCase => {
                compile(&self.expression, self.treat_as == TreatAs::RegExIgnoreCase).map(|_| ())
            }
            TreatAs::Cidr => cidr::parse_network(&self.expression).map(|_| ()),
            TreatAs::ExactMatch | TreatAs::ExactMatchIgnoreCase => Ok(()),
            TreatAs::Unsupported => Err(MatchError::Unsupported),
        }
    }
}

fn compile(expression: &str, ignore_case: bool) -> Result<regex::Regex, MatchError> {
    RegexBuilder::new(expression)
        .case_insensitive(ignore_case)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| MatchError::InvalidRegex(e.to_string()))
}

fn regex_match(expression: &str, term: &str, ignore_case: bool) -> Result<bool, MatchError> {
    Ok(compile(expression, ignore_case)?.is_match(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_is_unanchored() {
        let pattern = Pattern::regex("adcslabor");
        assert!(pattern.is_match("intranet.adcslabor.de", false));
        assert!(!pattern.is_match("intranet.ADCSLABOR.de", false));
        assert!(Pattern::regex_ignore_case("adcslabor").is_match("intranet.ADCSLABOR.de", false));
    }

    #[test]
    fn test_bad_regex_collapses_to_flag() {
        let pattern = Pattern::regex("(unclosed");
        assert!(!pattern.is_match("anything", false));
        assert!(pattern.is_match("anything", true));
        assert!(matches!(pattern.try_match("x"), Err(MatchError::InvalidRegex(_))));
    }

    #[test]
    fn test_exact_match() {
        assert!(Pattern::exact("Server").is_match("Server", false));
        assert!(!Pattern::exact("Server").is_match("server", false));
        assert!(Pattern::exact_ignore_case("Server").is_match("sERVER", false));
    }

    #[test]
    fn test_unsupported_collapses_to_flag() {
        let pattern = Pattern::new("x", TreatAs::Unsupported);
        assert!(pattern.is_match("x", true));
        assert!(!pattern.is_match("x", false));
    }

    #[test]
    fn test_unknown_treat_as_deserializes() {
        let pattern: Pattern =
            toml::from_str("expression = \"x\"\ntreatAs = \"Glob\"").unwrap();
        assert_eq!(pattern.treat_as, TreatAs::Unsupported);
        assert_eq!(pattern.action, PatternAction::Allow);
    }
}

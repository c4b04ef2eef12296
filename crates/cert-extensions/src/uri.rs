//! URI normalization for uniformResourceIdentifier values.
//!
//! Only schemes the codec recognizes (`http`, `https`, `ldap`) are
//! percent-encoded; anything else passes through unchanged. Existing `%`
//! escapes are left alone so already-encoded input is stable.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::borrow::Cow;

/// Characters RFC 3986 does not allow to appear literally in a URI.
const URI_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^');

/// Schemes whose URIs are percent-encoded.
pub const ENCODED_SCHEMES: [&str; 3] = ["http", "https", "ldap"];

/// Returns the scheme of `uri` if it starts with a syntactically valid one.
#[must_use]
pub fn scheme(uri: &str) -> Option<&str> {
    let (scheme, _) = uri.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    Some(scheme)
}

/// Percent-encodes `uri` if its scheme is one of [`ENCODED_SCHEMES`].
///
/// ```
/// use cert_extensions::uri::encode_uri;
///
/// assert_eq!(
///     encode_uri("http://pki.example.com/My CA.crl"),
///     "http://pki.example.com/My%20CA.crl"
/// );
/// assert_eq!(encode_uri("urn:uuid:My Thing"), "urn:uuid:My Thing");
/// ```
#[must_use]
pub fn encode_uri(uri: &str) -> Cow<'_, str> {
    match scheme(uri) {
        Some(s) if ENCODED_SCHEMES.iter().any(|known| known.eq_ignore_ascii_case(s)) => {
            utf8_percent_encode(uri, URI_UNSAFE).into()
        }
        _ => Cow::Borrowed(uri),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_detection() {
        assert_eq!(scheme("https://example.com"), Some("https"));
        assert_eq!(scheme("ldap:///CN=Test"), Some("ldap"));
        assert_eq!(scheme("no scheme here"), None);
        assert_eq!(scheme("1abc:foo"), None);
        assert_eq!(scheme(":foo"), None);
    }

    #[test]
    fn test_ldap_uri_spaces_are_encoded() {
        let uri = "ldap:///CN=ADCS Labor Issuing CA 1,CN=AIA,DC=example,DC=com?cACertificate";
        assert_eq!(
            encode_uri(uri),
            "ldap:///CN=ADCS%20Labor%20Issuing%20CA%201,CN=AIA,DC=example,DC=com?cACertificate"
        );
    }

    #[test]
    fn test_existing_escapes_are_kept() {
        let uri = "http://pki.example.com/My%20CA.crl";
        assert_eq!(encode_uri(uri), uri);
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_eq!(encode_uri("HTTP://a b"), "HTTP://a%20b");
    }

    #[test]
    fn test_unknown_scheme_passes_through() {
        assert_eq!(encode_uri("file:///a b"), "file:///a b");
        assert!(matches!(encode_uri("file:///a b"), Cow::Borrowed(_)));
    }
}

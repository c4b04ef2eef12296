//! Security identifier extension (`1.3.6.1.4.1.311.25.2`).
//!
//! The extension value is a GeneralNames sequence holding a single
//! otherName whose type id is `1.3.6.1.4.1.311.25.2.1` and whose value is an
//! OCTET STRING with the textual SID:
//!
//! ```text
//! SEQUENCE {
//!   [0] {
//!     OID 1.3.6.1.4.1.311.25.2.1
//!     [0] { OCTET STRING "S-1-5-21-..." }
//!   }
//! }
//! ```

use crate::error::{ExtensionError, Result};
use crate::oid::NTDS_OBJECTSID;
use der::{Any, Decode, Encode, Tag, Tagged};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use x509_cert::ext::pkix::name::{GeneralName, OtherName};

/// Largest identifier authority that is printed in decimal
const MAX_DECIMAL_AUTHORITY: u64 = u32::MAX as u64;

/// Largest identifier authority (48 bits)
const MAX_AUTHORITY: u64 = (1 << 48) - 1;

/// Maximum number of sub-authorities in a SID
pub const MAX_SUB_AUTHORITIES: usize = 15;

/// A Windows security identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecurityIdentifier {
    revision: u8,
    authority: u64,
    sub_authorities: Vec<u32>,
}

impl SecurityIdentifier {
    /// Parses the binary representation (as stored in `objectSid`).
    ///
    /// # Errors
    ///
    /// Returns `ExtensionError::InvalidSecurityIdentifier` if the buffer is
    /// truncated or declares too many sub-authorities.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let invalid = || ExtensionError::InvalidSecurityIdentifier(format!("{bytes:02x?}"));
        let (&revision, rest) = bytes.split_first().ok_or_else(invalid)?;
        let (&count, rest) = rest.split_first().ok_or_else(invalid)?;
        let count = usize::from(count);
        if count > MAX_SUB_AUTHORITIES || rest.len() != 6 + count * 4 {
            return Err(invalid());
        }
        let authority = rest[..6]
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        let sub_authorities = rest[6..]
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Ok(Self {
            revision,
            authority,
            sub_authorities,
        })
    }

    /// Binary representation
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.sub_authorities.len() * 4);
        bytes.push(self.revision);
        // sub-authority count is bounded by MAX_SUB_AUTHORITIES
        bytes.push(self.sub_authorities.len() as u8);
        bytes.extend_from_slice(&self.authority.to_be_bytes()[2..]);
        for sub in &self.sub_authorities {
            bytes.extend_from_slice(&sub.to_le_bytes());
        }
        bytes
    }

    /// Sub-authorities; the last one is the relative identifier
    #[must_use]
    pub fn sub_authorities(&self) -> &[u32] {
        &self.sub_authorities
    }
}

impl FromStr for SecurityIdentifier {
    type Err = ExtensionError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ExtensionError::InvalidSecurityIdentifier(s.to_string());
        let mut parts = s.split('-');
        if !parts.next().is_some_and(|p| p.eq_ignore_ascii_case("S")) {
            return Err(invalid());
        }
        let revision = parts
            .next()
            .and_then(|p| p.parse::<u8>().ok())
            .ok_or_else(invalid)?;
        let authority = parts
            .next()
            .and_then(|p| match p.strip_prefix("0x").or_else(|| p.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16).ok(),
                None => p.parse::<u64>().ok(),
            })
            .filter(|a| *a <= MAX_AUTHORITY)
            .ok_or_else(invalid)?;
        let sub_authorities = parts
            .map(|p| p.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;
        if sub_authorities.len() > MAX_SUB_AUTHORITIES {
            return Err(invalid());
        }
        Ok(Self {
            revision,
            authority,
            sub_authorities,
        })
    }
}

impl fmt::Display for SecurityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-", self.revision)?;
        if self.authority <= MAX_DECIMAL_AUTHORITY {
            write!(f, "{}", self.authority)?;
        } else {
            write!(f, "0x{:012X}", self.authority)?;
        }
        for sub in &self.sub_authorities {
            write!(f, "-{sub}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for SecurityIdentifier {
    type Error = ExtensionError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<SecurityIdentifier> for String {
    fn from(sid: SecurityIdentifier) -> Self {
        sid.to_string()
    }
}

/// Builds the security identifier extension value for `sid`.
///
/// # Errors
///
/// Returns `ExtensionError::Der` if encoding fails.
pub fn build_security_identifier_extension(sid: &SecurityIdentifier) -> Result<Vec<u8>> {
    let text = sid.to_string();
    let names = vec![GeneralName::OtherName(OtherName {
        type_id: NTDS_OBJECTSID,
        value: Any::new(Tag::OctetString, text.as_bytes())?,
    })];
    Ok(names.to_der()?)
}

/// Reads the SID back out of a security identifier extension value.
///
/// # Errors
///
/// Returns `ExtensionError::Der` for malformed DER and
/// `ExtensionError::InvalidSecurityIdentifier` if the structure does not
/// carry exactly one SID otherName.
pub fn decode_security_identifier_extension(bytes: &[u8]) -> Result<SecurityIdentifier> {
    let names = Vec::<GeneralName>::from_der(bytes)?;
    let [GeneralName::OtherName(other)] = names.as_slice() else {
        return Err(ExtensionError::InvalidSecurityIdentifier(
            "expected a single otherName".to_string(),
        ));
    };
    if other.type_id != NTDS_OBJECTSID || other.value.tag() != Tag::OctetString {
        return Err(ExtensionError::InvalidSecurityIdentifier(format!(
            "unexpected otherName {}",
            other.type_id
        )));
    }
    let text = std::str::from_utf8(other.value.value()).map_err(|_| {
        ExtensionError::InvalidSecurityIdentifier("SID is not valid text".to_string())
    })?;
    text.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let sid: SecurityIdentifier = "S-1-5-21-1381186052-4247692386-135928078-1225"
            .parse()
            .unwrap();
        assert_eq!(
            sid.to_string(),
            "S-1-5-21-1381186052-4247692386-135928078-1225"
        );
        assert_eq!(sid.sub_authorities().last(), Some(&1225));
    }

    #[test]
    fn test_binary_round_trip() {
        let sid: SecurityIdentifier = "S-1-5-32-544".parse().unwrap();
        let bytes = sid.to_bytes();
        assert_eq!(
            bytes,
            vec![1, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0, 0x20, 0x02, 0, 0]
        );
        assert_eq!(SecurityIdentifier::from_bytes(&bytes).unwrap(), sid);
    }

    #[test]
    fn test_large_authority_is_hex() {
        let sid: SecurityIdentifier = "S-1-0x0000FFFFFFFFFF-1".parse().unwrap();
        assert_eq!(sid.to_string(), "S-1-0x00FFFFFFFFFF-1");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("X-1-5-21".parse::<SecurityIdentifier>().is_err());
        assert!("S-1".parse::<SecurityIdentifier>().is_err());
        assert!("S-1-5-abc".parse::<SecurityIdentifier>().is_err());
        assert!(SecurityIdentifier::from_bytes(&[1, 5, 0]).is_err());
    }
}

//! CIDR range membership
//!
//! `192.168.0.0/16` style prefixes. The prefix length is mandatory and the
//! candidate address must be of the same family as the network.

use crate::pattern::MatchError;
use ipnetwork::IpNetwork;
use std::net::IpAddr;

/// Parse a `address/prefix` expression
pub(crate) fn parse_network(expression: &str) -> Result<IpNetwork, MatchError> {
    let expression = expression.trim();
    if !expression.contains('/') {
        return Err(MatchError::InvalidCidr(expression.to_string()));
    }
    expression
        .parse::<IpNetwork>()
        .map_err(|_| MatchError::InvalidCidr(expression.to_string()))
}

/// Check whether `term` lies inside the network described by `expression`
pub(crate) fn contains(expression: &str, term: &str) -> Result<bool, MatchError> {
    let network = parse_network(expression)?;
    let address: IpAddr = term
        .trim()
        .parse()
        .map_err(|_| MatchError::InvalidAddress(term.to_string()))?;

    if network.is_ipv4() != address.is_ipv4() {
        return Err(MatchError::AddressFamilyMismatch);
    }
    Ok(network.contains(address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_membership() {
        assert_eq!(contains("192.168.0.0/16", "192.168.123.1"), Ok(true));
        assert_eq!(contains("192.168.0.0/16", "10.0.0.1"), Ok(false));
        assert_eq!(contains("0.0.0.0/0", "8.8.8.8"), Ok(true));
        assert_eq!(contains("10.1.2.3/32", "10.1.2.3"), Ok(true));
    }

    #[test]
    fn test_host_bits_in_reference_are_masked() {
        assert_eq!(contains("192.168.1.77/24", "192.168.1.1"), Ok(true));
    }

    #[test]
    fn test_ipv6_membership() {
        assert_eq!(contains("2001:db8::/32", "2001:db8:1::1"), Ok(true));
        assert_eq!(contains("2001:db8::/32", "2001:db9::1"), Ok(false));
    }

    #[test]
    fn test_failures() {
        assert_eq!(
            contains("192.168.0.0/16", "::1"),
            Err(MatchError::AddressFamilyMismatch)
        );
        assert!(matches!(
            contains("192.168.0.0", "192.168.0.1"),
            Err(MatchError::InvalidCidr(_))
        ));
        assert!(matches!(
            contains("192.168.0.0/33", "192.168.0.1"),
            Err(MatchError::InvalidCidr(_))
        ));
        assert!(matches!(
            contains("192.168.0.0/16", "not-an-ip"),
            Err(MatchError::InvalidAddress(_))
        ));
    }
}

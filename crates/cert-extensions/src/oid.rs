//! Object identifiers used by the extension codec.

use const_oid::ObjectIdentifier;

/// Subject Alternative Name extension (2.5.29.17)
pub const SUBJECT_ALT_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.17");

/// CRL Distribution Points extension (2.5.29.31)
pub const CRL_DISTRIBUTION_POINTS: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.31");

/// Authority Information Access extension (1.3.6.1.5.5.7.1.1)
pub const AUTHORITY_INFO_ACCESS: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.1.1");

/// OCSP access method (1.3.6.1.5.5.7.48.1)
pub const AD_OCSP: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.48.1");

/// CA issuers access method (1.3.6.1.5.5.7.48.2)
pub const AD_CA_ISSUERS: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.48.2");

/// Microsoft userPrincipalName otherName (1.3.6.1.4.1.311.20.2.3)
pub const USER_PRINCIPAL_NAME: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.20.2.3");

/// Microsoft NTDS CA security extension (1.3.6.1.4.1.311.25.2)
pub const NTDS_CA_SECURITY_EXT: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.25.2");

/// Microsoft NTDS object SID otherName (1.3.6.1.4.1.311.25.2.1)
pub const NTDS_OBJECTSID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.25.2.1");

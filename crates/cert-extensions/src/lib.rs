// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 P47H Team <https://p47h.com>

//! # cert-extensions
//!
//! DER codec for the GeneralName-based X.509 extensions an enrollment policy
//! can rewrite or attach:
//!
//! - **Subject Alternative Name**: decode to / encode from an ordered
//!   list of typed names (dNSName, iPAddress, rfc822Name,
//!   userPrincipalName, uniformResourceIdentifier)
//! - **Authority Information Access**: CA issuer and OCSP locations
//! - **CRL Distribution Points**: one distribution point per URI
//! - **Security identifier**: the NTDS CA security extension carrying an
//!   account SID
//!
//! Encodings are deterministic: the same entries in the same order always
//! produce the same bytes.
//!
//! ```
//! use cert_extensions::{SanKind, SubjectAlternativeNames};
//!
//! let mut san = SubjectAlternativeNames::new();
//! san.add(SanKind::DnsName, "intranet.adcslabor.de").unwrap();
//! san.add(SanKind::DnsName, "intranet.adcslabor.de").unwrap(); // ignored
//!
//! let der = san.to_der().unwrap();
//! assert_eq!(SubjectAlternativeNames::from_der(&der).unwrap(), san);
//! assert!(SubjectAlternativeNames::new().to_der().unwrap().is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aia;
pub mod cdp;
pub mod error;
pub mod general_name;
pub mod oid;
pub mod san;
pub mod sid;
pub mod uri;

pub use aia::{build_authority_information_access, AccessMethod, AuthorityInformationAccess};
pub use cdp::{build_crl_distribution_points, CrlDistributionPoints};
pub use error::{ExtensionError, Result};
pub use general_name::{GeneralNameEntry, SanKind};
pub use san::SubjectAlternativeNames;
pub use sid::{
    build_security_identifier_extension, decode_security_identifier_extension,
    SecurityIdentifier,
};

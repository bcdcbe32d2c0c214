//! PKIX (Public Key Infrastructure using X.509) Common Types
//!
//! Byte-level codecs for the structures every PKIX artifact is built from:
//! [`AlgorithmIdentifier`], [`SignedContentBlob`] (the signed envelope used by
//! certificates, CRLs and requests) and the generic [`Extension`]. Each keeps
//! the exact encoding it was decoded from so that re-encoding is byte-exact.
//!
//! These types are defined in:
//! - RFC 5280: Internet X.509 Public Key Infrastructure Certificate and CRL Profile
//! - RFC 4519: Lightweight Directory Access Protocol (LDAP): Schema for User Applications

#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicBool, Ordering};

pub mod algorithm;
pub mod directory_string;
pub mod error;
pub mod extension;
pub mod name;
pub mod oid_name;
pub mod signed_content;

pub use algorithm::AlgorithmIdentifier;
pub use directory_string::DirectoryString;
pub use error::{Error, Result};
pub use extension::Extension;
pub use name::{AttributeTypeAndValue, Name, RelativeDistinguishedName};
pub use oid_name::OidName;
pub use signed_content::SignedContentBlob;

/// Key Identifier (RFC 5280 4.2.1.1, 4.2.1.2)
///
/// ```asn1
/// KeyIdentifier ::= OCTET STRING
/// ```
pub type KeyIdentifier = pkicodec_asn1::OctetString;

static USE_OID_VALUES: AtomicBool = AtomicBool::new(false);

/// Selects whether `Display` and serde output print dotted OIDs instead of
/// friendly names. Process wide.
pub fn set_use_oid_values(value: bool) {
    USE_OID_VALUES.store(value, Ordering::Relaxed);
}

pub fn get_use_oid_values() -> bool {
    USE_OID_VALUES.load(Ordering::Relaxed)
}

pub(crate) fn hex_spaced(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

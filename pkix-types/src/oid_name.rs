//! Conventional names for well-known OIDs

use pkicodec_asn1::ObjectIdentifier;

/// Types whose OID has a conventional name, e.g. `sha256WithRSAEncryption`
/// for `1.2.840.113549.1.1.11`.
pub trait OidName {
    fn oid_name(&self) -> Option<&'static str>;
}

/// The label to print for `oid`: the friendly name when one is known and
/// the "use OID values" switch is off, the dotted OID otherwise.
pub fn oid_label(oid: &ObjectIdentifier, name: Option<&'static str>) -> String {
    match name {
        Some(name) if !crate::get_use_oid_values() => name.to_string(),
        _ => oid.to_string(),
    }
}

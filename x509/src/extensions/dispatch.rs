use std::fmt;

use pkicodec_asn1::ObjectIdentifier;
use pkicodec_pkix_types::OidName;
use serde::Serialize;

use super::error::Result;
use super::*;

/// Generates [`CertificateExtension`], its OID table and the dispatcher from
/// one list of variants. Each variant is named after its payload type.
macro_rules! certificate_extensions {
    ($($variant:ident),+ $(,)?) => {
        /// An extension resolved to its concrete type, or kept as is when the
        /// OID is not known.
        #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
        pub enum CertificateExtension {
            $($variant(TypedExtension<$variant>),)+
            Unknown(RawExtension),
        }

        /// `(oid, name)` of every extension [`CertificateExtension::classify`]
        /// resolves.
        pub static KNOWN_EXTENSIONS: &[(&str, &str)] = &[
            $((<$variant as Extension>::OID, <$variant as Extension>::NAME),)+
        ];

        impl CertificateExtension {
            /// Resolves a generic extension by OID.
            ///
            /// Unknown OIDs are never an error. A known OID with a malformed
            /// payload fails with that type's error.
            pub fn classify(extension: &RawExtension) -> Result<Self> {
                let oid = extension.oid().to_string();
                match oid.as_str() {
                    $(<$variant as Extension>::OID => {
                        let typed = TypedExtension::<$variant>::from_generic(extension)
                            .inspect_err(|err| {
                                tracing::debug!(oid = %oid, error = %err, "malformed extension payload");
                            })?;
                        tracing::trace!(oid = %oid, name = <$variant as Extension>::NAME, "classified extension");
                        Ok(CertificateExtension::$variant(typed))
                    })+
                    _ => {
                        tracing::debug!(oid = %oid, critical = extension.is_critical(), "unknown extension passed through");
                        Ok(CertificateExtension::Unknown(extension.clone()))
                    }
                }
            }

            pub fn oid(&self) -> &ObjectIdentifier {
                match self {
                    $(CertificateExtension::$variant(ext) => ext.oid(),)+
                    CertificateExtension::Unknown(ext) => ext.oid(),
                }
            }

            pub fn is_critical(&self) -> bool {
                match self {
                    $(CertificateExtension::$variant(ext) => ext.is_critical(),)+
                    CertificateExtension::Unknown(ext) => ext.is_critical(),
                }
            }

            /// Conventional name; `None` for unknown extensions.
            pub fn name(&self) -> Option<&'static str> {
                match self {
                    $(CertificateExtension::$variant(_) => Some(<$variant as Extension>::NAME),)+
                    CertificateExtension::Unknown(_) => None,
                }
            }

            pub fn to_generic(&self) -> RawExtension {
                match self {
                    $(CertificateExtension::$variant(ext) => ext.to_generic(),)+
                    CertificateExtension::Unknown(ext) => ext.clone(),
                }
            }
        }

        impl fmt::Display for CertificateExtension {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(CertificateExtension::$variant(ext) => write!(f, "{}", ext),)+
                    CertificateExtension::Unknown(ext) => {
                        write_header(f, ext.oid(), None, ext.is_critical())?;
                        write_body(f, &pkicodec_asn1::hex_colon(ext.value().as_bytes()))
                    }
                }
            }
        }

        $(
            impl From<TypedExtension<$variant>> for CertificateExtension {
                fn from(ext: TypedExtension<$variant>) -> Self {
                    CertificateExtension::$variant(ext)
                }
            }

            impl KnownExtension for $variant {
                fn typed(extension: &CertificateExtension) -> Option<&TypedExtension<Self>> {
                    match extension {
                        CertificateExtension::$variant(ext) => Some(ext),
                        _ => None,
                    }
                }
            }
        )+
    };
}

/// Extension types that have a [`CertificateExtension`] variant.
pub trait KnownExtension: Extension {
    fn typed(extension: &CertificateExtension) -> Option<&TypedExtension<Self>>;
}

certificate_extensions! {
    SubjectKeyIdentifier,
    KeyUsage,
    SubjectAltName,
    IssuerAltName,
    BasicConstraints,
    CrlNumber,
    DeltaCrlIndicator,
    NameConstraints,
    CrlDistributionPoints,
    CertificatePolicies,
    PolicyMappings,
    AuthorityKeyIdentifier,
    PolicyConstraints,
    ExtendedKeyUsage,
    FreshestCrl,
    InhibitAnyPolicy,
    AuthorityInfoAccess,
    OcspNonce,
    OcspNoCheck,
    CertificateTemplateName,
    CaVersion,
    NextCrlPublish,
    CertificateTemplate,
    ApplicationPolicies,
    ApplicationPolicyMappings,
    ApplicationPolicyConstraints,
    PublishedCrlLocations,
}

impl CertificateExtension {
    /// DER of the whole extension (`SEQUENCE { extnID, critical, extnValue }`).
    pub fn to_der(&self) -> std::result::Result<Vec<u8>, pkicodec_pkix_types::Error> {
        use pkicodec::encoder::Encoder;
        let der: Vec<u8> = self.to_generic().encode()?;
        Ok(der)
    }
}

impl OidName for CertificateExtension {
    fn oid_name(&self) -> Option<&'static str> {
        self.name()
    }
}

impl From<RawExtension> for CertificateExtension {
    fn from(ext: RawExtension) -> Self {
        CertificateExtension::Unknown(ext)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pkicodec_asn1::OctetString;
    use rstest::rstest;

    use super::*;
    use crate::extensions::error::{Error, Kind};

    fn raw(oid: &str, critical: bool, value: &[u8]) -> RawExtension {
        RawExtension::new(oid.parse().unwrap(), critical, OctetString::from(value))
    }

    #[test]
    fn test_known_table_is_unique() {
        assert_eq!(27, KNOWN_EXTENSIONS.len());
        let oids: HashSet<_> = KNOWN_EXTENSIONS.iter().map(|(oid, _)| *oid).collect();
        assert_eq!(KNOWN_EXTENSIONS.len(), oids.len());
    }

    #[rstest]
    #[case::basic_constraints("2.5.29.19", vec![0x30, 0x00], "basicConstraints")]
    #[case::key_usage("2.5.29.15", vec![0x03, 0x02, 0x05, 0xa0], "keyUsage")]
    #[case::crl_number("2.5.29.20", vec![0x02, 0x01, 0x05], "cRLNumber")]
    #[case::ocsp_no_check("1.3.6.1.5.5.7.48.1.5", vec![0x05, 0x00], "ocspNoCheck")]
    #[case::ca_version("1.3.6.1.4.1.311.21.1", vec![0x02, 0x01, 0x00], "caVersion")]
    fn test_classify_known(#[case] oid: &str, #[case] value: Vec<u8>, #[case] name: &str) {
        let generic = raw(oid, false, &value);
        let classified = CertificateExtension::classify(&generic).unwrap();
        assert_eq!(Some(name), classified.name());
        assert_eq!(oid, classified.oid().to_string());
        assert!(!classified.is_critical());
        assert_eq!(generic, classified.to_generic());
    }

    #[test]
    fn test_classify_unknown() {
        let generic = raw("1.2.3.4.5", true, &[0xde, 0xad]);
        let classified = CertificateExtension::classify(&generic).unwrap();
        assert_eq!(CertificateExtension::Unknown(generic.clone()), classified);
        assert_eq!(None, classified.name());
        assert!(classified.is_critical());
        assert_eq!("1.2.3.4.5: critical\n    DE:AD", classified.to_string());
    }

    #[test]
    fn test_classify_malformed_known() {
        let generic = raw("2.5.29.19", false, &[0x04, 0x00]);
        let result = CertificateExtension::classify(&generic);
        assert_eq!(Err(Error::ExpectedSequence(Kind::BasicConstraints)), result);
    }

    #[test]
    fn test_typed_lookup() {
        let classified = CertificateExtension::classify(&raw("2.5.29.19", true, &[0x30, 0x00])).unwrap();
        assert!(BasicConstraints::typed(&classified).is_some());
        assert!(KeyUsage::typed(&classified).is_none());
    }

    #[test]
    fn test_to_der() {
        let classified =
            CertificateExtension::classify(&raw("2.5.29.19", true, &[0x30, 0x03, 0x01, 0x01, 0xff]))
                .unwrap();
        assert_eq!(
            vec![
                0x30, 0x0f, 0x06, 0x03, 0x55, 0x1d, 0x13, 0x01, 0x01, 0xff, 0x04, 0x05, 0x30,
                0x03, 0x01, 0x01, 0xff
            ],
            classified.to_der().unwrap()
        );
    }
}

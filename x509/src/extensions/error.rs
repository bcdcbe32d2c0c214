//! Extension payload errors

use thiserror::Error;

/// Which structure an extension error was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
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
    GeneralName,
    DistributionPoint,
    PolicyInformation,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Errors raised while decoding or encoding an extension payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{0}: expected SEQUENCE")]
    ExpectedSequence(Kind),
    #[error("{0}: at least one element required")]
    EmptySequence(Kind),
    #[error("{0}: expected BIT STRING")]
    ExpectedBitString(Kind),
    #[error("{0}: expected OCTET STRING")]
    ExpectedOctetString(Kind),
    #[error("{0}: expected INTEGER")]
    ExpectedInteger(Kind),
    #[error("{0}: expected OBJECT IDENTIFIER")]
    ExpectedOid(Kind),
    #[error("{0}: expected NULL")]
    ExpectedNull(Kind),
    #[error("{0}: expected a time value")]
    ExpectedTime(Kind),
    #[error("{kind}: unexpected context-specific tag [{slot}]")]
    UnexpectedContextTag { kind: Kind, slot: u8 },
    #[error("{kind}: expected {expected} elements, got {actual}")]
    InvalidElementCount {
        kind: Kind,
        expected: &'static str,
        actual: usize,
    },
    #[error("{0}: unexpected element type")]
    UnexpectedElementType(Kind),
    #[error("{0}: value out of range for u32")]
    ValueOutOfRangeU32(Kind),
    #[error("{0}: negative value")]
    NegativeValue(Kind),
    #[error("{0}: at least one field must be present")]
    EmptyContent(Kind),
    #[error("{0}: anyPolicy must not appear in a mapping")]
    AnyPolicyMapped(Kind),

    // GeneralName
    #[error("GeneralName: unknown context-specific tag [{0}]")]
    UnknownGeneralNameTag(u8),
    #[error("GeneralName: IA5String must be ASCII")]
    GeneralNameInvalidAscii,
    #[error("GeneralName: iPAddress must be 4, 8, 16 or 32 bytes, got {0}")]
    InvalidIpAddressLength(usize),
    #[error("GeneralName: netmask is not contiguous")]
    InvalidNetmask,
    #[error("GeneralName: otherName must be type-id followed by [0] EXPLICIT value")]
    OtherNameInvalidStructure,
    #[error("GeneralName: ediPartyName missing partyName [1]")]
    EdiPartyNameMissingPartyName,

    #[error("OcspNonce: nonce must be 1 to 32 octets, got {0}")]
    OcspNonceInvalidLength(usize),

    #[error("expected extension {expected}, got {actual}")]
    OidMismatch {
        expected: &'static str,
        actual: String,
    },
    #[error("invalid ASN.1: {0}")]
    InvalidAsn1(#[from] pkicodec_asn1::error::Error),
    #[error("PKIX types error: {0}")]
    PkixTypes(#[from] pkicodec_pkix_types::Error),
}

/// Result type for extension operations
pub type Result<T> = std::result::Result<T, Error>;

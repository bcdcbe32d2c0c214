//! Error types for PKIX types

use pkicodec_der::Tag;
use thiserror::Error;

/// Result type for PKIX types operations
pub type Result<T> = std::result::Result<T, Error>;

/// PKIX types error types
///
/// The structural variants name the structure being decoded and carry the
/// absolute byte offset of the TLV that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{structure}: expected {expected}, found {actual} at offset {offset}")]
    StructuralTagMismatch {
        structure: &'static str,
        expected: Tag,
        actual: Tag,
        offset: usize,
    },
    #[error("{structure}: missing {expected} at offset {offset}")]
    TruncatedInput {
        structure: &'static str,
        expected: &'static str,
        offset: usize,
    },
    #[error("{structure}: unexpected data at offset {offset}")]
    TrailingData {
        structure: &'static str,
        offset: usize,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("uninitialized state: {0}")]
    UninitializedState(&'static str),

    // Extension errors
    #[error("Extension: critical must be a single 0x00 or 0xff octet (offset {offset})")]
    ExtensionInvalidCritical { offset: usize },
    #[error("Extension: expected SEQUENCE")]
    ExtensionExpectedSequence,
    #[error("Extension: expected OBJECT IDENTIFIER, [BOOLEAN,] OCTET STRING")]
    ExtensionInvalidElements,

    // AlgorithmIdentifier errors
    #[error("AlgorithmIdentifier: expected SEQUENCE")]
    AlgorithmIdentifierExpectedSequence,
    #[error("AlgorithmIdentifier: expected OBJECT IDENTIFIER [, parameters]")]
    AlgorithmIdentifierInvalidElements,

    // DirectoryString errors
    #[error("DirectoryString: invalid UTF-8 in OctetString")]
    DirectoryStringInvalidUtf8,
    #[error("DirectoryString: expected string type")]
    DirectoryStringExpectedStringType,

    // Name errors
    #[error("Name: expected SEQUENCE")]
    NameExpectedSequence,
    #[error("RelativeDistinguishedName: expected SET")]
    RdnExpectedSet,
    #[error("AttributeTypeAndValue: expected SEQUENCE")]
    AttributeTypeAndValueExpectedSequence,
    #[error("AttributeTypeAndValue: expected OBJECT IDENTIFIER for attribute type")]
    AttributeTypeAndValueExpectedOid,
    #[error("AttributeTypeAndValue: expected 2 elements")]
    AttributeTypeAndValueInvalidElementCount,

    #[error("DER error: {0}")]
    Der(#[from] pkicodec_der::error::Error),
    #[error("ASN.1 error: {0}")]
    ASN1Error(#[from] pkicodec_asn1::error::Error),
}

impl Error {
    /// Maps a cursor error raised while reading `structure` to the
    /// structural error kinds, keeping its offset.
    pub(crate) fn structural(
        structure: &'static str,
    ) -> impl Fn(pkicodec_der::error::Error) -> Error {
        use pkicodec_der::error::Error as DerError;
        move |err| match err {
            DerError::TagMismatch {
                expected,
                actual,
                offset,
            } => Error::StructuralTagMismatch {
                structure,
                expected,
                actual,
                offset,
            },
            DerError::Truncated { expected, offset } => Error::TruncatedInput {
                structure,
                expected,
                offset,
            },
            DerError::TrailingData { offset } => Error::TrailingData { structure, offset },
            other => Error::Der(other),
        }
    }

    /// Byte offset the error refers to, when it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::StructuralTagMismatch { offset, .. }
            | Error::TruncatedInput { offset, .. }
            | Error::TrailingData { offset, .. }
            | Error::ExtensionInvalidCritical { offset } => Some(*offset),
            Error::Der(err) => err.offset(),
            _ => None,
        }
    }
}

//! Error types for ASN.1 value parsing and encoding.

use std::num::ParseIntError;

use thiserror::Error;

/// Errors that can occur while turning TLVs into typed ASN.1 values and back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // Boolean errors
    #[error("BOOLEAN: content must be a single 0x00 or 0xff octet")]
    InvalidBoolean,

    // Integer errors
    #[error("INTEGER: no data")]
    IntegerNoData,
    #[error("INTEGER: content is not in its shortest two's-complement form")]
    IntegerNonMinimal,
    #[error("INTEGER: value out of range for i64")]
    IntegerOutOfRangeI64,
    #[error("INTEGER: value out of range for u64")]
    IntegerOutOfRangeU64,
    #[error("parse int error: {0}")]
    ParseInt(ParseIntError),

    #[error("NULL: content must be empty")]
    NullHasContent,

    // ObjectIdentifier errors
    #[error("OBJECT IDENTIFIER: no data")]
    ObjectIdentifierNoData,
    #[error("OBJECT IDENTIFIER: incomplete encoding")]
    ObjectIdentifierIncompleteEncoding,
    #[error("OBJECT IDENTIFIER: arc is not encoded in its shortest form")]
    ObjectIdentifierNonMinimal,
    #[error("OBJECT IDENTIFIER: arc does not fit in 64 bits")]
    ObjectIdentifierArcTooLarge,
    #[error("OBJECT IDENTIFIER: too few components (need at least 2)")]
    ObjectIdentifierTooFewComponents,
    #[error("OBJECT IDENTIFIER: empty string")]
    ObjectIdentifierEmptyString,
    #[error("OBJECT IDENTIFIER: invalid component '{0}'")]
    ObjectIdentifierInvalidComponent(String),

    // BitString errors
    #[error("BIT STRING: no data")]
    BitStringNoData,
    #[error("BIT STRING: unused bits {0} out of range (must be 0-7)")]
    BitStringUnusedBitsOutOfRange(u8),
    #[error("BIT STRING: empty value must not declare unused bits")]
    BitStringUnusedBitsOnEmpty,

    // String type errors
    #[error("UTF8String: invalid UTF-8")]
    Utf8StringInvalidUtf8,
    #[error("PrintableString: invalid encoding")]
    PrintableStringInvalidEncoding,
    #[error("IA5String: invalid encoding")]
    Ia5StringInvalidEncoding,

    // Time errors
    #[error("UTCTime: no data")]
    UtcTimeNoData,
    #[error("UTCTime: invalid format")]
    UtcTimeInvalidFormat,
    #[error("GeneralizedTime: no data")]
    GeneralizedTimeNoData,
    #[error("GeneralizedTime: invalid format")]
    GeneralizedTimeInvalidFormat,

    // BMPString errors
    #[error("BMPString: odd byte length {0}")]
    BmpStringOddLength(usize),
    #[error("BMPString: contains character outside BMP (requires surrogate pair)")]
    BmpStringRequiresSurrogatePair,

    // Context-specific errors
    #[error("invalid context-specific value: {slot}, {msg}")]
    InvalidContextSpecific { slot: u8, msg: String },
    #[error("expected a context-specific element")]
    ExpectedContextSpecific,

    // DER errors
    #[error("invalid DER encoding: {0}")]
    FailedToDecodeDer(#[from] pkicodec_der::error::Error),
    #[error("expected a single element, found {0}")]
    NotSingleElement(usize),

    // Element errors
    #[error("element: {0} must use the primitive encoding")]
    ExpectedPrimitive(pkicodec_der::Tag),
    #[error("element: {0} must use the constructed encoding")]
    ExpectedConstructed(pkicodec_der::Tag),
    #[error("element: cannot encode {0}")]
    ElementCannotEncode(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

//! OCSP related extensions (RFC 6960 Section 4.4, RFC 8954)

use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, OctetString, hex_colon};
use serde::{Deserialize, Serialize};

use super::error::{Error, Kind, Result};
use super::{Extension, encode_element, parse_element};

/// Nonce binding an OCSP request to its response.
///
/// ```asn1
/// Nonce ::= OCTET STRING (SIZE(1..32))
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcspNonce {
    pub nonce: OctetString,
}

impl OcspNonce {
    pub const MAX_LEN: usize = 32;

    pub fn new(nonce: impl Into<Vec<u8>>) -> Result<Self> {
        let nonce = OctetString::from(nonce.into());
        check_nonce(&nonce)?;
        Ok(OcspNonce { nonce })
    }
}

fn check_nonce(nonce: &OctetString) -> Result<()> {
    if nonce.is_empty() || nonce.len() > OcspNonce::MAX_LEN {
        return Err(Error::OcspNonceInvalidLength(nonce.len()));
    }
    Ok(())
}

impl Extension for OcspNonce {
    const OID: &'static str = "1.3.6.1.5.5.7.48.1.2";
    const NAME: &'static str = "ocspNonce";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for OcspNonce {}

impl Decoder<Element, OcspNonce> for Element {
    type Error = Error;

    fn decode(&self) -> Result<OcspNonce> {
        let Element::OctetString(nonce) = self else {
            return Err(Error::ExpectedOctetString(Kind::OcspNonce));
        };
        check_nonce(nonce)?;
        Ok(OcspNonce {
            nonce: nonce.clone(),
        })
    }
}

impl EncodableTo<OcspNonce> for Element {}

impl Encoder<OcspNonce, Element> for OcspNonce {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        check_nonce(&self.nonce)?;
        Ok(Element::OctetString(self.nonce.clone()))
    }
}

impl fmt::Display for OcspNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex_colon(self.nonce.as_bytes()))
    }
}

/// Marks an OCSP responder certificate as exempt from revocation checks.
///
/// ```asn1
/// id-pkix-ocsp-nocheck ::= NULL
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcspNoCheck;

impl Extension for OcspNoCheck {
    const OID: &'static str = "1.3.6.1.5.5.7.48.1.5";
    const NAME: &'static str = "ocspNoCheck";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for OcspNoCheck {}

impl Decoder<Element, OcspNoCheck> for Element {
    type Error = Error;

    fn decode(&self) -> Result<OcspNoCheck> {
        match self {
            Element::Null => Ok(OcspNoCheck),
            _ => Err(Error::ExpectedNull(Kind::OcspNoCheck)),
        }
    }
}

impl EncodableTo<OcspNoCheck> for Element {}

impl Encoder<OcspNoCheck, Element> for OcspNoCheck {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Null)
    }
}

impl fmt::Display for OcspNoCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Yes")
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_ocsp_nonce() {
        let der = vec![0x04, 0x04, 0xde, 0xad, 0xbe, 0xef];
        let nonce = OcspNonce::parse(&OctetString::from(der.clone())).unwrap();
        assert_eq!("DE:AD:BE:EF", nonce.to_string());
        assert_eq!(der, nonce.to_value().unwrap());
    }

    #[rstest]
    #[case(0)]
    #[case(33)]
    fn test_ocsp_nonce_invalid_length(#[case] len: usize) {
        assert_eq!(
            Err(Error::OcspNonceInvalidLength(len)),
            OcspNonce::new(vec![0xab; len])
        );
        let mut der = vec![0x04, len as u8];
        der.extend(vec![0xab; len]);
        assert_eq!(
            Err(Error::OcspNonceInvalidLength(len)),
            OcspNonce::parse(&OctetString::from(der))
        );
    }

    #[test]
    fn test_ocsp_nonce_max_length() {
        let nonce = OcspNonce::new(vec![0x01; OcspNonce::MAX_LEN]).unwrap();
        assert_eq!(34, nonce.to_value().unwrap().len());
    }

    #[rstest]
    #[case(vec![0x05, 0x00], Ok(OcspNoCheck))]
    #[case(vec![0x04, 0x00], Err(Error::ExpectedNull(Kind::OcspNoCheck)))]
    fn test_ocsp_no_check(#[case] der: Vec<u8>, #[case] expected: Result<OcspNoCheck>) {
        assert_eq!(expected, OcspNoCheck::parse(&OctetString::from(der)));
    }

    #[test]
    fn test_ocsp_no_check_encodes_null() {
        assert_eq!(vec![0x05, 0x00], OcspNoCheck.to_value().unwrap());
    }
}

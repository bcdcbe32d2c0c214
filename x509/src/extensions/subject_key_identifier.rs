use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, OctetString, hex_colon};
use pkicodec_pkix_types::KeyIdentifier;
use serde::{Deserialize, Serialize};

use super::error::{Error, Kind, Result};
use super::{Extension, encode_element, parse_element};

/*
RFC 5280 Section 4.2.1.2
SubjectKeyIdentifier ::= KeyIdentifier
KeyIdentifier ::= OCTET STRING
*/

/// Subject Key Identifier, usually a SHA-1 of the subject public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectKeyIdentifier {
    pub key_identifier: KeyIdentifier,
}

impl SubjectKeyIdentifier {
    pub fn new(key_identifier: impl Into<Vec<u8>>) -> Self {
        SubjectKeyIdentifier {
            key_identifier: OctetString::from(key_identifier.into()),
        }
    }
}

impl Extension for SubjectKeyIdentifier {
    const OID: &'static str = "2.5.29.14";
    const NAME: &'static str = "subjectKeyIdentifier";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for SubjectKeyIdentifier {}

impl Decoder<Element, SubjectKeyIdentifier> for Element {
    type Error = Error;

    fn decode(&self) -> Result<SubjectKeyIdentifier> {
        match self {
            Element::OctetString(os) => Ok(SubjectKeyIdentifier {
                key_identifier: os.clone(),
            }),
            _ => Err(Error::ExpectedOctetString(Kind::SubjectKeyIdentifier)),
        }
    }
}

impl EncodableTo<SubjectKeyIdentifier> for Element {}

impl Encoder<SubjectKeyIdentifier, Element> for SubjectKeyIdentifier {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::OctetString(self.key_identifier.clone()))
    }
}

impl fmt::Display for SubjectKeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex_colon(self.key_identifier.as_bytes()))
    }
}

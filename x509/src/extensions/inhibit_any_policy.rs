use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, Integer, OctetString};
use serde::{Deserialize, Serialize};

use super::error::{Error, Kind, Result};
use super::{Extension, encode_element, integer_u32, parse_element};

/*
RFC 5280 Section 4.2.1.14
InhibitAnyPolicy ::= SkipCerts
SkipCerts ::= INTEGER (0..MAX)
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InhibitAnyPolicy {
    pub skip_certs: u32,
}

impl Extension for InhibitAnyPolicy {
    const OID: &'static str = "2.5.29.54";
    const NAME: &'static str = "inhibitAnyPolicy";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for InhibitAnyPolicy {}

impl Decoder<Element, InhibitAnyPolicy> for Element {
    type Error = Error;

    fn decode(&self) -> Result<InhibitAnyPolicy> {
        Ok(InhibitAnyPolicy {
            skip_certs: integer_u32(self, Kind::InhibitAnyPolicy)?,
        })
    }
}

impl EncodableTo<InhibitAnyPolicy> for Element {}

impl Encoder<InhibitAnyPolicy, Element> for InhibitAnyPolicy {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Integer(Integer::from(u64::from(self.skip_certs))))
    }
}

impl fmt::Display for InhibitAnyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.skip_certs)
    }
}

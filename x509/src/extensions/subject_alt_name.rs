use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, OctetString};
use serde::Serialize;

use super::error::{Error, Kind, Result};
use super::general_name::{GeneralName, decode_general_names, encode_general_names, join_names};
use super::{Extension, encode_element, parse_element};

/*
RFC 5280 Section 4.2.1.6 / 4.2.1.7
SubjectAltName ::= GeneralNames
IssuerAltName ::= GeneralNames
GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
*/

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectAltName {
    pub names: Vec<GeneralName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuerAltName {
    pub names: Vec<GeneralName>,
}

fn decode_names(element: &Element, kind: Kind) -> Result<Vec<GeneralName>> {
    match element {
        Element::Sequence(elements) if elements.is_empty() => Err(Error::EmptySequence(kind)),
        Element::Sequence(elements) => decode_general_names(elements),
        _ => Err(Error::ExpectedSequence(kind)),
    }
}

fn encode_names(names: &[GeneralName], kind: Kind) -> Result<Element> {
    if names.is_empty() {
        return Err(Error::EmptySequence(kind));
    }
    Ok(Element::Sequence(encode_general_names(names)?))
}

impl Extension for SubjectAltName {
    const OID: &'static str = "2.5.29.17";
    const NAME: &'static str = "subjectAltName";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for SubjectAltName {}

impl Decoder<Element, SubjectAltName> for Element {
    type Error = Error;

    fn decode(&self) -> Result<SubjectAltName> {
        Ok(SubjectAltName {
            names: decode_names(self, Kind::SubjectAltName)?,
        })
    }
}

impl EncodableTo<SubjectAltName> for Element {}

impl Encoder<SubjectAltName, Element> for SubjectAltName {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        encode_names(&self.names, Kind::SubjectAltName)
    }
}

impl fmt::Display for SubjectAltName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join_names(&self.names))
    }
}

impl Extension for IssuerAltName {
    const OID: &'static str = "2.5.29.18";
    const NAME: &'static str = "issuerAltName";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for IssuerAltName {}

impl Decoder<Element, IssuerAltName> for Element {
    type Error = Error;

    fn decode(&self) -> Result<IssuerAltName> {
        Ok(IssuerAltName {
            names: decode_names(self, Kind::IssuerAltName)?,
        })
    }
}

impl EncodableTo<IssuerAltName> for Element {}

impl Encoder<IssuerAltName, Element> for IssuerAltName {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        encode_names(&self.names, Kind::IssuerAltName)
    }
}

impl fmt::Display for IssuerAltName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join_names(&self.names))
    }
}

use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, Integer, OctetString};
use serde::{Deserialize, Serialize};

use super::error::{Error, Kind, Result};
use super::{Extension, encode_element, parse_element};

/*
RFC 5280 Section 5.2.3 / 5.2.4
CRLNumber ::= INTEGER (0..MAX)
BaseCRLNumber ::= CRLNumber

Values may be up to 20 octets, so they are kept as arbitrary-size integers.
*/

fn non_negative(element: &Element, kind: Kind) -> Result<Integer> {
    match element {
        Element::Integer(i) if *i < Integer::from(0u64) => Err(Error::NegativeValue(kind)),
        Element::Integer(i) => Ok(i.clone()),
        _ => Err(Error::ExpectedInteger(kind)),
    }
}

/// Monotonically increasing sequence number of a CRL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrlNumber {
    pub number: Integer,
}

/// Number of the base CRL a delta CRL updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaCrlIndicator {
    pub base_crl_number: Integer,
}

impl Extension for CrlNumber {
    const OID: &'static str = "2.5.29.20";
    const NAME: &'static str = "cRLNumber";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for CrlNumber {}

impl Decoder<Element, CrlNumber> for Element {
    type Error = Error;

    fn decode(&self) -> Result<CrlNumber> {
        Ok(CrlNumber {
            number: non_negative(self, Kind::CrlNumber)?,
        })
    }
}

impl EncodableTo<CrlNumber> for Element {}

impl Encoder<CrlNumber, Element> for CrlNumber {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        non_negative(&Element::Integer(self.number.clone()), Kind::CrlNumber).map(Element::Integer)
    }
}

impl fmt::Display for CrlNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number)
    }
}

impl Extension for DeltaCrlIndicator {
    const OID: &'static str = "2.5.29.27";
    const NAME: &'static str = "deltaCRLIndicator";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for DeltaCrlIndicator {}

impl Decoder<Element, DeltaCrlIndicator> for Element {
    type Error = Error;

    fn decode(&self) -> Result<DeltaCrlIndicator> {
        Ok(DeltaCrlIndicator {
            base_crl_number: non_negative(self, Kind::DeltaCrlIndicator)?,
        })
    }
}

impl EncodableTo<DeltaCrlIndicator> for Element {}

impl Encoder<DeltaCrlIndicator, Element> for DeltaCrlIndicator {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        non_negative(
            &Element::Integer(self.base_crl_number.clone()),
            Kind::DeltaCrlIndicator,
        )
        .map(Element::Integer)
    }
}

impl fmt::Display for DeltaCrlIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_crl_number)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(vec![0x02, 0x01, 0x05], "5")]
    #[case(vec![0x02, 0x02, 0x00, 0xff], "255")]
    #[case(
        vec![0x02, 0x09, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        "18446744073709551616"
    )]
    fn test_crl_number(#[case] der: Vec<u8>, #[case] display: &str) {
        let crl_number = CrlNumber::parse(&OctetString::from(der.clone())).unwrap();
        assert_eq!(display, crl_number.to_string());
        assert_eq!(der, crl_number.to_value().unwrap());
    }

    #[test]
    fn test_delta_crl_indicator() {
        let der = vec![0x02, 0x01, 0x2a];
        let delta = DeltaCrlIndicator::parse(&OctetString::from(der.clone())).unwrap();
        assert_eq!(Some(42), delta.base_crl_number.to_u32());
        assert_eq!(der, delta.to_value().unwrap());
    }

    #[rstest]
    #[case(vec![0x02, 0x01, 0xff], Error::NegativeValue(Kind::CrlNumber))]
    #[case(vec![0x04, 0x01, 0x01], Error::ExpectedInteger(Kind::CrlNumber))]
    fn test_crl_number_invalid(#[case] der: Vec<u8>, #[case] expected: Error) {
        let result = CrlNumber::parse(&OctetString::from(der));
        assert_eq!(Err(expected), result);
    }

    #[test]
    fn test_negative_not_encoded() {
        let crl_number = CrlNumber {
            number: Integer::from(-1i64),
        };
        assert_eq!(Err(Error::NegativeValue(Kind::CrlNumber)), crl_number.to_value());
    }
}

use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, Integer, OctetString};
use serde::{Deserialize, Serialize};

use super::error::{Error, Kind, Result};
use super::{Extension, encode_element, integer_u32, parse_element};

/// Microsoft CA version (1.3.6.1.4.1.311.21.1).
///
/// A single INTEGER: the low 16 bits count CA certificate renewals, the high
/// 16 bits count key renewals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaVersion {
    pub certificate_index: u16,
    pub key_index: u16,
}

impl CaVersion {
    pub fn from_raw(value: u32) -> Self {
        CaVersion {
            certificate_index: (value & 0xffff) as u16,
            key_index: (value >> 16) as u16,
        }
    }

    pub fn to_raw(&self) -> u32 {
        (u32::from(self.key_index) << 16) | u32::from(self.certificate_index)
    }
}

impl Extension for CaVersion {
    const OID: &'static str = "1.3.6.1.4.1.311.21.1";
    const NAME: &'static str = "caVersion";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for CaVersion {}

impl Decoder<Element, CaVersion> for Element {
    type Error = Error;

    fn decode(&self) -> Result<CaVersion> {
        Ok(CaVersion::from_raw(integer_u32(self, Kind::CaVersion)?))
    }
}

impl EncodableTo<CaVersion> for Element {}

impl Encoder<CaVersion, Element> for CaVersion {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Integer(Integer::from(u64::from(self.to_raw()))))
    }
}

impl fmt::Display for CaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}.{}", self.certificate_index, self.key_index)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(vec![0x02, 0x01, 0x00], 0, 0, "V0.0")]
    #[case(vec![0x02, 0x03, 0x01, 0x00, 0x01], 1, 1, "V1.1")]
    #[case(vec![0x02, 0x03, 0x02, 0x00, 0x03], 3, 2, "V3.2")]
    fn test_ca_version(
        #[case] der: Vec<u8>,
        #[case] certificate_index: u16,
        #[case] key_index: u16,
        #[case] display: &str,
    ) {
        let version = CaVersion::parse(&OctetString::from(der.clone())).unwrap();
        assert_eq!(certificate_index, version.certificate_index);
        assert_eq!(key_index, version.key_index);
        assert_eq!(display, version.to_string());
        assert_eq!(der, version.to_value().unwrap());
    }

    #[test]
    fn test_ca_version_not_integer() {
        let result = CaVersion::parse(&OctetString::from(vec![0x05, 0x00]));
        assert_eq!(Err(Error::ExpectedInteger(Kind::CaVersion)), result);
    }
}

use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, ObjectIdentifier, OctetString};
use pkicodec_pkix_types::oid_name::oid_label;
use serde::{Deserialize, Serialize};

use super::error::{Error, Kind, Result};
use super::{Extension, encode_element, parse_element};

/*
RFC 5280 Section 4.2.1.12
ExtendedKeyUsage ::= SEQUENCE SIZE (1..MAX) OF KeyPurposeId
KeyPurposeId ::= OBJECT IDENTIFIER
*/

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedKeyUsage {
    pub purposes: Vec<ObjectIdentifier>,
}

impl ExtendedKeyUsage {
    pub const ANY_EXTENDED_KEY_USAGE: &'static str = "2.5.29.37.0";
    pub const SERVER_AUTH: &'static str = "1.3.6.1.5.5.7.3.1";
    pub const CLIENT_AUTH: &'static str = "1.3.6.1.5.5.7.3.2";
    pub const CODE_SIGNING: &'static str = "1.3.6.1.5.5.7.3.3";
    pub const EMAIL_PROTECTION: &'static str = "1.3.6.1.5.5.7.3.4";
    pub const TIME_STAMPING: &'static str = "1.3.6.1.5.5.7.3.8";
    pub const OCSP_SIGNING: &'static str = "1.3.6.1.5.5.7.3.9";
    pub const SMART_CARD_LOGON: &'static str = "1.3.6.1.4.1.311.20.2.2";

    pub fn contains(&self, purpose: &str) -> bool {
        self.purposes.iter().any(|p| p == &purpose)
    }
}

fn purpose_name(oid: &ObjectIdentifier) -> Option<&'static str> {
    let name = match oid.to_string().as_str() {
        ExtendedKeyUsage::ANY_EXTENDED_KEY_USAGE => "Any Extended Key Usage",
        ExtendedKeyUsage::SERVER_AUTH => "TLS Web Server Authentication",
        ExtendedKeyUsage::CLIENT_AUTH => "TLS Web Client Authentication",
        ExtendedKeyUsage::CODE_SIGNING => "Code Signing",
        ExtendedKeyUsage::EMAIL_PROTECTION => "E-mail Protection",
        ExtendedKeyUsage::TIME_STAMPING => "Time Stamping",
        ExtendedKeyUsage::OCSP_SIGNING => "OCSP Signing",
        ExtendedKeyUsage::SMART_CARD_LOGON => "Microsoft Smartcard Login",
        _ => return None,
    };
    Some(name)
}

impl Extension for ExtendedKeyUsage {
    const OID: &'static str = "2.5.29.37";
    const NAME: &'static str = "extendedKeyUsage";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for ExtendedKeyUsage {}

impl Decoder<Element, ExtendedKeyUsage> for Element {
    type Error = Error;

    fn decode(&self) -> Result<ExtendedKeyUsage> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence(Kind::ExtendedKeyUsage));
        };
        if elements.is_empty() {
            return Err(Error::EmptySequence(Kind::ExtendedKeyUsage));
        }
        let purposes = elements
            .iter()
            .map(|elem| match elem {
                Element::ObjectIdentifier(oid) => Ok(oid.clone()),
                _ => Err(Error::ExpectedOid(Kind::ExtendedKeyUsage)),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ExtendedKeyUsage { purposes })
    }
}

impl EncodableTo<ExtendedKeyUsage> for Element {}

impl Encoder<ExtendedKeyUsage, Element> for ExtendedKeyUsage {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        if self.purposes.is_empty() {
            return Err(Error::EmptySequence(Kind::ExtendedKeyUsage));
        }
        Ok(Element::Sequence(
            self.purposes
                .iter()
                .cloned()
                .map(Element::ObjectIdentifier)
                .collect(),
        ))
    }
}

impl fmt::Display for ExtendedKeyUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self
            .purposes
            .iter()
            .map(|oid| oid_label(oid, purpose_name(oid)))
            .collect();
        write!(f, "{}", labels.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    // SEQUENCE { serverAuth, clientAuth }
    const EKU_DER: [u8; 22] = [
        0x30, 0x14, 0x06, 0x08, 0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x01, 0x06, 0x08, 0x2b,
        0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x02,
    ];

    #[test]
    fn test_extended_key_usage_round_trip() {
        let eku = ExtendedKeyUsage::parse(&OctetString::from(&EKU_DER[..])).unwrap();
        assert!(eku.contains(ExtendedKeyUsage::SERVER_AUTH));
        assert!(eku.contains(ExtendedKeyUsage::CLIENT_AUTH));
        assert!(!eku.contains(ExtendedKeyUsage::CODE_SIGNING));
        assert_eq!(
            "TLS Web Server Authentication, TLS Web Client Authentication",
            eku.to_string()
        );
        assert_eq!(EKU_DER.to_vec(), eku.to_value().unwrap());
    }

    #[test]
    fn test_unnamed_purpose_prints_oid() {
        let eku = ExtendedKeyUsage {
            purposes: vec![ObjectIdentifier::from_str("1.2.3.4").unwrap()],
        };
        assert_eq!("1.2.3.4", eku.to_string());
    }

    #[rstest]
    #[case(vec![0x30, 0x00], Error::EmptySequence(Kind::ExtendedKeyUsage))]
    #[case(vec![0x31, 0x00], Error::ExpectedSequence(Kind::ExtendedKeyUsage))]
    #[case(vec![0x30, 0x02, 0x05, 0x00], Error::ExpectedOid(Kind::ExtendedKeyUsage))]
    fn test_extended_key_usage_invalid(#[case] der: Vec<u8>, #[case] expected: Error) {
        let result = ExtendedKeyUsage::parse(&OctetString::from(der));
        assert_eq!(Err(expected), result);
    }
}

use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, Integer, OctetString, hex_colon};
use pkicodec_pkix_types::KeyIdentifier;
use serde::Serialize;

use super::error::{Error, Kind, Result};
use super::general_name::{GeneralName, decode_general_names, encode_general_names, join_names};
use super::{Extension, encode_element, parse_element};

/*
RFC 5280 Section 4.2.1.1
AuthorityKeyIdentifier ::= SEQUENCE {
    keyIdentifier             [0] KeyIdentifier           OPTIONAL,
    authorityCertIssuer       [1] GeneralNames            OPTIONAL,
    authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL
}

Issuer and serial number appear together or not at all.
*/

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorityKeyIdentifier {
    pub key_identifier: Option<KeyIdentifier>,
    pub authority_cert_issuer: Option<Vec<GeneralName>>,
    pub authority_cert_serial_number: Option<Integer>,
}

impl AuthorityKeyIdentifier {
    pub fn from_key_identifier(key_identifier: impl Into<Vec<u8>>) -> Self {
        AuthorityKeyIdentifier {
            key_identifier: Some(OctetString::from(key_identifier.into())),
            ..Default::default()
        }
    }
}

impl Extension for AuthorityKeyIdentifier {
    const OID: &'static str = "2.5.29.35";
    const NAME: &'static str = "authorityKeyIdentifier";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for AuthorityKeyIdentifier {}

impl Decoder<Element, AuthorityKeyIdentifier> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AuthorityKeyIdentifier> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence(Kind::AuthorityKeyIdentifier));
        };
        let mut aki = AuthorityKeyIdentifier::default();
        for elem in elements {
            match elem.context_slot() {
                Some(0) => {
                    aki.key_identifier = Some(OctetString::from(elem.implicit_content()?))
                }
                Some(1) => {
                    aki.authority_cert_issuer =
                        Some(decode_general_names(elem.implicit_children()?)?)
                }
                Some(2) => {
                    let content = elem.implicit_content()?;
                    if content.is_empty() {
                        return Err(Error::ExpectedInteger(Kind::AuthorityKeyIdentifier));
                    }
                    aki.authority_cert_serial_number = Some(Integer::from_der_content(content)?);
                }
                Some(slot) => {
                    return Err(Error::UnexpectedContextTag {
                        kind: Kind::AuthorityKeyIdentifier,
                        slot,
                    });
                }
                None => return Err(Error::UnexpectedElementType(Kind::AuthorityKeyIdentifier)),
            }
        }
        Ok(aki)
    }
}

impl EncodableTo<AuthorityKeyIdentifier> for Element {}

impl Encoder<AuthorityKeyIdentifier, Element> for AuthorityKeyIdentifier {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = Vec::with_capacity(3);
        if let Some(key_id) = &self.key_identifier {
            elements.push(Element::implicit_primitive(0, key_id.as_bytes()));
        }
        if let Some(issuer) = &self.authority_cert_issuer {
            elements.push(Element::implicit_constructed(
                1,
                encode_general_names(issuer)?,
            ));
        }
        if let Some(serial) = &self.authority_cert_serial_number {
            elements.push(Element::implicit_primitive(2, serial.to_der_content()));
        }
        Ok(Element::Sequence(elements))
    }
}

impl fmt::Display for AuthorityKeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        if let Some(key_id) = &self.key_identifier {
            lines.push(format!("keyid:{}", hex_colon(key_id.as_bytes())));
        }
        if let Some(issuer) = &self.authority_cert_issuer {
            lines.push(join_names(issuer));
        }
        if let Some(serial) = &self.authority_cert_serial_number {
            lines.push(format!("serial:{}", hex_colon(&serial.to_der_content())));
        }
        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_key_identifier_only() {
        // SEQUENCE { [0] 01 02 03 04 }
        let der = vec![0x30, 0x06, 0x80, 0x04, 0x01, 0x02, 0x03, 0x04];
        let aki = AuthorityKeyIdentifier::parse(&OctetString::from(der.clone())).unwrap();
        assert_eq!(
            AuthorityKeyIdentifier::from_key_identifier(vec![0x01, 0x02, 0x03, 0x04]),
            aki
        );
        assert_eq!("keyid:01:02:03:04", aki.to_string());
        assert_eq!(der, aki.to_value().unwrap());
    }

    #[test]
    fn test_issuer_and_serial() {
        // SEQUENCE { [1] { [2] "ca.example" }, [2] 00 ff }
        let mut der = vec![0x30, 0x12, 0xa1, 0x0c, 0x82, 0x0a];
        der.extend_from_slice(b"ca.example");
        der.extend_from_slice(&[0x82, 0x02, 0x00, 0xff]);
        let aki = AuthorityKeyIdentifier::parse(&OctetString::from(der.clone())).unwrap();
        assert_eq!(None, aki.key_identifier);
        assert_eq!(
            Some(vec![GeneralName::DnsName("ca.example".to_string())]),
            aki.authority_cert_issuer
        );
        assert_eq!(
            Some(255),
            aki.authority_cert_serial_number.as_ref().and_then(Integer::to_u32)
        );
        assert_eq!("DNS:ca.example\nserial:00:FF", aki.to_string());
        assert_eq!(der, aki.to_value().unwrap());
    }

    #[rstest]
    #[case(vec![0x04, 0x00], Error::ExpectedSequence(Kind::AuthorityKeyIdentifier))]
    #[case(
        vec![0x30, 0x02, 0x83, 0x00],
        Error::UnexpectedContextTag { kind: Kind::AuthorityKeyIdentifier, slot: 3 }
    )]
    #[case(vec![0x30, 0x02, 0x82, 0x00], Error::ExpectedInteger(Kind::AuthorityKeyIdentifier))]
    #[case(
        vec![0x30, 0x04, 0x82, 0x02, 0x00, 0x05],
        Error::InvalidAsn1(pkicodec_asn1::error::Error::IntegerNonMinimal)
    )]
    #[case(
        vec![0x30, 0x02, 0x04, 0x00],
        Error::UnexpectedElementType(Kind::AuthorityKeyIdentifier)
    )]
    fn test_authority_key_identifier_invalid(#[case] der: Vec<u8>, #[case] expected: Error) {
        let result = AuthorityKeyIdentifier::parse(&OctetString::from(der));
        assert_eq!(Err(expected), result);
    }
}

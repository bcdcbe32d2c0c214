use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, ObjectIdentifier, OctetString};
use pkicodec_pkix_types::oid_name::oid_label;
use serde::Serialize;

use super::error::{Error, Kind, Result};
use super::general_name::GeneralName;
use super::{Extension, encode_element, parse_element};

/*
RFC 5280 Section 4.2.2.1

AuthorityInfoAccessSyntax  ::= SEQUENCE SIZE (1..MAX) OF AccessDescription

AccessDescription  ::=  SEQUENCE {
    accessMethod          OBJECT IDENTIFIER,
    accessLocation        GeneralName  }
*/

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDescription {
    pub access_method: ObjectIdentifier,
    pub access_location: GeneralName,
}

impl AccessDescription {
    fn method_name(&self) -> Option<&'static str> {
        if self.access_method == AuthorityInfoAccess::OCSP {
            Some("OCSP")
        } else if self.access_method == AuthorityInfoAccess::CA_ISSUERS {
            Some("CA Issuers")
        } else {
            None
        }
    }
}

impl DecodableFrom<Element> for AccessDescription {}

impl Decoder<Element, AccessDescription> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AccessDescription> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence(Kind::AuthorityInfoAccess));
        };
        match elements.as_slice() {
            [Element::ObjectIdentifier(method), location] => Ok(AccessDescription {
                access_method: method.clone(),
                access_location: location.decode()?,
            }),
            [_, _] => Err(Error::ExpectedOid(Kind::AuthorityInfoAccess)),
            _ => Err(Error::InvalidElementCount {
                kind: Kind::AuthorityInfoAccess,
                expected: "2",
                actual: elements.len(),
            }),
        }
    }
}

impl EncodableTo<AccessDescription> for Element {}

impl Encoder<AccessDescription, Element> for AccessDescription {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Sequence(vec![
            Element::ObjectIdentifier(self.access_method.clone()),
            self.access_location.encode()?,
        ]))
    }
}

impl fmt::Display for AccessDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            oid_label(&self.access_method, self.method_name()),
            self.access_location
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorityInfoAccess {
    pub descriptors: Vec<AccessDescription>,
}

impl AuthorityInfoAccess {
    pub const OCSP: &'static str = "1.3.6.1.5.5.7.48.1";
    pub const CA_ISSUERS: &'static str = "1.3.6.1.5.5.7.48.2";

    /// Locations published for one access method, e.g. every OCSP responder.
    pub fn locations(&self, method: &str) -> impl Iterator<Item = &GeneralName> {
        self.descriptors
            .iter()
            .filter(move |d| d.access_method == method)
            .map(|d| &d.access_location)
    }
}

impl Extension for AuthorityInfoAccess {
    const OID: &'static str = "1.3.6.1.5.5.7.1.1";
    const NAME: &'static str = "authorityInfoAccess";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for AuthorityInfoAccess {}

impl Decoder<Element, AuthorityInfoAccess> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AuthorityInfoAccess> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence(Kind::AuthorityInfoAccess));
        };
        if elements.is_empty() {
            return Err(Error::EmptySequence(Kind::AuthorityInfoAccess));
        }
        Ok(AuthorityInfoAccess {
            descriptors: elements
                .iter()
                .map(|e| e.decode())
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

impl EncodableTo<AuthorityInfoAccess> for Element {}

impl Encoder<AuthorityInfoAccess, Element> for AuthorityInfoAccess {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        if self.descriptors.is_empty() {
            return Err(Error::EmptySequence(Kind::AuthorityInfoAccess));
        }
        Ok(Element::Sequence(
            self.descriptors
                .iter()
                .map(|d| d.encode())
                .collect::<Result<Vec<_>>>()?,
        ))
    }
}

impl fmt::Display for AuthorityInfoAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.descriptors.iter().map(ToString::to_string).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const OCSP_URL: &[u8] = b"http://ocsp.example.com";
    const ISSUER_URL: &[u8] = b"http://ca.example.com/ca.crt";

    fn access_description(method_arc: u8, url: &[u8]) -> Vec<u8> {
        let mut der = vec![0x30, url.len() as u8 + 12];
        der.extend_from_slice(&[0x06, 0x08, 0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x30, method_arc]);
        der.extend_from_slice(&[0x86, url.len() as u8]);
        der.extend_from_slice(url);
        der
    }

    fn aia_der() -> Vec<u8> {
        let ocsp = access_description(0x01, OCSP_URL);
        let issuer = access_description(0x02, ISSUER_URL);
        let mut der = vec![0x30, (ocsp.len() + issuer.len()) as u8];
        der.extend(ocsp);
        der.extend(issuer);
        der
    }

    #[test]
    fn test_authority_info_access_round_trip() {
        let aia = AuthorityInfoAccess::parse(&OctetString::from(aia_der())).unwrap();
        assert_eq!(2, aia.descriptors.len());
        assert_eq!(
            vec![&GeneralName::Uri("http://ocsp.example.com".to_string())],
            aia.locations(AuthorityInfoAccess::OCSP).collect::<Vec<_>>()
        );
        assert_eq!(
            "OCSP - URI:http://ocsp.example.com\nCA Issuers - URI:http://ca.example.com/ca.crt",
            aia.to_string()
        );
        assert_eq!(aia_der(), aia.to_value().unwrap());
    }

    #[rstest]
    #[case(vec![0x30, 0x00], Error::EmptySequence(Kind::AuthorityInfoAccess))]
    #[case(vec![0x04, 0x00], Error::ExpectedSequence(Kind::AuthorityInfoAccess))]
    #[case(
        vec![0x30, 0x04, 0x30, 0x02, 0x05, 0x00],
        Error::InvalidElementCount { kind: Kind::AuthorityInfoAccess, expected: "2", actual: 1 }
    )]
    #[case(
        vec![0x30, 0x07, 0x30, 0x05, 0x05, 0x00, 0x86, 0x01, b'a'],
        Error::ExpectedOid(Kind::AuthorityInfoAccess)
    )]
    fn test_authority_info_access_invalid(#[case] der: Vec<u8>, #[case] expected: Error) {
        let result = AuthorityInfoAccess::parse(&OctetString::from(der));
        assert_eq!(Err(expected), result);
    }
}

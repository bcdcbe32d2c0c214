//! Microsoft certificate template extensions
//!
//! ```asn1
//! -- 1.3.6.1.4.1.311.20.2 (V1 templates)
//! CertificateTemplateName ::= BMPString
//!
//! -- 1.3.6.1.4.1.311.21.7 (V2 and later)
//! CertificateTemplate ::= SEQUENCE {
//!     templateID              OBJECT IDENTIFIER,
//!     templateMajorVersion    TemplateVersion OPTIONAL,
//!     templateMinorVersion    TemplateVersion OPTIONAL }
//!
//! TemplateVersion ::= INTEGER (0..4294967295)
//! ```

use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, Integer, ObjectIdentifier, OctetString};
use pkicodec_pkix_types::DirectoryString;
use pkicodec_pkix_types::directory_string::StringKind;
use serde::Serialize;

use super::error::{Error, Kind, Result};
use super::{Extension, encode_element, integer_u32, parse_element};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateTemplateName {
    pub name: DirectoryString,
}

impl CertificateTemplateName {
    pub fn new(name: impl Into<String>) -> Self {
        CertificateTemplateName {
            name: DirectoryString::with_kind(StringKind::Bmp, name),
        }
    }
}

impl Extension for CertificateTemplateName {
    const OID: &'static str = "1.3.6.1.4.1.311.20.2";
    const NAME: &'static str = "certificateTemplateName";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for CertificateTemplateName {}

impl Decoder<Element, CertificateTemplateName> for Element {
    type Error = Error;

    fn decode(&self) -> Result<CertificateTemplateName> {
        match self {
            // Issued as BMPString; some CAs write UTF8String.
            Element::BMPString(_) | Element::UTF8String(_) | Element::PrintableString(_) => {
                Ok(CertificateTemplateName {
                    name: self.decode()?,
                })
            }
            _ => Err(Error::UnexpectedElementType(Kind::CertificateTemplateName)),
        }
    }
}

impl EncodableTo<CertificateTemplateName> for Element {}

impl Encoder<CertificateTemplateName, Element> for CertificateTemplateName {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(self.name.encode()?)
    }
}

impl fmt::Display for CertificateTemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateTemplate {
    pub template_id: ObjectIdentifier,
    pub major_version: Option<u32>,
    /// Only encoded when `major_version` is present.
    pub minor_version: Option<u32>,
}

impl Extension for CertificateTemplate {
    const OID: &'static str = "1.3.6.1.4.1.311.21.7";
    const NAME: &'static str = "certificateTemplate";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for CertificateTemplate {}

impl Decoder<Element, CertificateTemplate> for Element {
    type Error = Error;

    fn decode(&self) -> Result<CertificateTemplate> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence(Kind::CertificateTemplate));
        };
        let (template_id, versions) = match elements.as_slice() {
            [Element::ObjectIdentifier(oid), versions @ ..] if versions.len() <= 2 => {
                (oid.clone(), versions)
            }
            [Element::ObjectIdentifier(_), ..] => {
                return Err(Error::InvalidElementCount {
                    kind: Kind::CertificateTemplate,
                    expected: "1 to 3",
                    actual: elements.len(),
                });
            }
            [_, ..] => return Err(Error::ExpectedOid(Kind::CertificateTemplate)),
            [] => return Err(Error::EmptySequence(Kind::CertificateTemplate)),
        };
        let mut versions = versions
            .iter()
            .map(|v| integer_u32(v, Kind::CertificateTemplate));
        Ok(CertificateTemplate {
            template_id,
            major_version: versions.next().transpose()?,
            minor_version: versions.next().transpose()?,
        })
    }
}

impl EncodableTo<CertificateTemplate> for Element {}

impl Encoder<CertificateTemplate, Element> for CertificateTemplate {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = vec![Element::ObjectIdentifier(self.template_id.clone())];
        if let Some(major) = self.major_version {
            elements.push(Element::Integer(Integer::from(u64::from(major))));
            if let Some(minor) = self.minor_version {
                elements.push(Element::Integer(Integer::from(u64::from(minor))));
            }
        }
        Ok(Element::Sequence(elements))
    }
}

impl fmt::Display for CertificateTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Template={}", self.template_id)?;
        if let Some(major) = self.major_version {
            write!(f, "\nMajor Version Number={}", major)?;
        }
        if let Some(minor) = self.minor_version {
            write!(f, "\nMinor Version Number={}", minor)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_certificate_template_name() {
        // BMPString "User"
        let der = vec![0x1e, 0x08, 0x00, b'U', 0x00, b's', 0x00, b'e', 0x00, b'r'];
        let name = CertificateTemplateName::parse(&OctetString::from(der.clone())).unwrap();
        assert_eq!(CertificateTemplateName::new("User"), name);
        assert_eq!("User", name.to_string());
        assert_eq!(der, name.to_value().unwrap());
    }

    #[test]
    fn test_certificate_template_name_wrong_type() {
        let result = CertificateTemplateName::parse(&OctetString::from(vec![0x02, 0x01, 0x00]));
        assert_eq!(
            Err(Error::UnexpectedElementType(Kind::CertificateTemplateName)),
            result
        );
    }

    // SEQUENCE { 1.3.6.1.4.1.311.21.8.1, 100, 4 }
    fn template_der() -> Vec<u8> {
        vec![
            0x30, 0x13, 0x06, 0x0b, 0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0x37, 0x15, 0x08, 0x01,
            0x01, 0x02, 0x01, 0x64, 0x02, 0x01, 0x04,
        ]
    }

    #[test]
    fn test_certificate_template() {
        let template = CertificateTemplate::parse(&OctetString::from(template_der())).unwrap();
        assert_eq!("1.3.6.1.4.1.311.21.8.1.1", template.template_id.to_string());
        assert_eq!(Some(100), template.major_version);
        assert_eq!(Some(4), template.minor_version);
        assert_eq!(
            "Template=1.3.6.1.4.1.311.21.8.1.1\nMajor Version Number=100\nMinor Version Number=4",
            template.to_string()
        );
        assert_eq!(template_der(), template.to_value().unwrap());
    }

    #[rstest]
    #[case(vec![0x30, 0x00], Error::EmptySequence(Kind::CertificateTemplate))]
    #[case(vec![0x30, 0x03, 0x02, 0x01, 0x01], Error::ExpectedOid(Kind::CertificateTemplate))]
    #[case(
        vec![0x30, 0x07, 0x06, 0x02, 0x2a, 0x03, 0x04, 0x01, 0x00],
        Error::ExpectedInteger(Kind::CertificateTemplate)
    )]
    #[case(
        vec![0x30, 0x0d, 0x06, 0x02, 0x2a, 0x03, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02, 0x02, 0x01, 0x03],
        Error::InvalidElementCount { kind: Kind::CertificateTemplate, expected: "1 to 3", actual: 4 }
    )]
    fn test_certificate_template_invalid(#[case] der: Vec<u8>, #[case] expected: Error) {
        let result = CertificateTemplate::parse(&OctetString::from(der));
        assert_eq!(Err(expected), result);
    }
}

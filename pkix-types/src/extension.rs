//! PKIX Extension type
//!
//! RFC 5280 Section 4.1.2.9
//!
//! ```asn1
//! Extension  ::=  SEQUENCE  {
//!     extnID      OBJECT IDENTIFIER,
//!     critical    BOOLEAN DEFAULT FALSE,
//!     extnValue   OCTET STRING
//!                 -- contains the DER encoding of an ASN.1 value
//!                 -- corresponding to the extension type identified
//!                 -- by extnID
//! }
//! ```
//!
//! This is the untyped form. The meaning of `extnValue` is decided by the
//! dispatcher in `pkicodec-x509`.

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, ObjectIdentifier, OctetString, encode};
use pkicodec_der::{Cursor, Tag};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const STRUCTURE: &str = "Extension";

/// A single extension with its payload still encoded.
///
/// The default value has no OID and cannot be encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    id: ObjectIdentifier,
    critical: bool,
    value: OctetString,
}

impl Extension {
    pub fn new(id: ObjectIdentifier, critical: bool, value: OctetString) -> Self {
        Self {
            id,
            critical,
            value,
        }
    }

    pub fn oid(&self) -> &ObjectIdentifier {
        &self.id
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// The extnValue payload (DER of the extension specific structure).
    pub fn value(&self) -> &OctetString {
        &self.value
    }

    /// Reads the extension the cursor is positioned on.
    pub fn read(cursor: &Cursor<'_>) -> Result<Self> {
        let structural = Error::structural(STRUCTURE);
        cursor.expect(Tag::SEQUENCE, STRUCTURE).map_err(&structural)?;

        let mut child = cursor.child()?;
        child
            .expect(Tag::OBJECT_IDENTIFIER, "extnID")
            .map_err(&structural)?;
        let id = ObjectIdentifier::try_from(child.payload()?)?;
        child.next_sibling()?;

        // critical is DEFAULT FALSE; an explicit FALSE is tolerated on input.
        let critical = if !child.is_at_end() && child.tag()? == Tag::BOOLEAN {
            let critical = match child.payload()? {
                [0x00] => false,
                [0xff] => true,
                _ => {
                    return Err(Error::ExtensionInvalidCritical {
                        offset: child.offset(),
                    });
                }
            };
            child.next_sibling()?;
            critical
        } else {
            false
        };

        child
            .expect(Tag::OCTET_STRING, "extnValue")
            .map_err(&structural)?;
        let value = OctetString::from(child.payload()?);
        child.next_sibling()?;
        child.finish().map_err(&structural)?;

        Ok(Extension {
            id,
            critical,
            value,
        })
    }

    fn check_initialized(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::UninitializedState("extension OID is not set"));
        }
        Ok(())
    }
}

impl DecodableFrom<[u8]> for Extension {}

impl Decoder<[u8], Extension> for [u8] {
    type Error = Error;

    fn decode(&self) -> Result<Extension> {
        let mut cursor = Cursor::new(self);
        let extension = Extension::read(&cursor)?;
        cursor.next_sibling()?;
        cursor.finish().map_err(Error::structural(STRUCTURE))?;
        Ok(extension)
    }
}

impl EncodableTo<Extension> for Vec<u8> {}

impl Encoder<Extension, Vec<u8>> for Extension {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>> {
        self.check_initialized()?;
        let mut children = vec![encode::object_identifier(&self.id)?];
        if self.critical {
            children.push(encode::boolean(true));
        }
        children.push(encode::octet_string(self.value.as_bytes()));
        Ok(encode::sequence(&children))
    }
}

impl DecodableFrom<Element> for Extension {}

impl Decoder<Element, Extension> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Extension> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExtensionExpectedSequence);
        };
        match elements.as_slice() {
            [Element::ObjectIdentifier(id), Element::OctetString(value)] => {
                Ok(Extension::new(id.clone(), false, value.clone()))
            }
            [
                Element::ObjectIdentifier(id),
                Element::Boolean(critical),
                Element::OctetString(value),
            ] => Ok(Extension::new(id.clone(), *critical, value.clone())),
            _ => Err(Error::ExtensionInvalidElements),
        }
    }
}

impl EncodableTo<Extension> for Element {}

impl Encoder<Extension, Element> for Extension {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        self.check_initialized()?;
        let mut elements = vec![Element::ObjectIdentifier(self.id.clone())];
        if self.critical {
            elements.push(Element::Boolean(true));
        }
        elements.push(Element::OctetString(self.value.clone()));
        Ok(Element::Sequence(elements))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    fn basic_constraints(critical: bool) -> Extension {
        Extension::new(
            ObjectIdentifier::from_str("2.5.29.19").unwrap(),
            critical,
            OctetString::from(vec![0x30, 0x03, 0x01, 0x01, 0xff]),
        )
    }

    #[test]
    fn test_encode_critical() {
        let encoded: Vec<u8> = basic_constraints(true).encode().unwrap();
        assert_eq!(
            vec![
                0x30, 0x0f, 0x06, 0x03, 0x55, 0x1d, 0x13, 0x01, 0x01, 0xff, 0x04, 0x05, 0x30,
                0x03, 0x01, 0x01, 0xff
            ],
            encoded
        );
    }

    #[test]
    fn test_encode_non_critical_omits_boolean() {
        let encoded: Vec<u8> = basic_constraints(false).encode().unwrap();
        assert_eq!(
            vec![
                0x30, 0x0c, 0x06, 0x03, 0x55, 0x1d, 0x13, 0x04, 0x05, 0x30, 0x03, 0x01, 0x01,
                0xff
            ],
            encoded
        );
    }

    #[rstest]
    #[case::critical(true)]
    #[case::non_critical(false)]
    fn test_roundtrip(#[case] critical: bool) {
        let ext = basic_constraints(critical);
        let encoded: Vec<u8> = ext.encode().unwrap();
        let decoded: Extension = encoded.as_slice().decode().unwrap();
        assert_eq!(ext, decoded);

        let element: Element = ext.encode().unwrap();
        let decoded: Extension = element.decode().unwrap();
        assert_eq!(ext, decoded);
    }

    #[test]
    fn test_encode_uninitialized() {
        let result: Result<Vec<u8>> = Extension::default().encode();
        assert_eq!(
            Err(Error::UninitializedState("extension OID is not set")),
            result
        );
        let result: Result<Element> = Extension::default().encode();
        assert!(matches!(result, Err(Error::UninitializedState(_))));
    }

    #[test]
    fn test_decode_explicit_false() {
        let input: &[u8] = &[
            0x30, 0x0a, 0x06, 0x03, 0x55, 0x1d, 0x0f, 0x01, 0x01, 0x00, 0x04, 0x00,
        ];
        let ext: Extension = input.decode().unwrap();
        assert!(!ext.is_critical());
        assert!(ext.value().is_empty());
    }

    #[rstest(input, expected,
        case(vec![0x02, 0x01, 0x00], Error::StructuralTagMismatch {
            structure: "Extension",
            expected: Tag::SEQUENCE,
            actual: Tag::INTEGER,
            offset: 0,
        }),
        case(vec![0x30, 0x03, 0x02, 0x01, 0x00], Error::StructuralTagMismatch {
            structure: "Extension",
            expected: Tag::OBJECT_IDENTIFIER,
            actual: Tag::INTEGER,
            offset: 2,
        }),
        case(vec![0x30, 0x05, 0x06, 0x03, 0x55, 0x1d, 0x13], Error::TruncatedInput {
            structure: "Extension",
            expected: "extnValue",
            offset: 7,
        }),
        case(vec![0x30, 0x08, 0x06, 0x03, 0x55, 0x1d, 0x13, 0x01, 0x01, 0xff], Error::TruncatedInput {
            structure: "Extension",
            expected: "extnValue",
            offset: 10,
        }),
        case(vec![0x30, 0x08, 0x06, 0x03, 0x55, 0x1d, 0x13, 0x02, 0x01, 0x00], Error::StructuralTagMismatch {
            structure: "Extension",
            expected: Tag::OCTET_STRING,
            actual: Tag::INTEGER,
            offset: 7,
        }),
        case(vec![0x30, 0x0a, 0x06, 0x03, 0x55, 0x1d, 0x13, 0x01, 0x01, 0x01, 0x04, 0x00], Error::ExtensionInvalidCritical {
            offset: 7,
        }),
        case(vec![0x30, 0x09, 0x06, 0x03, 0x55, 0x1d, 0x13, 0x04, 0x00, 0x05, 0x00], Error::TrailingData {
            structure: "Extension",
            offset: 9,
        }),
    )]
    fn test_decode_rejects(input: Vec<u8>, expected: Error) {
        let result: Result<Extension> = input.as_slice().decode();
        assert_eq!(Err(expected), result);
    }

    #[test]
    fn test_decode_element_invalid() {
        let element = Element::Sequence(vec![Element::Null]);
        let result: Result<Extension> = element.decode();
        assert_eq!(Err(Error::ExtensionInvalidElements), result);
        let result: Result<Extension> = Element::Null.decode();
        assert_eq!(Err(Error::ExtensionExpectedSequence), result);
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&basic_constraints(true)).unwrap();
        assert_eq!(
            r#"{"id":"2.5.29.19","critical":true,"value":"30030101ff"}"#,
            json
        );
    }
}

//! DirectoryString (RFC 5280 Section 4.1.2.4)
//!
//! ```asn1
//! DirectoryString ::= CHOICE {
//!   teletexString     TeletexString (SIZE (1..MAX)),
//!   printableString   PrintableString (SIZE (1..MAX)),
//!   universalString   UniversalString (SIZE (1..MAX)),
//!   utf8String        UTF8String (SIZE (1..MAX)),
//!   bmpString         BMPString (SIZE (1..MAX))
//! }
//! ```
//!
//! IA5String is accepted too since emailAddress and domainComponent use it.
//! TeletexString and UniversalString are not decoded.

use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::Element;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The string type a value was (or will be) encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    Printable,
    Utf8,
    Ia5,
    Bmp,
}

/// A directory string that remembers its original string type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryString {
    kind: StringKind,
    value: String,
}

impl DirectoryString {
    /// PrintableString when every character allows it, UTF8String otherwise.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let kind = if is_printable(&value) {
            StringKind::Printable
        } else {
            StringKind::Utf8
        };
        Self { kind, value }
    }

    pub fn with_kind(kind: StringKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn kind(&self) -> StringKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl From<&str> for DirectoryString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DirectoryString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for DirectoryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Serialize for DirectoryString {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for DirectoryString {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(DirectoryString::new)
    }
}

impl DecodableFrom<Element> for DirectoryString {}

impl Decoder<Element, DirectoryString> for Element {
    type Error = Error;

    fn decode(&self) -> Result<DirectoryString> {
        let (kind, value) = match self {
            Element::PrintableString(s) => (StringKind::Printable, s.clone()),
            Element::UTF8String(s) => (StringKind::Utf8, s.clone()),
            Element::IA5String(s) => (StringKind::Ia5, s.clone()),
            Element::BMPString(s) => (StringKind::Bmp, s.clone()),
            // IMPLICIT tagging leaves the value as raw octets
            Element::OctetString(os) => (
                StringKind::Utf8,
                String::from_utf8(os.as_bytes().to_vec())
                    .map_err(|_| Error::DirectoryStringInvalidUtf8)?,
            ),
            _ => return Err(Error::DirectoryStringExpectedStringType),
        };
        Ok(DirectoryString { kind, value })
    }
}

impl EncodableTo<DirectoryString> for Element {}

impl Encoder<DirectoryString, Element> for DirectoryString {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let value = self.value.clone();
        Ok(match self.kind {
            StringKind::Printable => Element::PrintableString(value),
            StringKind::Utf8 => Element::UTF8String(value),
            StringKind::Ia5 => Element::IA5String(value),
            StringKind::Bmp => Element::BMPString(value),
        })
    }
}

/// PrintableString alphabet: A-Z a-z 0-9 space and ' ( ) + , - . / : = ?
fn is_printable(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || " '()+,-./:=?".contains(c))
}

#[cfg(test)]
mod tests {
    use pkicodec_asn1::OctetString;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Element::PrintableString("Hello123".into()), StringKind::Printable, "Hello123")]
    #[case(Element::UTF8String("こんにちは".into()), StringKind::Utf8, "こんにちは")]
    #[case(Element::IA5String("a@example.com".into()), StringKind::Ia5, "a@example.com")]
    #[case(Element::BMPString("テスト".into()), StringKind::Bmp, "テスト")]
    #[case(Element::OctetString(OctetString::from(b"hello".to_vec())), StringKind::Utf8, "hello")]
    fn test_decode(#[case] element: Element, #[case] kind: StringKind, #[case] expected: &str) {
        let ds: DirectoryString = element.decode().unwrap();
        assert_eq!(kind, ds.kind());
        assert_eq!(expected, ds.as_str());
    }

    #[rstest]
    #[case(Element::Null, Error::DirectoryStringExpectedStringType)]
    #[case(Element::OctetString(OctetString::from(vec![0xff, 0xfe])), Error::DirectoryStringInvalidUtf8)]
    fn test_decode_rejects(#[case] element: Element, #[case] expected: Error) {
        let result: Result<DirectoryString> = element.decode();
        assert_eq!(Err(expected), result);
    }

    #[test]
    fn test_encode_keeps_original_kind() {
        // "Example" fits PrintableString but was received as UTF8String.
        let element = Element::UTF8String("Example".into());
        let ds: DirectoryString = element.decode().unwrap();
        let encoded: Element = ds.encode().unwrap();
        assert_eq!(element, encoded);
    }

    #[rstest]
    #[case("CN=Test (1)", StringKind::Printable)]
    #[case("test@example.com", StringKind::Utf8)]
    #[case("test!", StringKind::Utf8)]
    fn test_new_picks_kind(#[case] input: &str, #[case] kind: StringKind) {
        assert_eq!(kind, DirectoryString::new(input).kind());
    }

    #[test]
    fn test_serde() {
        let ds = DirectoryString::new("serialize_test");
        let json = serde_json::to_string(&ds).unwrap();
        assert_eq!("\"serialize_test\"", json);
        let back: DirectoryString = serde_json::from_str(&json).unwrap();
        assert_eq!(ds, back);
    }
}

//! Distinguished names (RFC 5280 Section 4.1.2.4)
//!
//! ```asn1
//! Name ::= CHOICE { rdnSequence  RDNSequence }
//! RDNSequence ::= SEQUENCE OF RelativeDistinguishedName
//! RelativeDistinguishedName ::= SET OF AttributeTypeAndValue
//! AttributeTypeAndValue ::= SEQUENCE {
//!     type     AttributeType,
//!     value    AttributeValue }
//! ```
//!
//! Used by the directoryName form of GeneralName.

use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, ObjectIdentifier};
use serde::{Serialize, ser::SerializeStruct};

use crate::OidName;
use crate::directory_string::DirectoryString;
use crate::error::{Error, Result};
use crate::oid_name::oid_label;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Name {
    rdn_sequence: Vec<RelativeDistinguishedName>,
}

impl Name {
    pub fn new(rdn_sequence: Vec<RelativeDistinguishedName>) -> Self {
        Self { rdn_sequence }
    }

    pub fn rdn_sequence(&self) -> &[RelativeDistinguishedName] {
        &self.rdn_sequence
    }

    /// First value of the attribute `oid`, searching RDNs in order.
    pub fn find(&self, oid: &str) -> Option<&DirectoryString> {
        self.rdn_sequence
            .iter()
            .flat_map(|rdn| rdn.attributes.iter())
            .find(|attr| attr.attribute_type == oid)
            .map(|attr| &attr.attribute_value)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdn) in self.rdn_sequence.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", rdn)?;
        }
        Ok(())
    }
}

impl DecodableFrom<Element> for Name {}

impl Decoder<Element, Name> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Name> {
        let Element::Sequence(elements) = self else {
            return Err(Error::NameExpectedSequence);
        };
        let rdn_sequence = elements
            .iter()
            .map(|elem| elem.decode())
            .collect::<Result<Vec<RelativeDistinguishedName>>>()?;
        Ok(Name { rdn_sequence })
    }
}

impl EncodableTo<Name> for Element {}

impl Encoder<Name, Element> for Name {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let rdns = self
            .rdn_sequence
            .iter()
            .map(|rdn| rdn.encode())
            .collect::<Result<Vec<Element>>>()?;
        Ok(Element::Sequence(rdns))
    }
}

/// One component of a Name; multi-valued when it holds more than one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelativeDistinguishedName {
    attributes: Vec<AttributeTypeAndValue>,
}

impl RelativeDistinguishedName {
    pub fn new(attributes: Vec<AttributeTypeAndValue>) -> Self {
        Self { attributes }
    }

    pub fn attributes(&self) -> &[AttributeTypeAndValue] {
        &self.attributes
    }
}

impl From<AttributeTypeAndValue> for RelativeDistinguishedName {
    fn from(attribute: AttributeTypeAndValue) -> Self {
        Self {
            attributes: vec![attribute],
        }
    }
}

impl fmt::Display for RelativeDistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attr) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{}", attr)?;
        }
        Ok(())
    }
}

impl DecodableFrom<Element> for RelativeDistinguishedName {}

impl Decoder<Element, RelativeDistinguishedName> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RelativeDistinguishedName> {
        let Element::Set(elements) = self else {
            return Err(Error::RdnExpectedSet);
        };
        let attributes = elements
            .iter()
            .map(|elem| elem.decode())
            .collect::<Result<Vec<AttributeTypeAndValue>>>()?;
        Ok(RelativeDistinguishedName { attributes })
    }
}

impl EncodableTo<RelativeDistinguishedName> for Element {}

impl Encoder<RelativeDistinguishedName, Element> for RelativeDistinguishedName {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let attributes = self
            .attributes
            .iter()
            .map(|attr| attr.encode())
            .collect::<Result<Vec<Element>>>()?;
        Ok(Element::Set(attributes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeAndValue {
    attribute_type: ObjectIdentifier,
    attribute_value: DirectoryString,
}

impl AttributeTypeAndValue {
    pub const OID_COMMON_NAME: &'static str = "2.5.4.3";
    pub const OID_SURNAME: &'static str = "2.5.4.4";
    pub const OID_SERIAL_NUMBER: &'static str = "2.5.4.5";
    pub const OID_COUNTRY_NAME: &'static str = "2.5.4.6";
    pub const OID_LOCALITY_NAME: &'static str = "2.5.4.7";
    pub const OID_STATE_OR_PROVINCE_NAME: &'static str = "2.5.4.8";
    pub const OID_STREET_ADDRESS: &'static str = "2.5.4.9";
    pub const OID_ORGANIZATION_NAME: &'static str = "2.5.4.10";
    pub const OID_ORGANIZATIONAL_UNIT_NAME: &'static str = "2.5.4.11";
    pub const OID_TITLE: &'static str = "2.5.4.12";
    pub const OID_GIVEN_NAME: &'static str = "2.5.4.42";
    pub const OID_DOMAIN_COMPONENT: &'static str = "0.9.2342.19200300.100.1.25";
    pub const OID_EMAIL_ADDRESS: &'static str = "1.2.840.113549.1.9.1";

    pub fn new(attribute_type: ObjectIdentifier, value: impl Into<DirectoryString>) -> Self {
        Self {
            attribute_type,
            attribute_value: value.into(),
        }
    }

    pub fn attribute_type(&self) -> &ObjectIdentifier {
        &self.attribute_type
    }

    pub fn value(&self) -> &DirectoryString {
        &self.attribute_value
    }
}

impl OidName for AttributeTypeAndValue {
    fn oid_name(&self) -> Option<&'static str> {
        Some(match self.attribute_type.to_string().as_str() {
            Self::OID_COMMON_NAME => "CN",
            Self::OID_SURNAME => "SN",
            Self::OID_SERIAL_NUMBER => "serialNumber",
            Self::OID_COUNTRY_NAME => "C",
            Self::OID_LOCALITY_NAME => "L",
            Self::OID_STATE_OR_PROVINCE_NAME => "ST",
            Self::OID_STREET_ADDRESS => "STREET",
            Self::OID_ORGANIZATION_NAME => "O",
            Self::OID_ORGANIZATIONAL_UNIT_NAME => "OU",
            Self::OID_TITLE => "T",
            Self::OID_GIVEN_NAME => "G",
            Self::OID_DOMAIN_COMPONENT => "DC",
            Self::OID_EMAIL_ADDRESS => "E",
            _ => return None,
        })
    }
}

impl fmt::Display for AttributeTypeAndValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Distinguished names read as CN=..., regardless of the OID switch.
        match self.oid_name() {
            Some(name) => write!(f, "{}={}", name, self.attribute_value),
            None => write!(f, "{}={}", self.attribute_type, self.attribute_value),
        }
    }
}

impl Serialize for AttributeTypeAndValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AttributeTypeAndValue", 2)?;
        state.serialize_field(
            "attribute_type",
            &oid_label(&self.attribute_type, self.oid_name()),
        )?;
        state.serialize_field("attribute_value", self.attribute_value.as_str())?;
        state.end()
    }
}

impl DecodableFrom<Element> for AttributeTypeAndValue {}

impl Decoder<Element, AttributeTypeAndValue> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AttributeTypeAndValue> {
        let Element::Sequence(seq) = self else {
            return Err(Error::AttributeTypeAndValueExpectedSequence);
        };
        match seq.as_slice() {
            [Element::ObjectIdentifier(oid), value] => Ok(AttributeTypeAndValue {
                attribute_type: oid.clone(),
                attribute_value: value.decode()?,
            }),
            [_, _] => Err(Error::AttributeTypeAndValueExpectedOid),
            _ => Err(Error::AttributeTypeAndValueInvalidElementCount),
        }
    }
}

impl EncodableTo<AttributeTypeAndValue> for Element {}

impl Encoder<AttributeTypeAndValue, Element> for AttributeTypeAndValue {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Sequence(vec![
            Element::ObjectIdentifier(self.attribute_type.clone()),
            self.attribute_value.encode()?,
        ]))
    }
}

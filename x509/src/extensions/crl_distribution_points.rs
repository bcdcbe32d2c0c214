use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{BitString, Element, OctetString};
use pkicodec_pkix_types::RelativeDistinguishedName;
use serde::Serialize;

use super::error::{Error, Kind, Result};
use super::general_name::{GeneralName, decode_general_names, encode_general_names, join_names};
use super::{Extension, encode_element, parse_element};

/*
RFC 5280 Section 4.2.1.13

CRLDistributionPoints ::= SEQUENCE SIZE (1..MAX) OF DistributionPoint

DistributionPoint ::= SEQUENCE {
    distributionPoint       [0]     DistributionPointName OPTIONAL,
    reasons                 [1]     ReasonFlags OPTIONAL,
    cRLIssuer               [2]     GeneralNames OPTIONAL }

DistributionPointName ::= CHOICE {
    fullName                [0]     GeneralNames,
    nameRelativeToCRLIssuer [1]     RelativeDistinguishedName }

ReasonFlags ::= BIT STRING {
    unused                  (0),
    keyCompromise           (1),
    cACompromise            (2),
    affiliationChanged      (3),
    superseded              (4),
    cessationOfOperation    (5),
    certificateHold         (6),
    privilegeWithdrawn      (7),
    aACompromise            (8) }

FreshestCRL (4.2.1.15) and the Microsoft published CRL locations extension
share this syntax.
*/

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DistributionPoint {
    pub distribution_point: Option<DistributionPointName>,
    pub reasons: Option<ReasonFlags>,
    pub crl_issuer: Option<Vec<GeneralName>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DistributionPointName {
    FullName(Vec<GeneralName>),
    NameRelativeToCrlIssuer(RelativeDistinguishedName),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReasonFlags {
    pub key_compromise: bool,
    pub ca_compromise: bool,
    pub affiliation_changed: bool,
    pub superseded: bool,
    pub cessation_of_operation: bool,
    pub certificate_hold: bool,
    pub privilege_withdrawn: bool,
    pub aa_compromise: bool,
}

impl ReasonFlags {
    // Index 0 is bit 1; bit 0 is unused.
    fn flags(&self) -> [(bool, &'static str); 8] {
        [
            (self.key_compromise, "Key Compromise"),
            (self.ca_compromise, "CA Compromise"),
            (self.affiliation_changed, "Affiliation Changed"),
            (self.superseded, "Superseded"),
            (self.cessation_of_operation, "Cessation Of Operation"),
            (self.certificate_hold, "Certificate Hold"),
            (self.privilege_withdrawn, "Privilege Withdrawn"),
            (self.aa_compromise, "AA Compromise"),
        ]
    }

    fn to_bit_string(&self) -> BitString {
        let set: Vec<usize> = self
            .flags()
            .iter()
            .enumerate()
            .filter_map(|(n, (on, _))| on.then_some(n + 1))
            .collect();
        BitString::from_bits(&set)
    }
}

impl From<&BitString> for ReasonFlags {
    fn from(bits: &BitString) -> Self {
        ReasonFlags {
            key_compromise: bits.bit(1),
            ca_compromise: bits.bit(2),
            affiliation_changed: bits.bit(3),
            superseded: bits.bit(4),
            cessation_of_operation: bits.bit(5),
            certificate_hold: bits.bit(6),
            privilege_withdrawn: bits.bit(7),
            aa_compromise: bits.bit(8),
        }
    }
}

impl fmt::Display for ReasonFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<&str> = self
            .flags()
            .iter()
            .filter_map(|(on, label)| on.then_some(*label))
            .collect();
        write!(f, "{}", reasons.join(", "))
    }
}

impl DecodableFrom<Element> for DistributionPointName {}

impl Decoder<Element, DistributionPointName> for Element {
    type Error = Error;

    fn decode(&self) -> Result<DistributionPointName> {
        match self.context_slot() {
            Some(0) => Ok(DistributionPointName::FullName(decode_general_names(
                self.implicit_children()?,
            )?)),
            Some(1) => {
                // IMPLICIT SET OF AttributeTypeAndValue
                let set = Element::Set(self.implicit_children()?.to_vec());
                Ok(DistributionPointName::NameRelativeToCrlIssuer(set.decode()?))
            }
            Some(slot) => Err(Error::UnexpectedContextTag {
                kind: Kind::DistributionPoint,
                slot,
            }),
            None => Err(Error::UnexpectedElementType(Kind::DistributionPoint)),
        }
    }
}

impl EncodableTo<DistributionPointName> for Element {}

impl Encoder<DistributionPointName, Element> for DistributionPointName {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        match self {
            DistributionPointName::FullName(names) => Ok(Element::implicit_constructed(
                0,
                encode_general_names(names)?,
            )),
            DistributionPointName::NameRelativeToCrlIssuer(rdn) => match rdn.encode()? {
                Element::Set(attributes) => Ok(Element::implicit_constructed(1, attributes)),
                _ => Err(Error::UnexpectedElementType(Kind::DistributionPoint)),
            },
        }
    }
}

impl DecodableFrom<Element> for DistributionPoint {}

impl Decoder<Element, DistributionPoint> for Element {
    type Error = Error;

    fn decode(&self) -> Result<DistributionPoint> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence(Kind::DistributionPoint));
        };
        let mut point = DistributionPoint::default();
        for elem in elements {
            match elem.context_slot() {
                // CHOICE under a tag is always EXPLICIT.
                Some(0) => point.distribution_point = Some(elem.explicit_inner()?.decode()?),
                Some(1) => {
                    let bits = BitString::try_from(elem.implicit_content()?)?;
                    point.reasons = Some(ReasonFlags::from(&bits));
                }
                Some(2) => {
                    point.crl_issuer = Some(decode_general_names(elem.implicit_children()?)?)
                }
                Some(slot) => {
                    return Err(Error::UnexpectedContextTag {
                        kind: Kind::DistributionPoint,
                        slot,
                    });
                }
                None => return Err(Error::UnexpectedElementType(Kind::DistributionPoint)),
            }
        }
        Ok(point)
    }
}

impl EncodableTo<DistributionPoint> for Element {}

impl Encoder<DistributionPoint, Element> for DistributionPoint {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = Vec::with_capacity(3);
        if let Some(name) = &self.distribution_point {
            elements.push(Element::explicit(0, name.encode()?));
        }
        if let Some(reasons) = &self.reasons {
            elements.push(Element::implicit_primitive(
                1,
                Vec::from(reasons.to_bit_string()),
            ));
        }
        if let Some(issuer) = &self.crl_issuer {
            elements.push(Element::implicit_constructed(
                2,
                encode_general_names(issuer)?,
            ));
        }
        Ok(Element::Sequence(elements))
    }
}

impl fmt::Display for DistributionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        match &self.distribution_point {
            Some(DistributionPointName::FullName(names)) => {
                lines.push("Full Name:".to_string());
                lines.extend(names.iter().map(|n| format!("  {}", n)));
            }
            Some(DistributionPointName::NameRelativeToCrlIssuer(rdn)) => {
                lines.push(format!("Relative Name: {}", rdn));
            }
            None => {}
        }
        if let Some(reasons) = &self.reasons {
            lines.push(format!("Reasons: {}", reasons));
        }
        if let Some(issuer) = &self.crl_issuer {
            lines.push(format!("CRL Issuer: {}", join_names(issuer)));
        }
        write!(f, "{}", lines.join("\n"))
    }
}

fn decode_points(element: &Element, kind: Kind) -> Result<Vec<DistributionPoint>> {
    match element {
        Element::Sequence(elements) if elements.is_empty() => Err(Error::EmptySequence(kind)),
        Element::Sequence(elements) => elements.iter().map(|e| e.decode()).collect(),
        _ => Err(Error::ExpectedSequence(kind)),
    }
}

fn encode_points(points: &[DistributionPoint], kind: Kind) -> Result<Element> {
    if points.is_empty() {
        return Err(Error::EmptySequence(kind));
    }
    let elements = points
        .iter()
        .map(|p| p.encode())
        .collect::<Result<Vec<_>>>()?;
    Ok(Element::Sequence(elements))
}

/// Defines an extension whose payload is a list of distribution points.
macro_rules! distribution_point_list {
    ($(#[$doc:meta])* $name:ident, $oid:literal, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
        pub struct $name {
            pub distribution_points: Vec<DistributionPoint>,
        }

        impl Extension for $name {
            const OID: &'static str = $oid;
            const NAME: &'static str = $label;

            fn parse(value: &OctetString) -> Result<Self> {
                parse_element(value)
            }

            fn to_value(&self) -> Result<Vec<u8>> {
                encode_element(self)
            }
        }

        impl DecodableFrom<Element> for $name {}

        impl Decoder<Element, $name> for Element {
            type Error = Error;

            fn decode(&self) -> Result<$name> {
                Ok($name {
                    distribution_points: decode_points(self, Kind::$name)?,
                })
            }
        }

        impl EncodableTo<$name> for Element {}

        impl Encoder<$name, Element> for $name {
            type Error = Error;

            fn encode(&self) -> Result<Element> {
                encode_points(&self.distribution_points, Kind::$name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let points: Vec<String> =
                    self.distribution_points.iter().map(ToString::to_string).collect();
                write!(f, "{}", points.join("\n"))
            }
        }
    };
}

distribution_point_list!(
    /// CRL Distribution Points (RFC 5280 4.2.1.13)
    CrlDistributionPoints,
    "2.5.29.31",
    "cRLDistributionPoints"
);

distribution_point_list!(
    /// Freshest CRL, where delta CRLs are published (RFC 5280 4.2.1.15)
    FreshestCrl,
    "2.5.29.46",
    "freshestCRL"
);

distribution_point_list!(
    /// Locations a Microsoft CA publishes its own CRL to
    PublishedCrlLocations,
    "1.3.6.1.4.1.311.21.14",
    "publishedCRLLocations"
);

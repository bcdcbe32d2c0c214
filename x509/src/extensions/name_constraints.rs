use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, OctetString};
use serde::Serialize;

use super::error::{Error, Kind, Result};
use super::general_name::GeneralName;
use super::{Extension, encode_element, implicit_integer, implicit_u32, parse_element};

/*
RFC 5280 Section 4.2.1.10

NameConstraints ::= SEQUENCE {
    permittedSubtrees       [0]     GeneralSubtrees OPTIONAL,
    excludedSubtrees        [1]     GeneralSubtrees OPTIONAL
}

GeneralSubtrees ::= SEQUENCE SIZE (1..MAX) OF GeneralSubtree

GeneralSubtree ::= SEQUENCE {
    base                    GeneralName,
    minimum         [0]     BaseDistance DEFAULT 0,
    maximum         [1]     BaseDistance OPTIONAL
}

BaseDistance ::= INTEGER (0..MAX)
*/

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralSubtree {
    pub base: GeneralName,
    pub minimum: u32,
    pub maximum: Option<u32>,
}

impl GeneralSubtree {
    pub fn new(base: GeneralName) -> Self {
        GeneralSubtree {
            base,
            minimum: 0,
            maximum: None,
        }
    }
}

impl DecodableFrom<Element> for GeneralSubtree {}

impl Decoder<Element, GeneralSubtree> for Element {
    type Error = Error;

    fn decode(&self) -> Result<GeneralSubtree> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence(Kind::NameConstraints));
        };
        let (base, rest) = match elements.as_slice() {
            [base, rest @ ..] => (base.decode()?, rest),
            [] => return Err(Error::EmptySequence(Kind::NameConstraints)),
        };
        let mut subtree = GeneralSubtree::new(base);
        for elem in rest {
            match elem.context_slot() {
                Some(0) => subtree.minimum = implicit_u32(elem, Kind::NameConstraints)?,
                Some(1) => subtree.maximum = Some(implicit_u32(elem, Kind::NameConstraints)?),
                Some(slot) => {
                    return Err(Error::UnexpectedContextTag {
                        kind: Kind::NameConstraints,
                        slot,
                    });
                }
                None => return Err(Error::UnexpectedElementType(Kind::NameConstraints)),
            }
        }
        Ok(subtree)
    }
}

impl EncodableTo<GeneralSubtree> for Element {}

impl Encoder<GeneralSubtree, Element> for GeneralSubtree {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = vec![self.base.encode()?];
        // minimum is DEFAULT 0 and is left out at its default.
        if self.minimum != 0 {
            elements.push(implicit_integer(0, self.minimum));
        }
        if let Some(maximum) = self.maximum {
            elements.push(implicit_integer(1, maximum));
        }
        Ok(Element::Sequence(elements))
    }
}

/// Name Constraints extension. At least one of the two lists is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameConstraints {
    pub permitted_subtrees: Option<Vec<GeneralSubtree>>,
    pub excluded_subtrees: Option<Vec<GeneralSubtree>>,
}

fn decode_subtrees(element: &Element) -> Result<Vec<GeneralSubtree>> {
    let children = element.implicit_children()?;
    if children.is_empty() {
        return Err(Error::EmptySequence(Kind::NameConstraints));
    }
    children.iter().map(|e| e.decode()).collect()
}

fn encode_subtrees(slot: u8, subtrees: &[GeneralSubtree]) -> Result<Element> {
    if subtrees.is_empty() {
        return Err(Error::EmptySequence(Kind::NameConstraints));
    }
    let children = subtrees
        .iter()
        .map(|s| s.encode())
        .collect::<Result<Vec<_>>>()?;
    Ok(Element::implicit_constructed(slot, children))
}

impl Extension for NameConstraints {
    const OID: &'static str = "2.5.29.30";
    const NAME: &'static str = "nameConstraints";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for NameConstraints {}

impl Decoder<Element, NameConstraints> for Element {
    type Error = Error;

    fn decode(&self) -> Result<NameConstraints> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence(Kind::NameConstraints));
        };
        let mut permitted_subtrees = None;
        let mut excluded_subtrees = None;
        for elem in elements {
            match elem.context_slot() {
                Some(0) if permitted_subtrees.is_none() && excluded_subtrees.is_none() => {
                    permitted_subtrees = Some(decode_subtrees(elem)?)
                }
                Some(1) if excluded_subtrees.is_none() => {
                    excluded_subtrees = Some(decode_subtrees(elem)?)
                }
                Some(slot) => {
                    return Err(Error::UnexpectedContextTag {
                        kind: Kind::NameConstraints,
                        slot,
                    });
                }
                None => return Err(Error::UnexpectedElementType(Kind::NameConstraints)),
            }
        }

        // RFC 5280: at least one of the two MUST be present.
        if permitted_subtrees.is_none() && excluded_subtrees.is_none() {
            return Err(Error::EmptyContent(Kind::NameConstraints));
        }

        Ok(NameConstraints {
            permitted_subtrees,
            excluded_subtrees,
        })
    }
}

impl EncodableTo<NameConstraints> for Element {}

impl Encoder<NameConstraints, Element> for NameConstraints {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        if self.permitted_subtrees.is_none() && self.excluded_subtrees.is_none() {
            return Err(Error::EmptyContent(Kind::NameConstraints));
        }
        let permitted = self
            .permitted_subtrees
            .as_deref()
            .map(|s| encode_subtrees(0, s))
            .transpose()?;
        let excluded = self
            .excluded_subtrees
            .as_deref()
            .map(|s| encode_subtrees(1, s))
            .transpose()?;
        Ok(Element::Sequence(
            permitted.into_iter().chain(excluded).collect(),
        ))
    }
}

impl fmt::Display for NameConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lists = [
            ("Permitted", &self.permitted_subtrees),
            ("Excluded", &self.excluded_subtrees),
        ];
        let mut first = true;
        for (label, subtrees) in lists {
            let Some(subtrees) = subtrees else { continue };
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "{}:", label)?;
            for subtree in subtrees {
                write!(f, "\n  {}", subtree.base)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::extensions::IpAddressOrRange;

    // SEQUENCE {
    //   [0] { SEQUENCE { [2] ".example.com" } }
    //   [1] { SEQUENCE { [7] 10.0.0.0/255.0.0.0 } }
    // }
    fn constraints_der() -> Vec<u8> {
        let mut der = vec![0x30, 0x20, 0xa0, 0x10, 0x30, 0x0e, 0x82, 0x0c];
        der.extend_from_slice(b".example.com");
        der.extend_from_slice(&[0xa1, 0x0c, 0x30, 0x0a, 0x87, 0x08, 10, 0, 0, 0, 255, 0, 0, 0]);
        der
    }

    #[test]
    fn test_name_constraints_round_trip() {
        let nc = NameConstraints::parse(&OctetString::from(constraints_der())).unwrap();
        assert_eq!(
            Some(vec![GeneralSubtree::new(GeneralName::DnsName(
                ".example.com".to_string()
            ))]),
            nc.permitted_subtrees
        );
        assert_eq!(
            Some(vec![GeneralSubtree::new(GeneralName::IpAddress(
                IpAddressOrRange::Network("10.0.0.0/8".parse().unwrap())
            ))]),
            nc.excluded_subtrees
        );
        assert_eq!(
            "Permitted:\n  DNS:.example.com\nExcluded:\n  IP Address:10.0.0.0/8",
            nc.to_string()
        );
        assert_eq!(constraints_der(), nc.to_value().unwrap());
    }

    #[test]
    fn test_general_subtree_min_max() {
        // SEQUENCE { [2] "a", [0] 1, [1] 5 }
        let der = vec![0x30, 0x09, 0x82, 0x01, b'a', 0x80, 0x01, 0x01, 0x81, 0x01, 0x05];
        let subtree: GeneralSubtree = Element::from_der(&der).unwrap().decode().unwrap();
        assert_eq!(1, subtree.minimum);
        assert_eq!(Some(5), subtree.maximum);
        let encoded: Element = subtree.encode().unwrap();
        assert_eq!(der, encoded.to_der().unwrap());
    }

    #[rstest]
    #[case::empty(vec![0x30, 0x00], Error::EmptyContent(Kind::NameConstraints))]
    #[case::empty_subtrees(vec![0x30, 0x02, 0xa0, 0x00], Error::EmptySequence(Kind::NameConstraints))]
    #[case::unknown_slot(
        vec![0x30, 0x02, 0xa2, 0x00],
        Error::UnexpectedContextTag { kind: Kind::NameConstraints, slot: 2 }
    )]
    #[case::not_sequence(vec![0x05, 0x00], Error::ExpectedSequence(Kind::NameConstraints))]
    fn test_name_constraints_invalid(#[case] der: Vec<u8>, #[case] expected: Error) {
        let result = NameConstraints::parse(&OctetString::from(der));
        assert_eq!(Err(expected), result);
    }
}

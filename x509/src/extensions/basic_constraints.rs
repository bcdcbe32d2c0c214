use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, Integer, OctetString};
use serde::{Deserialize, Serialize};

use super::error::{Error, Kind, Result};
use super::{Extension, encode_element, parse_element};

/*
RFC 5280 Section 4.2.1.9
BasicConstraints ::= SEQUENCE {
    cA                      BOOLEAN DEFAULT FALSE,
    pathLenConstraint       INTEGER (0..MAX) OPTIONAL
}
*/

/// Basic Constraints extension ([RFC 5280 Section 4.2.1.9](https://datatracker.ietf.org/doc/html/rfc5280#section-4.2.1.9)).
///
/// Identifies whether the subject is a CA and how many intermediate
/// certificates may follow it in a path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicConstraints {
    pub ca: bool,
    pub path_len_constraint: Option<u32>,
}

impl Extension for BasicConstraints {
    const OID: &'static str = "2.5.29.19";
    const NAME: &'static str = "basicConstraints";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for BasicConstraints {}

impl Decoder<Element, BasicConstraints> for Element {
    type Error = Error;

    fn decode(&self) -> Result<BasicConstraints> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence(Kind::BasicConstraints));
        };
        let (ca, path_len) = match elements.as_slice() {
            [] => (false, None),
            [Element::Boolean(ca)] => (*ca, None),
            [Element::Integer(len)] => (false, Some(len)),
            [Element::Boolean(ca), Element::Integer(len)] => (*ca, Some(len)),
            [_] | [_, _] => return Err(Error::UnexpectedElementType(Kind::BasicConstraints)),
            _ => {
                return Err(Error::InvalidElementCount {
                    kind: Kind::BasicConstraints,
                    expected: "at most 2",
                    actual: elements.len(),
                });
            }
        };
        let path_len_constraint = path_len
            .map(|len| {
                len.to_u32()
                    .ok_or(Error::ValueOutOfRangeU32(Kind::BasicConstraints))
            })
            .transpose()?;

        Ok(BasicConstraints {
            ca,
            path_len_constraint,
        })
    }
}

impl EncodableTo<BasicConstraints> for Element {}

impl Encoder<BasicConstraints, Element> for BasicConstraints {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        // cA is DEFAULT FALSE and is left out when false.
        let ca = self.ca.then_some(Element::Boolean(true));
        let path_len = self
            .path_len_constraint
            .map(|len| Element::Integer(Integer::from(u64::from(len))));
        Ok(Element::Sequence(ca.into_iter().chain(path_len).collect()))
    }
}

impl fmt::Display for BasicConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ca {
            write!(f, "CA:TRUE")?;
        } else {
            write!(f, "CA:FALSE")?;
        }
        if let Some(pathlen) = self.path_len_constraint {
            write!(f, ", pathlen:{}", pathlen)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest(
        input,
        expected,
        // CA=true, no pathLenConstraint
        case(
            vec![0x30, 0x03, 0x01, 0x01, 0xff],
            BasicConstraints { ca: true, path_len_constraint: None }
        ),
        // empty SEQUENCE: cA defaults to FALSE
        case(vec![0x30, 0x00], BasicConstraints::default()),
        case(
            vec![0x30, 0x06, 0x01, 0x01, 0xff, 0x02, 0x01, 0x00],
            BasicConstraints { ca: true, path_len_constraint: Some(0) }
        ),
        // explicit FALSE with a pathLenConstraint
        case(
            vec![0x30, 0x06, 0x01, 0x01, 0x00, 0x02, 0x01, 0x0a],
            BasicConstraints { ca: false, path_len_constraint: Some(10) }
        ),
    )]
    fn test_basic_constraints_parse(input: Vec<u8>, expected: BasicConstraints) {
        let actual = BasicConstraints::parse(&OctetString::from(input)).unwrap();
        assert_eq!(expected, actual);
    }

    #[rstest(
        input,
        expected,
        case(vec![0x01, 0x01, 0xff], Error::ExpectedSequence(Kind::BasicConstraints)),
        case(
            vec![0x30, 0x03, 0x04, 0x01, 0x01],
            Error::UnexpectedElementType(Kind::BasicConstraints)
        ),
        case(
            vec![0x30, 0x07, 0x02, 0x05, 0x01, 0x00, 0x00, 0x00, 0x00],
            Error::ValueOutOfRangeU32(Kind::BasicConstraints)
        ),
        // pathLenConstraint before cA
        case(
            vec![0x30, 0x06, 0x02, 0x01, 0x00, 0x01, 0x01, 0xff],
            Error::UnexpectedElementType(Kind::BasicConstraints)
        ),
        // cA given twice
        case(
            vec![0x30, 0x06, 0x01, 0x01, 0xff, 0x01, 0x01, 0x00],
            Error::UnexpectedElementType(Kind::BasicConstraints)
        ),
        case(
            vec![0x30, 0x09, 0x01, 0x01, 0xff, 0x01, 0x01, 0xff, 0x02, 0x01, 0x00],
            Error::InvalidElementCount {
                kind: Kind::BasicConstraints,
                expected: "at most 2",
                actual: 3,
            }
        ),
    )]
    fn test_basic_constraints_parse_failure(input: Vec<u8>, expected: Error) {
        let result = BasicConstraints::parse(&OctetString::from(input));
        assert_eq!(Err(expected), result);
    }

    #[rstest]
    #[case(BasicConstraints { ca: false, path_len_constraint: None }, vec![0x30, 0x00])]
    #[case(
        BasicConstraints { ca: true, path_len_constraint: Some(5) },
        vec![0x30, 0x06, 0x01, 0x01, 0xff, 0x02, 0x01, 0x05]
    )]
    #[case(
        BasicConstraints { ca: true, path_len_constraint: Some(200) },
        vec![0x30, 0x07, 0x01, 0x01, 0xff, 0x02, 0x02, 0x00, 0xc8]
    )]
    fn test_basic_constraints_to_value(#[case] value: BasicConstraints, #[case] expected: Vec<u8>) {
        assert_eq!(expected, value.to_value().unwrap());
    }

    #[rstest]
    #[case(BasicConstraints { ca: true, path_len_constraint: Some(2) }, "CA:TRUE, pathlen:2")]
    #[case(BasicConstraints::default(), "CA:FALSE")]
    fn test_basic_constraints_display(#[case] value: BasicConstraints, #[case] expected: &str) {
        assert_eq!(expected, value.to_string());
    }
}

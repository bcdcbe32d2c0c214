//! Pure writers for single primitive TLVs.
//!
//! Each function returns the complete TLV (identifier, shortest-form
//! length, content).

use pkicodec_der::{TAG_CONSTRUCTED, write_tlv};

use crate::error::Error;
use crate::{BitString, ObjectIdentifier};

const BOOLEAN: u8 = 0x01;
const INTEGER: u8 = 0x02;
const BIT_STRING: u8 = 0x03;
const OCTET_STRING: u8 = 0x04;
const NULL: u8 = 0x05;
const OBJECT_IDENTIFIER: u8 = 0x06;
const SEQUENCE: u8 = 0x10 | TAG_CONSTRUCTED;

pub fn boolean(value: bool) -> Vec<u8> {
    write_tlv(BOOLEAN, &[if value { 0xff } else { 0x00 }])
}

pub fn integer_u64(value: u64) -> Vec<u8> {
    integer_bytes(&value.to_be_bytes())
}

/// INTEGER from an unsigned big-endian magnitude.
pub fn integer_bytes(magnitude: &[u8]) -> Vec<u8> {
    let start = magnitude
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(magnitude.len());
    let significant = &magnitude[start..];
    let mut content = Vec::with_capacity(significant.len() + 1);
    if significant.first().is_none_or(|&b| b & 0x80 != 0) {
        content.push(0x00);
    }
    content.extend_from_slice(significant);
    write_tlv(INTEGER, &content)
}

pub fn object_identifier(oid: &ObjectIdentifier) -> Result<Vec<u8>, Error> {
    Ok(write_tlv(OBJECT_IDENTIFIER, &oid.to_der_content()?))
}

pub fn null() -> Vec<u8> {
    vec![NULL, 0x00]
}

pub fn bit_string(value: &BitString) -> Vec<u8> {
    write_tlv(BIT_STRING, &Vec::from(value.clone()))
}

pub fn octet_string(value: &[u8]) -> Vec<u8> {
    write_tlv(OCTET_STRING, value)
}

/// SEQUENCE over already encoded children.
pub fn sequence<T: AsRef<[u8]>>(children: &[T]) -> Vec<u8> {
    let content: Vec<u8> = children
        .iter()
        .flat_map(|c| c.as_ref().iter().copied())
        .collect();
    write_tlv(SEQUENCE, &content)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest(value, expected,
        case(0, vec![0x02, 0x01, 0x00]),
        case(1, vec![0x02, 0x01, 0x01]),
        case(127, vec![0x02, 0x01, 0x7f]),
        case(128, vec![0x02, 0x02, 0x00, 0x80]),
        case(256, vec![0x02, 0x02, 0x01, 0x00]),
        case(u64::MAX, vec![0x02, 0x09, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
    )]
    fn test_integer_u64(value: u64, expected: Vec<u8>) {
        assert_eq!(expected, integer_u64(value));
    }

    #[rstest(magnitude, expected,
        case(vec![], vec![0x02, 0x01, 0x00]),
        case(vec![0x00, 0x00, 0x42], vec![0x02, 0x01, 0x42]),
        case(vec![0x9c, 0x01], vec![0x02, 0x03, 0x00, 0x9c, 0x01]),
    )]
    fn test_integer_bytes(magnitude: Vec<u8>, expected: Vec<u8>) {
        assert_eq!(expected, integer_bytes(&magnitude));
    }

    #[test]
    fn test_primitives() {
        assert_eq!(vec![0x01, 0x01, 0xff], boolean(true));
        assert_eq!(vec![0x01, 0x01, 0x00], boolean(false));
        assert_eq!(vec![0x05, 0x00], null());
        assert_eq!(vec![0x04, 0x02, 0xde, 0xad], octet_string(&[0xde, 0xad]));
        let bs = BitString::new(1, vec![0x86]).unwrap();
        assert_eq!(vec![0x03, 0x02, 0x01, 0x86], bit_string(&bs));
    }

    #[test]
    fn test_object_identifier() {
        let oid = ObjectIdentifier::from_str("1.3.14.3.2.26").unwrap();
        assert_eq!(
            vec![0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a],
            object_identifier(&oid).unwrap()
        );
        assert!(object_identifier(&ObjectIdentifier::default()).is_err());
    }

    #[test]
    fn test_sequence() {
        let children = vec![integer_u64(1), null()];
        assert_eq!(
            vec![0x30, 0x05, 0x02, 0x01, 0x01, 0x05, 0x00],
            sequence(&children)
        );
        assert_eq!(vec![0x30, 0x00], sequence::<Vec<u8>>(&[]));
    }
}

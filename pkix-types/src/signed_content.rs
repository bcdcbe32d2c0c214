//! Signed content envelope
//!
//! The outer shape shared by certificates, CRLs and certificate requests:
//!
//! ```asn1
//! SignedContent ::= SEQUENCE {
//!     toBeSigned          ANY,
//!     signatureAlgorithm  AlgorithmIdentifier,
//!     signature           BIT STRING
//! }
//! ```

use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{BitString, encode};
use pkicodec_der::{Cursor, Tag, validate_single};
use serde::{Serialize, ser::SerializeStruct};

use crate::algorithm::AlgorithmIdentifier;
use crate::error::{Error, Result};
use crate::hex_spaced;

const STRUCTURE: &str = "SignedContentBlob";

/// A decoded signed envelope.
///
/// `to_be_signed` is the complete encoded inner structure (tag, length and
/// content) and is not interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedContentBlob {
    to_be_signed: Vec<u8>,
    signature_algorithm: AlgorithmIdentifier,
    signature: BitString,
    raw: Vec<u8>,
}

impl SignedContentBlob {
    pub fn new(
        to_be_signed: Vec<u8>,
        signature_algorithm: AlgorithmIdentifier,
        signature: BitString,
    ) -> Result<Self> {
        validate_single(&to_be_signed)
            .map_err(|e| Error::InvalidArgument(format!("to_be_signed: {}", e)))?;
        let raw = encode::sequence(&[
            to_be_signed.as_slice(),
            signature_algorithm.raw(),
            encode::bit_string(&signature).as_slice(),
        ]);
        Ok(SignedContentBlob {
            to_be_signed,
            signature_algorithm,
            signature,
            raw,
        })
    }

    pub fn read(cursor: &Cursor<'_>) -> Result<Self> {
        let structural = Error::structural(STRUCTURE);
        cursor.expect(Tag::SEQUENCE, STRUCTURE).map_err(&structural)?;
        let raw = cursor.raw()?.to_vec();

        let mut child = cursor.child()?;
        require(&child, "tbsData")?;
        let to_be_signed = child.raw()?.to_vec();
        child.next_sibling()?;

        require(&child, "signatureAlgorithm")?;
        let signature_algorithm = AlgorithmIdentifier::read(&child)?;
        child.next_sibling()?;

        child
            .expect(Tag::BIT_STRING, "signature")
            .map_err(&structural)?;
        let signature = BitString::try_from(child.payload()?)?;
        child.next_sibling()?;
        child.finish().map_err(&structural)?;

        Ok(SignedContentBlob {
            to_be_signed,
            signature_algorithm,
            signature,
            raw,
        })
    }

    pub fn to_be_signed(&self) -> &[u8] {
        &self.to_be_signed
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        &self.signature_algorithm
    }

    pub fn signature(&self) -> &BitString {
        &self.signature
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

fn require(cursor: &Cursor<'_>, expected: &'static str) -> Result<()> {
    if cursor.is_at_end() {
        return Err(Error::TruncatedInput {
            structure: STRUCTURE,
            expected,
            offset: cursor.offset(),
        });
    }
    Ok(())
}

impl fmt::Display for SignedContentBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.signature_algorithm)?;
        write!(f, "Signature: {}", hex_spaced(self.signature.as_bytes()))
    }
}

impl Serialize for SignedContentBlob {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("SignedContentBlob", 3)?;
        state.serialize_field("to_be_signed_length", &self.to_be_signed.len())?;
        state.serialize_field("signature_algorithm", &self.signature_algorithm)?;
        state.serialize_field("signature", &self.signature)?;
        state.end()
    }
}

impl DecodableFrom<[u8]> for SignedContentBlob {}

impl Decoder<[u8], SignedContentBlob> for [u8] {
    type Error = Error;

    fn decode(&self) -> Result<SignedContentBlob> {
        let mut cursor = Cursor::new(self);
        let blob = SignedContentBlob::read(&cursor)?;
        cursor.next_sibling()?;
        cursor.finish().map_err(Error::structural(STRUCTURE))?;
        Ok(blob)
    }
}

impl EncodableTo<SignedContentBlob> for Vec<u8> {}

impl Encoder<SignedContentBlob, Vec<u8>> for SignedContentBlob {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.raw.clone())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    // SEQUENCE {
    //   SEQUENCE { INTEGER 1 }                      -- toBeSigned
    //   SEQUENCE { OID 1.2.840.10045.4.3.2 }        -- ecdsa-with-SHA256
    //   BIT STRING 00 ab cd
    // }
    const BLOB: &[u8] = &[
        0x30, 0x16, 0x30, 0x03, 0x02, 0x01, 0x01, 0x30, 0x0a, 0x06, 0x08, 0x2a, 0x86, 0x48, 0xce,
        0x3d, 0x04, 0x03, 0x02, 0x03, 0x03, 0x00, 0xab, 0xcd,
    ];

    #[test]
    fn test_decode() {
        let blob: SignedContentBlob = BLOB.decode().unwrap();
        assert_eq!(&[0x30, 0x03, 0x02, 0x01, 0x01], blob.to_be_signed());
        assert_eq!(
            "1.2.840.10045.4.3.2",
            blob.signature_algorithm().algorithm().to_string()
        );
        // Absent parameters read back as DER NULL.
        assert_eq!(&[0x05, 0x00], blob.signature_algorithm().parameters());
        assert_eq!(&[0xab, 0xcd], blob.signature().as_bytes());
        assert_eq!(0, blob.signature().unused_bits());
        assert_eq!(BLOB, blob.raw());
    }

    #[test]
    fn test_new_matches_decoded_fields() {
        let alg = AlgorithmIdentifier::new("1.3.14.3.2.26", None).unwrap();
        let signature = BitString::new(0, vec![0x01, 0x02]).unwrap();
        let blob = SignedContentBlob::new(vec![0x05, 0x00], alg.clone(), signature.clone())
            .unwrap();
        let encoded: Vec<u8> = blob.encode().unwrap();
        let decoded: SignedContentBlob = encoded.as_slice().decode().unwrap();
        assert_eq!(blob, decoded);
        assert_eq!(&alg, decoded.signature_algorithm());
        assert_eq!(&signature, decoded.signature());
    }

    #[rstest]
    #[case::empty(vec![])]
    #[case::two_elements(vec![0x05, 0x00, 0x05, 0x00])]
    #[case::overrun(vec![0x30, 0x05, 0x00])]
    fn test_new_rejects_bad_to_be_signed(#[case] to_be_signed: Vec<u8>) {
        let alg = AlgorithmIdentifier::new("1.3.14.3.2.26", None).unwrap();
        let signature = BitString::new(0, vec![]).unwrap();
        let result = SignedContentBlob::new(to_be_signed, alg, signature);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[rstest(input, expected,
        case(vec![0x02, 0x01, 0x00], Error::StructuralTagMismatch {
            structure: "SignedContentBlob",
            expected: Tag::SEQUENCE,
            actual: Tag::INTEGER,
            offset: 0,
        }),
        case(vec![0x30, 0x00], Error::TruncatedInput {
            structure: "SignedContentBlob",
            expected: "tbsData",
            offset: 2,
        }),
        case(vec![0x30, 0x02, 0x05, 0x00], Error::TruncatedInput {
            structure: "SignedContentBlob",
            expected: "signatureAlgorithm",
            offset: 4,
        }),
        case([&[0x30u8, 0x11][..], &BLOB[2..19]].concat(), Error::TruncatedInput {
            structure: "SignedContentBlob",
            expected: "signature",
            offset: 19,
        }),
        // signatureAlgorithm that is an INTEGER: offset is that of the outer buffer
        case(vec![0x30, 0x07, 0x05, 0x00, 0x02, 0x01, 0x00, 0x03, 0x00], Error::StructuralTagMismatch {
            structure: "AlgorithmIdentifier",
            expected: Tag::SEQUENCE,
            actual: Tag::INTEGER,
            offset: 4,
        }),
        case(vec![0x30, 0x0b, 0x05, 0x00, 0x30, 0x03, 0x06, 0x01, 0x2a, 0x04, 0x02, 0x00, 0x00], Error::StructuralTagMismatch {
            structure: "SignedContentBlob",
            expected: Tag::BIT_STRING,
            actual: Tag::OCTET_STRING,
            offset: 9,
        }),
        case(vec![0x30, 0x0c, 0x05, 0x00, 0x30, 0x03, 0x06, 0x01, 0x2a, 0x03, 0x01, 0x00, 0x05, 0x00], Error::TrailingData {
            structure: "SignedContentBlob",
            offset: 12,
        }),
    )]
    fn test_decode_rejects(input: Vec<u8>, expected: Error) {
        let result: Result<SignedContentBlob> = input.as_slice().decode();
        assert_eq!(Err(expected), result);
    }
}

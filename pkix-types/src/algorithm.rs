//! AlgorithmIdentifier type
//!
//! Defined in [RFC 5280 Section 4.1.1.2](https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.1.2)
//!
//! ```asn1
//! AlgorithmIdentifier ::= SEQUENCE {
//!     algorithm   OBJECT IDENTIFIER,
//!     parameters  ANY DEFINED BY algorithm OPTIONAL
//! }
//! ```

use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{AsOid, Element, ObjectIdentifier, encode};
use pkicodec_der::{Cursor, Tag, validate_single};
use serde::{Serialize, ser::SerializeStruct};

use crate::{OidName, hex_spaced};
use crate::error::{Error, Result};
use crate::oid_name::oid_label;

const STRUCTURE: &str = "AlgorithmIdentifier";

/// Algorithm Identifier
///
/// Keeps the algorithm OID, the parameters as one encoded TLV, and the full
/// encoding it was built from. Instances are immutable: they come either from
/// [`AlgorithmIdentifier::new`] or from decoding bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    algorithm: ObjectIdentifier,
    parameters: Vec<u8>,
    raw: Vec<u8>,
}

impl AlgorithmIdentifier {
    // Digests
    pub const OID_MD5: &'static str = "1.2.840.113549.2.5";
    pub const OID_SHA1: &'static str = "1.3.14.3.2.26";
    pub const OID_SHA256: &'static str = "2.16.840.1.101.3.4.2.1";
    pub const OID_SHA384: &'static str = "2.16.840.1.101.3.4.2.2";
    pub const OID_SHA512: &'static str = "2.16.840.1.101.3.4.2.3";

    // Public key and signature algorithms (RFC 3279, RFC 4055, RFC 5758, RFC 8410)
    pub const OID_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.1";
    pub const OID_MD5_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.4";
    pub const OID_SHA1_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.5";
    pub const OID_RSASSA_PSS: &'static str = "1.2.840.113549.1.1.10";
    pub const OID_SHA256_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.11";
    pub const OID_SHA384_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.12";
    pub const OID_SHA512_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.13";
    pub const OID_ID_DSA: &'static str = "1.2.840.10040.4.1";
    pub const OID_DSA_WITH_SHA1: &'static str = "1.2.840.10040.4.3";
    pub const OID_EC_PUBLIC_KEY: &'static str = "1.2.840.10045.2.1";
    pub const OID_ECDSA_WITH_SHA1: &'static str = "1.2.840.10045.4.1";
    pub const OID_ECDSA_WITH_SHA256: &'static str = "1.2.840.10045.4.3.2";
    pub const OID_ECDSA_WITH_SHA384: &'static str = "1.2.840.10045.4.3.3";
    pub const OID_ECDSA_WITH_SHA512: &'static str = "1.2.840.10045.4.3.4";
    pub const OID_ED25519: &'static str = "1.3.101.112";
    pub const OID_ED448: &'static str = "1.3.101.113";

    /// Builds an identifier from an OID and optional encoded parameters.
    ///
    /// Missing or empty parameters become DER NULL. Given parameters must be
    /// exactly one well-formed DER element.
    pub fn new<O: AsOid>(algorithm: O, parameters: Option<&[u8]>) -> Result<Self> {
        let algorithm = algorithm
            .as_oid()
            .map_err(|e| Error::InvalidArgument(format!("algorithm: {}", e)))?;
        if algorithm.is_empty() {
            return Err(Error::InvalidArgument(
                "algorithm: OID is not set".to_string(),
            ));
        }
        let parameters = match parameters {
            None | Some([]) => encode::null(),
            Some(params) => {
                validate_single(params)
                    .map_err(|e| Error::InvalidArgument(format!("parameters: {}", e)))?;
                params.to_vec()
            }
        };
        let oid = encode::object_identifier(&algorithm)
            .map_err(|e| Error::InvalidArgument(format!("algorithm: {}", e)))?;
        let raw = encode::sequence(&[oid, parameters.clone()]);
        Ok(AlgorithmIdentifier {
            algorithm,
            parameters,
            raw,
        })
    }

    /// Reads the identifier the cursor is positioned on. Offsets in errors
    /// are those of the cursor's buffer.
    pub fn read(cursor: &Cursor<'_>) -> Result<Self> {
        let structural = Error::structural(STRUCTURE);
        cursor.expect(Tag::SEQUENCE, STRUCTURE).map_err(&structural)?;
        let raw = cursor.raw()?.to_vec();

        let mut child = cursor.child()?;
        child
            .expect(Tag::OBJECT_IDENTIFIER, "algorithm")
            .map_err(&structural)?;
        let algorithm = ObjectIdentifier::try_from(child.payload()?)?;

        let parameters = if child.next_sibling()? {
            let parameters = child.raw()?.to_vec();
            child.next_sibling()?;
            parameters
        } else {
            encode::null()
        };
        child.finish().map_err(&structural)?;

        Ok(AlgorithmIdentifier {
            algorithm,
            parameters,
            raw,
        })
    }

    pub fn algorithm(&self) -> &ObjectIdentifier {
        &self.algorithm
    }

    /// The parameters TLV, DER NULL when the encoding had none.
    pub fn parameters(&self) -> &[u8] {
        &self.parameters
    }

    /// The complete encoding.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn parameters_element(&self) -> Result<Element> {
        Ok(Element::from_der(&self.parameters)?)
    }
}

impl OidName for AlgorithmIdentifier {
    fn oid_name(&self) -> Option<&'static str> {
        match self.algorithm.to_string().as_str() {
            Self::OID_MD5 => Some("md5"),
            Self::OID_SHA1 => Some("sha1"),
            Self::OID_SHA256 => Some("sha256"),
            Self::OID_SHA384 => Some("sha384"),
            Self::OID_SHA512 => Some("sha512"),
            Self::OID_RSA_ENCRYPTION => Some("rsaEncryption"),
            Self::OID_MD5_WITH_RSA_ENCRYPTION => Some("md5WithRSAEncryption"),
            Self::OID_SHA1_WITH_RSA_ENCRYPTION => Some("sha1WithRSAEncryption"),
            Self::OID_RSASSA_PSS => Some("rsassaPss"),
            Self::OID_SHA256_WITH_RSA_ENCRYPTION => Some("sha256WithRSAEncryption"),
            Self::OID_SHA384_WITH_RSA_ENCRYPTION => Some("sha384WithRSAEncryption"),
            Self::OID_SHA512_WITH_RSA_ENCRYPTION => Some("sha512WithRSAEncryption"),
            Self::OID_ID_DSA => Some("id-dsa"),
            Self::OID_DSA_WITH_SHA1 => Some("dsa-with-sha1"),
            Self::OID_EC_PUBLIC_KEY => Some("ecPublicKey"),
            Self::OID_ECDSA_WITH_SHA1 => Some("ecdsa-with-SHA1"),
            Self::OID_ECDSA_WITH_SHA256 => Some("ecdsa-with-SHA256"),
            Self::OID_ECDSA_WITH_SHA384 => Some("ecdsa-with-SHA384"),
            Self::OID_ECDSA_WITH_SHA512 => Some("ecdsa-with-SHA512"),
            Self::OID_ED25519 => Some("ED25519"),
            Self::OID_ED448 => Some("ED448"),
            _ => None,
        }
    }
}

impl fmt::Display for AlgorithmIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = oid_label(&self.algorithm, self.oid_name());
        if label == self.algorithm.to_string() {
            writeln!(f, "Algorithm ID: {}", label)?;
        } else {
            writeln!(f, "Algorithm ID: {} ({})", label, self.algorithm)?;
        }
        write!(f, "Algorithm Parameters: {}", hex_spaced(&self.parameters))
    }
}

impl Serialize for AlgorithmIdentifier {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AlgorithmIdentifier", 2)?;
        state.serialize_field("algorithm", &oid_label(&self.algorithm, self.oid_name()))?;
        state.serialize_field("parameters", &hex_spaced(&self.parameters))?;
        state.end()
    }
}

impl DecodableFrom<[u8]> for AlgorithmIdentifier {}

impl Decoder<[u8], AlgorithmIdentifier> for [u8] {
    type Error = Error;

    fn decode(&self) -> Result<AlgorithmIdentifier> {
        let mut cursor = Cursor::new(self);
        let algorithm = AlgorithmIdentifier::read(&cursor)?;
        cursor.next_sibling()?;
        cursor.finish().map_err(Error::structural(STRUCTURE))?;
        Ok(algorithm)
    }
}

impl EncodableTo<AlgorithmIdentifier> for Vec<u8> {}

impl Encoder<AlgorithmIdentifier, Vec<u8>> for AlgorithmIdentifier {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.raw.clone())
    }
}

impl DecodableFrom<Element> for AlgorithmIdentifier {}

impl Decoder<Element, AlgorithmIdentifier> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AlgorithmIdentifier> {
        let Element::Sequence(elements) = self else {
            return Err(Error::AlgorithmIdentifierExpectedSequence);
        };
        match elements.as_slice() {
            [Element::ObjectIdentifier(_)] | [Element::ObjectIdentifier(_), _] => {
                let raw = self.to_der()?;
                raw.as_slice().decode()
            }
            _ => Err(Error::AlgorithmIdentifierInvalidElements),
        }
    }
}

impl EncodableTo<AlgorithmIdentifier> for Element {}

impl Encoder<AlgorithmIdentifier, Element> for AlgorithmIdentifier {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::from_der(&self.raw)?)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    const SHA1_RAW: &[u8] = &[
        0x30, 0x09, 0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a, 0x05, 0x00,
    ];

    #[test]
    fn test_new_defaults_to_null_parameters() {
        let alg = AlgorithmIdentifier::new("1.3.14.3.2.26", None).unwrap();
        assert_eq!(encode::null(), alg.parameters());
        assert_eq!(SHA1_RAW, alg.raw());
        assert_eq!(Element::Null, alg.parameters_element().unwrap());
    }

    #[rstest]
    #[case::ec_curve(
        "1.2.840.10045.2.1",
        vec![0x06, 0x08, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07]
    )]
    #[case::empty_sequence("1.2.840.113549.1.1.10", vec![0x30, 0x00])]
    fn test_new_roundtrip(#[case] oid: &str, #[case] params: Vec<u8>) {
        let alg = AlgorithmIdentifier::new(oid, Some(&params)).unwrap();
        let decoded: AlgorithmIdentifier = alg.raw().decode().unwrap();
        assert_eq!(alg.raw(), decoded.raw());
        assert_eq!(alg, decoded);
        assert_eq!(params, decoded.parameters());
    }

    #[rstest]
    #[case::empty_string("")]
    #[case::single_arc("1")]
    #[case::not_numeric("sha1")]
    fn test_new_rejects_bad_oid(#[case] oid: &str) {
        let result = AlgorithmIdentifier::new(oid, None);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_new_rejects_unset_oid() {
        let result = AlgorithmIdentifier::new(ObjectIdentifier::default(), None);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[rstest]
    #[case::two_elements(vec![0x05, 0x00, 0x05, 0x00])]
    #[case::truncated(vec![0x04, 0x05, 0x00])]
    #[case::indefinite(vec![0x30, 0x80, 0x00, 0x00])]
    fn test_new_rejects_bad_parameters(#[case] params: Vec<u8>) {
        let result = AlgorithmIdentifier::new("1.3.14.3.2.26", Some(&params));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_new_empty_parameters_is_null() {
        let alg = AlgorithmIdentifier::new("1.3.14.3.2.26", Some(&[])).unwrap();
        assert_eq!(SHA1_RAW, alg.raw());
    }

    #[test]
    fn test_decode_without_parameters() {
        let input: &[u8] = &[0x30, 0x07, 0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a];
        let alg: AlgorithmIdentifier = input.decode().unwrap();
        assert_eq!(
            &ObjectIdentifier::from_str("1.3.14.3.2.26").unwrap(),
            alg.algorithm()
        );
        assert_eq!(encode::null(), alg.parameters());
        // raw keeps the input verbatim
        assert_eq!(input, alg.raw());
    }

    #[rstest(input, expected,
        case(vec![0x02, 0x01, 0x00], Error::StructuralTagMismatch {
            structure: "AlgorithmIdentifier",
            expected: Tag::SEQUENCE,
            actual: Tag::INTEGER,
            offset: 0,
        }),
        case(vec![0x30, 0x03, 0x02, 0x01, 0x00], Error::StructuralTagMismatch {
            structure: "AlgorithmIdentifier",
            expected: Tag::OBJECT_IDENTIFIER,
            actual: Tag::INTEGER,
            offset: 2,
        }),
        case(vec![0x30, 0x00], Error::TruncatedInput {
            structure: "AlgorithmIdentifier",
            expected: "algorithm",
            offset: 2,
        }),
        case(vec![0x30, 0x0b, 0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a, 0x05, 0x00, 0x05, 0x00], Error::TrailingData {
            structure: "AlgorithmIdentifier",
            offset: 11,
        }),
        case([SHA1_RAW, &[0x00u8][..]].concat(), Error::TrailingData {
            structure: "AlgorithmIdentifier",
            offset: 11,
        }),
    )]
    fn test_decode_rejects(input: Vec<u8>, expected: Error) {
        let result: Result<AlgorithmIdentifier> = input.as_slice().decode();
        assert_eq!(Err(expected), result);
    }

    #[test]
    fn test_decode_rejects_indefinite_length() {
        let input: &[u8] = &[0x30, 0x80, 0x06, 0x01, 0x2a, 0x00, 0x00];
        let result: Result<AlgorithmIdentifier> = input.decode();
        assert_eq!(Some(0), result.unwrap_err().offset());
    }

    #[test]
    fn test_element_path() {
        let alg = AlgorithmIdentifier::new(AlgorithmIdentifier::OID_SHA256_WITH_RSA_ENCRYPTION, None)
            .unwrap();
        let element: Element = alg.encode().unwrap();
        assert!(matches!(&element, Element::Sequence(children) if children.len() == 2));
        let decoded: AlgorithmIdentifier = element.decode().unwrap();
        assert_eq!(alg, decoded);

        let bad = Element::Sequence(vec![Element::Null]);
        let result: Result<AlgorithmIdentifier> = bad.decode();
        assert_eq!(Err(Error::AlgorithmIdentifierInvalidElements), result);
    }

    // The only test in this crate that flips the process wide switch.
    #[test]
    fn test_display_and_serialize() {
        let alg = AlgorithmIdentifier::new("1.3.14.3.2.26", None).unwrap();
        assert_eq!(
            "Algorithm ID: sha1 (1.3.14.3.2.26)\nAlgorithm Parameters: 05 00",
            alg.to_string()
        );
        assert_eq!(
            r#"{"algorithm":"sha1","parameters":"05 00"}"#,
            serde_json::to_string(&alg).unwrap()
        );

        crate::set_use_oid_values(true);
        let with_oid = alg.to_string();
        crate::set_use_oid_values(false);
        assert_eq!(
            "Algorithm ID: 1.3.14.3.2.26\nAlgorithm Parameters: 05 00",
            with_oid
        );

        let unknown = AlgorithmIdentifier::new("1.2.3.4", None).unwrap();
        assert_eq!(
            "Algorithm ID: 1.2.3.4\nAlgorithm Parameters: 05 00",
            unknown.to_string()
        );
    }
}

use pkicodec::decoder::Decoder;
use pkicodec::encoder::Encoder;
use pkicodec_asn1::BitString;
use pkicodec_der::Tag;
use pkicodec_pkix_types::{AlgorithmIdentifier, Error, SignedContentBlob};
use pkicodec_x509::extensions::RawExtension;
use rstest::rstest;

#[test]
fn test_sha1_identifier_bytes() {
    let sha1 = AlgorithmIdentifier::new("1.3.14.3.2.26", None).unwrap();
    assert_eq!(&[0x05, 0x00], sha1.parameters());
    assert_eq!(
        &[0x30, 0x09, 0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a, 0x05, 0x00],
        sha1.raw()
    );
}

#[rstest]
#[case(AlgorithmIdentifier::OID_SHA256, None)]
#[case(AlgorithmIdentifier::OID_ED25519, None)]
#[case(AlgorithmIdentifier::OID_EC_PUBLIC_KEY, Some(vec![0x06, 0x08, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07]))]
fn test_identifier_round_trip(#[case] oid: &str, #[case] parameters: Option<Vec<u8>>) {
    let built = AlgorithmIdentifier::new(oid, parameters.as_deref()).unwrap();
    let decoded: AlgorithmIdentifier = built.raw().decode().unwrap();
    assert_eq!(built.raw(), decoded.raw());
    assert_eq!(built.parameters(), decoded.parameters());
    assert_eq!(oid, decoded.algorithm().to_string());
}

#[test]
fn test_signed_blob_round_trip() {
    let algorithm =
        AlgorithmIdentifier::new(AlgorithmIdentifier::OID_SHA256_WITH_RSA_ENCRYPTION, None)
            .unwrap();
    let blob = SignedContentBlob::new(
        vec![0x30, 0x03, 0x02, 0x01, 0x01],
        algorithm,
        BitString::new(0, vec![0xaa, 0xbb]).unwrap(),
    )
    .unwrap();
    let der: Vec<u8> = blob.encode().unwrap();
    let decoded: SignedContentBlob = der.as_slice().decode().unwrap();
    assert_eq!(blob.to_be_signed(), decoded.to_be_signed());
    assert_eq!(
        blob.signature_algorithm().raw(),
        decoded.signature_algorithm().raw()
    );
    assert_eq!(der, decoded.raw());
}

fn integer_mismatch(structure: &'static str) -> Error {
    Error::StructuralTagMismatch {
        structure,
        expected: Tag::SEQUENCE,
        actual: Tag::INTEGER,
        offset: 0,
    }
}

#[rstest]
#[case(vec![0x02, 0x01, 0x00])]
#[case(vec![0x02, 0x02, 0x01, 0x00])]
fn test_outer_integer_is_rejected(#[case] input: Vec<u8>) {
    let algorithm: Result<AlgorithmIdentifier, Error> = input.as_slice().decode();
    assert_eq!(Err(integer_mismatch("AlgorithmIdentifier")), algorithm);

    let blob: Result<SignedContentBlob, Error> = input.as_slice().decode();
    assert_eq!(Err(integer_mismatch("SignedContentBlob")), blob);

    let extension: Result<RawExtension, Error> = input.as_slice().decode();
    assert_eq!(Err(integer_mismatch("Extension")), extension);
}

#[test]
fn test_signature_algorithm_offset_is_absolute() {
    // tbsData, then an INTEGER where the AlgorithmIdentifier's OID belongs
    let input = [
        0x30, 0x0e, 0x30, 0x00, 0x30, 0x05, 0x02, 0x01, 0x00, 0x05, 0x00, 0x03, 0x03, 0x00,
        0xaa, 0xbb,
    ];
    let result: Result<SignedContentBlob, Error> = input.as_slice().decode();
    assert_eq!(
        Err(Error::StructuralTagMismatch {
            structure: "AlgorithmIdentifier",
            expected: Tag::OBJECT_IDENTIFIER,
            actual: Tag::INTEGER,
            offset: 6,
        }),
        result
    );
}

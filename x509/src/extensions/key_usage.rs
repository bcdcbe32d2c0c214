use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{BitString, Element, OctetString};
use serde::{Deserialize, Serialize};

use super::error::{Error, Kind, Result};
use super::{Extension, encode_element, parse_element};

/*
RFC 5280 Section 4.2.1.3
KeyUsage ::= BIT STRING {
    digitalSignature        (0),
    nonRepudiation          (1), -- renamed to contentCommitment
    keyEncipherment         (2),
    dataEncipherment        (3),
    keyAgreement            (4),
    keyCertSign             (5),
    cRLSign                 (6),
    encipherOnly            (7),
    decipherOnly            (8)
}
*/

/// Key Usage extension: what the certified key may be used for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyUsage {
    pub digital_signature: bool,
    pub content_commitment: bool,
    pub key_encipherment: bool,
    pub data_encipherment: bool,
    pub key_agreement: bool,
    pub key_cert_sign: bool,
    pub crl_sign: bool,
    pub encipher_only: bool,
    pub decipher_only: bool,
}

impl KeyUsage {
    fn flags(&self) -> [(bool, &'static str); 9] {
        [
            (self.digital_signature, "Digital Signature"),
            (self.content_commitment, "Content Commitment"),
            (self.key_encipherment, "Key Encipherment"),
            (self.data_encipherment, "Data Encipherment"),
            (self.key_agreement, "Key Agreement"),
            (self.key_cert_sign, "Certificate Sign"),
            (self.crl_sign, "CRL Sign"),
            (self.encipher_only, "Encipher Only"),
            (self.decipher_only, "Decipher Only"),
        ]
    }
}

impl Extension for KeyUsage {
    const OID: &'static str = "2.5.29.15";
    const NAME: &'static str = "keyUsage";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for KeyUsage {}

impl Decoder<Element, KeyUsage> for Element {
    type Error = Error;

    fn decode(&self) -> Result<KeyUsage> {
        let Element::BitString(bits) = self else {
            return Err(Error::ExpectedBitString(Kind::KeyUsage));
        };
        Ok(KeyUsage {
            digital_signature: bits.bit(0),
            content_commitment: bits.bit(1),
            key_encipherment: bits.bit(2),
            data_encipherment: bits.bit(3),
            key_agreement: bits.bit(4),
            key_cert_sign: bits.bit(5),
            crl_sign: bits.bit(6),
            encipher_only: bits.bit(7),
            decipher_only: bits.bit(8),
        })
    }
}

impl EncodableTo<KeyUsage> for Element {}

impl Encoder<KeyUsage, Element> for KeyUsage {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let set: Vec<usize> = self
            .flags()
            .iter()
            .enumerate()
            .filter_map(|(n, (on, _))| on.then_some(n))
            .collect();
        Ok(Element::BitString(BitString::from_bits(&set)))
    }
}

impl fmt::Display for KeyUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let usages: Vec<&str> = self
            .flags()
            .iter()
            .filter_map(|(on, label)| on.then_some(*label))
            .collect();
        write!(f, "{}", usages.join(", "))
    }
}

//! # pkicodec-asn1
//!
//! Typed ASN.1 values built on top of the DER tree from `pkicodec-der`.
//!
//! [`Element`] is the generic value model; [`ObjectIdentifier`],
//! [`Integer`], [`BitString`] and [`OctetString`] are the primitive types
//! the PKIX layers work with. The [`encode`] module holds pure functions
//! that write single primitive TLVs.

#![forbid(unsafe_code)]

use std::{fmt::Display, str::FromStr};

use chrono::{Datelike, NaiveDateTime};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_der::{Der, Tag, Tlv, UniversalTag};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub mod encode;
pub mod error;

use error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ASN1Object {
    elements: Vec<Element>,
}

impl ASN1Object {
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn new(elements: Vec<Element>) -> Self {
        ASN1Object { elements }
    }
}

impl DecodableFrom<Der> for ASN1Object {}

impl Decoder<Der, ASN1Object> for Der {
    type Error = Error;

    fn decode(&self) -> Result<ASN1Object, Error> {
        let elements = self
            .elements()
            .iter()
            .map(Element::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ASN1Object { elements })
    }
}

impl EncodableTo<ASN1Object> for Der {}

impl Encoder<ASN1Object, Der> for ASN1Object {
    type Error = Error;

    fn encode(&self) -> Result<Der, Self::Error> {
        let tlvs = self
            .elements
            .iter()
            .map(Tlv::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Der::new(tlvs))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Boolean(bool),
    Integer(Integer),
    BitString(BitString),
    OctetString(OctetString),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    UTF8String(String),
    Sequence(Vec<Element>),
    Set(Vec<Element>),
    PrintableString(String),
    IA5String(String),
    UTCTime(NaiveDateTime),
    GeneralizedTime(NaiveDateTime),
    BMPString(String),
    ContextSpecific {
        slot: u8,
        constructed: bool,
        element: Box<Element>,
    },
    /// Any TLV this crate has no typed model for; re-encoded verbatim.
    Unimplemented(Tlv),
}

impl Element {
    /// Decodes a buffer that must hold exactly one DER element.
    pub fn from_der(bytes: &[u8]) -> Result<Element, Error> {
        let der: Der = bytes.decode()?;
        match der.elements() {
            [tlv] => Element::try_from(tlv),
            elements => Err(Error::NotSingleElement(elements.len())),
        }
    }

    /// DER encoding of this element.
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        Ok(Tlv::try_from(self)?.to_bytes())
    }

    /// `[slot] EXPLICIT inner`
    pub fn explicit(slot: u8, inner: Element) -> Element {
        Element::ContextSpecific {
            slot,
            constructed: true,
            element: Box::new(Element::Sequence(vec![inner])),
        }
    }

    /// `[slot] IMPLICIT SEQUENCE { children }` (or SET)
    pub fn implicit_constructed(slot: u8, children: Vec<Element>) -> Element {
        Element::ContextSpecific {
            slot,
            constructed: true,
            element: Box::new(Element::Sequence(children)),
        }
    }

    /// `[slot] IMPLICIT` over a primitive type, given its content octets.
    pub fn implicit_primitive(slot: u8, content: impl Into<Vec<u8>>) -> Element {
        Element::ContextSpecific {
            slot,
            constructed: false,
            element: Box::new(Element::OctetString(OctetString::from(content.into()))),
        }
    }

    /// The wrapped element of `[n] EXPLICIT X`.
    pub fn explicit_inner(&self) -> Result<&Element, Error> {
        match self {
            Element::ContextSpecific {
                slot,
                constructed: true,
                element,
            } => match element.as_ref() {
                Element::Sequence(children) if children.len() == 1 => Ok(&children[0]),
                _ => Err(Error::InvalidContextSpecific {
                    slot: *slot,
                    msg: "EXPLICIT tag must wrap exactly one element".to_string(),
                }),
            },
            Element::ContextSpecific { slot, .. } => Err(Error::InvalidContextSpecific {
                slot: *slot,
                msg: "EXPLICIT tag must be constructed".to_string(),
            }),
            _ => Err(Error::ExpectedContextSpecific),
        }
    }

    /// Children of a constructed context-specific element.
    pub fn implicit_children(&self) -> Result<&[Element], Error> {
        match self {
            Element::ContextSpecific {
                constructed: true,
                element,
                ..
            } => match element.as_ref() {
                Element::Sequence(children) => Ok(children),
                single => Ok(std::slice::from_ref(single)),
            },
            Element::ContextSpecific { slot, .. } => Err(Error::InvalidContextSpecific {
                slot: *slot,
                msg: "IMPLICIT SEQUENCE must be constructed".to_string(),
            }),
            _ => Err(Error::ExpectedContextSpecific),
        }
    }

    /// Content octets of a primitive context-specific element.
    pub fn implicit_content(&self) -> Result<&[u8], Error> {
        match self {
            Element::ContextSpecific {
                constructed: false,
                element,
                ..
            } => match element.as_ref() {
                Element::OctetString(content) => Ok(content.as_bytes()),
                _ => Err(Error::ElementCannotEncode("implicit tag over a non-octet value")),
            },
            Element::ContextSpecific { slot, .. } => Err(Error::InvalidContextSpecific {
                slot: *slot,
                msg: "IMPLICIT primitive must not be constructed".to_string(),
            }),
            _ => Err(Error::ExpectedContextSpecific),
        }
    }

    /// Slot number when this is a context-specific element.
    pub fn context_slot(&self) -> Option<u8> {
        match self {
            Element::ContextSpecific { slot, .. } => Some(*slot),
            _ => None,
        }
    }
}

fn primitive_data(tlv: &Tlv) -> Result<&[u8], Error> {
    tlv.data().ok_or(Error::ExpectedPrimitive(*tlv.tag()))
}

fn constructed_elements(tlv: &Tlv) -> Result<Vec<Element>, Error> {
    tlv.tlvs()
        .ok_or(Error::ExpectedConstructed(*tlv.tag()))?
        .iter()
        .map(Element::try_from)
        .collect()
}

impl TryFrom<&Tlv> for Element {
    type Error = Error;

    fn try_from(tlv: &Tlv) -> Result<Self, Self::Error> {
        match tlv.tag() {
            Tag::Universal(universal, _) => match universal {
                UniversalTag::Boolean => match primitive_data(tlv)? {
                    [0x00] => Ok(Element::Boolean(false)),
                    [0xff] => Ok(Element::Boolean(true)),
                    _ => Err(Error::InvalidBoolean),
                },
                UniversalTag::Integer => {
                    Ok(Element::Integer(Integer::from_der_content(primitive_data(tlv)?)?))
                }
                UniversalTag::BitString => {
                    Ok(Element::BitString(BitString::try_from(primitive_data(tlv)?)?))
                }
                UniversalTag::OctetString => {
                    Ok(Element::OctetString(OctetString::from(primitive_data(tlv)?)))
                }
                UniversalTag::Null => match primitive_data(tlv)? {
                    [] => Ok(Element::Null),
                    _ => Err(Error::NullHasContent),
                },
                UniversalTag::ObjectIdentifier => Ok(Element::ObjectIdentifier(
                    ObjectIdentifier::try_from(primitive_data(tlv)?)?,
                )),
                UniversalTag::UTF8String => {
                    let s = String::from_utf8(primitive_data(tlv)?.to_vec())
                        .map_err(|_| Error::Utf8StringInvalidUtf8)?;
                    Ok(Element::UTF8String(s))
                }
                UniversalTag::Sequence => Ok(Element::Sequence(constructed_elements(tlv)?)),
                UniversalTag::Set => Ok(Element::Set(constructed_elements(tlv)?)),
                UniversalTag::PrintableString => {
                    let data = primitive_data(tlv)?;
                    if !data.iter().all(|b| is_printable(*b)) {
                        return Err(Error::PrintableStringInvalidEncoding);
                    }
                    Ok(Element::PrintableString(
                        String::from_utf8_lossy(data).into_owned(),
                    ))
                }
                UniversalTag::IA5String => {
                    let data = primitive_data(tlv)?;
                    if !data.is_ascii() {
                        return Err(Error::Ia5StringInvalidEncoding);
                    }
                    Ok(Element::IA5String(String::from_utf8_lossy(data).into_owned()))
                }
                UniversalTag::UTCTime => Ok(Element::UTCTime(parse_utc_time(primitive_data(
                    tlv,
                )?)?)),
                UniversalTag::GeneralizedTime => Ok(Element::GeneralizedTime(
                    parse_generalized_time(primitive_data(tlv)?)?,
                )),
                UniversalTag::BMPString => {
                    Ok(Element::BMPString(decode_bmp_string(primitive_data(tlv)?)?))
                }
                UniversalTag::Enumerated
                | UniversalTag::T61String
                | UniversalTag::Unimplemented(_) => Ok(Element::Unimplemented(tlv.clone())),
            },
            Tag::ContextSpecific { slot, constructed } => {
                if *constructed {
                    // The children are kept as a SEQUENCE. EXPLICIT tagging is the
                    // single child case; IMPLICIT SEQUENCE / SET may carry any number.
                    Ok(Element::ContextSpecific {
                        slot: *slot,
                        constructed: true,
                        element: Box::new(Element::Sequence(constructed_elements(tlv)?)),
                    })
                } else {
                    // IMPLICIT tagging: the schema above decides what the bytes mean.
                    Ok(Element::ContextSpecific {
                        slot: *slot,
                        constructed: false,
                        element: Box::new(Element::OctetString(OctetString::from(
                            primitive_data(tlv)?,
                        ))),
                    })
                }
            }
            Tag::Application { .. } | Tag::Private { .. } => {
                Ok(Element::Unimplemented(tlv.clone()))
            }
        }
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Boolean(b) => write!(f, "Boolean({})", b),
            Element::Integer(i) => write!(f, "Integer({})", i),
            Element::BitString(bs) => write!(f, "BitString({})", bs),
            Element::OctetString(os) => write!(f, "OctetString({})", os),
            Element::Null => write!(f, "Null"),
            Element::ObjectIdentifier(oid) => write!(f, "ObjectIdentifier({})", oid),
            Element::UTF8String(s) => write!(f, "UTF8String({})", s),
            Element::Sequence(seq) => write!(f, "Sequence({:?})", seq),
            Element::Set(set) => write!(f, "Set({:?})", set),
            Element::PrintableString(s) => write!(f, "PrintableString({})", s),
            Element::IA5String(s) => write!(f, "IA5String({})", s),
            Element::UTCTime(dt) => write!(f, "UTCTime({})", dt),
            Element::GeneralizedTime(dt) => write!(f, "GeneralizedTime({})", dt),
            Element::BMPString(s) => write!(f, "BMPString({})", s),
            Element::ContextSpecific {
                slot,
                constructed,
                element,
            } => write!(
                f,
                "ContextSpecific(slot: {}, constructed: {}, element: {})",
                slot, constructed, element
            ),
            Element::Unimplemented(tlv) => write!(f, "Unimplemented({})", tlv.tag()),
        }
    }
}

impl TryFrom<&Element> for Tlv {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self, Self::Error> {
        let primitive = |tag: UniversalTag, data: Vec<u8>| -> Result<Tlv, Error> {
            Ok(Tlv::new_primitive(Tag::universal(tag, false), data))
        };
        let constructed = |tag: UniversalTag, elements: &[Element]| -> Result<Tlv, Error> {
            let tlvs = elements
                .iter()
                .map(Tlv::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Tlv::new_constructed(Tag::universal(tag, true), tlvs))
        };
        match element {
            Element::Boolean(b) => {
                primitive(UniversalTag::Boolean, vec![if *b { 0xff } else { 0x00 }])
            }
            Element::Integer(i) => primitive(UniversalTag::Integer, i.to_der_content()),
            Element::BitString(bs) => primitive(UniversalTag::BitString, Vec::from(bs.clone())),
            Element::OctetString(os) => primitive(UniversalTag::OctetString, os.as_bytes().to_vec()),
            Element::Null => primitive(UniversalTag::Null, vec![]),
            Element::ObjectIdentifier(oid) => {
                primitive(UniversalTag::ObjectIdentifier, oid.to_der_content()?)
            }
            Element::UTF8String(s) => primitive(UniversalTag::UTF8String, s.as_bytes().to_vec()),
            Element::Sequence(elements) => constructed(UniversalTag::Sequence, elements),
            Element::Set(elements) => constructed(UniversalTag::Set, elements),
            Element::PrintableString(s) => {
                primitive(UniversalTag::PrintableString, s.as_bytes().to_vec())
            }
            Element::IA5String(s) => primitive(UniversalTag::IA5String, s.as_bytes().to_vec()),
            Element::UTCTime(dt) => primitive(
                UniversalTag::UTCTime,
                dt.format("%y%m%d%H%M%SZ").to_string().into_bytes(),
            ),
            Element::GeneralizedTime(dt) => primitive(
                UniversalTag::GeneralizedTime,
                dt.format("%Y%m%d%H%M%SZ").to_string().into_bytes(),
            ),
            Element::BMPString(s) => primitive(UniversalTag::BMPString, encode_bmp_string(s)?),
            Element::ContextSpecific {
                slot,
                constructed,
                element,
            } => {
                let tag = Tag::ContextSpecific {
                    slot: *slot,
                    constructed: *constructed,
                };
                if *constructed {
                    let children = match element.as_ref() {
                        Element::Sequence(children) => children
                            .iter()
                            .map(Tlv::try_from)
                            .collect::<Result<Vec<_>, _>>()?,
                        single => vec![Tlv::try_from(single)?],
                    };
                    Ok(Tlv::new_constructed(tag, children))
                } else {
                    let inner = Tlv::try_from(element.as_ref())?;
                    // IMPLICIT tagging keeps the inner content and swaps the tag.
                    match inner.data() {
                        Some(data) => Ok(Tlv::new_primitive(tag, data.to_vec())),
                        None => Err(Error::ElementCannotEncode(
                            "implicit tag over a constructed element",
                        )),
                    }
                }
            }
            Element::Unimplemented(tlv) => Ok(tlv.clone()),
        }
    }
}

impl EncodableTo<Element> for Tlv {}

impl Encoder<Element, Tlv> for Element {
    type Error = Error;

    fn encode(&self) -> Result<Tlv, Self::Error> {
        Tlv::try_from(self)
    }
}

fn is_printable(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b" '()+,-./:=?".contains(&b)
}

// ASN.1 INTEGER is arbitrary sized and signed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Integer {
    inner: BigInt,
}

impl Integer {
    pub fn as_bigint(&self) -> &BigInt {
        &self.inner
    }

    pub fn to_u32(&self) -> Option<u32> {
        self.inner.to_u32()
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.inner.to_i64()
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.inner.to_u64()
    }

    /// Minimal two's complement content octets.
    pub fn to_der_content(&self) -> Vec<u8> {
        self.inner.to_signed_bytes_be()
    }
}

impl Serialize for Integer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.inner.to_string())
    }
}

impl<'de> Deserialize<'de> for Integer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let inner = s.parse::<BigInt>().map_err(serde::de::Error::custom)?;
        Ok(Integer { inner })
    }
}

impl Integer {
    /// Reads INTEGER content octets, requiring the shortest two's-complement
    /// form.
    pub fn from_der_content(content: &[u8]) -> Result<Self, Error> {
        match content {
            [] => Err(Error::IntegerNoData),
            [0x00, next, ..] if *next < 0x80 => Err(Error::IntegerNonMinimal),
            [0xff, next, ..] if *next >= 0x80 => Err(Error::IntegerNonMinimal),
            _ => Ok(Integer::from(content)),
        }
    }
}

impl From<&[u8]> for Integer {
    fn from(value: &[u8]) -> Self {
        Integer {
            inner: BigInt::from_signed_bytes_be(value),
        }
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Integer {
            inner: BigInt::from(value),
        }
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Integer {
            inner: BigInt::from(value),
        }
    }
}

impl TryFrom<&Integer> for i64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self, Self::Error> {
        value.inner.to_i64().ok_or(Error::IntegerOutOfRangeI64)
    }
}

impl TryFrom<&Integer> for u64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self, Self::Error> {
        value.inner.to_u64().ok_or(Error::IntegerOutOfRangeU64)
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// An OBJECT IDENTIFIER as its list of arcs.
///
/// The default value has no arcs and stands for an OID that was never set.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectIdentifier {
    inner: Vec<u64>,
}

impl ObjectIdentifier {
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn arcs(&self) -> &[u64] {
        &self.inner
    }

    /// Content octets (no tag or length) of the DER encoding.
    pub fn to_der_content(&self) -> Result<Vec<u8>, Error> {
        let (first, second, rest) = match self.inner.as_slice() {
            [first, second, rest @ ..] => (*first, *second, rest),
            _ => return Err(Error::ObjectIdentifierTooFewComponents),
        };
        if first > 2 || (first < 2 && second >= 40) {
            return Err(Error::ObjectIdentifierInvalidComponent(self.to_string()));
        }
        let head = (first * 40)
            .checked_add(second)
            .ok_or(Error::ObjectIdentifierArcTooLarge)?;
        let mut result = Vec::new();
        for arc in std::iter::once(head).chain(rest.iter().copied()) {
            push_base128(&mut result, arc);
        }
        Ok(result)
    }
}

fn push_base128(out: &mut Vec<u8>, mut value: u64) {
    let mut encoded = vec![(value & 0x7f) as u8];
    value >>= 7;
    while value > 0 {
        encoded.push((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    out.extend(encoded.iter().rev());
}

impl Serialize for ObjectIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ObjectIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ObjectIdentifier::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<&[u8]> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(Error::ObjectIdentifierNoData);
        }
        if value.last().is_some_and(|b| b & 0x80 != 0) {
            return Err(Error::ObjectIdentifierIncompleteEncoding);
        }

        let mut arcs = Vec::new();
        let mut val = 0u64;
        let mut start = true;
        for v in value {
            if start && *v == 0x80 {
                return Err(Error::ObjectIdentifierNonMinimal);
            }
            if val > (u64::MAX >> 7) {
                return Err(Error::ObjectIdentifierArcTooLarge);
            }
            val = (val << 7) | (*v as u64 & 0x7f);
            start = *v & 0x80 == 0;
            if start {
                arcs.push(val);
                val = 0;
            }
        }

        // The first subidentifier packs two arcs as 40 * X + Y.
        let head = arcs.remove(0);
        let (first, second) = match head {
            0..=39 => (0, head),
            40..=79 => (1, head - 40),
            _ => (2, head - 80),
        };
        let mut inner = vec![first, second];
        inner.extend(arcs);
        Ok(ObjectIdentifier { inner })
    }
}

impl TryFrom<Vec<u8>> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(value.as_slice())
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self
            .inner
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", s)
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::ObjectIdentifierEmptyString);
        }
        let inner = s
            .split('.')
            .map(|c| {
                c.parse::<u64>()
                    .map_err(|_| Error::ObjectIdentifierInvalidComponent(c.to_string()))
            })
            .collect::<Result<Vec<u64>, Error>>()?;
        if inner.len() < 2 {
            return Err(Error::ObjectIdentifierTooFewComponents);
        }
        Ok(ObjectIdentifier { inner })
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

impl PartialEq<ObjectIdentifier> for &str {
    fn eq(&self, other: &ObjectIdentifier) -> bool {
        *self == other.to_string()
    }
}

/// Types that name an OBJECT IDENTIFIER.
pub trait AsOid {
    fn as_oid(&self) -> Result<ObjectIdentifier, Error>;
}

impl AsOid for ObjectIdentifier {
    fn as_oid(&self) -> Result<ObjectIdentifier, Error> {
        Ok(self.clone())
    }
}

impl AsOid for &ObjectIdentifier {
    fn as_oid(&self) -> Result<ObjectIdentifier, Error> {
        Ok((*self).clone())
    }
}

impl AsOid for &str {
    fn as_oid(&self) -> Result<ObjectIdentifier, Error> {
        ObjectIdentifier::from_str(self)
    }
}

impl AsOid for String {
    fn as_oid(&self) -> Result<ObjectIdentifier, Error> {
        self.as_str().as_oid()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

impl Serialize for BitString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("BitString", 2)?;
        state.serialize_field("bit_length", &self.bit_len())?;
        let hex_string = self
            .data
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(":");
        state.serialize_field("bits", &hex_string)?;
        state.end()
    }
}

impl BitString {
    pub fn new(unused: u8, data: Vec<u8>) -> Result<Self, Error> {
        if unused > 7 {
            return Err(Error::BitStringUnusedBitsOutOfRange(unused));
        }
        if data.is_empty() && unused != 0 {
            return Err(Error::BitStringUnusedBitsOnEmpty);
        }
        Ok(BitString { unused, data })
    }

    pub fn unused_bits(&self) -> u8 {
        self.unused
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Number of significant bits.
    pub fn bit_len(&self) -> usize {
        if self.data.is_empty() {
            0
        } else {
            self.data.len() * 8 - self.unused as usize
        }
    }

    /// Value of bit `n`, counting from the most significant bit of the first octet.
    pub fn bit(&self, n: usize) -> bool {
        n < self.bit_len() && self.data[n / 8] & (0x80 >> (n % 8)) != 0
    }

    /// Builds a named bit list from the set bit positions, with trailing
    /// zero bits removed as DER requires.
    pub fn from_bits(bits: &[usize]) -> Self {
        let Some(&highest) = bits.iter().max() else {
            return BitString {
                unused: 0,
                data: Vec::new(),
            };
        };
        let mut data = vec![0u8; highest / 8 + 1];
        for n in bits {
            data[n / 8] |= 0x80 >> (n % 8);
        }
        BitString {
            unused: (7 - highest % 8) as u8,
            data,
        }
    }
}

impl AsRef<[u8]> for BitString {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl TryFrom<&[u8]> for BitString {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match value.split_first() {
            Some((&unused, data)) => BitString::new(unused, data.to_vec()),
            None => Err(Error::BitStringNoData),
        }
    }
}

impl From<BitString> for Vec<u8> {
    fn from(value: BitString) -> Self {
        let mut result = Vec::with_capacity(value.data.len() + 1);
        result.push(value.unused);
        result.extend(value.data);
        result
    }
}

impl Display for BitString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut result = String::new();
        for (i, byte) in self.data.iter().enumerate() {
            if i == self.data.len() - 1 && self.unused > 0 {
                let valid_bits = byte >> self.unused;
                let bit_count = 8 - self.unused as usize;
                result.push_str(&format!("{:0bit_count$b}", valid_bits, bit_count = bit_count));
            } else {
                result.push_str(&format!("{:08b}", byte));
            }
        }
        write!(f, "{}", result)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OctetString {
    inner: Vec<u8>,
}

impl Serialize for OctetString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for OctetString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_string = String::deserialize(deserializer)?;
        let cleaned = hex_string.replace(|c: char| c.is_whitespace() || c == ':' || c == '-', "");
        if !cleaned.is_ascii() {
            return Err(serde::de::Error::custom("hex string must be ASCII"));
        }
        if cleaned.len() % 2 != 0 {
            return Err(serde::de::Error::custom("hex string must have even length"));
        }
        let inner = cleaned
            .as_bytes()
            .chunks(2)
            .map(|pair| {
                std::str::from_utf8(pair)
                    .ok()
                    .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                    .ok_or_else(|| {
                        serde::de::Error::custom(format!(
                            "invalid hex string: {}",
                            String::from_utf8_lossy(pair)
                        ))
                    })
            })
            .collect::<Result<Vec<u8>, _>>()?;
        Ok(OctetString { inner })
    }
}

impl OctetString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl TryFrom<&OctetString> for ASN1Object {
    type Error = Error;

    fn try_from(value: &OctetString) -> Result<Self, Self::Error> {
        let der: Der = value.as_bytes().decode()?;
        der.decode()
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(value: Vec<u8>) -> Self {
        OctetString { inner: value }
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> Self {
        OctetString {
            inner: value.to_vec(),
        }
    }
}

impl Display for OctetString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in &self.inner {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Formats bytes as colon separated uppercase hex, the way certificate
/// dumps print key identifiers and serials.
pub fn hex_colon(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":")
}

fn parse_utc_time(data: &[u8]) -> Result<NaiveDateTime, Error> {
    if data.is_empty() {
        return Err(Error::UtcTimeNoData);
    }
    let s = std::str::from_utf8(data).map_err(|_| Error::UtcTimeInvalidFormat)?;
    let dt = NaiveDateTime::parse_from_str(s, "%y%m%d%H%M%SZ")
        .map_err(|_| Error::UtcTimeInvalidFormat)?;
    // RFC 5280: YY >= 50 is 19YY, YY < 50 is 20YY.
    if dt.year() >= 2050 {
        return dt
            .with_year(dt.year() - 100)
            .ok_or(Error::UtcTimeInvalidFormat);
    }
    if dt.year() < 1950 {
        return dt
            .with_year(dt.year() + 100)
            .ok_or(Error::UtcTimeInvalidFormat);
    }
    Ok(dt)
}

fn parse_generalized_time(data: &[u8]) -> Result<NaiveDateTime, Error> {
    if data.is_empty() {
        return Err(Error::GeneralizedTimeNoData);
    }
    let s = std::str::from_utf8(data).map_err(|_| Error::GeneralizedTimeInvalidFormat)?;
    NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%SZ")
        .map_err(|_| Error::GeneralizedTimeInvalidFormat)
}

fn decode_bmp_string(data: &[u8]) -> Result<String, Error> {
    if data.len() % 2 != 0 {
        return Err(Error::BmpStringOddLength(data.len()));
    }
    data.chunks_exact(2)
        .map(|pair| {
            let unit = u16::from_be_bytes([pair[0], pair[1]]);
            char::from_u32(unit as u32).ok_or(Error::BmpStringRequiresSurrogatePair)
        })
        .collect()
}

fn encode_bmp_string(s: &str) -> Result<Vec<u8>, Error> {
    let mut out = Vec::with_capacity(s.len() * 2);
    for c in s.chars() {
        let unit = u16::try_from(c as u32).map_err(|_| Error::BmpStringRequiresSurrogatePair)?;
        out.extend_from_slice(&unit.to_be_bytes());
    }
    Ok(out)
}

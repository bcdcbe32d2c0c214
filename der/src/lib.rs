//! # pkicodec-der
//!
//! The DER layer of pkicodec: identifier and length octets, a zero-copy
//! [`Cursor`] that walks sibling and child TLVs while tracking absolute byte
//! offsets, a recursive [`Der`]/[`Tlv`] tree, and the shortest-form writer
//! used on the encode path.
//!
//! Only the DER subset of BER is accepted: definite lengths, minimal
//! long-form lengths, and single-octet identifiers.

#![forbid(unsafe_code)]

use std::fmt;

use nom::{IResult, Parser};
use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};

mod cursor;
pub mod error;

pub use cursor::Cursor;
use error::{Error, Result};

pub const TAG_CONSTRUCTED: u8 = 0x20;
pub const TAG_CLASS_MASK: u8 = 0xc0;
pub const TAG_CLASS_UNIVERSAL: u8 = 0x00;
pub const TAG_CLASS_APPLICATION: u8 = 0x40;
pub const TAG_CLASS_CONTEXT_SPECIFIC: u8 = 0x80;
pub const TAG_CLASS_PRIVATE: u8 = 0xc0;
const TAG_NUMBER_MASK: u8 = 0x1f;

/// Nesting limit applied when a whole buffer is decoded into a tree.
pub const MAX_DEPTH: usize = 64;

/// Universal class tag numbers this crate gives a name to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UniversalTag {
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    Enumerated,
    UTF8String,
    Sequence,
    Set,
    PrintableString,
    T61String,
    IA5String,
    UTCTime,
    GeneralizedTime,
    BMPString,
    Unimplemented(u8),
}

impl UniversalTag {
    /// Tag number (the low five bits of the identifier octet).
    pub fn number(&self) -> u8 {
        match self {
            UniversalTag::Boolean => 0x01,
            UniversalTag::Integer => 0x02,
            UniversalTag::BitString => 0x03,
            UniversalTag::OctetString => 0x04,
            UniversalTag::Null => 0x05,
            UniversalTag::ObjectIdentifier => 0x06,
            UniversalTag::Enumerated => 0x0a,
            UniversalTag::UTF8String => 0x0c,
            UniversalTag::Sequence => 0x10,
            UniversalTag::Set => 0x11,
            UniversalTag::PrintableString => 0x13,
            UniversalTag::T61String => 0x14,
            UniversalTag::IA5String => 0x16,
            UniversalTag::UTCTime => 0x17,
            UniversalTag::GeneralizedTime => 0x18,
            UniversalTag::BMPString => 0x1e,
            UniversalTag::Unimplemented(n) => *n,
        }
    }
}

impl From<u8> for UniversalTag {
    fn from(number: u8) -> Self {
        match number & TAG_NUMBER_MASK {
            0x01 => UniversalTag::Boolean,
            0x02 => UniversalTag::Integer,
            0x03 => UniversalTag::BitString,
            0x04 => UniversalTag::OctetString,
            0x05 => UniversalTag::Null,
            0x06 => UniversalTag::ObjectIdentifier,
            0x0a => UniversalTag::Enumerated,
            0x0c => UniversalTag::UTF8String,
            0x10 => UniversalTag::Sequence,
            0x11 => UniversalTag::Set,
            0x13 => UniversalTag::PrintableString,
            0x14 => UniversalTag::T61String,
            0x16 => UniversalTag::IA5String,
            0x17 => UniversalTag::UTCTime,
            0x18 => UniversalTag::GeneralizedTime,
            0x1e => UniversalTag::BMPString,
            n => UniversalTag::Unimplemented(n),
        }
    }
}

/// A decoded identifier octet.
///
/// `Universal` keeps the raw identifier byte next to the tag number so that
/// the constructed bit survives a decode/encode cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Universal(UniversalTag, u8),
    ContextSpecific { slot: u8, constructed: bool },
    Application { number: u8, constructed: bool },
    Private { number: u8, constructed: bool },
}

impl Tag {
    pub const BOOLEAN: Tag = Tag::Universal(UniversalTag::Boolean, 0x01);
    pub const INTEGER: Tag = Tag::Universal(UniversalTag::Integer, 0x02);
    pub const BIT_STRING: Tag = Tag::Universal(UniversalTag::BitString, 0x03);
    pub const OCTET_STRING: Tag = Tag::Universal(UniversalTag::OctetString, 0x04);
    pub const NULL: Tag = Tag::Universal(UniversalTag::Null, 0x05);
    pub const OBJECT_IDENTIFIER: Tag = Tag::Universal(UniversalTag::ObjectIdentifier, 0x06);
    pub const SEQUENCE: Tag = Tag::Universal(UniversalTag::Sequence, 0x30);
    pub const SET: Tag = Tag::Universal(UniversalTag::Set, 0x31);

    /// Builds a universal tag from its tag number and constructed flag.
    pub fn universal(tag: UniversalTag, constructed: bool) -> Tag {
        let byte = tag.number() | if constructed { TAG_CONSTRUCTED } else { 0 };
        Tag::Universal(tag, byte)
    }

    /// The identifier octet as it appears on the wire.
    pub fn byte(&self) -> u8 {
        let constructed = |c: bool| if c { TAG_CONSTRUCTED } else { 0 };
        match self {
            Tag::Universal(_, byte) => *byte,
            Tag::ContextSpecific { slot, constructed: c } => {
                TAG_CLASS_CONTEXT_SPECIFIC | constructed(*c) | (slot & TAG_NUMBER_MASK)
            }
            Tag::Application { number, constructed: c } => {
                TAG_CLASS_APPLICATION | constructed(*c) | (number & TAG_NUMBER_MASK)
            }
            Tag::Private { number, constructed: c } => {
                TAG_CLASS_PRIVATE | constructed(*c) | (number & TAG_NUMBER_MASK)
            }
        }
    }

    pub fn is_constructed(&self) -> bool {
        self.byte() & TAG_CONSTRUCTED == TAG_CONSTRUCTED
    }
}

impl From<u8> for Tag {
    fn from(byte: u8) -> Self {
        let constructed = byte & TAG_CONSTRUCTED == TAG_CONSTRUCTED;
        let number = byte & TAG_NUMBER_MASK;
        match byte & TAG_CLASS_MASK {
            TAG_CLASS_UNIVERSAL => Tag::Universal(UniversalTag::from(number), byte),
            TAG_CLASS_APPLICATION => Tag::Application {
                number,
                constructed,
            },
            TAG_CLASS_CONTEXT_SPECIFIC => Tag::ContextSpecific {
                slot: number,
                constructed,
            },
            _ => Tag::Private {
                number,
                constructed,
            },
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Universal(tag, byte) => {
                let name = match tag {
                    UniversalTag::Boolean => "BOOLEAN",
                    UniversalTag::Integer => "INTEGER",
                    UniversalTag::BitString => "BIT STRING",
                    UniversalTag::OctetString => "OCTET STRING",
                    UniversalTag::Null => "NULL",
                    UniversalTag::ObjectIdentifier => "OBJECT IDENTIFIER",
                    UniversalTag::Enumerated => "ENUMERATED",
                    UniversalTag::UTF8String => "UTF8String",
                    UniversalTag::Sequence => "SEQUENCE",
                    UniversalTag::Set => "SET",
                    UniversalTag::PrintableString => "PrintableString",
                    UniversalTag::T61String => "T61String",
                    UniversalTag::IA5String => "IA5String",
                    UniversalTag::UTCTime => "UTCTime",
                    UniversalTag::GeneralizedTime => "GeneralizedTime",
                    UniversalTag::BMPString => "BMPString",
                    UniversalTag::Unimplemented(_) => return write!(f, "tag 0x{:02x}", byte),
                };
                write!(f, "{} (0x{:02x})", name, byte)
            }
            Tag::ContextSpecific { slot, .. } => write!(f, "[{}] (0x{:02x})", slot, self.byte()),
            Tag::Application { number, .. } => {
                write!(f, "[APPLICATION {}] (0x{:02x})", number, self.byte())
            }
            Tag::Private { number, .. } => {
                write!(f, "[PRIVATE {}] (0x{:02x})", number, self.byte())
            }
        }
    }
}

/// Identifier and length octets of one TLV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tag: Tag,
    pub header_len: usize,
    pub content_len: usize,
}

impl Header {
    /// Length of the whole TLV, header included.
    pub fn total_len(&self) -> usize {
        self.header_len + self.content_len
    }
}

enum Length<'a> {
    Short(u8),
    Long(&'a [u8]),
    Indefinite,
}

fn parse_tag(input: &[u8]) -> IResult<&[u8], u8> {
    nom::number::complete::be_u8(input)
}

fn parse_length(input: &[u8]) -> IResult<&[u8], Length<'_>> {
    let (input, n) = nom::number::complete::be_u8(input)?;
    if n & 0x80 == 0 {
        // short form: 0-127
        return Ok((input, Length::Short(n)));
    }
    // long form: the low 7 bits count the length octets that follow.
    let count = n & 0x7f;
    if count == 0 {
        return Ok((input, Length::Indefinite));
    }
    let (input, bs) = nom::bytes::complete::take(count as usize).parse(input)?;
    Ok((input, Length::Long(bs)))
}

fn from_nom(err: nom::Err<nom::error::Error<&[u8]>>, offset: usize) -> Error {
    match err {
        nom::Err::Incomplete(needed) => Error::ParserIncomplete(needed),
        nom::Err::Error(e) | nom::Err::Failure(e) => Error::Parser {
            kind: e.code,
            offset,
        },
    }
}

/// Reads the header of the TLV starting at `input[0]`.
///
/// `offset` is the absolute position of `input[0]` and is only used for
/// error reporting. The content is checked to fit inside `input`.
pub fn read_header(input: &[u8], offset: usize) -> Result<Header> {
    let (rest, byte) = parse_tag(input).map_err(|e| from_nom(e, offset))?;
    if byte & TAG_NUMBER_MASK == TAG_NUMBER_MASK {
        return Err(Error::HighTagNumber { offset });
    }
    let (rest, length) = parse_length(rest).map_err(|e| from_nom(e, offset))?;
    let content_len = match length {
        Length::Short(n) => n as usize,
        Length::Indefinite => return Err(Error::IndefiniteLength { offset }),
        Length::Long(bs) => {
            if bs.len() > std::mem::size_of::<usize>() {
                return Err(Error::LengthTooLarge { offset });
            }
            if bs.first() == Some(&0) {
                return Err(Error::NonMinimalLength { offset });
            }
            let n = bs.iter().fold(0usize, |n, &b| (n << 8) | b as usize);
            if n < 0x80 {
                return Err(Error::NonMinimalLength { offset });
            }
            n
        }
    };
    let header_len = input.len() - rest.len();
    if content_len > rest.len() {
        return Err(Error::LengthOverrun { offset });
    }
    Ok(Header {
        tag: Tag::from(byte),
        header_len,
        content_len,
    })
}

/// Encodes a content length in its shortest form.
pub fn encode_length(len: usize) -> Vec<u8> {
    if len < 0x80 {
        return vec![len as u8];
    }
    let bytes = len.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    let significant = &bytes[start..];
    let mut out = Vec::with_capacity(significant.len() + 1);
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
    out
}

/// Wraps `content` in a TLV with the given identifier octet.
pub fn write_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let length = encode_length(content.len());
    let mut out = Vec::with_capacity(1 + length.len() + content.len());
    out.push(tag);
    out.extend_from_slice(&length);
    out.extend_from_slice(content);
    out
}

/// Checks that `input` holds exactly one well-formed TLV (recursively).
pub fn validate_single(input: &[u8]) -> Result<()> {
    let cursor = Cursor::new(input);
    Tlv::read(&cursor, 0)?;
    let mut cursor = cursor;
    if cursor.next_sibling()? {
        return Err(Error::TrailingData {
            offset: cursor.offset(),
        });
    }
    Ok(())
}

/// A fully decoded DER buffer: the top-level TLVs in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Der {
    elements: Vec<Tlv>,
}

impl Der {
    pub fn new(elements: Vec<Tlv>) -> Self {
        Der { elements }
    }

    pub fn elements(&self) -> &[Tlv] {
        &self.elements
    }
}

impl DecodableFrom<[u8]> for Der {}

impl Decoder<[u8], Der> for [u8] {
    type Error = Error;

    fn decode(&self) -> Result<Der> {
        let mut cursor = Cursor::new(self);
        let mut elements = Vec::new();
        while !cursor.is_at_end() {
            elements.push(Tlv::read(&cursor, 0)?);
            cursor.next_sibling()?;
        }
        Ok(Der { elements })
    }
}

impl EncodableTo<Der> for Vec<u8> {}

impl Encoder<Der, Vec<u8>> for Der {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for tlv in &self.elements {
            tlv.encode_into(&mut out);
        }
        Ok(out)
    }
}

/// One node of the decoded tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    offset: usize,
    value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Tlv(Vec<Tlv>),
    Data(Vec<u8>),
}

impl Tlv {
    pub fn new_primitive(tag: Tag, data: Vec<u8>) -> Self {
        Tlv {
            tag,
            offset: 0,
            value: Value::Data(data),
        }
    }

    pub fn new_constructed(tag: Tag, tlvs: Vec<Tlv>) -> Self {
        Tlv {
            tag,
            offset: 0,
            value: Value::Tlv(tlvs),
        }
    }

    fn read(cursor: &Cursor<'_>, depth: usize) -> Result<Tlv> {
        let header = cursor.header()?;
        let offset = cursor.offset();
        if !header.tag.is_constructed() {
            return Ok(Tlv {
                tag: header.tag,
                offset,
                value: Value::Data(cursor.payload()?.to_vec()),
            });
        }
        if depth >= MAX_DEPTH {
            return Err(Error::NestingTooDeep {
                limit: MAX_DEPTH,
                offset,
            });
        }
        let mut child = cursor.child()?;
        let mut tlvs = Vec::new();
        while !child.is_at_end() {
            tlvs.push(Tlv::read(&child, depth + 1)?);
            child.next_sibling()?;
        }
        Ok(Tlv {
            tag: header.tag,
            offset,
            value: Value::Tlv(tlvs),
        })
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Absolute byte offset of this TLV in the decoded buffer (0 for
    /// values built in memory).
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn data(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Data(data) => Some(data),
            Value::Tlv(_) => None,
        }
    }

    pub fn tlvs(&self) -> Option<&[Tlv]> {
        match &self.value {
            Value::Tlv(tlvs) => Some(tlvs),
            Value::Data(_) => None,
        }
    }

    fn content(&self) -> Vec<u8> {
        match &self.value {
            Value::Data(data) => data.clone(),
            Value::Tlv(tlvs) => {
                let mut out = Vec::new();
                for tlv in tlvs {
                    tlv.encode_into(&mut out);
                }
                out
            }
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        let content = self.content();
        out.push(self.tag.byte());
        out.extend_from_slice(&encode_length(content.len()));
        out.extend_from_slice(&content);
    }

    /// DER encoding of this TLV.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }
}

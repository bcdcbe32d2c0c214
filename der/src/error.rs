use thiserror::Error;

use crate::Tag;

/// Errors produced while reading or writing DER.
///
/// Every variant raised while reading carries the absolute byte offset of
/// the TLV header that caused it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("parser error {kind:?} at offset {offset}")]
    Parser {
        kind: nom::error::ErrorKind,
        offset: usize,
    },
    #[error("parser incomplete: {0:?}")]
    ParserIncomplete(nom::Needed),
    #[error("indefinite length is not allowed in DER (offset {offset})")]
    IndefiniteLength { offset: usize },
    #[error("high tag number form is not supported (offset {offset})")]
    HighTagNumber { offset: usize },
    #[error("length is not encoded in its shortest form (offset {offset})")]
    NonMinimalLength { offset: usize },
    #[error("length does not fit in memory (offset {offset})")]
    LengthTooLarge { offset: usize },
    #[error("length runs past the enclosing content (offset {offset})")]
    LengthOverrun { offset: usize },
    #[error("expected {expected}, found {actual} (offset {offset})")]
    TagMismatch {
        expected: Tag,
        actual: Tag,
        offset: usize,
    },
    #[error("missing {expected} (offset {offset})")]
    Truncated {
        expected: &'static str,
        offset: usize,
    },
    #[error("unexpected data after the last element (offset {offset})")]
    TrailingData { offset: usize },
    #[error("{tag} is not a constructed type (offset {offset})")]
    NotConstructed { tag: Tag, offset: usize },
    #[error("nesting deeper than {limit} levels (offset {offset})")]
    NestingTooDeep { limit: usize, offset: usize },
}

impl Error {
    /// Byte offset the error refers to, when it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Parser { offset, .. }
            | Error::IndefiniteLength { offset }
            | Error::HighTagNumber { offset }
            | Error::NonMinimalLength { offset }
            | Error::LengthTooLarge { offset }
            | Error::LengthOverrun { offset }
            | Error::TagMismatch { offset, .. }
            | Error::Truncated { offset, .. }
            | Error::TrailingData { offset }
            | Error::NotConstructed { offset, .. }
            | Error::NestingTooDeep { offset, .. } => Some(*offset),
            Error::ParserIncomplete(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

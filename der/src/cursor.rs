use crate::error::{Error, Result};
use crate::{Header, Tag, read_header};

/// A zero-copy reader positioned on one TLV among its siblings.
///
/// The cursor keeps the whole input buffer so every offset it reports is
/// absolute, including offsets reached through [`Cursor::child`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Cursor {
            input,
            pos: 0,
            end: input.len(),
        }
    }

    /// Absolute offset of the current TLV.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.end
    }

    pub fn header(&self) -> Result<Header> {
        if self.is_at_end() {
            return Err(Error::Truncated {
                expected: "element",
                offset: self.pos,
            });
        }
        read_header(&self.input[self.pos..self.end], self.pos)
    }

    pub fn tag(&self) -> Result<Tag> {
        Ok(self.header()?.tag)
    }

    /// The current TLV, header included.
    pub fn raw(&self) -> Result<&'a [u8]> {
        let header = self.header()?;
        Ok(&self.input[self.pos..self.pos + header.total_len()])
    }

    /// The content octets of the current TLV.
    pub fn payload(&self) -> Result<&'a [u8]> {
        let header = self.header()?;
        let start = self.pos + header.header_len;
        Ok(&self.input[start..start + header.content_len])
    }

    /// Moves past the current TLV. Returns whether another sibling follows.
    pub fn next_sibling(&mut self) -> Result<bool> {
        let header = self.header()?;
        self.pos += header.total_len();
        Ok(!self.is_at_end())
    }

    /// A cursor on the first child of the current (constructed) TLV.
    pub fn child(&self) -> Result<Cursor<'a>> {
        let header = self.header()?;
        if !header.tag.is_constructed() {
            return Err(Error::NotConstructed {
                tag: header.tag,
                offset: self.pos,
            });
        }
        Ok(Cursor {
            input: self.input,
            pos: self.pos + header.header_len,
            end: self.pos + header.total_len(),
        })
    }

    /// Checks that the current TLV exists and carries `tag`.
    ///
    /// `what` names the expected element in the `Truncated` error.
    pub fn expect(&self, tag: Tag, what: &'static str) -> Result<Header> {
        if self.is_at_end() {
            return Err(Error::Truncated {
                expected: what,
                offset: self.pos,
            });
        }
        let header = self.header()?;
        if header.tag != tag {
            return Err(Error::TagMismatch {
                expected: tag,
                actual: header.tag,
                offset: self.pos,
            });
        }
        Ok(header)
    }

    /// Fails with `TrailingData` unless every sibling has been consumed.
    pub fn finish(&self) -> Result<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(Error::TrailingData { offset: self.pos })
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    // SEQUENCE { OID 2.5.29.19, OCTET STRING { 30 00 } }
    const EXTENSION: &[u8] = &[
        0x30, 0x09, 0x06, 0x03, 0x55, 0x1d, 0x13, 0x04, 0x02, 0x30, 0x00,
    ];

    #[test]
    fn test_cursor_walks_children() {
        let cursor = Cursor::new(EXTENSION);
        assert_eq!(Tag::SEQUENCE, cursor.tag().unwrap());
        assert_eq!(EXTENSION, cursor.raw().unwrap());

        let mut child = cursor.child().unwrap();
        assert_eq!(2, child.offset());
        child.expect(Tag::OBJECT_IDENTIFIER, "extnID").unwrap();
        assert_eq!(&[0x55, 0x1d, 0x13], child.payload().unwrap());
        assert!(child.next_sibling().unwrap());

        assert_eq!(7, child.offset());
        child.expect(Tag::OCTET_STRING, "extnValue").unwrap();
        assert_eq!(&[0x04, 0x02, 0x30, 0x00], child.raw().unwrap());
        assert!(!child.next_sibling().unwrap());
        assert!(child.finish().is_ok());
    }

    #[rstest(tag, what, expected,
        case(Tag::INTEGER, "version", Error::TagMismatch {
            expected: Tag::INTEGER,
            actual: Tag::SEQUENCE,
            offset: 0,
        }),
    )]
    fn test_cursor_expect_mismatch(tag: Tag, what: &'static str, expected: Error) {
        let cursor = Cursor::new(EXTENSION);
        assert_eq!(Err(expected), cursor.expect(tag, what));
    }

    #[test]
    fn test_cursor_truncated() {
        let cursor = Cursor::new(EXTENSION);
        let mut child = cursor.child().unwrap();
        child.next_sibling().unwrap();
        child.next_sibling().unwrap();
        assert_eq!(
            Err(Error::Truncated {
                expected: "critical",
                offset: 11
            }),
            child.expect(Tag::BOOLEAN, "critical")
        );
    }

    #[test]
    fn test_cursor_child_of_primitive() {
        let cursor = Cursor::new(&[0x04, 0x00]);
        assert_eq!(
            Err(Error::NotConstructed {
                tag: Tag::OCTET_STRING,
                offset: 0
            }),
            cursor.child()
        );
    }

    #[test]
    fn test_cursor_child_length_bounded_by_parent() {
        // The inner OCTET STRING claims 4 bytes but the SEQUENCE holds 3.
        let input: &[u8] = &[0x30, 0x03, 0x04, 0x04, 0x00, 0x00, 0x00];
        let child = Cursor::new(input).child().unwrap();
        assert_eq!(Err(Error::LengthOverrun { offset: 2 }), child.header());
    }

    #[test]
    fn test_cursor_finish_trailing() {
        let input: &[u8] = &[0x05, 0x00, 0x05, 0x00];
        let cursor = Cursor::new(input);
        assert_eq!(Err(Error::TrailingData { offset: 0 }), cursor.finish());
    }
}

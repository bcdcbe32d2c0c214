use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_collection::{NotSupported, Notification, ObservableCollection, SubscriptionId};
use pkicodec_der::{Cursor, Tag, write_tlv};
use serde::{Serialize, Serializer};

use super::dispatch::{CertificateExtension, KnownExtension};
use super::{RawExtension, TypedExtension};
use crate::error::{Error, Result};

/*
RFC 5280 Section 4.1

Extensions  ::=  SEQUENCE SIZE (1..MAX) OF Extension

Inside TBSCertificate the list sits under [3] EXPLICIT. A certificate MUST
NOT include more than one instance of a particular extension.
*/

const EXTENSIONS_TAG: Tag = Tag::ContextSpecific {
    slot: 3,
    constructed: true,
};

/// The extensions of a certificate or CRL, classified by OID.
///
/// Backed by an [`ObservableCollection`], so subscribers see every change
/// and the list can be closed against edits.
#[derive(Debug, Default)]
pub struct Extensions {
    items: ObservableCollection<CertificateExtension>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CertificateExtension> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[CertificateExtension] {
        self.items.as_slice()
    }

    pub fn collection(&self) -> &ObservableCollection<CertificateExtension> {
        &self.items
    }

    /// The typed extension of type `T`, if present.
    pub fn get<T: KnownExtension>(&self) -> Option<&TypedExtension<T>> {
        self.items.iter().find_map(T::typed)
    }

    pub fn find(&self, oid: &str) -> Option<&CertificateExtension> {
        self.items.iter().find(|ext| ext.oid() == &oid)
    }

    /// Appends an extension. Fails when one with the same OID is present.
    pub fn push(&mut self, extension: impl Into<CertificateExtension>) -> Result<()> {
        let extension = extension.into();
        let oid = extension.oid().to_string();
        if self.find(&oid).is_some() {
            return Err(Error::DuplicateExtension(oid));
        }
        self.items.add(extension)?;
        Ok(())
    }

    /// Removes the extension with `oid` from this list and returns it.
    pub fn remove_by_oid(&mut self, oid: &str) -> Result<Option<CertificateExtension>> {
        let Some(index) = self.items.position(|ext| ext.oid() == &oid) else {
            return Ok(None);
        };
        let removed = self.remove_at(index)?;
        Ok(Some(removed))
    }

    pub fn remove_at(&mut self, index: usize) -> Result<CertificateExtension> {
        let removed = self.items.remove_at(index)?;
        tracing::debug!(oid = %removed.oid(), index, remaining = self.items.len(), "extension removed");
        Ok(removed)
    }

    pub fn subscribe<F>(&self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&Notification<'_, CertificateExtension>) -> std::result::Result<(), NotSupported>
            + 'static,
    {
        self.items.subscribe(subscriber)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.items.unsubscribe(id)
    }

    pub fn close(&mut self) {
        self.items.close();
    }

    pub fn is_closed(&self) -> bool {
        self.items.is_closed()
    }

    /// Empties the list and reopens it.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// DER wrapped in the `[3] EXPLICIT` tag used by TBSCertificate.
    pub fn to_explicit_der(&self) -> Result<Vec<u8>> {
        let der: Vec<u8> = self.encode()?;
        Ok(write_tlv(EXTENSIONS_TAG.byte(), &der))
    }

    fn read(cursor: &Cursor<'_>) -> Result<Self> {
        let tag = cursor.tag()?;
        if tag != EXTENSIONS_TAG {
            return Self::read_sequence(cursor);
        }
        let mut inner = cursor.child()?;
        let list = Self::read_sequence(&inner)?;
        if inner.next_sibling()? {
            return Err(Error::TrailingData {
                offset: inner.offset(),
            });
        }
        Ok(list)
    }

    fn read_sequence(cursor: &Cursor<'_>) -> Result<Self> {
        let tag = cursor.tag()?;
        if tag != Tag::SEQUENCE {
            return Err(Error::UnexpectedTag {
                expected: "SEQUENCE or [3]",
                actual: tag,
                offset: cursor.offset(),
            });
        }
        let mut child = cursor.child()?;
        let mut list = Extensions::new();
        while !child.is_at_end() {
            let raw = RawExtension::read(&child)?;
            let extension = CertificateExtension::classify(&raw)?;
            list.push(extension)?;
            child.next_sibling()?;
        }
        if list.is_empty() {
            return Err(Error::ExtensionsEmpty);
        }
        tracing::debug!(count = list.len(), "decoded extensions");
        Ok(list)
    }
}

impl PartialEq for Extensions {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for Extensions {}

impl<'a> IntoIterator for &'a Extensions {
    type Item = &'a CertificateExtension;
    type IntoIter = std::slice::Iter<'a, CertificateExtension>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl DecodableFrom<[u8]> for Extensions {}

impl Decoder<[u8], Extensions> for [u8] {
    type Error = Error;

    /// Accepts a bare `SEQUENCE OF Extension` or one under `[3]`.
    fn decode(&self) -> Result<Extensions> {
        let mut cursor = Cursor::new(self);
        let list = Extensions::read(&cursor)?;
        if cursor.next_sibling()? {
            return Err(Error::TrailingData {
                offset: cursor.offset(),
            });
        }
        Ok(list)
    }
}

impl EncodableTo<Extensions> for Vec<u8> {}

impl Encoder<Extensions, Vec<u8>> for Extensions {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Err(Error::ExtensionsEmpty);
        }
        let mut content = Vec::new();
        for extension in self.iter() {
            content.extend(extension.to_der()?);
        }
        Ok(write_tlv(Tag::SEQUENCE.byte(), &content))
    }
}

impl fmt::Display for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, extension) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", extension)?;
        }
        Ok(())
    }
}

impl Serialize for Extensions {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

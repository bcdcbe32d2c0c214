use pkicodec_der::Tag;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Extensions: expected {expected}, found {actual} at offset {offset}")]
    UnexpectedTag {
        expected: &'static str,
        actual: Tag,
        offset: usize,
    },
    #[error("Extensions: at least one extension required")]
    ExtensionsEmpty,
    #[error("Extensions: unexpected data at offset {offset}")]
    TrailingData { offset: usize },
    #[error("Extensions: duplicate extension {0}")]
    DuplicateExtension(String),
    #[error(transparent)]
    Extension(#[from] crate::extensions::error::Error),
    #[error(transparent)]
    PkixTypes(#[from] pkicodec_pkix_types::Error),
    #[error("DER error: {0}")]
    Der(#[from] pkicodec_der::error::Error),
    #[error(transparent)]
    Collection(#[from] pkicodec_collection::Error),
}

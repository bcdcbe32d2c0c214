use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("collection is closed")]
    CollectionClosed,
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Returned by a subscriber that cannot handle a granular notification.
/// The collection then sends that subscriber a `Reset` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("notification not supported")]
pub struct NotSupported;

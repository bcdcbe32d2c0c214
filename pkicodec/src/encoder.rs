//! Encoder trait, the reverse direction of [`crate::decoder::Decoder`].

/// Converts `self` (of type `T`) into `E`.
pub trait Encoder<T: ?Sized, E: EncodableTo<T>> {
    /// The error type returned when encoding fails.
    type Error;

    /// Encodes `self` into type `E`.
    ///
    /// # Errors
    ///
    /// Returns an error if `self` cannot be represented as `E`, for
    /// example because a mandatory field was never set.
    fn encode(&self) -> Result<E, Self::Error>;
}

/// Marker trait indicating that type `E` can be encoded from type `T`.
pub trait EncodableTo<T: ?Sized> {}

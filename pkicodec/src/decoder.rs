//! Decoder trait for type-safe conversions.
//!
//! A source type `T` implements `Decoder<T, D>` to produce `D`; the
//! destination declares `DecodableFrom<T>` so that only intended
//! conversions compile.
//!
//! ```no_run
//! use pkicodec::decoder::{DecodableFrom, Decoder};
//!
//! struct Raw(Vec<u8>);
//! struct Length(usize);
//!
//! #[derive(Debug)]
//! struct Never;
//!
//! impl DecodableFrom<Raw> for Length {}
//!
//! impl Decoder<Raw, Length> for Raw {
//!     type Error = Never;
//!
//!     fn decode(&self) -> Result<Length, Self::Error> {
//!         Ok(Length(self.0.len()))
//!     }
//! }
//! ```

/// Converts `self` (of type `T`) into `D`.
pub trait Decoder<T: ?Sized, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not describe a valid `D`. No
    /// partially decoded value is ever produced.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait indicating that type `D` can be decoded from type `T`.
pub trait DecodableFrom<T: ?Sized> {}

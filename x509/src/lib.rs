//! # pkicodec-x509
//!
//! Typed X.509 extensions on top of the generic
//! [`Extension`](pkicodec_pkix_types::Extension) codec.
//!
//! [`CertificateExtension::classify`] resolves a decoded extension to one of
//! the concrete payload types in [`extensions`] by OID; OIDs it does not know
//! pass through unchanged. [`Extensions`] holds a whole extension list in an
//! observable collection.
//!
//! ```text
//! bytes ──▶ Extension (generic) ──▶ classify ──▶ CertificateExtension
//!                                                 ├─ BasicConstraints, KeyUsage, ...
//!                                                 └─ Unknown(Extension)
//! ```
//!
//! RFC 5280 Section 4.2 and the Microsoft PKI extensions.

#![forbid(unsafe_code)]

pub mod error;
pub mod extensions;

pub use error::{Error, Result};
pub use extensions::{CertificateExtension, Extensions, KNOWN_EXTENSIONS, TypedExtension};

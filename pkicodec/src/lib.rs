//! # pkicodec
//!
//! Conversion traits shared by every layer of the pkicodec workspace.
//!
//! Each layer turns one representation of PKI data into the next one:
//!
//! ```text
//! &[u8] → Der → ASN1Object / Element → AlgorithmIdentifier, Extension, ...
//!                                    → CertificateExtension (OID dispatch)
//! ```
//!
//! Decoding goes left to right through [`decoder::Decoder`], encoding goes
//! back through [`encoder::Encoder`]. Both traits are paired with a marker
//! trait ([`decoder::DecodableFrom`], [`encoder::EncodableTo`]) so a
//! conversion only exists where a layer explicitly declares it.
//!
//! ```ignore
//! use pkicodec::decoder::Decoder;
//! use pkicodec_der::Der;
//! use pkicodec_asn1::ASN1Object;
//!
//! let bytes = vec![0x30, 0x03, 0x02, 0x01, 0x07];
//! let der: Der = bytes.decode().unwrap();
//! let asn1: ASN1Object = der.decode().unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
pub mod encoder;

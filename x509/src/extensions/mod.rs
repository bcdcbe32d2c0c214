//! Typed X.509 extensions and the OID dispatcher.
//!
//! Every extension payload the crate understands has a struct implementing
//! [`Extension`]. [`CertificateExtension::classify`] picks the right one for a
//! generic extension by its OID and keeps anything else as
//! [`CertificateExtension::Unknown`].

use std::fmt;
use std::str::FromStr;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, Integer, ObjectIdentifier, OctetString};
use pkicodec_pkix_types::oid_name::oid_label;
use serde::Serialize;

mod application_policies;
mod authority_info_access;
mod authority_key_identifier;
mod basic_constraints;
mod ca_version;
mod certificate_policies;
mod certificate_template;
mod crl_distribution_points;
mod crl_number;
mod dispatch;
pub mod error;
mod extended_key_usage;
mod general_name;
mod inhibit_any_policy;
mod key_usage;
mod list;
mod name_constraints;
mod next_crl_publish;
mod ocsp;
mod policy_constraints;
mod policy_mappings;
mod subject_alt_name;
mod subject_key_identifier;

pub use application_policies::{
    ApplicationPolicies, ApplicationPolicyConstraints, ApplicationPolicyMappings,
};
pub use authority_info_access::{AccessDescription, AuthorityInfoAccess};
pub use authority_key_identifier::AuthorityKeyIdentifier;
pub use basic_constraints::BasicConstraints;
pub use ca_version::CaVersion;
pub use certificate_policies::{
    CertificatePolicies, NoticeReference, PolicyInformation, PolicyQualifierInfo, Qualifier,
    UserNotice,
};
pub use certificate_template::{CertificateTemplate, CertificateTemplateName};
pub use crl_distribution_points::{
    CrlDistributionPoints, DistributionPoint, DistributionPointName, FreshestCrl,
    PublishedCrlLocations, ReasonFlags,
};
pub use crl_number::{CrlNumber, DeltaCrlIndicator};
pub use dispatch::{CertificateExtension, KNOWN_EXTENSIONS, KnownExtension};
pub use extended_key_usage::ExtendedKeyUsage;
pub use general_name::{EdiPartyName, GeneralName, IpAddressOrRange, OtherName};
pub use inhibit_any_policy::InhibitAnyPolicy;
pub use key_usage::KeyUsage;
pub use list::Extensions;
pub use name_constraints::{GeneralSubtree, NameConstraints};
pub use next_crl_publish::NextCrlPublish;
pub use ocsp::{OcspNoCheck, OcspNonce};
pub use pkicodec_pkix_types::Extension as RawExtension;
pub use policy_constraints::PolicyConstraints;
pub use policy_mappings::{PolicyMapping, PolicyMappings};
pub use subject_alt_name::{IssuerAltName, SubjectAltName};
pub use subject_key_identifier::SubjectKeyIdentifier;

use self::error::{Error, Kind, Result};

/// A typed extension payload.
///
/// `parse` reads the DER held in the extension's OCTET STRING; `to_value`
/// produces it again.
pub trait Extension: Sized {
    /// Dotted OID, e.g. "2.5.29.19" for BasicConstraints
    const OID: &'static str;
    /// Conventional name, e.g. "basicConstraints"
    const NAME: &'static str;

    fn oid() -> Result<ObjectIdentifier> {
        Ok(ObjectIdentifier::from_str(Self::OID)?)
    }

    fn parse(value: &OctetString) -> Result<Self>;

    fn to_value(&self) -> Result<Vec<u8>>;
}

/// Decodes a payload that is a single element modeled through [`Element`].
pub(crate) fn parse_element<T>(value: &OctetString) -> Result<T>
where
    T: DecodableFrom<Element>,
    Element: Decoder<Element, T, Error = Error>,
{
    let element = Element::from_der(value.as_bytes())?;
    element.decode()
}

pub(crate) fn encode_element<T>(value: &T) -> Result<Vec<u8>>
where
    T: Encoder<T, Element, Error = Error>,
    Element: EncodableTo<T>,
{
    let element: Element = value.encode()?;
    Ok(element.to_der()?)
}

pub(crate) fn integer_u32(element: &Element, kind: Kind) -> Result<u32> {
    match element {
        Element::Integer(i) => i.to_u32().ok_or(Error::ValueOutOfRangeU32(kind)),
        _ => Err(Error::ExpectedInteger(kind)),
    }
}

/// `[n] IMPLICIT INTEGER` read as u32.
pub(crate) fn implicit_u32(element: &Element, kind: Kind) -> Result<u32> {
    let content = element.implicit_content()?;
    if content.is_empty() {
        return Err(Error::ExpectedInteger(kind));
    }
    Integer::from_der_content(content)?
        .to_u32()
        .ok_or(Error::ValueOutOfRangeU32(kind))
}

pub(crate) fn implicit_integer(slot: u8, value: u32) -> Element {
    Element::implicit_primitive(slot, Integer::from(u64::from(value)).to_der_content())
}

/// A concrete extension: the parsed value, its critical flag and the payload
/// it was read from (or encoded to).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedExtension<T> {
    oid: ObjectIdentifier,
    critical: bool,
    value: T,
    #[serde(skip)]
    raw: OctetString,
}

impl<T: Extension> TypedExtension<T> {
    /// Builds the extension from its fields. The payload is encoded once here.
    pub fn new(value: T, critical: bool) -> Result<Self> {
        let raw = OctetString::from(value.to_value()?);
        Ok(TypedExtension {
            oid: T::oid()?,
            critical,
            value,
            raw,
        })
    }

    /// Parses a generic extension, keeping its payload verbatim.
    pub fn from_generic(extension: &RawExtension) -> Result<Self> {
        if extension.oid() != &T::OID {
            return Err(Error::OidMismatch {
                expected: T::OID,
                actual: extension.oid().to_string(),
            });
        }
        Ok(TypedExtension {
            oid: extension.oid().clone(),
            critical: extension.is_critical(),
            value: T::parse(extension.value())?,
            raw: extension.value().clone(),
        })
    }
}

impl<T> TypedExtension<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn oid(&self) -> &ObjectIdentifier {
        &self.oid
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// The payload bytes exactly as decoded or as encoded by `new`.
    pub fn raw_value(&self) -> &OctetString {
        &self.raw
    }

    pub fn to_generic(&self) -> RawExtension {
        RawExtension::new(self.oid.clone(), self.critical, self.raw.clone())
    }
}

impl<T: Extension + fmt::Display> fmt::Display for TypedExtension<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_header(f, &self.oid, Some(T::NAME), self.critical)?;
        write_body(f, &self.value.to_string())
    }
}

/// Writes the label line shared by every extension, e.g.
/// `basicConstraints: critical`.
pub(crate) fn write_header(
    f: &mut fmt::Formatter<'_>,
    oid: &ObjectIdentifier,
    name: Option<&'static str>,
    critical: bool,
) -> fmt::Result {
    write!(f, "{}", oid_label(oid, name))?;
    if critical {
        write!(f, ": critical")?;
    }
    Ok(())
}

pub(crate) fn write_body(f: &mut fmt::Formatter<'_>, body: &str) -> fmt::Result {
    for line in body.lines() {
        write!(f, "\n    {}", line)?;
    }
    Ok(())
}

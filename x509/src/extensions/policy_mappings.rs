use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, ObjectIdentifier, OctetString};
use serde::Serialize;

use super::certificate_policies::CertificatePolicies;
use super::error::{Error, Kind, Result};
use super::{Extension, encode_element, parse_element};

/*
RFC 5280 Section 4.2.1.5

PolicyMappings ::= SEQUENCE SIZE (1..MAX) OF SEQUENCE {
     issuerDomainPolicy      CertPolicyId,
     subjectDomainPolicy     CertPolicyId }

anyPolicy MUST NOT be mapped in either direction.
*/

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyMapping {
    pub issuer_domain_policy: ObjectIdentifier,
    pub subject_domain_policy: ObjectIdentifier,
}

impl PolicyMapping {
    fn check(&self, kind: Kind) -> Result<()> {
        if self.issuer_domain_policy == CertificatePolicies::ANY_POLICY
            || self.subject_domain_policy == CertificatePolicies::ANY_POLICY
        {
            return Err(Error::AnyPolicyMapped(kind));
        }
        Ok(())
    }

    fn decode_as(element: &Element, kind: Kind) -> Result<Self> {
        let Element::Sequence(elements) = element else {
            return Err(Error::ExpectedSequence(kind));
        };
        let mapping = match elements.as_slice() {
            [Element::ObjectIdentifier(issuer), Element::ObjectIdentifier(subject)] => {
                PolicyMapping {
                    issuer_domain_policy: issuer.clone(),
                    subject_domain_policy: subject.clone(),
                }
            }
            [_, _] => return Err(Error::ExpectedOid(kind)),
            _ => {
                return Err(Error::InvalidElementCount {
                    kind,
                    expected: "2",
                    actual: elements.len(),
                });
            }
        };
        mapping.check(kind)?;
        Ok(mapping)
    }

    fn encode_as(&self, kind: Kind) -> Result<Element> {
        self.check(kind)?;
        Ok(Element::Sequence(vec![
            Element::ObjectIdentifier(self.issuer_domain_policy.clone()),
            Element::ObjectIdentifier(self.subject_domain_policy.clone()),
        ]))
    }
}

impl fmt::Display for PolicyMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.issuer_domain_policy, self.subject_domain_policy
        )
    }
}

pub(crate) fn decode_mappings(element: &Element, kind: Kind) -> Result<Vec<PolicyMapping>> {
    match element {
        Element::Sequence(elements) if elements.is_empty() => Err(Error::EmptySequence(kind)),
        Element::Sequence(elements) => elements
            .iter()
            .map(|e| PolicyMapping::decode_as(e, kind))
            .collect(),
        _ => Err(Error::ExpectedSequence(kind)),
    }
}

pub(crate) fn encode_mappings(mappings: &[PolicyMapping], kind: Kind) -> Result<Element> {
    if mappings.is_empty() {
        return Err(Error::EmptySequence(kind));
    }
    let elements = mappings
        .iter()
        .map(|m| m.encode_as(kind))
        .collect::<Result<Vec<_>>>()?;
    Ok(Element::Sequence(elements))
}

pub(crate) fn join_mappings(mappings: &[PolicyMapping]) -> String {
    mappings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyMappings {
    pub mappings: Vec<PolicyMapping>,
}

impl Extension for PolicyMappings {
    const OID: &'static str = "2.5.29.33";
    const NAME: &'static str = "policyMappings";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for PolicyMappings {}

impl Decoder<Element, PolicyMappings> for Element {
    type Error = Error;

    fn decode(&self) -> Result<PolicyMappings> {
        Ok(PolicyMappings {
            mappings: decode_mappings(self, Kind::PolicyMappings)?,
        })
    }
}

impl EncodableTo<PolicyMappings> for Element {}

impl Encoder<PolicyMappings, Element> for PolicyMappings {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        encode_mappings(&self.mappings, Kind::PolicyMappings)
    }
}

impl fmt::Display for PolicyMappings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join_mappings(&self.mappings))
    }
}

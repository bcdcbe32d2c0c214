use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, OctetString};
use serde::{Deserialize, Serialize};

use super::error::{Error, Kind, Result};
use super::{Extension, encode_element, implicit_integer, implicit_u32, parse_element};

/*
RFC 5280 Section 4.2.1.11

PolicyConstraints ::= SEQUENCE {
    requireExplicitPolicy           [0] SkipCerts OPTIONAL,
    inhibitPolicyMapping            [1] SkipCerts OPTIONAL }

SkipCerts ::= INTEGER (0..MAX)

An empty sequence MUST NOT be issued.
*/

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConstraints {
    pub require_explicit_policy: Option<u32>,
    pub inhibit_policy_mapping: Option<u32>,
}

impl PolicyConstraints {
    pub(crate) fn decode_as(element: &Element, kind: Kind) -> Result<Self> {
        let Element::Sequence(elements) = element else {
            return Err(Error::ExpectedSequence(kind));
        };
        let mut constraints = PolicyConstraints::default();
        for elem in elements {
            match elem.context_slot() {
                Some(0) if constraints.require_explicit_policy.is_none() => {
                    constraints.require_explicit_policy = Some(implicit_u32(elem, kind)?)
                }
                Some(1) if constraints.inhibit_policy_mapping.is_none() => {
                    constraints.inhibit_policy_mapping = Some(implicit_u32(elem, kind)?)
                }
                Some(slot) => return Err(Error::UnexpectedContextTag { kind, slot }),
                None => return Err(Error::UnexpectedElementType(kind)),
            }
        }
        if constraints.is_empty() {
            return Err(Error::EmptyContent(kind));
        }
        Ok(constraints)
    }

    pub(crate) fn encode_as(&self, kind: Kind) -> Result<Element> {
        if self.is_empty() {
            return Err(Error::EmptyContent(kind));
        }
        let require = self
            .require_explicit_policy
            .map(|n| implicit_integer(0, n));
        let inhibit = self.inhibit_policy_mapping.map(|n| implicit_integer(1, n));
        Ok(Element::Sequence(require.into_iter().chain(inhibit).collect()))
    }

    fn is_empty(&self) -> bool {
        self.require_explicit_policy.is_none() && self.inhibit_policy_mapping.is_none()
    }
}

impl Extension for PolicyConstraints {
    const OID: &'static str = "2.5.29.36";
    const NAME: &'static str = "policyConstraints";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for PolicyConstraints {}

impl Decoder<Element, PolicyConstraints> for Element {
    type Error = Error;

    fn decode(&self) -> Result<PolicyConstraints> {
        PolicyConstraints::decode_as(self, Kind::PolicyConstraints)
    }
}

impl EncodableTo<PolicyConstraints> for Element {}

impl Encoder<PolicyConstraints, Element> for PolicyConstraints {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        self.encode_as(Kind::PolicyConstraints)
    }
}

impl fmt::Display for PolicyConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        if let Some(n) = self.require_explicit_policy {
            lines.push(format!("Require Explicit Policy:{}", n));
        }
        if let Some(n) = self.inhibit_policy_mapping {
            lines.push(format!("Inhibit Policy Mapping:{}", n));
        }
        write!(f, "{}", lines.join("\n"))
    }
}

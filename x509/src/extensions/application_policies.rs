//! Microsoft application policy extensions.
//!
//! They carry the certificate policy syntaxes of RFC 5280 under Microsoft
//! OIDs, with application policy (EKU-like) OIDs in place of policy OIDs.

use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, OctetString};
use serde::Serialize;

use super::certificate_policies::{
    PolicyInformation, decode_policies, encode_policies, write_policies,
};
use super::error::{Error, Kind, Result};
use super::policy_constraints::PolicyConstraints;
use super::policy_mappings::{PolicyMapping, decode_mappings, encode_mappings, join_mappings};
use super::{Extension, encode_element, parse_element};

/// Application policies (1.3.6.1.4.1.311.21.10), syntax of certificatePolicies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationPolicies {
    pub policies: Vec<PolicyInformation>,
}

impl Extension for ApplicationPolicies {
    const OID: &'static str = "1.3.6.1.4.1.311.21.10";
    const NAME: &'static str = "applicationPolicies";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for ApplicationPolicies {}

impl Decoder<Element, ApplicationPolicies> for Element {
    type Error = Error;

    fn decode(&self) -> Result<ApplicationPolicies> {
        Ok(ApplicationPolicies {
            policies: decode_policies(self, Kind::ApplicationPolicies)?,
        })
    }
}

impl EncodableTo<ApplicationPolicies> for Element {}

impl Encoder<ApplicationPolicies, Element> for ApplicationPolicies {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        encode_policies(&self.policies, Kind::ApplicationPolicies)
    }
}

impl fmt::Display for ApplicationPolicies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_policies(f, &self.policies)
    }
}

/// Application policy mappings (1.3.6.1.4.1.311.21.11), syntax of policyMappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationPolicyMappings {
    pub mappings: Vec<PolicyMapping>,
}

impl Extension for ApplicationPolicyMappings {
    const OID: &'static str = "1.3.6.1.4.1.311.21.11";
    const NAME: &'static str = "applicationPolicyMappings";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for ApplicationPolicyMappings {}

impl Decoder<Element, ApplicationPolicyMappings> for Element {
    type Error = Error;

    fn decode(&self) -> Result<ApplicationPolicyMappings> {
        Ok(ApplicationPolicyMappings {
            mappings: decode_mappings(self, Kind::ApplicationPolicyMappings)?,
        })
    }
}

impl EncodableTo<ApplicationPolicyMappings> for Element {}

impl Encoder<ApplicationPolicyMappings, Element> for ApplicationPolicyMappings {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        encode_mappings(&self.mappings, Kind::ApplicationPolicyMappings)
    }
}

impl fmt::Display for ApplicationPolicyMappings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join_mappings(&self.mappings))
    }
}

/// Application policy constraints (1.3.6.1.4.1.311.21.12), syntax of
/// policyConstraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationPolicyConstraints {
    pub constraints: PolicyConstraints,
}

impl Extension for ApplicationPolicyConstraints {
    const OID: &'static str = "1.3.6.1.4.1.311.21.12";
    const NAME: &'static str = "applicationPolicyConstraints";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for ApplicationPolicyConstraints {}

impl Decoder<Element, ApplicationPolicyConstraints> for Element {
    type Error = Error;

    fn decode(&self) -> Result<ApplicationPolicyConstraints> {
        Ok(ApplicationPolicyConstraints {
            constraints: PolicyConstraints::decode_as(self, Kind::ApplicationPolicyConstraints)?,
        })
    }
}

impl EncodableTo<ApplicationPolicyConstraints> for Element {}

impl Encoder<ApplicationPolicyConstraints, Element> for ApplicationPolicyConstraints {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        self.constraints
            .encode_as(Kind::ApplicationPolicyConstraints)
    }
}

impl fmt::Display for ApplicationPolicyConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constraints)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pkicodec_asn1::ObjectIdentifier;
    use rstest::rstest;

    use super::*;

    fn oid(s: &str) -> ObjectIdentifier {
        ObjectIdentifier::from_str(s).unwrap()
    }

    #[test]
    fn test_application_policies() {
        // SEQUENCE { SEQUENCE { clientAuth } }
        let der = vec![
            0x30, 0x0c, 0x30, 0x0a, 0x06, 0x08, 0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x02,
        ];
        let policies = ApplicationPolicies::parse(&OctetString::from(der.clone())).unwrap();
        assert_eq!(
            vec![PolicyInformation::new(oid("1.3.6.1.5.5.7.3.2"))],
            policies.policies
        );
        assert_eq!("Policy: 1.3.6.1.5.5.7.3.2", policies.to_string());
        assert_eq!(der, policies.to_value().unwrap());
    }

    #[test]
    fn test_application_policy_mappings() {
        let input = Element::Sequence(vec![Element::Sequence(vec![
            Element::ObjectIdentifier(oid("1.3.6.1.5.5.7.3.1")),
            Element::ObjectIdentifier(oid("1.3.6.1.5.5.7.3.2")),
        ])]);
        let mappings: ApplicationPolicyMappings = input.decode().unwrap();
        assert_eq!("1.3.6.1.5.5.7.3.1:1.3.6.1.5.5.7.3.2", mappings.to_string());
        let encoded: Element = mappings.encode().unwrap();
        assert_eq!(input, encoded);
    }

    #[test]
    fn test_application_policy_constraints() {
        let der = vec![0x30, 0x03, 0x80, 0x01, 0x00];
        let apc = ApplicationPolicyConstraints::parse(&OctetString::from(der.clone())).unwrap();
        assert_eq!(Some(0), apc.constraints.require_explicit_policy);
        assert_eq!("Require Explicit Policy:0", apc.to_string());
        assert_eq!(der, apc.to_value().unwrap());
    }

    #[rstest]
    #[case(vec![0x30, 0x00], Error::EmptySequence(Kind::ApplicationPolicies))]
    #[case(vec![0x05, 0x00], Error::ExpectedSequence(Kind::ApplicationPolicies))]
    fn test_application_policies_invalid(#[case] der: Vec<u8>, #[case] expected: Error) {
        let result = ApplicationPolicies::parse(&OctetString::from(der));
        assert_eq!(Err(expected), result);
    }

    #[test]
    fn test_application_policy_constraints_empty() {
        let result = ApplicationPolicyConstraints::parse(&OctetString::from(vec![0x30, 0x00]));
        assert_eq!(
            Err(Error::EmptyContent(Kind::ApplicationPolicyConstraints)),
            result
        );
    }
}

use std::fmt;

use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{Element, Integer, ObjectIdentifier, OctetString};
use pkicodec_pkix_types::DirectoryString;
use pkicodec_pkix_types::oid_name::oid_label;
use serde::Serialize;

use super::error::{Error, Kind, Result};
use super::{Extension, encode_element, parse_element};

/*
RFC 5280 Section 4.2.1.4

CertificatePolicies ::= SEQUENCE SIZE (1..MAX) OF PolicyInformation

PolicyInformation ::= SEQUENCE {
    policyIdentifier   CertPolicyId,
    policyQualifiers   SEQUENCE SIZE (1..MAX) OF PolicyQualifierInfo OPTIONAL }

PolicyQualifierInfo ::= SEQUENCE {
    policyQualifierId  PolicyQualifierId,
    qualifier          ANY DEFINED BY policyQualifierId }

UserNotice ::= SEQUENCE {
    noticeRef        NoticeReference OPTIONAL,
    explicitText     DisplayText OPTIONAL }

NoticeReference ::= SEQUENCE {
    organization     DisplayText,
    noticeNumbers    SEQUENCE OF INTEGER }
*/

/// One policy entry. Shared with the Microsoft application policies
/// extension, which uses the same syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyInformation {
    pub policy_identifier: ObjectIdentifier,
    pub policy_qualifiers: Option<Vec<PolicyQualifierInfo>>,
}

impl PolicyInformation {
    pub fn new(policy_identifier: ObjectIdentifier) -> Self {
        PolicyInformation {
            policy_identifier,
            policy_qualifiers: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyQualifierInfo {
    pub policy_qualifier_id: ObjectIdentifier,
    pub qualifier: Qualifier,
}

impl PolicyQualifierInfo {
    pub const ID_QT_CPS: &'static str = "1.3.6.1.5.5.7.2.1";
    pub const ID_QT_UNOTICE: &'static str = "1.3.6.1.5.5.7.2.2";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Qualifier {
    CpsUri(String),
    UserNotice(UserNotice),
    /// DER of a qualifier this crate has no model for
    Other(Vec<u8>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserNotice {
    pub notice_ref: Option<NoticeReference>,
    pub explicit_text: Option<DirectoryString>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeReference {
    pub organization: DirectoryString,
    pub notice_numbers: Vec<Integer>,
}

impl DecodableFrom<Element> for NoticeReference {}

impl Decoder<Element, NoticeReference> for Element {
    type Error = Error;

    fn decode(&self) -> Result<NoticeReference> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence(Kind::PolicyInformation));
        };
        let [organization, Element::Sequence(numbers)] = elements.as_slice() else {
            return Err(Error::InvalidElementCount {
                kind: Kind::PolicyInformation,
                expected: "organization and noticeNumbers",
                actual: elements.len(),
            });
        };
        let notice_numbers = numbers
            .iter()
            .map(|n| match n {
                Element::Integer(i) => Ok(i.clone()),
                _ => Err(Error::ExpectedInteger(Kind::PolicyInformation)),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(NoticeReference {
            organization: organization.decode()?,
            notice_numbers,
        })
    }
}

impl EncodableTo<NoticeReference> for Element {}

impl Encoder<NoticeReference, Element> for NoticeReference {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let numbers = self
            .notice_numbers
            .iter()
            .cloned()
            .map(Element::Integer)
            .collect();
        Ok(Element::Sequence(vec![
            self.organization.encode()?,
            Element::Sequence(numbers),
        ]))
    }
}

impl DecodableFrom<Element> for UserNotice {}

impl Decoder<Element, UserNotice> for Element {
    type Error = Error;

    fn decode(&self) -> Result<UserNotice> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence(Kind::PolicyInformation));
        };
        let mut notice = UserNotice::default();
        for elem in elements {
            match elem {
                Element::Sequence(_) if notice.notice_ref.is_none() && notice.explicit_text.is_none() => {
                    notice.notice_ref = Some(elem.decode()?)
                }
                _ if notice.explicit_text.is_none() => notice.explicit_text = Some(elem.decode()?),
                _ => return Err(Error::UnexpectedElementType(Kind::PolicyInformation)),
            }
        }
        Ok(notice)
    }
}

impl EncodableTo<UserNotice> for Element {}

impl Encoder<UserNotice, Element> for UserNotice {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = Vec::with_capacity(2);
        if let Some(notice_ref) = &self.notice_ref {
            elements.push(notice_ref.encode()?);
        }
        if let Some(text) = &self.explicit_text {
            elements.push(text.encode()?);
        }
        Ok(Element::Sequence(elements))
    }
}

impl DecodableFrom<Element> for PolicyQualifierInfo {}

impl Decoder<Element, PolicyQualifierInfo> for Element {
    type Error = Error;

    fn decode(&self) -> Result<PolicyQualifierInfo> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence(Kind::PolicyInformation));
        };
        let [Element::ObjectIdentifier(id), qualifier] = elements.as_slice() else {
            return Err(Error::InvalidElementCount {
                kind: Kind::PolicyInformation,
                expected: "policyQualifierId and qualifier",
                actual: elements.len(),
            });
        };
        let qualifier = if id == &PolicyQualifierInfo::ID_QT_CPS {
            match qualifier {
                Element::IA5String(uri) => Qualifier::CpsUri(uri.clone()),
                _ => return Err(Error::UnexpectedElementType(Kind::PolicyInformation)),
            }
        } else if id == &PolicyQualifierInfo::ID_QT_UNOTICE {
            Qualifier::UserNotice(qualifier.decode()?)
        } else {
            Qualifier::Other(qualifier.to_der()?)
        };
        Ok(PolicyQualifierInfo {
            policy_qualifier_id: id.clone(),
            qualifier,
        })
    }
}

impl EncodableTo<PolicyQualifierInfo> for Element {}

impl Encoder<PolicyQualifierInfo, Element> for PolicyQualifierInfo {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let qualifier = match &self.qualifier {
            Qualifier::CpsUri(uri) => Element::IA5String(uri.clone()),
            Qualifier::UserNotice(notice) => notice.encode()?,
            Qualifier::Other(der) => Element::from_der(der)?,
        };
        Ok(Element::Sequence(vec![
            Element::ObjectIdentifier(self.policy_qualifier_id.clone()),
            qualifier,
        ]))
    }
}

impl DecodableFrom<Element> for PolicyInformation {}

impl Decoder<Element, PolicyInformation> for Element {
    type Error = Error;

    fn decode(&self) -> Result<PolicyInformation> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence(Kind::PolicyInformation));
        };
        match elements.as_slice() {
            [Element::ObjectIdentifier(id)] => Ok(PolicyInformation::new(id.clone())),
            [Element::ObjectIdentifier(id), Element::Sequence(qualifiers)] => {
                if qualifiers.is_empty() {
                    return Err(Error::EmptySequence(Kind::PolicyInformation));
                }
                Ok(PolicyInformation {
                    policy_identifier: id.clone(),
                    policy_qualifiers: Some(
                        qualifiers
                            .iter()
                            .map(|q| q.decode())
                            .collect::<Result<Vec<_>>>()?,
                    ),
                })
            }
            [first, ..] if !matches!(first, Element::ObjectIdentifier(_)) => {
                Err(Error::ExpectedOid(Kind::PolicyInformation))
            }
            _ => Err(Error::InvalidElementCount {
                kind: Kind::PolicyInformation,
                expected: "1 or 2",
                actual: elements.len(),
            }),
        }
    }
}

impl EncodableTo<PolicyInformation> for Element {}

impl Encoder<PolicyInformation, Element> for PolicyInformation {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = vec![Element::ObjectIdentifier(self.policy_identifier.clone())];
        if let Some(qualifiers) = &self.policy_qualifiers {
            if qualifiers.is_empty() {
                return Err(Error::EmptySequence(Kind::PolicyInformation));
            }
            elements.push(Element::Sequence(
                qualifiers
                    .iter()
                    .map(|q| q.encode())
                    .collect::<Result<Vec<_>>>()?,
            ));
        }
        Ok(Element::Sequence(elements))
    }
}

impl fmt::Display for PolicyInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = (self.policy_identifier == CertificatePolicies::ANY_POLICY).then_some("anyPolicy");
        write!(f, "Policy: {}", oid_label(&self.policy_identifier, name))?;
        for info in self.policy_qualifiers.iter().flatten() {
            match &info.qualifier {
                Qualifier::CpsUri(uri) => write!(f, "\n  CPS: {}", uri)?,
                Qualifier::UserNotice(notice) => {
                    write!(f, "\n  User Notice:")?;
                    if let Some(notice_ref) = &notice.notice_ref {
                        let numbers: Vec<String> =
                            notice_ref.notice_numbers.iter().map(Integer::to_string).collect();
                        write!(f, "\n    Organization: {}", notice_ref.organization)?;
                        write!(f, "\n    Number: {}", numbers.join(", "))?;
                    }
                    if let Some(text) = &notice.explicit_text {
                        write!(f, "\n    Explicit Text: {}", text)?;
                    }
                }
                Qualifier::Other(_) => write!(f, "\n  {}: <unsupported>", info.policy_qualifier_id)?,
            }
        }
        Ok(())
    }
}

pub(crate) fn decode_policies(element: &Element, kind: Kind) -> Result<Vec<PolicyInformation>> {
    match element {
        Element::Sequence(elements) if elements.is_empty() => Err(Error::EmptySequence(kind)),
        Element::Sequence(elements) => elements.iter().map(|e| e.decode()).collect(),
        _ => Err(Error::ExpectedSequence(kind)),
    }
}

pub(crate) fn encode_policies(policies: &[PolicyInformation], kind: Kind) -> Result<Element> {
    if policies.is_empty() {
        return Err(Error::EmptySequence(kind));
    }
    Ok(Element::Sequence(
        policies
            .iter()
            .map(|p| p.encode())
            .collect::<Result<Vec<_>>>()?,
    ))
}

pub(crate) fn write_policies(f: &mut fmt::Formatter<'_>, policies: &[PolicyInformation]) -> fmt::Result {
    for (i, policy) in policies.iter().enumerate() {
        if i > 0 {
            writeln!(f)?;
        }
        write!(f, "{}", policy)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificatePolicies {
    pub policies: Vec<PolicyInformation>,
}

impl CertificatePolicies {
    pub const ANY_POLICY: &'static str = "2.5.29.32.0";
}

impl Extension for CertificatePolicies {
    const OID: &'static str = "2.5.29.32";
    const NAME: &'static str = "certificatePolicies";

    fn parse(value: &OctetString) -> Result<Self> {
        parse_element(value)
    }

    fn to_value(&self) -> Result<Vec<u8>> {
        encode_element(self)
    }
}

impl DecodableFrom<Element> for CertificatePolicies {}

impl Decoder<Element, CertificatePolicies> for Element {
    type Error = Error;

    fn decode(&self) -> Result<CertificatePolicies> {
        Ok(CertificatePolicies {
            policies: decode_policies(self, Kind::CertificatePolicies)?,
        })
    }
}

impl EncodableTo<CertificatePolicies> for Element {}

impl Encoder<CertificatePolicies, Element> for CertificatePolicies {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        encode_policies(&self.policies, Kind::CertificatePolicies)
    }
}

impl fmt::Display for CertificatePolicies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_policies(f, &self.policies)
    }
}

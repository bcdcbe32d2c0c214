use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use pkicodec::decoder::{DecodableFrom, Decoder};
use pkicodec::encoder::{EncodableTo, Encoder};
use pkicodec_asn1::{ASN1Object, Element, ObjectIdentifier};
use pkicodec_der::Der;
use pkicodec_pkix_types::{DirectoryString, Name};
use serde::Serialize;

use super::error::{Error, Kind, Result};

/// Represents an IP address or an IP network range (for NameConstraints)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum IpAddressOrRange {
    /// Single address (4 or 16 octets)
    Address(IpAddr),
    /// Address plus netmask (8 or 32 octets), used by NameConstraints
    Network(IpNet),
}

impl IpAddressOrRange {
    pub fn is_network(&self) -> bool {
        matches!(self, IpAddressOrRange::Network(_))
    }

    pub fn addr(&self) -> IpAddr {
        match self {
            IpAddressOrRange::Address(addr) => *addr,
            IpAddressOrRange::Network(net) => net.addr(),
        }
    }

    fn from_octets(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            4 => {
                let octets: [u8; 4] = bytes.try_into().map_err(|_| Error::InvalidIpAddressLength(4))?;
                Ok(IpAddressOrRange::Address(IpAddr::from(octets)))
            }
            16 => {
                let octets: [u8; 16] =
                    bytes.try_into().map_err(|_| Error::InvalidIpAddressLength(16))?;
                Ok(IpAddressOrRange::Address(IpAddr::from(octets)))
            }
            8 => {
                let (addr, mask) = bytes.split_at(4);
                let addr: [u8; 4] = addr.try_into().map_err(|_| Error::InvalidIpAddressLength(8))?;
                let mask: [u8; 4] = mask.try_into().map_err(|_| Error::InvalidIpAddressLength(8))?;
                let prefix = prefix_len(u32::from_be_bytes(mask) as u128, 32)?;
                let net = Ipv4Net::new(Ipv4Addr::from(addr), prefix)
                    .map_err(|_| Error::InvalidNetmask)?;
                Ok(IpAddressOrRange::Network(IpNet::V4(net)))
            }
            32 => {
                let (addr, mask) = bytes.split_at(16);
                let addr: [u8; 16] =
                    addr.try_into().map_err(|_| Error::InvalidIpAddressLength(32))?;
                let mask: [u8; 16] =
                    mask.try_into().map_err(|_| Error::InvalidIpAddressLength(32))?;
                let prefix = prefix_len(u128::from_be_bytes(mask), 128)?;
                let net = Ipv6Net::new(Ipv6Addr::from(addr), prefix)
                    .map_err(|_| Error::InvalidNetmask)?;
                Ok(IpAddressOrRange::Network(IpNet::V6(net)))
            }
            len => Err(Error::InvalidIpAddressLength(len)),
        }
    }

    fn to_octets(&self) -> Vec<u8> {
        match self {
            IpAddressOrRange::Address(IpAddr::V4(addr)) => addr.octets().to_vec(),
            IpAddressOrRange::Address(IpAddr::V6(addr)) => addr.octets().to_vec(),
            IpAddressOrRange::Network(IpNet::V4(net)) => {
                [&net.addr().octets()[..], &net.netmask().octets()[..]].concat()
            }
            IpAddressOrRange::Network(IpNet::V6(net)) => {
                [&net.addr().octets()[..], &net.netmask().octets()[..]].concat()
            }
        }
    }
}

/// Prefix length of a netmask held in the low `bits` bits of `mask`.
fn prefix_len(mask: u128, bits: u32) -> Result<u8> {
    let shifted = mask << (128 - bits);
    let prefix = shifted.leading_ones();
    // Everything after the run of ones must be zero.
    if prefix < 128 && shifted << prefix != 0 {
        return Err(Error::InvalidNetmask);
    }
    Ok(prefix.min(bits) as u8)
}

impl fmt::Display for IpAddressOrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpAddressOrRange::Address(addr) => write!(f, "{}", addr),
            IpAddressOrRange::Network(net) => write!(f, "{}", net),
        }
    }
}

/*
RFC 5280 Section 4.2.1.6
GeneralName ::= CHOICE {
    otherName                 [0] OtherName,
    rfc822Name                [1] IA5String,
    dNSName                   [2] IA5String,
    x400Address               [3] ORAddress,
    directoryName             [4] Name,
    ediPartyName              [5] EDIPartyName,
    uniformResourceIdentifier [6] IA5String,
    iPAddress                 [7] OCTET STRING,
    registeredID              [8] OBJECT IDENTIFIER
}

OtherName ::= SEQUENCE {
    type-id    OBJECT IDENTIFIER,
    value      [0] EXPLICIT ANY DEFINED BY type-id
}

EDIPartyName ::= SEQUENCE {
    nameAssigner [0] DirectoryString OPTIONAL,
    partyName    [1] DirectoryString
}
*/

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GeneralName {
    OtherName(OtherName),
    Rfc822Name(String),
    DnsName(String),
    /// ORAddress content octets, kept undecoded
    X400Address(Vec<u8>),
    DirectoryName(Name),
    EdiPartyName(EdiPartyName),
    Uri(String),
    IpAddress(IpAddressOrRange),
    RegisteredId(ObjectIdentifier),
}

/// OtherName: the value is kept as the DER of the element inside `[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OtherName {
    pub type_id: ObjectIdentifier,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdiPartyName {
    pub name_assigner: Option<DirectoryString>,
    pub party_name: DirectoryString,
}

fn ia5(content: &[u8]) -> Result<String> {
    if !content.is_ascii() {
        return Err(Error::GeneralNameInvalidAscii);
    }
    String::from_utf8(content.to_vec()).map_err(|_| Error::GeneralNameInvalidAscii)
}

impl DecodableFrom<Element> for GeneralName {}

impl Decoder<Element, GeneralName> for Element {
    type Error = Error;

    fn decode(&self) -> Result<GeneralName> {
        let slot = self
            .context_slot()
            .ok_or(Error::UnexpectedElementType(Kind::GeneralName))?;
        match slot {
            0 => {
                let (type_id, value) = match self.implicit_children()? {
                    [Element::ObjectIdentifier(oid), value] if value.context_slot() == Some(0) => {
                        (oid.clone(), value.explicit_inner()?.to_der()?)
                    }
                    _ => return Err(Error::OtherNameInvalidStructure),
                };
                Ok(GeneralName::OtherName(OtherName { type_id, value }))
            }
            1 => Ok(GeneralName::Rfc822Name(ia5(self.implicit_content()?)?)),
            2 => Ok(GeneralName::DnsName(ia5(self.implicit_content()?)?)),
            3 => {
                let content = match self.implicit_content() {
                    Ok(content) => content.to_vec(),
                    Err(_) => self
                        .implicit_children()?
                        .iter()
                        .map(Element::to_der)
                        .collect::<std::result::Result<Vec<_>, _>>()?
                        .concat(),
                };
                Ok(GeneralName::X400Address(content))
            }
            4 => {
                let name: Name = self.explicit_inner()?.decode()?;
                Ok(GeneralName::DirectoryName(name))
            }
            5 => {
                let mut name_assigner = None;
                let mut party_name = None;
                for field in self.implicit_children()? {
                    let value: DirectoryString = field.explicit_inner()?.decode()?;
                    match field.context_slot() {
                        Some(0) => name_assigner = Some(value),
                        Some(1) => party_name = Some(value),
                        Some(slot) => {
                            return Err(Error::UnexpectedContextTag {
                                kind: Kind::GeneralName,
                                slot,
                            });
                        }
                        None => return Err(Error::UnexpectedElementType(Kind::GeneralName)),
                    }
                }
                Ok(GeneralName::EdiPartyName(EdiPartyName {
                    name_assigner,
                    party_name: party_name.ok_or(Error::EdiPartyNameMissingPartyName)?,
                }))
            }
            6 => Ok(GeneralName::Uri(ia5(self.implicit_content()?)?)),
            7 => Ok(GeneralName::IpAddress(IpAddressOrRange::from_octets(
                self.implicit_content()?,
            )?)),
            8 => Ok(GeneralName::RegisteredId(ObjectIdentifier::try_from(
                self.implicit_content()?,
            )?)),
            _ => Err(Error::UnknownGeneralNameTag(slot)),
        }
    }
}

impl EncodableTo<GeneralName> for Element {}

impl Encoder<GeneralName, Element> for GeneralName {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        match self {
            GeneralName::OtherName(other) => {
                let value = Element::from_der(&other.value)?;
                Ok(Element::implicit_constructed(
                    0,
                    vec![
                        Element::ObjectIdentifier(other.type_id.clone()),
                        Element::explicit(0, value),
                    ],
                ))
            }
            GeneralName::Rfc822Name(s) => Ok(Element::implicit_primitive(1, s.as_bytes())),
            GeneralName::DnsName(s) => Ok(Element::implicit_primitive(2, s.as_bytes())),
            GeneralName::X400Address(content) => {
                let der: Der = content
                    .as_slice()
                    .decode()
                    .map_err(pkicodec_asn1::error::Error::from)?;
                let object: ASN1Object = der.decode()?;
                Ok(Element::implicit_constructed(3, object.elements().to_vec()))
            }
            GeneralName::DirectoryName(name) => Ok(Element::explicit(4, name.encode()?)),
            GeneralName::EdiPartyName(edi) => {
                let mut fields = Vec::with_capacity(2);
                if let Some(assigner) = &edi.name_assigner {
                    fields.push(Element::explicit(0, assigner.encode()?));
                }
                fields.push(Element::explicit(1, edi.party_name.encode()?));
                Ok(Element::implicit_constructed(5, fields))
            }
            GeneralName::Uri(s) => Ok(Element::implicit_primitive(6, s.as_bytes())),
            GeneralName::IpAddress(ip) => Ok(Element::implicit_primitive(7, ip.to_octets())),
            GeneralName::RegisteredId(oid) => {
                Ok(Element::implicit_primitive(8, oid.to_der_content()?))
            }
        }
    }
}

impl fmt::Display for GeneralName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneralName::DnsName(dns) => write!(f, "DNS:{}", dns),
            GeneralName::IpAddress(ip) => write!(f, "IP Address:{}", ip),
            GeneralName::Rfc822Name(email) => write!(f, "email:{}", email),
            GeneralName::Uri(uri) => write!(f, "URI:{}", uri),
            GeneralName::DirectoryName(name) => write!(f, "DirName:{}", name),
            GeneralName::RegisteredId(oid) => write!(f, "Registered ID:{}", oid),
            GeneralName::OtherName(other) => write!(f, "othername:{}", other.type_id),
            GeneralName::X400Address(_) => write!(f, "X400Address"),
            GeneralName::EdiPartyName(edi) => write!(f, "EdiPartyName:{}", edi.party_name),
        }
    }
}

/// Decodes `GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName` from
/// already-unwrapped children.
pub(crate) fn decode_general_names(elements: &[Element]) -> Result<Vec<GeneralName>> {
    elements.iter().map(|e| e.decode()).collect()
}

pub(crate) fn encode_general_names(names: &[GeneralName]) -> Result<Vec<Element>> {
    names.iter().map(|n| n.encode()).collect()
}

/// Joins names the way they are printed inside extension bodies.
pub(crate) fn join_names(names: &[GeneralName]) -> String {
    names
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use pkicodec_pkix_types::AttributeTypeAndValue;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::dns(
        vec![0x82, 0x0b, b'e', b'x', b'a', b'm', b'p', b'l', b'e', b'.', b'c', b'o', b'm'],
        GeneralName::DnsName("example.com".to_string())
    )]
    #[case::email(
        vec![0x81, 0x05, b'a', b'@', b'b', b'.', b'c'],
        GeneralName::Rfc822Name("a@b.c".to_string())
    )]
    #[case::uri(
        vec![0x86, 0x08, b'h', b't', b't', b'p', b':', b'/', b'/', b'x'],
        GeneralName::Uri("http://x".to_string())
    )]
    #[case::ipv4(
        vec![0x87, 0x04, 192, 168, 1, 1],
        GeneralName::IpAddress(IpAddressOrRange::Address(IpAddr::from([192, 168, 1, 1])))
    )]
    #[case::ipv4_network(
        vec![0x87, 0x08, 10, 0, 0, 0, 255, 0, 0, 0],
        GeneralName::IpAddress(IpAddressOrRange::Network("10.0.0.0/8".parse().unwrap()))
    )]
    #[case::registered_id(
        vec![0x88, 0x03, 0x2a, 0x03, 0x04],
        GeneralName::RegisteredId("1.2.3.4".parse().unwrap())
    )]
    fn test_general_name_der(#[case] der: Vec<u8>, #[case] expected: GeneralName) {
        let element = Element::from_der(&der).unwrap();
        let name: GeneralName = element.decode().unwrap();
        assert_eq!(expected, name);

        let encoded: Element = name.encode().unwrap();
        assert_eq!(der, encoded.to_der().unwrap());
    }

    #[test]
    fn test_ipv6_network() {
        let mut der = vec![0x87, 0x20];
        der.extend_from_slice(&"2001:db8::".parse::<Ipv6Addr>().unwrap().octets());
        der.extend_from_slice(&[0xff; 4]);
        der.extend_from_slice(&[0x00; 12]);
        let name: GeneralName = Element::from_der(&der).unwrap().decode().unwrap();
        assert_eq!("IP Address:2001:db8::/32", name.to_string());
        let encoded: Element = name.encode().unwrap();
        assert_eq!(der, encoded.to_der().unwrap());
    }

    #[test]
    fn test_directory_name() {
        let name = Name::new(vec![
            AttributeTypeAndValue::new(AttributeTypeAndValue::OID_COMMON_NAME.parse().unwrap(), "ca").into(),
        ]);
        let general = GeneralName::DirectoryName(name.clone());
        let element: Element = general.encode().unwrap();
        let der = element.to_der().unwrap();
        // [4] constructed wrapping the Name SEQUENCE
        assert_eq!(0xa4, der[0]);
        assert_eq!(0x30, der[2]);

        let decoded: GeneralName = Element::from_der(&der).unwrap().decode().unwrap();
        assert_eq!(general, decoded);
        assert_eq!("DirName:CN=ca", decoded.to_string());
    }

    #[test]
    fn test_other_name() {
        // [0] { OID 1.3.6.1.4.1.311.20.2.3, [0] { UTF8String "u@x" } }
        let der = vec![
            0xa0, 0x15, 0x06, 0x0a, 0x2b, 0x06, 0x01, 0x04, 0x01, 0x82, 0x37, 0x14, 0x02, 0x03,
            0xa0, 0x07, 0x0c, 0x05, b'u', b'@', b'x', b'.', b'y',
        ];
        let name: GeneralName = Element::from_der(&der).unwrap().decode().unwrap();
        match &name {
            GeneralName::OtherName(other) => {
                assert_eq!("1.3.6.1.4.1.311.20.2.3", other.type_id.to_string());
                assert_eq!(vec![0x0c, 0x05, b'u', b'@', b'x', b'.', b'y'], other.value);
            }
            other => panic!("unexpected {other:?}"),
        }
        let encoded: Element = name.encode().unwrap();
        assert_eq!(der, encoded.to_der().unwrap());
    }

    #[test]
    fn test_edi_party_name() {
        let edi = GeneralName::EdiPartyName(EdiPartyName {
            name_assigner: Some(DirectoryString::new("Assigner")),
            party_name: DirectoryString::new("Party"),
        });
        let element: Element = edi.encode().unwrap();
        let decoded: GeneralName = Element::from_der(&element.to_der().unwrap())
            .unwrap()
            .decode()
            .unwrap();
        assert_eq!(edi, decoded);
    }

    #[rstest]
    #[case::unknown_tag(vec![0x89, 0x01, 0x00], Error::UnknownGeneralNameTag(9))]
    #[case::ip_length(vec![0x87, 0x03, 1, 2, 3], Error::InvalidIpAddressLength(3))]
    #[case::netmask(vec![0x87, 0x08, 10, 0, 0, 0, 255, 0, 255, 0], Error::InvalidNetmask)]
    #[case::non_ascii(vec![0x82, 0x01, 0xc3], Error::GeneralNameInvalidAscii)]
    #[case::edi_missing_party(
        vec![0xa5, 0x06, 0xa0, 0x04, 0x13, 0x02, b'a', b'b'],
        Error::EdiPartyNameMissingPartyName
    )]
    #[case::other_name_shape(vec![0xa0, 0x02, 0x05, 0x00], Error::OtherNameInvalidStructure)]
    #[case::universal(vec![0x05, 0x00], Error::UnexpectedElementType(Kind::GeneralName))]
    fn test_general_name_invalid(#[case] der: Vec<u8>, #[case] expected: Error) {
        let element = Element::from_der(&der).unwrap();
        let result: Result<GeneralName> = element.decode();
        assert_eq!(Err(expected), result);
    }
}

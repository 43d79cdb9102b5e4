use crate::error::SchemaError;
use crate::node::DerNode;
use crate::schema::{compare_schema, Template};
use crate::traits::SchemaObject;
use crate::utils::format_serial;
use crate::x509::{SchemaNames, X509Name};
use asn1_rs::{Oid, Tag};
use data_encoding::HEXUPPER;
use log::debug;
use serde_json::{json, Value};
use std::convert::TryFrom;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// <pre>
/// OtherName ::= SEQUENCE {
///      type-id    OBJECT IDENTIFIER,
///      value      [0] EXPLICIT ANY DEFINED BY type-id }
/// </pre>
#[derive(Clone, Debug, PartialEq)]
pub struct OtherName {
    pub type_id: Oid<'static>,
    /// Content of the `[0] EXPLICIT` value
    pub value: DerNode,
}

#[derive(Clone, Debug, PartialEq)]
/// Represents a GeneralName as defined in RFC5280.
///
/// X.400 addresses and EDIPartyName are kept unparsed, as the list of their fields.
///
/// String formats are not validated.
///
/// <pre>
/// GeneralName ::= CHOICE {
///      otherName                       [0]     OtherName,
///      rfc822Name                      [1]     IA5String,
///      dNSName                         [2]     IA5String,
///      x400Address                     [3]     ORAddress,
///      directoryName                   [4]     Name,
///      ediPartyName                    [5]     EDIPartyName,
///      uniformResourceIdentifier       [6]     IA5String,
///      iPAddress                       [7]     OCTET STRING,
///      registeredID                    [8]     OBJECT IDENTIFIER }
/// </pre>
pub enum GeneralName {
    OtherName(OtherName),
    /// More or less an e-mail, the format is not checked.
    RFC822Name(String),
    /// A hostname, format is not checked.
    DNSName(String),
    /// X400Address,
    X400Address(Vec<DerNode>),
    /// RFC5280 defines several string types, we always try to parse as utf-8
    /// which is more or less a superset of the string types.
    DirectoryName(X509Name),
    /// EDIPartyName
    EDIPartyName(Vec<DerNode>),
    /// An uniform resource identifier. The format is not checked.
    URI(String),
    /// An ip address, provided as encoded.
    IPAddress(Vec<u8>),
    RegisteredID(Oid<'static>),
}

/// Naming hints for the `GeneralName` template
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeneralNameSchemaNames {
    /// Capture name of the selected alternative
    pub block_name: Option<String>,
}

impl GeneralName {
    /// Return the context-specific tag number of the name form
    pub fn tag_number(&self) -> u32 {
        match self {
            GeneralName::OtherName(_) => 0,
            GeneralName::RFC822Name(_) => 1,
            GeneralName::DNSName(_) => 2,
            GeneralName::X400Address(_) => 3,
            GeneralName::DirectoryName(_) => 4,
            GeneralName::EDIPartyName(_) => 5,
            GeneralName::URI(_) => 6,
            GeneralName::IPAddress(_) => 7,
            GeneralName::RegisteredID(_) => 8,
        }
    }

    /// Return the IP address, if this is an `IPAddress` of 4 or 16 bytes
    pub fn ip_addr(&self) -> Option<IpAddr> {
        match self {
            GeneralName::IPAddress(b) => ip_from_bytes(b),
            _ => None,
        }
    }
}

impl From<IpAddr> for GeneralName {
    fn from(ip: IpAddr) -> Self {
        let b = match ip {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        };
        GeneralName::IPAddress(b)
    }
}

fn ip_from_bytes(b: &[u8]) -> Option<IpAddr> {
    if let Ok(v4) = <[u8; 4]>::try_from(b) {
        Some(IpAddr::V4(Ipv4Addr::from(v4)))
    } else if let Ok(v6) = <[u8; 16]>::try_from(b) {
        Some(IpAddr::V6(Ipv6Addr::from(v6)))
    } else {
        None
    }
}

impl SchemaObject for GeneralName {
    type Names = GeneralNameSchemaNames;

    const NAME: &'static str = "GeneralName";

    fn schema(names: &GeneralNameSchemaNames) -> Template {
        Template::choice(vec![
            Template::tagged_constructed(
                0,
                vec![
                    Template::universal(Tag::Oid),
                    Template::tagged_constructed(0, vec![Template::any()]),
                ],
            ),
            Template::tagged_primitive(1),
            Template::tagged_primitive(2),
            Template::tagged_constructed(3, vec![Template::repeated(Template::any())]),
            Template::tagged_constructed(4, vec![X509Name::schema(&SchemaNames::default())]),
            Template::tagged_constructed(5, vec![Template::repeated(Template::any())]),
            Template::tagged_primitive(6),
            Template::tagged_primitive(7),
            Template::tagged_primitive(8),
        ])
        .with_name(names.block_name.as_deref())
    }

    fn from_schema(node: &DerNode) -> Result<Self, SchemaError> {
        let names = GeneralNameSchemaNames {
            block_name: Some("blockName".to_owned()),
        };
        let captures = compare_schema(node, &Self::schema(&names)).map_err(|e| {
            debug!("{}: {}", Self::NAME, e);
            SchemaError::verification_failed(Self::NAME)
        })?;
        let node = captures
            .node("blockName")
            .ok_or_else(|| SchemaError::verification_failed(Self::NAME))?;
        parse_generalname(node)
    }

    fn to_schema(&self) -> DerNode {
        match self {
            GeneralName::OtherName(other) => DerNode::tagged_constructed(
                0,
                vec![
                    DerNode::oid(&other.type_id),
                    DerNode::tagged_constructed(0, vec![other.value.clone()]),
                ],
            ),
            GeneralName::RFC822Name(s) => DerNode::tagged_primitive(1, s.as_bytes()),
            GeneralName::DNSName(s) => DerNode::tagged_primitive(2, s.as_bytes()),
            GeneralName::X400Address(fields) => DerNode::tagged_constructed(3, fields.clone()),
            GeneralName::DirectoryName(name) => {
                DerNode::tagged_constructed(4, vec![name.to_schema()])
            }
            GeneralName::EDIPartyName(fields) => DerNode::tagged_constructed(5, fields.clone()),
            GeneralName::URI(s) => DerNode::tagged_primitive(6, s.as_bytes()),
            GeneralName::IPAddress(b) => DerNode::tagged_primitive(7, b.clone()),
            GeneralName::RegisteredID(oid) => DerNode::tagged_primitive(8, oid.as_bytes()),
        }
    }

    fn to_json(&self) -> Value {
        let value = match self {
            GeneralName::OtherName(other) => json!({
                "typeId": other.type_id.to_id_string(),
                "value": other.value.to_json(),
            }),
            GeneralName::RFC822Name(s) | GeneralName::DNSName(s) | GeneralName::URI(s) => {
                Value::String(s.clone())
            }
            GeneralName::X400Address(fields) | GeneralName::EDIPartyName(fields) => {
                Value::Array(fields.iter().map(DerNode::to_json).collect())
            }
            GeneralName::DirectoryName(name) => name.to_json(),
            GeneralName::IPAddress(b) => Value::String(HEXUPPER.encode(b)),
            GeneralName::RegisteredID(oid) => Value::String(oid.to_id_string()),
        };
        json!({
            "type": self.tag_number(),
            "value": value,
        })
    }
}

// `node` already matched one of the alternatives of the template
fn parse_generalname(node: &DerNode) -> Result<GeneralName, SchemaError> {
    let failed = || SchemaError::verification_failed(GeneralName::NAME);
    // Relax constraints from RFC here: we are expecting an IA5String, but many certificates
    // are using unicode characters
    let ia5str = |node: &DerNode| node.as_str().map(String::from).ok_or_else(failed);
    let name = match node.tag().0 {
        0 => {
            let children = node.children();
            let type_id = children.first().and_then(DerNode::as_oid).ok_or_else(failed)?;
            let value = children
                .get(1)
                .and_then(|explicit| explicit.children().first())
                .cloned()
                .ok_or_else(failed)?;
            GeneralName::OtherName(OtherName { type_id, value })
        }
        1 => GeneralName::RFC822Name(ia5str(node)?),
        2 => GeneralName::DNSName(ia5str(node)?),
        3 => GeneralName::X400Address(node.children().to_vec()),
        4 => {
            let inner = node.children().first().ok_or_else(failed)?;
            let name = X509Name::from_schema(inner)
                .map_err(|e| SchemaError::caused_by(GeneralName::NAME, e))?;
            GeneralName::DirectoryName(name)
        }
        5 => GeneralName::EDIPartyName(node.children().to_vec()),
        6 => GeneralName::URI(ia5str(node)?),
        7 => GeneralName::IPAddress(node.data().ok_or_else(failed)?.to_vec()),
        8 => GeneralName::RegisteredID(node.as_oid().ok_or_else(failed)?),
        _ => return Err(failed()),
    };
    Ok(name)
}

impl fmt::Display for GeneralName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneralName::OtherName(other) => write!(f, "OtherName({}, [...])", other.type_id),
            GeneralName::RFC822Name(s) => write!(f, "RFC822Name({})", s),
            GeneralName::DNSName(s) => write!(f, "DNSName({})", s),
            GeneralName::X400Address(_) => write!(f, "X400Address(<unparsed>)"),
            GeneralName::DirectoryName(dn) => write!(f, "DirectoryName({})", dn),
            GeneralName::EDIPartyName(_) => write!(f, "EDIPartyName(<unparsed>)"),
            GeneralName::URI(s) => write!(f, "URI({})", s),
            GeneralName::IPAddress(b) => match ip_from_bytes(b) {
                Some(ip) => write!(f, "IPAddress({})", ip),
                None => write!(f, "IPAddress({})", format_serial(b)),
            },
            GeneralName::RegisteredID(oid) => write!(f, "RegisteredID({})", oid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asn1_rs::{oid, Class};
    use hex_literal::hex;

    #[test]
    fn parse_dns_name() {
        let bytes = &hex!("82 09 6c 6f 63 61 6c 68 6f 73 74");
        let (rem, name) = GeneralName::from_der(bytes).expect("parsing failed");
        assert!(rem.is_empty());
        assert_eq!(name, GeneralName::DNSName("localhost".to_owned()));
        assert_eq!(name.to_string(), "DNSName(localhost)");
    }

    #[test]
    fn parse_other_name() {
        let bytes = &hex!(
            "a0 1e 06 03 2a 03 04 a0 17 0c 15 73 6f 6d 65 20
             6f 74 68 65 72 20 69 64 65 6e 74 69 66 69 65 72"
        );
        let (rem, name) = GeneralName::from_der(bytes).expect("parsing failed");
        assert!(rem.is_empty());
        match &name {
            GeneralName::OtherName(other) => {
                assert_eq!(other.type_id, oid!(1.2.3.4));
                assert_eq!(other.value.tag(), Tag::Utf8String);
                assert_eq!(other.value.as_str(), Some("some other identifier"));
            }
            _ => panic!("wrong name form: {:?}", name),
        }
        assert_eq!(name.to_der_vec().expect("encoding failed"), bytes.to_vec());
    }

    #[test]
    fn reject_non_choice() {
        // universal IA5String instead of [2]
        let node = DerNode::new_primitive(Class::Universal, Tag::Ia5String, "localhost");
        assert_eq!(
            GeneralName::from_schema(&node),
            Err(SchemaError::verification_failed("GeneralName"))
        );
        // [9] is not an alternative
        let node = DerNode::tagged_primitive(9, vec![0]);
        assert!(GeneralName::from_schema(&node).is_err());
        // [2] must be primitive
        let node = DerNode::tagged_constructed(2, vec![]);
        assert!(GeneralName::from_schema(&node).is_err());
    }

    #[test]
    fn reject_invalid_utf8() {
        let node = DerNode::tagged_primitive(2, vec![0xff, 0xfe]);
        assert_eq!(
            GeneralName::from_schema(&node),
            Err(SchemaError::verification_failed("GeneralName"))
        );
    }

    #[test]
    fn reject_malformed_oid() {
        // registeredID whose last arc is truncated
        let node = DerNode::tagged_primitive(8, vec![0x2a, 0x80]);
        assert_eq!(
            GeneralName::from_schema(&node),
            Err(SchemaError::verification_failed("GeneralName"))
        );
        // otherName with a type-id too large for 64 bits
        let node = DerNode::tagged_constructed(
            0,
            vec![
                DerNode::new_primitive(Class::Universal, Tag::Oid, vec![0xff; 20]),
                DerNode::tagged_constructed(0, vec![DerNode::utf8_string("x")]),
            ],
        );
        assert_eq!(
            GeneralName::from_schema(&node),
            Err(SchemaError::verification_failed("GeneralName"))
        );
    }

    #[test]
    fn directory_name_error_is_kept_as_cause() {
        // [4] { SEQUENCE { SET { SEQUENCE { OID (empty), UTF8String } } } }
        // The structure matches the template, but the attribute type cannot be read
        let empty_oid = DerNode::new_primitive(Class::Universal, Tag::Oid, vec![]);
        let node = DerNode::tagged_constructed(
            4,
            vec![DerNode::sequence(vec![DerNode::set(vec![DerNode::sequence(
                vec![empty_oid, DerNode::utf8_string("x")],
            )])])],
        );
        let expected = SchemaError::caused_by(
            "GeneralName",
            SchemaError::caused_by(
                "X509Name",
                SchemaError::caused_by(
                    "RelativeDistinguishedName",
                    SchemaError::verification_failed("AttributeTypeAndValue"),
                ),
            ),
        );
        assert_eq!(GeneralName::from_schema(&node), Err(expected));
    }

    #[test]
    fn ip_address_display() {
        let ip: IpAddr = "192.168.7.1".parse().unwrap();
        let name = GeneralName::from(ip);
        assert_eq!(name, GeneralName::IPAddress(vec![192, 168, 7, 1]));
        assert_eq!(name.ip_addr(), Some(ip));
        assert_eq!(name.to_string(), "IPAddress(192.168.7.1)");
        // name constraints use address + mask
        let subnet = GeneralName::IPAddress(vec![192, 168, 0, 0, 255, 255, 0, 0]);
        assert_eq!(subnet.ip_addr(), None);
        assert_eq!(subnet.to_string(), "IPAddress(c0:a8:00:00:ff:ff:00:00)");
    }

    #[test]
    fn generalname_json() {
        assert_eq!(
            GeneralName::URI("http://my.url.here/".to_owned()).to_json(),
            json!({ "type": 6, "value": "http://my.url.here/" })
        );
        assert_eq!(
            GeneralName::IPAddress(vec![192, 168, 7, 1]).to_json(),
            json!({ "type": 7, "value": "C0A80701" })
        );
        assert_eq!(
            GeneralName::RegisteredID(oid!(1.2.90.0)).to_json(),
            json!({ "type": 8, "value": "1.2.90.0" })
        );
    }

    #[test]
    fn rebuild_all_forms() {
        let names = vec![
            GeneralName::OtherName(OtherName {
                type_id: oid!(1.2.3.4),
                value: DerNode::utf8_string("x"),
            }),
            GeneralName::RFC822Name("foo@example.com".to_owned()),
            GeneralName::DNSName("example.com".to_owned()),
            GeneralName::X400Address(vec![DerNode::sequence(vec![])]),
            GeneralName::DirectoryName(X509Name::default()),
            GeneralName::EDIPartyName(vec![DerNode::tagged_constructed(1, vec![])]),
            GeneralName::URI("http://example.com/".to_owned()),
            GeneralName::IPAddress(vec![127, 0, 0, 1]),
            GeneralName::RegisteredID(oid!(1.2.90.0)),
        ];
        for (i, name) in names.iter().enumerate() {
            let node = name.to_schema();
            assert_eq!(node.class(), Class::ContextSpecific);
            assert_eq!(node.tag(), Tag(i as u32));
            assert_eq!(name.tag_number(), i as u32);
            let decoded = GeneralName::from_schema(&node).expect("decoding failed");
            assert_eq!(&decoded, name);
        }
    }
}

use asn1_rs::oid;
use hex_literal::hex;
use nom::Parser;
use serde_json::json;
use std::net::{IpAddr, Ipv4Addr};
use x509_altname::prelude::*;

// subjectAltName extension, as generated by openssl with:
//   email:foo@example.com, URI:http://my.url.here/, IP:192.168.7.1,
//   dirName:(C=UK, O=My Organization, OU=My Unit, CN=My Name), DNS:localhost,
//   RID:1.2.90.0, otherName:1.2.3.4;UTF8:some other identifier
static SAN_EXT_DER: &[u8] = &hex!(
    "30 81 b6 06 03 55 1d 11 04 81 ae
     30 81 ab
     81 0f 66 6f 6f 40 65 78 61 6d 70 6c 65 2e 63 6f 6d
     86 13 68 74 74 70 3a 2f 2f 6d 79 2e 75 72 6c 2e 68 65 72 65 2f
     87 04 c0 a8 07 01
     a4 4d 30 4b 31 0b 30 09 06 03 55 04 06 13 02 55 4b
     31 18 30 16 06 03 55 04 0a 0c 0f 4d 79 20 4f 72 67 61 6e 69 7a 61 74 69 6f 6e
     31 10 30 0e 06 03 55 04 0b 0c 07 4d 79 20 55 6e 69 74
     31 10 30 0e 06 03 55 04 03 0c 07 4d 79 20 4e 61 6d 65
     82 09 6c 6f 63 61 6c 68 6f 73 74
     88 03 2a 5a 00
     a0 1e 06 03 2a 03 04 a0 17 0c 15 73 6f 6d 65 20 6f 74 68 65 72 20 69 64 65 6e 74 69 66 69 65 72"
);

// the extnValue of SAN_EXT_DER
fn san_value() -> &'static [u8] {
    &SAN_EXT_DER[11..]
}

#[test]
fn test_altname_all_forms() {
    let bytes = san_value();
    assert_eq!(bytes.len(), 0xae);
    let res = AltName::from_der(bytes);
    match res {
        Ok((rem, alt_name)) => {
            assert!(rem.is_empty());
            assert_eq!(alt_name.len(), 7);
            //
            assert_eq!(
                alt_name[0],
                GeneralName::RFC822Name("foo@example.com".to_owned())
            );
            assert_eq!(
                alt_name[1],
                GeneralName::URI("http://my.url.here/".to_owned())
            );
            assert_eq!(
                alt_name[2].ip_addr(),
                Some(IpAddr::V4(Ipv4Addr::new(192, 168, 7, 1)))
            );
            match &alt_name[3] {
                GeneralName::DirectoryName(dn) => {
                    assert_eq!(
                        dn.to_string(),
                        "C=UK, O=My Organization, OU=My Unit, CN=My Name"
                    );
                    let cn = dn.iter_common_name().next().and_then(|cn| cn.as_str());
                    assert_eq!(cn, Some("My Name"));
                }
                n => panic!("unexpected name {}", n),
            }
            assert_eq!(alt_name[4], GeneralName::DNSName("localhost".to_owned()));
            assert_eq!(alt_name[5], GeneralName::RegisteredID(oid!(1.2.90.0)));
            match &alt_name[6] {
                GeneralName::OtherName(other) => {
                    assert_eq!(other.type_id, oid!(1.2.3.4));
                    assert_eq!(other.value.as_str(), Some("some other identifier"));
                }
                n => panic!("unexpected name {}", n),
            }
            //
            assert_eq!(alt_name.to_der_vec().expect("encoding failed"), bytes);
        }
        _ => panic!("AltName decoding failed: {:?}", res),
    }
}

#[test]
fn test_altname_redecode_is_stable() {
    let (_, alt_name) = AltName::from_der(san_value()).expect("decoding failed");
    let node = alt_name.to_schema();
    let decoded = AltName::from_schema(&node).expect("decoding failed");
    assert_eq!(decoded, alt_name);
    assert_eq!(decoded.to_json(), alt_name.to_json());
}

#[test]
fn test_altname_json() {
    let (_, alt_name) = AltName::from_der(san_value()).expect("decoding failed");
    let value = alt_name.to_json();
    let names = value["altNames"].as_array().expect("altNames is not an array");
    assert_eq!(names.len(), 7);
    assert_eq!(names[0], json!({ "type": 1, "value": "foo@example.com" }));
    assert_eq!(names[1], json!({ "type": 6, "value": "http://my.url.here/" }));
    assert_eq!(names[2], json!({ "type": 7, "value": "C0A80701" }));
    assert_eq!(
        names[3],
        json!({
            "type": 4,
            "value": {
                "rdnSequence": [
                    { "typesAndValues": [ { "type": "2.5.4.6", "value": "UK" } ] },
                    { "typesAndValues": [ { "type": "2.5.4.10", "value": "My Organization" } ] },
                    { "typesAndValues": [ { "type": "2.5.4.11", "value": "My Unit" } ] },
                    { "typesAndValues": [ { "type": "2.5.4.3", "value": "My Name" } ] },
                ]
            }
        })
    );
    assert_eq!(names[4], json!({ "type": 2, "value": "localhost" }));
    assert_eq!(names[5], json!({ "type": 8, "value": "1.2.90.0" }));
    assert_eq!(names[6]["type"], json!(0));
    assert_eq!(names[6]["value"]["typeId"], json!("1.2.3.4"));
    assert_eq!(names[6]["value"]["value"]["tag"], json!(12));
}

#[test]
fn test_san_extension() {
    let (rem, ext) = X509Extension::from_der(SAN_EXT_DER).expect("decoding failed");
    assert!(rem.is_empty());
    assert_eq!(ext.oid, OID_EXT_SAN);
    assert!(!ext.critical);
    assert_eq!(ext.value, san_value());
    match ext.parsed_extension() {
        ParsedExtension::SubjectAlternativeName(san) => {
            assert_eq!(san.len(), 7);
            assert_eq!(san.to_json()["altNames"][4]["value"], json!("localhost"));
        }
        e => panic!("wrong extension type: {:?}", e),
    }
    assert_eq!(ext.to_der_vec().expect("encoding failed"), SAN_EXT_DER);
    assert_eq!(ext.to_json()["extnID"], json!("2.5.29.17"));
    assert_eq!(oid2sn(&ext.oid), Ok("subjectAltName"));
}

#[test]
fn test_ian_extension() {
    let bytes = &hex!("30 13 06 03 55 1d 12 04 0c 30 0a 82 08 63 61 2e 6c 6f 63 61 6c");
    let (rem, ext) = ExtensionParser::new().parse(bytes).expect("decoding failed");
    assert!(rem.is_empty());
    match ext.parsed_extension() {
        ParsedExtension::IssuerAlternativeName(ian) => {
            assert_eq!(ian.alt_names, vec![GeneralName::DNSName("ca.local".to_owned())]);
        }
        e => panic!("wrong extension type: {:?}", e),
    }
}

#[test]
fn test_altname_truncated_input() {
    let bytes = &san_value()[..50];
    let res = AltName::from_der(bytes);
    assert_eq!(res, Err(nom::Err::Error(DecodeError::Incomplete)));
}

#[test]
fn test_altname_reject_non_der_length() {
    // SEQUENCE { [2] "a" } with the outer length in long form
    let bytes = &hex!("30 81 03 82 01 61");
    let res = AltName::from_der(bytes);
    assert_eq!(res, Err(nom::Err::Error(DecodeError::NonMinimalHeader)));
}

#[test]
fn test_altname_atomic_update() {
    let mut alt_name = AltName::from(vec![GeneralName::DNSName("keep.me".to_owned())]);
    // same names, but the registeredID is an empty OID
    let (_, mut node) = DerNode::from_der(san_value()).expect("decoding failed");
    if let NodeContent::Constructed(children) = &mut node.content {
        children[5] = DerNode::tagged_primitive(8, Vec::new());
    }
    let e = alt_name.set_from_schema(&node).expect_err("decoding should fail");
    assert!(matches!(
        e,
        SchemaError::SchemaVerificationFailed {
            object: "AltName",
            cause: Some(_)
        }
    ));
    assert_eq!(
        alt_name.alt_names,
        vec![GeneralName::DNSName("keep.me".to_owned())]
    );
}

#[test]
fn test_altname_in_larger_template() {
    // TBSCertList-like structure: SEQUENCE { INTEGER, [1] { GeneralNames } }
    let names = AltNameSchemaNames {
        container: Some("issuerAltName".to_owned()),
        alt_names: None,
    };
    let template = Template::sequence(vec![
        Template::universal(asn1_rs::Tag::Integer).named("version"),
        Template::tagged_constructed(1, vec![AltName::schema(&names)]).optional(),
    ]);
    let (_, alt_name) = AltName::from_der(san_value()).expect("decoding failed");
    let node = DerNode::sequence(vec![
        DerNode::new_primitive(asn1_rs::Class::Universal, asn1_rs::Tag::Integer, vec![1]),
        DerNode::tagged_constructed(1, vec![alt_name.to_schema()]),
    ]);
    let captures = compare_schema(&node, &template).expect("schema mismatch");
    assert!(captures.contains("version"));
    let inner = captures.node("issuerAltName").expect("missing capture");
    assert_eq!(AltName::from_schema(inner).as_ref(), Ok(&alt_name));
    // optional part absent
    let node = DerNode::sequence(vec![DerNode::new_primitive(
        asn1_rs::Class::Universal,
        asn1_rs::Tag::Integer,
        vec![1],
    )]);
    let captures = compare_schema(&node, &template).expect("schema mismatch");
    assert!(!captures.contains("issuerAltName"));
}

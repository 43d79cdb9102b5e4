//! Generic DER tree
//!
//! A [`DerNode`] is an owned, untyped view of a DER-encoded value: a class, a tag number, and
//! either the raw content bytes (primitive) or the list of nested nodes (constructed).
//!
//! This is the representation consumed by [`compare_schema`](crate::schema::compare_schema) and
//! produced by the `to_schema` method of every schema object. Bytes are only read and written
//! here, using `asn1-rs` for the header encoding.

use std::borrow::Cow;

use asn1_rs::{Any, Class, FromDer, Header, Length, Oid, SerializeResult, Tag, ToDer};
use data_encoding::HEXUPPER;
use nom::Err;
use serde_json::{json, Value};

use crate::error::{DecodeError, DecodeResult};

/// Maximum nesting level accepted when parsing a tree
pub const MAX_RECURSION: usize = 50;

/// Content of a [`DerNode`]
#[derive(Clone, Debug, PartialEq)]
pub enum NodeContent {
    Primitive(Vec<u8>),
    Constructed(Vec<DerNode>),
}

/// An untyped DER value
#[derive(Clone, Debug, PartialEq)]
pub struct DerNode {
    pub class: Class,
    pub tag: Tag,
    pub content: NodeContent,
}

impl DerNode {
    /// Build a primitive node
    pub fn new_primitive<D: Into<Vec<u8>>>(class: Class, tag: Tag, data: D) -> Self {
        DerNode {
            class,
            tag,
            content: NodeContent::Primitive(data.into()),
        }
    }

    /// Build a constructed node
    pub fn new_constructed(class: Class, tag: Tag, children: Vec<DerNode>) -> Self {
        DerNode {
            class,
            tag,
            content: NodeContent::Constructed(children),
        }
    }

    pub fn sequence(children: Vec<DerNode>) -> Self {
        Self::new_constructed(Class::Universal, Tag::Sequence, children)
    }

    pub fn set(children: Vec<DerNode>) -> Self {
        Self::new_constructed(Class::Universal, Tag::Set, children)
    }

    /// Build a context-specific primitive node `[n]`
    pub fn tagged_primitive<D: Into<Vec<u8>>>(n: u32, data: D) -> Self {
        Self::new_primitive(Class::ContextSpecific, Tag(n), data)
    }

    /// Build a context-specific constructed node `[n]`
    pub fn tagged_constructed(n: u32, children: Vec<DerNode>) -> Self {
        Self::new_constructed(Class::ContextSpecific, Tag(n), children)
    }

    pub fn oid(oid: &Oid) -> Self {
        Self::new_primitive(Class::Universal, Tag::Oid, oid.as_bytes())
    }

    pub fn boolean(b: bool) -> Self {
        let v = if b { 0xff } else { 0x00 };
        Self::new_primitive(Class::Universal, Tag::Boolean, vec![v])
    }

    pub fn octet_string<D: Into<Vec<u8>>>(data: D) -> Self {
        Self::new_primitive(Class::Universal, Tag::OctetString, data)
    }

    pub fn utf8_string(s: &str) -> Self {
        Self::new_primitive(Class::Universal, Tag::Utf8String, s.as_bytes())
    }

    #[inline]
    pub fn class(&self) -> Class {
        self.class
    }

    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    #[inline]
    pub fn is_constructed(&self) -> bool {
        matches!(self.content, NodeContent::Constructed(_))
    }

    /// Return the nested nodes (empty for primitive nodes)
    pub fn children(&self) -> &[DerNode] {
        match &self.content {
            NodeContent::Constructed(children) => children,
            NodeContent::Primitive(_) => &[],
        }
    }

    /// Return the content bytes, if the node is primitive
    pub fn data(&self) -> Option<&[u8]> {
        match &self.content {
            NodeContent::Primitive(data) => Some(data),
            NodeContent::Constructed(_) => None,
        }
    }

    /// Attempt to read the content as an UTF-8 string.
    ///
    /// The tag is not checked: this is also used for IMPLICIT tagged strings.
    pub fn as_str(&self) -> Option<&str> {
        self.data().and_then(|d| std::str::from_utf8(d).ok())
    }

    /// Attempt to read the content as an object identifier.
    ///
    /// The tag is not checked: this is also used for IMPLICIT tagged OIDs.
    ///
    /// Return `None` if the content is not a valid encoding: truncated last arc, arc starting
    /// with a `0x80` padding byte, or arc not fitting in 64 bits.
    pub fn as_oid(&self) -> Option<Oid<'static>> {
        let d = self.data()?;
        if d.last().map_or(true, |b| b & 0x80 != 0) {
            return None;
        }
        let padded = d
            .iter()
            .enumerate()
            .any(|(idx, b)| *b == 0x80 && (idx == 0 || d[idx - 1] & 0x80 == 0));
        if padded {
            return None;
        }
        let oid = Oid::new(Cow::Owned(d.to_vec()));
        oid.iter()?;
        Some(oid)
    }

    /// Parse a DER-encoded value, and return the remaining of the input and the tree
    pub fn from_der(i: &[u8]) -> DecodeResult<'_, DerNode> {
        parse_der_node(i, 0)
    }

    /// Serialize the tree to DER
    pub fn to_der_vec(&self) -> SerializeResult<Vec<u8>> {
        let mut v = Vec::new();
        self.write_der(&mut v)?;
        Ok(v)
    }

    fn write_der(&self, out: &mut Vec<u8>) -> SerializeResult<()> {
        let content: Cow<[u8]> = match &self.content {
            NodeContent::Primitive(data) => Cow::Borrowed(data),
            NodeContent::Constructed(children) => {
                let mut v = Vec::new();
                for child in children {
                    child.write_der(&mut v)?;
                }
                Cow::Owned(v)
            }
        };
        let header = Header::new(
            self.class,
            self.is_constructed(),
            self.tag,
            Length::Definite(content.len()),
        );
        let encoded = Any::new(header, &content[..]).to_der_vec()?;
        out.extend_from_slice(&encoded);
        Ok(())
    }

    /// Plain-data view of the node, for inspection
    pub fn to_json(&self) -> Value {
        let value = match &self.content {
            NodeContent::Primitive(data) => Value::String(HEXUPPER.encode(data)),
            NodeContent::Constructed(children) => {
                Value::Array(children.iter().map(DerNode::to_json).collect())
            }
        };
        json!({
            "class": class_name(self.class),
            "tag": self.tag.0,
            "constructed": self.is_constructed(),
            "value": value,
        })
    }
}

pub(crate) fn class_name(class: Class) -> &'static str {
    match class {
        Class::Universal => "UNIVERSAL",
        Class::Application => "APPLICATION",
        Class::ContextSpecific => "CONTEXT-SPECIFIC",
        Class::Private => "PRIVATE",
    }
}

// DER requires the shortest form for both the tag number and the length
fn minimal_header_len(tag: Tag, len: usize) -> usize {
    let tag_len = if tag.0 < 31 {
        1
    } else {
        1 + ((32 - tag.0.leading_zeros() + 6) / 7) as usize
    };
    let len_len = if len < 0x80 {
        1
    } else {
        1 + ((usize::BITS - len.leading_zeros() + 7) / 8) as usize
    };
    tag_len + len_len
}

fn parse_der_node(i: &[u8], depth: usize) -> DecodeResult<'_, DerNode> {
    if depth > MAX_RECURSION {
        return Err(Err::Failure(DecodeError::MaxDepthExceeded));
    }
    let (rem, any) = Any::from_der(i).map_err(|e| match e {
        Err::Incomplete(_) => Err::Error(DecodeError::Incomplete),
        e => e.map(DecodeError::from),
    })?;
    let header_len = i.len() - rem.len() - any.data.len();
    if header_len != minimal_header_len(any.header.tag(), any.data.len()) {
        return Err(Err::Error(DecodeError::NonMinimalHeader));
    }
    let content = if any.header.is_constructed() {
        let mut children = Vec::new();
        let mut input = any.data;
        while !input.is_empty() {
            let (rest, child) = parse_der_node(input, depth + 1)?;
            children.push(child);
            input = rest;
        }
        NodeContent::Constructed(children)
    } else {
        NodeContent::Primitive(any.data.to_vec())
    };
    let node = DerNode {
        class: any.header.class(),
        tag: any.header.tag(),
        content,
    };
    Ok((rem, node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn parse_nested_tree() {
        let bytes = &hex!("30 0a 82 03 61 2e 62 87 03 01 02 03 ff");
        let (rem, node) = DerNode::from_der(bytes).expect("parsing failed");
        assert_eq!(rem, &[0xff]);
        assert_eq!(node.tag(), Tag::Sequence);
        assert!(node.is_constructed());
        assert_eq!(node.children().len(), 2);
        assert_eq!(node.children()[0].class(), Class::ContextSpecific);
        assert_eq!(node.children()[0].tag(), Tag(2));
        assert_eq!(node.children()[0].as_str(), Some("a.b"));
        assert_eq!(node.children()[1].data(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn serialize_tree() {
        let node = DerNode::sequence(vec![
            DerNode::tagged_primitive(2, "a.b"),
            DerNode::tagged_constructed(4, vec![DerNode::sequence(vec![])]),
            DerNode::boolean(true),
        ]);
        let der = node.to_der_vec().expect("serialization failed");
        assert_eq!(der, hex!("30 0c 82 03 61 2e 62 a4 02 30 00 01 01 ff"));
        let (rem, decoded) = DerNode::from_der(&der).expect("parsing failed");
        assert!(rem.is_empty());
        assert_eq!(decoded, node);
    }

    #[test]
    fn serialize_long_length() {
        let node = DerNode::octet_string(vec![0x41; 200]);
        let der = node.to_der_vec().expect("serialization failed");
        assert_eq!(&der[..3], &hex!("04 81 c8"));
        assert_eq!(der.len(), 203);
    }

    #[test]
    fn parse_truncated() {
        let bytes = &hex!("30 0a 82 03 61");
        let res = DerNode::from_der(bytes);
        assert!(res.is_err());
    }

    #[test]
    fn reject_non_minimal_length() {
        // length 3 encoded in long form
        let bytes = &hex!("30 81 03 82 01 61");
        let res = DerNode::from_der(bytes);
        assert_eq!(res, Err(Err::Error(DecodeError::NonMinimalHeader)));
        // same for a nested node
        let bytes = &hex!("30 04 82 81 01 61");
        let res = DerNode::from_der(bytes);
        assert_eq!(res, Err(Err::Error(DecodeError::NonMinimalHeader)));
        // long form is kept for lengths >= 128
        let der = DerNode::octet_string(vec![0x41; 128])
            .to_der_vec()
            .expect("serialization failed");
        assert_eq!(&der[..3], &hex!("04 81 80"));
        assert!(DerNode::from_der(&der).is_ok());
    }

    #[test]
    fn oid_content_is_validated() {
        let oid = |d: &[u8]| DerNode::new_primitive(Class::Universal, Tag::Oid, d).as_oid();
        let id_string = |d: &[u8]| oid(d).map(|o| o.to_id_string());
        assert_eq!(id_string(&hex!("2a 03 04")), Some("1.2.3.4".to_owned()));
        assert_eq!(id_string(&hex!("2a 86 48 01")), Some("1.2.840.1".to_owned()));
        assert_eq!(oid(&[]), None);
        // last arc is truncated
        assert_eq!(oid(&hex!("2a 80")), None);
        assert_eq!(oid(&[0xff; 20]), None);
        // arc starting with padding
        assert_eq!(oid(&hex!("2a 80 01")), None);
        assert_eq!(oid(&hex!("80 2a")), None);
        // arc larger than 64 bits
        assert_eq!(oid(&hex!("2a ff ff ff ff ff ff ff ff ff ff 7f")), None);
        // constructed content
        assert_eq!(DerNode::sequence(vec![]).as_oid(), None);
    }

    #[test]
    fn parse_too_deep() {
        // 60 nested empty-ish SEQUENCEs, built from the inside out
        let mut node = DerNode::sequence(vec![]);
        for _ in 0..60 {
            node = DerNode::sequence(vec![node]);
        }
        let der = node.to_der_vec().expect("serialization failed");
        let res = DerNode::from_der(&der);
        assert_eq!(res, Err(Err::Failure(DecodeError::MaxDepthExceeded)));
    }

    #[test]
    fn node_json() {
        let node = DerNode::tagged_constructed(3, vec![DerNode::octet_string(vec![0xab])]);
        assert_eq!(
            node.to_json(),
            json!({
                "class": "CONTEXT-SPECIFIC",
                "tag": 3,
                "constructed": true,
                "value": [
                    { "class": "UNIVERSAL", "tag": 4, "constructed": false, "value": "AB" }
                ]
            })
        );
    }
}

//! X.509 names
//!
//! Based on RFC5280. These objects are carried by the `directoryName` form of a
//! [`GeneralName`](crate::extensions::GeneralName).

use std::fmt;

use asn1_rs::{Oid, Tag};
use data_encoding::HEXUPPER;
use log::debug;
use serde_json::{json, Value};

use crate::error::SchemaError;
use crate::node::DerNode;
use crate::objects::*;
use crate::schema::{compare_schema, Template};
use crate::traits::SchemaObject;

/// Naming hints for objects with a single capture point
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchemaNames {
    pub block_name: Option<String>,
}

/// <pre>
/// AttributeTypeAndValue ::= SEQUENCE {
///   type     AttributeType,
///   value    AttributeValue }
///
/// AttributeType ::= OBJECT IDENTIFIER
///
/// AttributeValue ::= ANY -- DEFINED BY AttributeType
/// </pre>
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeTypeAndValue {
    pub attr_type: Oid<'static>,
    pub attr_value: DerNode,
}

impl AttributeTypeAndValue {
    pub fn new(attr_type: Oid<'static>, attr_value: DerNode) -> Self {
        AttributeTypeAndValue {
            attr_type,
            attr_value,
        }
    }

    /// Attempt to get the content as `str`.
    /// This can fail if the object does not contain a string type.
    ///
    /// Only NumericString, PrintableString, UTF8String and IA5String
    /// are considered here. Other string types can be read using `as_slice`.
    pub fn as_str(&self) -> Option<&str> {
        let tag = self.attr_value.tag();
        if tag == Tag::NumericString
            || tag == Tag::PrintableString
            || tag == Tag::Utf8String
            || tag == Tag::Ia5String
        {
            self.attr_value.as_str()
        } else {
            None
        }
    }

    /// Attempt to get the content as a slice.
    /// This can fail if the object is constructed (e.g a sequence).
    pub fn as_slice(&self) -> Option<&[u8]> {
        self.attr_value.data()
    }

    // If type is not a string, the hex encoding of the value is returned
    fn value_to_string(&self) -> String {
        match self.as_str() {
            Some(s) => s.to_owned(),
            None => match self.as_slice() {
                Some(data) => HEXUPPER.encode(data),
                None => self
                    .attr_value
                    .to_der_vec()
                    .map(|v| HEXUPPER.encode(&v))
                    .unwrap_or_default(),
            },
        }
    }
}

impl SchemaObject for AttributeTypeAndValue {
    type Names = SchemaNames;

    const NAME: &'static str = "AttributeTypeAndValue";

    fn schema(names: &SchemaNames) -> Template {
        Template::sequence(vec![
            Template::universal(Tag::Oid).named("type"),
            Template::any().named("value"),
        ])
        .with_name(names.block_name.as_deref())
    }

    fn from_schema(node: &DerNode) -> Result<Self, SchemaError> {
        let captures = compare_schema(node, &Self::schema(&SchemaNames::default()))
            .map_err(|e| {
                debug!("{}: {}", Self::NAME, e);
                SchemaError::verification_failed(Self::NAME)
            })?;
        let attr_type = captures
            .node("type")
            .and_then(DerNode::as_oid)
            .ok_or_else(|| SchemaError::verification_failed(Self::NAME))?;
        let attr_value = captures
            .node("value")
            .cloned()
            .ok_or_else(|| SchemaError::verification_failed(Self::NAME))?;
        Ok(AttributeTypeAndValue {
            attr_type,
            attr_value,
        })
    }

    fn to_schema(&self) -> DerNode {
        DerNode::sequence(vec![DerNode::oid(&self.attr_type), self.attr_value.clone()])
    }

    fn to_json(&self) -> Value {
        json!({
            "type": self.attr_type.to_id_string(),
            "value": self.value_to_string(),
        })
    }
}

/// <pre>
/// RelativeDistinguishedName ::=
///   SET SIZE (1..MAX) OF AttributeTypeAndValue
/// </pre>
///
/// Note: empty sets are accepted
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RelativeDistinguishedName {
    pub set: Vec<AttributeTypeAndValue>,
}

impl RelativeDistinguishedName {
    pub fn new(set: Vec<AttributeTypeAndValue>) -> Self {
        RelativeDistinguishedName { set }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeTypeAndValue> {
        self.set.iter()
    }
}

impl SchemaObject for RelativeDistinguishedName {
    type Names = SchemaNames;

    const NAME: &'static str = "RelativeDistinguishedName";

    fn schema(names: &SchemaNames) -> Template {
        Template::set(vec![Template::repeated(AttributeTypeAndValue::schema(
            &SchemaNames::default(),
        ))
        .named("typesAndValues")])
        .with_name(names.block_name.as_deref())
    }

    fn from_schema(node: &DerNode) -> Result<Self, SchemaError> {
        let captures = compare_schema(node, &Self::schema(&SchemaNames::default()))
            .map_err(|e| {
                debug!("{}: {}", Self::NAME, e);
                SchemaError::verification_failed(Self::NAME)
            })?;
        let set = captures
            .repeated("typesAndValues")
            .iter()
            .map(|n| AttributeTypeAndValue::from_schema(n))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SchemaError::caused_by(Self::NAME, e))?;
        Ok(RelativeDistinguishedName { set })
    }

    fn to_schema(&self) -> DerNode {
        DerNode::set(self.set.iter().map(|atv| atv.to_schema()).collect())
    }

    fn to_json(&self) -> Value {
        json!({
            "typesAndValues": self.set.iter().map(|atv| atv.to_json()).collect::<Vec<_>>(),
        })
    }
}

/// <pre>
/// Name ::= CHOICE { -- only one possibility for now --
///   rdnSequence  RDNSequence }
///
/// RDNSequence ::= SEQUENCE OF RelativeDistinguishedName
/// </pre>
#[derive(Clone, Debug, Default, PartialEq)]
pub struct X509Name {
    pub rdn_seq: Vec<RelativeDistinguishedName>,
}

impl X509Name {
    pub fn new(rdn_seq: Vec<RelativeDistinguishedName>) -> Self {
        X509Name { rdn_seq }
    }

    /// Return an iterator over the `RelativeDistinguishedName` components of the name
    pub fn iter_rdn(&self) -> impl Iterator<Item = &RelativeDistinguishedName> {
        self.rdn_seq.iter()
    }

    /// Return an iterator over the attribute types and values of the name
    pub fn iter_attributes(&self) -> impl Iterator<Item = &AttributeTypeAndValue> {
        self.rdn_seq.iter().flat_map(|rdn| rdn.set.iter())
    }

    /// Return an iterator over the components identified by the given OID
    ///
    /// Attributes with same OID may be present multiple times, so the returned object is
    /// an iterator.
    pub fn iter_by_oid<'a>(
        &'a self,
        oid: &Oid<'a>,
    ) -> impl Iterator<Item = &'a AttributeTypeAndValue> + 'a {
        let oid = oid.clone();
        self.iter_attributes()
            .filter(move |obj| obj.attr_type == oid)
    }

    /// Return an iterator over the `CommonName` attributes of the X.509 Name.
    ///
    /// ```
    /// use x509_altname::x509::X509Name;
    ///
    /// fn get_first_cn_as_str(name: &X509Name) -> Option<&str> {
    ///     name.iter_common_name()
    ///         .next()
    ///         .and_then(|cn| cn.as_str())
    /// }
    /// ```
    pub fn iter_common_name(&self) -> impl Iterator<Item = &AttributeTypeAndValue> {
        self.iter_by_oid(&OID_CN)
    }

    /// Return an iterator over the `Country` attributes of the X.509 Name.
    pub fn iter_country(&self) -> impl Iterator<Item = &AttributeTypeAndValue> {
        self.iter_by_oid(&OID_C)
    }

    /// Return an iterator over the `Organization` attributes of the X.509 Name.
    pub fn iter_organization(&self) -> impl Iterator<Item = &AttributeTypeAndValue> {
        self.iter_by_oid(&OID_O)
    }

    /// Return an iterator over the `OrganizationalUnit` attributes of the X.509 Name.
    pub fn iter_organizational_unit(&self) -> impl Iterator<Item = &AttributeTypeAndValue> {
        self.iter_by_oid(&OID_OU)
    }

    /// Return an iterator over the `EmailAddress` attributes of the X.509 Name.
    pub fn iter_email(&self) -> impl Iterator<Item = &AttributeTypeAndValue> {
        self.iter_by_oid(&OID_EMAIL)
    }
}

impl SchemaObject for X509Name {
    type Names = SchemaNames;

    const NAME: &'static str = "X509Name";

    fn schema(names: &SchemaNames) -> Template {
        Template::sequence(vec![Template::repeated(RelativeDistinguishedName::schema(
            &SchemaNames::default(),
        ))
        .named("RDN")])
        .with_name(names.block_name.as_deref())
    }

    fn from_schema(node: &DerNode) -> Result<Self, SchemaError> {
        let captures = compare_schema(node, &Self::schema(&SchemaNames::default()))
            .map_err(|e| {
                debug!("{}: {}", Self::NAME, e);
                SchemaError::verification_failed(Self::NAME)
            })?;
        let rdn_seq = captures
            .repeated("RDN")
            .iter()
            .map(|n| RelativeDistinguishedName::from_schema(n))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SchemaError::caused_by(Self::NAME, e))?;
        Ok(X509Name { rdn_seq })
    }

    fn to_schema(&self) -> DerNode {
        DerNode::sequence(self.rdn_seq.iter().map(|rdn| rdn.to_schema()).collect())
    }

    fn to_json(&self) -> Value {
        json!({
            "rdnSequence": self.rdn_seq.iter().map(|rdn| rdn.to_json()).collect::<Vec<_>>(),
        })
    }
}

impl fmt::Display for X509Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&x509name_to_string(&self.rdn_seq))
    }
}

/// Convert a X.509 name to a human-readable string
///
/// RDNs are separated with ","
/// Multiple RDNs are separated with "+"
///
/// Attributes that cannot be represented by a string are hex-encoded
fn x509name_to_string(rdn_seq: &[RelativeDistinguishedName]) -> String {
    rdn_seq
        .iter()
        .map(|rdn| {
            rdn.set
                .iter()
                .map(|attr| {
                    let sn_str = match oid2sn(&attr.attr_type) {
                        Ok(s) => String::from(s),
                        _ => attr.attr_type.to_id_string(),
                    };
                    format!("{}={}", sn_str, attr.value_to_string())
                })
                .collect::<Vec<_>>()
                .join(" + ")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

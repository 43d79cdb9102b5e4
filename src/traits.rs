use asn1_rs::SerializeResult;
use nom::Err;
use serde_json::Value;

use crate::error::{DecodeError, DecodeResult, SchemaError};
use crate::node::DerNode;
use crate::schema::Template;

/// An object described by a structural template.
///
/// Every ASN.1 structure of this crate implements the same four operations:
///
/// - [`schema`](SchemaObject::schema) returns the template of the object. The naming hints
///   select which positions are captured, so the same template can be used to decode the object
///   alone, or embedded as a field of a larger template;
/// - [`from_schema`](SchemaObject::from_schema) verifies a tree against the template and builds
///   the object from the captured nodes;
/// - [`to_schema`](SchemaObject::to_schema) rebuilds the tree of the object;
/// - [`to_json`](SchemaObject::to_json) returns a plain-data projection, for inspection only.
///
/// # Example
///
/// ```rust
/// use x509_altname::prelude::*;
/// use hex_literal::hex;
///
/// # fn main() {
/// // SEQUENCE { [2] "localhost" }
/// let bytes = &hex!("30 0b 82 09 6c 6f 63 61 6c 68 6f 73 74");
/// let (rem, alt_name) = AltName::from_der(bytes).expect("decoding failed");
/// assert!(rem.is_empty());
/// assert_eq!(alt_name.alt_names, vec![GeneralName::DNSName("localhost".to_owned())]);
/// assert_eq!(alt_name.to_der_vec().expect("encoding failed"), bytes.to_vec());
/// # }
/// ```
pub trait SchemaObject: Sized {
    /// Naming hints accepted by [`schema`](SchemaObject::schema)
    type Names: Default;

    /// Name of the object, used in error messages
    const NAME: &'static str;

    /// Return the structural template of the object
    fn schema(names: &Self::Names) -> Template;

    /// Verify a tree against the object template, and build the object
    fn from_schema(node: &DerNode) -> Result<Self, SchemaError>;

    /// Build the tree representing the object
    fn to_schema(&self) -> DerNode;

    /// Return a plain-data projection of the object
    fn to_json(&self) -> Value;

    /// Parse DER-encoded bytes, and return the remaining of the input and the object
    fn from_der(bytes: &[u8]) -> DecodeResult<'_, Self> {
        let (rem, node) = DerNode::from_der(bytes)?;
        let obj = Self::from_schema(&node).map_err(|e| Err::Error(DecodeError::from(e)))?;
        Ok((rem, obj))
    }

    /// Serialize the object to DER
    fn to_der_vec(&self) -> SerializeResult<Vec<u8>> {
        self.to_schema().to_der_vec()
    }
}

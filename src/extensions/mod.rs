//! X.509 Extensions objects and types

use crate::error::{DecodeError, SchemaError};
use crate::node::DerNode;
use crate::objects::{OID_EXT_IAN, OID_EXT_SAN};
use crate::schema::{compare_schema, Template};
use crate::traits::SchemaObject;
use crate::x509::SchemaNames;

use asn1_rs::{Oid, SerializeResult, Tag};
use data_encoding::HEXUPPER;
use log::debug;
use nom::{Err, IResult, Parser};
use serde_json::{json, Value};

mod altname;
mod generalname;
mod issuer_alt_name;
mod subject_alt_name;

pub use altname::{AltName, AltNameMember, AltNameSchemaNames};
pub use generalname::*;
pub use issuer_alt_name::IssuerAlternativeName;
pub use subject_alt_name::SubjectAlternativeName;

/// X.509 version 3 extension
///
/// Each extension in a certificate is designated as either critical or non-critical.
///
/// Each extension includes an OID and an ASN.1 structure.  When an extension appears in a
/// certificate, the OID appears as the field extnID and the corresponding ASN.1 encoded structure
/// is the value of the octet string extnValue.
///
/// When decoding an extension, the global extension structure (described above) is decoded,
/// and the object is returned if it succeeds.
/// During this step, it also attempts to decode the content of the extension, if known.
/// The returned object has a
/// [`X509Extension::parsed_extension()`] method. The returned
/// enum is either a known extension, or the special value `ParsedExtension::UnsupportedExtension`.
///
/// # Example
///
/// ```rust
/// use x509_altname::prelude::*;
///
/// static DER: &[u8] = &[
///     0x30, 0x13, 0x06, 0x03, 0x55, 0x1d, 0x11, 0x04, 0x0c, 0x30, 0x0a, 0x82, 0x08, 0x63,
///     0x61, 0x2e, 0x6c, 0x6f, 0x63, 0x61, 0x6c ];
///
/// # fn main() {
/// let res = X509Extension::from_der(DER);
/// match res {
///     Ok((_rem, ext)) => {
///         println!("Extension OID: {}", ext.oid);
///         println!("  Critical: {}", ext.critical);
///         let parsed_ext = ext.parsed_extension();
///         assert!(!parsed_ext.unsupported());
///         assert!(parsed_ext.error().is_none());
///         if let ParsedExtension::SubjectAlternativeName(san) = parsed_ext {
///             assert_eq!(san.len(), 1);
///         } else {
///             panic!("Extension has wrong type");
///         }
///     },
///     _ => panic!("x509 extension parsing failed: {:?}", res),
/// }
/// # }
/// ```
///
/// <pre>
/// Extension  ::=  SEQUENCE  {
///     extnID      OBJECT IDENTIFIER,
///     critical    BOOLEAN DEFAULT FALSE,
///     extnValue   OCTET STRING  }
/// </pre>
#[derive(Clone, Debug, PartialEq)]
pub struct X509Extension {
    /// OID describing the extension content
    pub oid: Oid<'static>,
    /// Boolean value describing the 'critical' attribute of the extension
    ///
    /// An extension includes the boolean critical, with a default value of FALSE.
    pub critical: bool,
    /// Raw content of the extension
    pub value: Vec<u8>,
    pub(crate) parsed_extension: ParsedExtension,
}

impl X509Extension {
    /// Creates a new extension with the provided values.
    #[inline]
    pub const fn new(
        oid: Oid<'static>,
        critical: bool,
        value: Vec<u8>,
        parsed_extension: ParsedExtension,
    ) -> X509Extension {
        X509Extension {
            oid,
            critical,
            value,
            parsed_extension,
        }
    }

    /// Creates a Subject Alternative Name extension, encoding the names
    pub fn subject_alt_name(critical: bool, alt_name: AltName) -> SerializeResult<Self> {
        let san = SubjectAlternativeName(alt_name);
        let value = san.to_der_vec()?;
        Ok(X509Extension::new(
            OID_EXT_SAN,
            critical,
            value,
            ParsedExtension::SubjectAlternativeName(san),
        ))
    }

    /// Creates an Issuer Alternative Name extension, encoding the names
    pub fn issuer_alt_name(critical: bool, alt_name: AltName) -> SerializeResult<Self> {
        let ian = IssuerAlternativeName(alt_name);
        let value = ian.to_der_vec()?;
        Ok(X509Extension::new(
            OID_EXT_IAN,
            critical,
            value,
            ParsedExtension::IssuerAlternativeName(ian),
        ))
    }

    /// Return the extension type or `UnsupportedExtension` if the extension is not implemented.
    #[inline]
    pub fn parsed_extension(&self) -> &ParsedExtension {
        &self.parsed_extension
    }
}

impl SchemaObject for X509Extension {
    type Names = SchemaNames;

    const NAME: &'static str = "Extension";

    fn schema(names: &SchemaNames) -> Template {
        Template::sequence(vec![
            Template::universal(Tag::Oid).named("extnID"),
            Template::universal(Tag::Boolean).named("critical").optional(),
            Template::universal(Tag::OctetString).named("extnValue"),
        ])
        .with_name(names.block_name.as_deref())
    }

    fn from_schema(node: &DerNode) -> Result<Self, SchemaError> {
        ExtensionParser::new().parse_node(node)
    }

    fn to_schema(&self) -> DerNode {
        let mut v = vec![DerNode::oid(&self.oid)];
        // DEFAULT FALSE is not encoded
        if self.critical {
            v.push(DerNode::boolean(true));
        }
        v.push(DerNode::octet_string(self.value.clone()));
        DerNode::sequence(v)
    }

    fn to_json(&self) -> Value {
        let mut obj = json!({
            "extnID": self.oid.to_id_string(),
            "critical": self.critical,
            "extnValue": HEXUPPER.encode(&self.value),
        });
        let parsed = match &self.parsed_extension {
            ParsedExtension::SubjectAlternativeName(san) => Some(san.to_json()),
            ParsedExtension::IssuerAlternativeName(ian) => Some(ian.to_json()),
            _ => None,
        };
        if let (Some(parsed), Some(map)) = (parsed, obj.as_object_mut()) {
            map.insert("parsedValue".to_owned(), parsed);
        }
        obj
    }
}

/// `X509Extension` parser builder
#[derive(Clone, Copy, Debug)]
pub struct ExtensionParser {
    deep_parse_extensions: bool,
}

impl ExtensionParser {
    #[inline]
    pub const fn new() -> Self {
        ExtensionParser {
            deep_parse_extensions: true,
        }
    }

    /// Select whether the content of known extensions is decoded
    #[inline]
    pub const fn with_deep_parse_extensions(self, deep_parse_extensions: bool) -> Self {
        ExtensionParser {
            deep_parse_extensions,
        }
    }

    /// Verify a tree against the `Extension` template, and build the extension
    pub fn parse_node(&self, node: &DerNode) -> Result<X509Extension, SchemaError> {
        let failed = || SchemaError::verification_failed(X509Extension::NAME);
        let captures = compare_schema(node, &X509Extension::schema(&SchemaNames::default()))
            .map_err(|e| {
                debug!("{}: {}", X509Extension::NAME, e);
                failed()
            })?;
        let oid = captures
            .node("extnID")
            .and_then(DerNode::as_oid)
            .ok_or_else(failed)?;
        let critical = match captures.node("critical") {
            Some(node) => match node.data() {
                Some([b]) => *b != 0,
                _ => return Err(failed()),
            },
            None => false,
        };
        let value = captures
            .node("extnValue")
            .and_then(DerNode::data)
            .ok_or_else(failed)?
            .to_vec();
        let parsed_extension = if self.deep_parse_extensions {
            parser::parse_extension(&value, &oid)
        } else {
            ParsedExtension::Unparsed
        };
        Ok(X509Extension {
            oid,
            critical,
            value,
            parsed_extension,
        })
    }
}

impl Default for ExtensionParser {
    fn default() -> Self {
        ExtensionParser::new()
    }
}

impl<'i> Parser<&'i [u8], X509Extension, DecodeError> for ExtensionParser {
    fn parse(&mut self, input: &'i [u8]) -> IResult<&'i [u8], X509Extension, DecodeError> {
        let (rem, node) = DerNode::from_der(input)?;
        let ext = self
            .parse_node(&node)
            .map_err(|e| Err::Error(DecodeError::from(e)))?;
        Ok((rem, ext))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParsedExtension {
    /// Crate parser does not support this extension (yet)
    UnsupportedExtension { oid: Oid<'static> },
    ParseError { error: DecodeError },
    /// Section 4.2.1.6 of rfc 5280
    SubjectAlternativeName(SubjectAlternativeName),
    /// Section 4.2.1.7 of rfc 5280
    IssuerAlternativeName(IssuerAlternativeName),
    /// Unparsed extension (was not requested in parsing options)
    Unparsed,
}

impl ParsedExtension {
    /// Return `true` if the extension is unsupported
    pub fn unsupported(&self) -> bool {
        matches!(self, &ParsedExtension::UnsupportedExtension { .. })
    }

    /// Return a reference on the parsing error if the extension parsing failed
    pub fn error(&self) -> Option<&DecodeError> {
        match self {
            ParsedExtension::ParseError { error } => Some(error),
            _ => None,
        }
    }
}

pub(crate) mod parser {
    use super::*;
    use crate::error::DecodeResult;
    use lazy_static::lazy_static;
    use std::collections::HashMap;

    type ExtParser = fn(&DerNode) -> Result<ParsedExtension, SchemaError>;

    lazy_static! {
        static ref EXTENSION_PARSERS: HashMap<Oid<'static>, ExtParser> = {
            macro_rules! add {
                ($m:ident, $oid:ident, $p:ident) => {
                    $m.insert($oid, $p as ExtParser);
                };
            }

            let mut m = HashMap::new();
            add!(m, OID_EXT_SAN, parse_subjectalternativename_ext);
            add!(m, OID_EXT_IAN, parse_issueralternativename_ext);
            m
        };
    }

    // look into the parser map if the extension is known, and parse it
    // otherwise, leave it as UnsupportedExtension
    pub(crate) fn parse_extension(value: &[u8], oid: &Oid<'static>) -> ParsedExtension {
        let ext_parser = match EXTENSION_PARSERS.get(oid) {
            Some(p) => p,
            None => return ParsedExtension::UnsupportedExtension { oid: oid.clone() },
        };
        let res: DecodeResult<DerNode> = DerNode::from_der(value);
        let error = match res {
            Ok((rem, node)) if rem.is_empty() => match ext_parser(&node) {
                Ok(ext) => return ext,
                Err(e) => DecodeError::Schema(e),
            },
            Ok(_) => DecodeError::TrailingData,
            Err(Err::Error(e)) | Err(Err::Failure(e)) => e,
            Err(Err::Incomplete(_)) => DecodeError::Incomplete,
        };
        debug!("extension {}: {}", oid, error);
        ParsedExtension::ParseError { error }
    }

    fn parse_subjectalternativename_ext(node: &DerNode) -> Result<ParsedExtension, SchemaError> {
        SubjectAlternativeName::from_schema(node).map(ParsedExtension::SubjectAlternativeName)
    }

    fn parse_issueralternativename_ext(node: &DerNode) -> Result<ParsedExtension, SchemaError> {
        IssuerAlternativeName::from_schema(node).map(ParsedExtension::IssuerAlternativeName)
    }
}

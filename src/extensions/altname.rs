use std::fmt;
use std::iter::FromIterator;
use std::ops::Deref;
use std::str::FromStr;

use log::{debug, trace};
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::node::DerNode;
use crate::schema::{compare_schema, Template};
use crate::traits::SchemaObject;

use super::{GeneralName, GeneralNameSchemaNames};

/// The list of names of the Subject or Issuer Alternative Name extensions
///
/// Note: empty sequences are accepted, and duplicate names are kept
///
/// <pre>
/// SubjectAltName ::= GeneralNames
/// IssuerAltName ::= GeneralNames
///
/// GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
/// </pre>
///
/// Decoding is atomic: if any of the names cannot be decoded, the whole object is rejected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AltName {
    pub alt_names: Vec<GeneralName>,
}

/// Attributes of an [`AltName`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AltNameMember {
    AltNames,
}

impl AltNameMember {
    pub const fn as_str(self) -> &'static str {
        match self {
            AltNameMember::AltNames => "altNames",
        }
    }
}

impl FromStr for AltNameMember {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "altNames" => Ok(AltNameMember::AltNames),
            _ => Err(SchemaError::InvalidMemberName {
                object: AltName::NAME,
                name: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for AltNameMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Naming hints for the [`AltName`] template
///
/// Both names default to "no capture".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AltNameSchemaNames {
    /// Capture name of the outer SEQUENCE, when the template is embedded in a larger one
    pub container: Option<String>,
    /// Capture name of the repeated `GeneralName` values
    pub alt_names: Option<String>,
}

impl AltName {
    /// Create an empty object
    pub const fn new() -> Self {
        AltName {
            alt_names: Vec::new(),
        }
    }

    /// Return the default value of an attribute
    pub fn default_values(member: AltNameMember) -> Vec<GeneralName> {
        match member {
            AltNameMember::AltNames => Vec::new(),
        }
    }

    /// Decode `node`, and replace the current names on success.
    ///
    /// On error, `self` is not modified.
    pub fn set_from_schema(&mut self, node: &DerNode) -> Result<(), SchemaError> {
        let decoded = Self::from_schema(node)?;
        *self = decoded;
        Ok(())
    }

    pub fn push(&mut self, name: GeneralName) {
        self.alt_names.push(name);
    }
}

impl Deref for AltName {
    type Target = Vec<GeneralName>;

    fn deref(&self) -> &Self::Target {
        &self.alt_names
    }
}

impl From<Vec<GeneralName>> for AltName {
    fn from(alt_names: Vec<GeneralName>) -> Self {
        AltName { alt_names }
    }
}

impl FromIterator<GeneralName> for AltName {
    fn from_iter<T: IntoIterator<Item = GeneralName>>(iter: T) -> Self {
        AltName {
            alt_names: iter.into_iter().collect(),
        }
    }
}

impl SchemaObject for AltName {
    type Names = AltNameSchemaNames;

    const NAME: &'static str = "AltName";

    fn schema(names: &AltNameSchemaNames) -> Template {
        Template::sequence(vec![Template::repeated(GeneralName::schema(
            &GeneralNameSchemaNames::default(),
        ))
        .with_name(names.alt_names.as_deref())])
        .with_name(names.container.as_deref())
    }

    fn from_schema(node: &DerNode) -> Result<Self, SchemaError> {
        let label = AltNameMember::AltNames.as_str();
        let names = AltNameSchemaNames {
            container: None,
            alt_names: Some(label.to_owned()),
        };
        let captures = compare_schema(node, &Self::schema(&names)).map_err(|e| {
            debug!("{}: {}", Self::NAME, e);
            SchemaError::verification_failed(Self::NAME)
        })?;
        let alt_names = captures
            .repeated(label)
            .iter()
            .enumerate()
            .map(|(idx, n)| {
                GeneralName::from_schema(n).map_err(|e| {
                    debug!("{}: name at index {} rejected: {}", Self::NAME, idx, e);
                    SchemaError::caused_by(Self::NAME, e)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        trace!("{}: decoded {} names", Self::NAME, alt_names.len());
        Ok(AltName { alt_names })
    }

    fn to_schema(&self) -> DerNode {
        DerNode::sequence(self.alt_names.iter().map(|n| n.to_schema()).collect())
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            AltNameMember::AltNames.to_string(),
            Value::Array(self.alt_names.iter().map(|n| n.to_json()).collect()),
        );
        Value::Object(map)
    }
}

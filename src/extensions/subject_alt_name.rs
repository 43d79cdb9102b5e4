use std::ops::Deref;

use serde_json::Value;

use crate::error::SchemaError;
use crate::node::DerNode;
use crate::schema::Template;
use crate::traits::SchemaObject;

use super::{AltName, AltNameSchemaNames};

/// Subject Alternative Name
///
/// Note: empty sequences are accepted
///
/// <pre>
/// SubjectAltName ::= GeneralNames
///
/// GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
/// </pre>
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubjectAlternativeName(pub AltName);

impl Deref for SubjectAlternativeName {
    type Target = AltName;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<AltName> for SubjectAlternativeName {
    fn from(alt_name: AltName) -> Self {
        SubjectAlternativeName(alt_name)
    }
}

impl SchemaObject for SubjectAlternativeName {
    type Names = AltNameSchemaNames;

    const NAME: &'static str = "SubjectAlternativeName";

    fn schema(names: &AltNameSchemaNames) -> Template {
        AltName::schema(names)
    }

    fn from_schema(node: &DerNode) -> Result<Self, SchemaError> {
        AltName::from_schema(node).map(SubjectAlternativeName)
    }

    fn to_schema(&self) -> DerNode {
        self.0.to_schema()
    }

    fn to_json(&self) -> Value {
        self.0.to_json()
    }
}

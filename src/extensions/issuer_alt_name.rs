use std::ops::Deref;

use serde_json::Value;

use crate::error::SchemaError;
use crate::node::DerNode;
use crate::schema::Template;
use crate::traits::SchemaObject;

use super::{AltName, AltNameSchemaNames};

/// Issuer Alternative Name
///
/// Note: empty sequences are accepted
///
/// <pre>
/// IssuerAltName ::= GeneralNames
///
/// GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName
/// </pre>
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IssuerAlternativeName(pub AltName);

impl Deref for IssuerAlternativeName {
    type Target = AltName;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<AltName> for IssuerAlternativeName {
    fn from(alt_name: AltName) -> Self {
        IssuerAlternativeName(alt_name)
    }
}

impl SchemaObject for IssuerAlternativeName {
    type Names = AltNameSchemaNames;

    const NAME: &'static str = "IssuerAlternativeName";

    fn schema(names: &AltNameSchemaNames) -> Template {
        AltName::schema(names)
    }

    fn from_schema(node: &DerNode) -> Result<Self, SchemaError> {
        AltName::from_schema(node).map(IssuerAlternativeName)
    }

    fn to_schema(&self) -> DerNode {
        self.0.to_schema()
    }

    fn to_json(&self) -> Value {
        self.0.to_json()
    }
}

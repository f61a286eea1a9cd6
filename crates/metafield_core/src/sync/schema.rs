//! Discovery schema derivation for registered fields.
//!
//! # Responsibility
//! - Project the registered field set into a JSON-Schema-like document for
//!   API discovery responses.
//!
//! # Invariants
//! - The property set is exactly the REST-visible field set: a field absent
//!   from reads is absent here too.

use crate::registry::field_registry::FieldRegistry;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// JSON-Schema-like description of one object type's meta mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDocument {
    pub description: String,
    #[serde(rename = "type")]
    pub schema_type: &'static str,
    pub context: Vec<&'static str>,
    pub properties: BTreeMap<String, PropertySchema>,
}

/// Schema for one registered field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub schema_type: &'static str,
    pub description: String,
    pub default: Value,
}

/// Derives the discovery document for one registry.
pub fn field_schema(registry: &FieldRegistry) -> SchemaDocument {
    let properties = registry
        .rest_fields()
        .into_values()
        .map(|definition| {
            (
                definition.name,
                PropertySchema {
                    schema_type: definition.value_type.as_str(),
                    description: definition.description,
                    default: definition.default,
                },
            )
        })
        .collect();

    SchemaDocument {
        description: format!("Meta fields for {} objects.", registry.object_type().as_str()),
        schema_type: "object",
        context: vec!["view", "edit"],
        properties,
    }
}

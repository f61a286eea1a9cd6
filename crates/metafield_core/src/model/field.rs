//! Meta field definitions.
//!
//! # Responsibility
//! - Define the registration input shape and the REST-visible projection.
//! - Map declared type strings onto the supported typed value set.
//!
//! # Invariants
//! - A `FieldDefinition` always carries a recognized `ValueType`.
//! - Definitions are immutable once registered for the process lifetime.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How many stored values one field may hold per object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// At most one stored value; writes replace it wholesale.
    Single,
    /// Ordered list of values; writes reconcile by diff.
    Multi,
}

impl Cardinality {
    /// Stable string id used in logs and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
        }
    }
}

/// Declared scalar type of a field's values.
///
/// Generic key/value storage flattens every scalar to text, so the declared
/// type is re-imposed on every read. Registrations with an unrecognized type
/// string yield no `ValueType` and are excluded from reads and schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Number,
    Boolean,
}

impl ValueType {
    /// Stable string id matching the JSON Schema type keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Parses one declared type string.
    ///
    /// Returns `None` for empty or unrecognized values; callers treat that
    /// as "field has no usable schema", not as an error.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }
}

/// Raw registration input for one meta field.
///
/// Mirrors what a host registration mechanism hands over: the declared type
/// is an arbitrary string and REST exposure is opt-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRegistration {
    /// Meta key, unique per object type.
    pub name: String,
    /// `true` for single-value semantics, `false` for multi-value.
    pub single: bool,
    /// Declared type string; empty or unknown values disable REST exposure.
    #[serde(rename = "type", default)]
    pub type_name: String,
    /// Human-readable description surfaced in the derived schema.
    #[serde(default)]
    pub description: String,
    /// Default returned by reads when nothing is stored. `Null` if unset.
    #[serde(default)]
    pub default: Value,
    /// Whether the field is exposed through the REST projection at all.
    #[serde(default)]
    pub show_in_rest: bool,
}

impl FieldRegistration {
    /// Creates a REST-visible single-value registration.
    pub fn single(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            single: true,
            type_name: type_name.into(),
            description: String::new(),
            default: Value::Null,
            show_in_rest: true,
        }
    }

    /// Creates a REST-visible multi-value registration.
    pub fn multi(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            single: false,
            type_name: type_name.into(),
            description: String::new(),
            default: Value::Null,
            show_in_rest: true,
        }
    }

    /// Sets the schema description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the default value returned when nothing is stored.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    /// Returns the REST-visible projection, or `None` when the field is not
    /// exposed or its declared type is unusable.
    pub fn rest_definition(&self) -> Option<FieldDefinition> {
        if !self.show_in_rest {
            return None;
        }
        let value_type = ValueType::parse(&self.type_name)?;
        Some(FieldDefinition {
            name: self.name.clone(),
            cardinality: if self.single {
                Cardinality::Single
            } else {
                Cardinality::Multi
            },
            value_type,
            description: self.description.clone(),
            default: self.default.clone(),
        })
    }
}

/// REST-visible projection of one registered field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub cardinality: Cardinality,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub description: String,
    pub default: Value,
}

#[cfg(test)]
mod tests {
    use super::{Cardinality, FieldRegistration, ValueType};
    use serde_json::json;

    #[test]
    fn parses_supported_type_strings() {
        assert_eq!(ValueType::parse("string"), Some(ValueType::String));
        assert_eq!(ValueType::parse(" number "), Some(ValueType::Number));
        assert_eq!(ValueType::parse("boolean"), Some(ValueType::Boolean));
    }

    #[test]
    fn rejects_empty_and_unknown_type_strings() {
        assert_eq!(ValueType::parse(""), None);
        assert_eq!(ValueType::parse("integer"), None);
        assert_eq!(ValueType::parse("object"), None);
    }

    #[test]
    fn rest_definition_requires_show_in_rest() {
        let mut registration = FieldRegistration::single("visible", "string");
        registration.show_in_rest = false;
        assert!(registration.rest_definition().is_none());
    }

    #[test]
    fn rest_definition_requires_recognized_type() {
        let registration = FieldRegistration::single("untyped", "");
        assert!(registration.rest_definition().is_none());
    }

    #[test]
    fn rest_definition_carries_registration_metadata() {
        let registration = FieldRegistration::multi("tags", "string")
            .with_description("Free-form labels.")
            .with_default(json!("untagged"));

        let definition = registration.rest_definition().expect("visible field");
        assert_eq!(definition.name, "tags");
        assert_eq!(definition.cardinality, Cardinality::Multi);
        assert_eq!(definition.value_type, ValueType::String);
        assert_eq!(definition.description, "Free-form labels.");
        assert_eq!(definition.default, json!("untagged"));
    }
}

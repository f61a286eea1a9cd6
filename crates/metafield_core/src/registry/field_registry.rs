//! Field registry and registration validation.
//!
//! # Responsibility
//! - Hold the registered field set for one object type.
//! - Validate field names and reject duplicate registrations.
//! - Derive the REST-visible projection consumed by sync and schema layers.
//!
//! # Invariants
//! - Registered definitions are immutable for the registry lifetime.
//! - `rest_fields()` iterates in stable name order.
//! - Fields without a usable declared type never appear in `rest_fields()`.

use crate::model::entry::ObjectType;
use crate::model::field::{FieldDefinition, FieldRegistration};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static FIELD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid field name regex"));

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidFieldName(String),
    DuplicateField(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFieldName(name) => write!(f, "field name is invalid: `{name}`"),
            Self::DuplicateField(name) => write!(f, "field already registered: `{name}`"),
        }
    }
}

impl Error for RegistryError {}

/// Registered field set for one object type.
pub struct FieldRegistry {
    object_type: ObjectType,
    fields: BTreeMap<String, FieldRegistration>,
}

impl FieldRegistry {
    pub fn new(object_type: ObjectType) -> Self {
        Self {
            object_type,
            fields: BTreeMap::new(),
        }
    }

    /// Object type this registry serves.
    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    /// Registers one field.
    pub fn register(&mut self, registration: FieldRegistration) -> Result<(), RegistryError> {
        let name = registration.name.trim().to_string();
        if !FIELD_NAME_RE.is_match(&name) {
            return Err(RegistryError::InvalidFieldName(name));
        }
        if self.fields.contains_key(name.as_str()) {
            return Err(RegistryError::DuplicateField(name));
        }

        let mut registration = registration;
        registration.name = name.clone();
        self.fields.insert(name, registration);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns one raw registration by name.
    pub fn get(&self, name: &str) -> Option<&FieldRegistration> {
        self.fields.get(name)
    }

    /// Returns the REST-visible definition set in name order.
    ///
    /// Registrations without `show_in_rest` or without a recognized declared
    /// type are omitted, keeping the read path and the derived schema
    /// consistent with each other.
    pub fn rest_fields(&self) -> BTreeMap<String, FieldDefinition> {
        self.fields
            .values()
            .filter_map(|registration| {
                registration
                    .rest_definition()
                    .map(|definition| (definition.name.clone(), definition))
            })
            .collect()
    }
}

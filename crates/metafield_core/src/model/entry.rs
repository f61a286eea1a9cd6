//! Stored meta entry records and object addressing.
//!
//! # Responsibility
//! - Identify one host object as an (object type, object id) pair.
//! - Model one stored raw value with its storage-layer row identity.
//!
//! # Invariants
//! - `EntryId` values are assigned by storage and never reused.
//! - Raw values are kept exactly as the caller supplied them.

use serde::{Deserialize, Serialize};

/// Stable per-entry identity assigned by storage (host row-id semantics).
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type EntryId = i64;

/// Host object kind carrying its own metadata table namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Post,
    Comment,
    Term,
    User,
}

impl ObjectType {
    /// Stable string id used in storage and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
            Self::Term => "term",
            Self::User => "user",
        }
    }

    /// Parses one stored object type string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "post" => Some(Self::Post),
            "comment" => Some(Self::Comment),
            "term" => Some(Self::Term),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

/// Address of one host object's metadata set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub object_type: ObjectType,
    pub object_id: u64,
}

impl ObjectRef {
    pub fn new(object_type: ObjectType, object_id: u64) -> Self {
        Self {
            object_type,
            object_id,
        }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.object_type.as_str(), self.object_id)
    }
}

/// One stored raw value addressed by its storage identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEntry {
    /// Storage-assigned row identity.
    pub entry_id: EntryId,
    /// Object this entry belongs to.
    pub object: ObjectRef,
    /// Meta key.
    pub key: String,
    /// Untyped storage-layer value, stored verbatim.
    pub raw_value: String,
}

#[cfg(test)]
mod tests {
    use super::{ObjectRef, ObjectType};

    #[test]
    fn object_type_string_ids_round_trip() {
        for object_type in [
            ObjectType::Post,
            ObjectType::Comment,
            ObjectType::Term,
            ObjectType::User,
        ] {
            assert_eq!(ObjectType::parse(object_type.as_str()), Some(object_type));
        }
    }

    #[test]
    fn rejects_unknown_object_type() {
        assert_eq!(ObjectType::parse("revision"), None);
    }

    #[test]
    fn object_ref_displays_type_and_id() {
        let object = ObjectRef::new(ObjectType::Post, 42);
        assert_eq!(object.to_string(), "post:42");
    }
}

//! Storage capability contracts and implementations.
//!
//! # Responsibility
//! - Define the narrow primitive set the synchronizer consumes.
//! - Isolate backend details (SQLite, in-memory) behind one trait.
//!
//! # Invariants
//! - Implementations store raw values verbatim; no quoting or escaping is
//!   added on write and none is stripped on read.
//! - Entry ids are stable for the life of an entry and never reused.
//! - `fetch_all`/`list_entries` return entries in insertion order.

use crate::db::DbError;
use crate::model::entry::{EntryId, MetaEntry, ObjectRef};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryMetaStore;
pub use sqlite::SqliteMetaStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer failure for meta primitives.
#[derive(Debug)]
pub enum StoreError {
    /// Entry-addressed primitive targeted a missing entry.
    EntryNotFound(EntryId),
    /// SQLite transport or schema failure.
    Db(DbError),
    /// Persisted state failed to parse back into model types.
    InvalidData(String),
    /// Connection has not been migrated to the expected schema version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Connection schema lacks a required table.
    MissingRequiredTable(&'static str),
    /// Connection schema lacks a required column.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Backend-specific failure described as text.
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntryNotFound(entry_id) => write!(f, "meta entry not found: {entry_id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted meta data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection schema is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "connection schema is missing required column `{table}.{column}`"
            ),
            Self::Backend(message) => write!(f, "storage backend failure: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Narrow primitive set over the host's per-object metadata multimap.
///
/// Mutating primitives take `&mut self` so implementations need no interior
/// mutability; the synchronizer serializes calls within one operation anyway.
pub trait MetaStore {
    /// Returns every stored entry for (object, key), in insertion order.
    fn fetch_all(&self, object: &ObjectRef, key: &str) -> StoreResult<Vec<MetaEntry>>;

    /// Appends one raw value and returns its new entry id.
    fn add_entry(&mut self, object: &ObjectRef, key: &str, raw_value: &str) -> StoreResult<EntryId>;

    /// Deletes entries for (object, key).
    ///
    /// With `raw_value` set, deletes only entries holding exactly that value;
    /// otherwise deletes all entries for the key. Returns whether anything
    /// was deleted.
    fn delete_matching(
        &mut self,
        object: &ObjectRef,
        key: &str,
        raw_value: Option<&str>,
    ) -> StoreResult<bool>;

    /// Overwrites the key with exactly one value.
    ///
    /// When a sole entry already exists its identity is kept and the value
    /// updated in place; duplicate rows collapse to one.
    fn replace_all(&mut self, object: &ObjectRef, key: &str, raw_value: &str) -> StoreResult<()>;

    /// Returns every entry stored for the object, in insertion order.
    fn list_entries(&self, object: &ObjectRef) -> StoreResult<Vec<MetaEntry>>;

    /// Returns one entry by id.
    fn get_entry(&self, entry_id: EntryId) -> StoreResult<Option<MetaEntry>>;

    /// Overwrites one entry's raw value by id.
    fn update_entry(&mut self, entry_id: EntryId, raw_value: &str) -> StoreResult<()>;

    /// Deletes one entry by id.
    fn delete_entry(&mut self, entry_id: EntryId) -> StoreResult<()>;
}

// Lets the synchronizer and the entry service borrow one backing store.
impl<T: MetaStore + ?Sized> MetaStore for &mut T {
    fn fetch_all(&self, object: &ObjectRef, key: &str) -> StoreResult<Vec<MetaEntry>> {
        (**self).fetch_all(object, key)
    }

    fn add_entry(&mut self, object: &ObjectRef, key: &str, raw_value: &str) -> StoreResult<EntryId> {
        (**self).add_entry(object, key, raw_value)
    }

    fn delete_matching(
        &mut self,
        object: &ObjectRef,
        key: &str,
        raw_value: Option<&str>,
    ) -> StoreResult<bool> {
        (**self).delete_matching(object, key, raw_value)
    }

    fn replace_all(&mut self, object: &ObjectRef, key: &str, raw_value: &str) -> StoreResult<()> {
        (**self).replace_all(object, key, raw_value)
    }

    fn list_entries(&self, object: &ObjectRef) -> StoreResult<Vec<MetaEntry>> {
        (**self).list_entries(object)
    }

    fn get_entry(&self, entry_id: EntryId) -> StoreResult<Option<MetaEntry>> {
        (**self).get_entry(entry_id)
    }

    fn update_entry(&mut self, entry_id: EntryId, raw_value: &str) -> StoreResult<()> {
        (**self).update_entry(entry_id, raw_value)
    }

    fn delete_entry(&mut self, entry_id: EntryId) -> StoreResult<()> {
        (**self).delete_entry(entry_id)
    }
}

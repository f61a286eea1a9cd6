//! Per-entry meta CRUD service.
//!
//! # Responsibility
//! - Address one stored value among duplicates via its entry id.
//! - Enforce belongs-to-object, protected-key and scalar-value guards.
//!
//! # Invariants
//! - An entry belonging to a different object is indistinguishable from a
//!   missing entry (`EntryNotFound`), never leaked.
//! - Protected keys (leading `_`) are neither readable nor writable here.
//! - Compound raw payloads are hidden rather than returned as lossy text.

use crate::auth::{Authorizer, MetaAction};
use crate::model::entry::{EntryId, MetaEntry, ObjectRef};
use crate::model::value::{is_compound_raw, raw_from_value};
use crate::store::{MetaStore, StoreError};
use log::info;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EntryServiceResult<T> = Result<T, EntryServiceError>;

/// Entry service errors.
#[derive(Debug)]
pub enum EntryServiceError {
    /// Entry is missing or belongs to a different object.
    EntryNotFound(EntryId),
    /// Key is reserved for internal host use.
    ProtectedKey(String),
    /// Stored payload is compound and cannot be exposed as one scalar.
    NotScalar(EntryId),
    /// Supplied value is not a storable scalar.
    InvalidValue(String),
    /// Host capability check refused the mutation.
    PermissionDenied { key: String, action: MetaAction },
    /// Storage-layer failure.
    Storage(StoreError),
}

impl Display for EntryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntryNotFound(entry_id) => write!(f, "meta entry not found: {entry_id}"),
            Self::ProtectedKey(key) => write!(f, "meta key is protected: `{key}`"),
            Self::NotScalar(entry_id) => {
                write!(f, "meta entry holds a non-scalar payload: {entry_id}")
            }
            Self::InvalidValue(reason) => write!(f, "invalid meta value: {reason}"),
            Self::PermissionDenied { key, action } => {
                write!(f, "not allowed to {} the `{key}` meta key", action.as_str())
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EntryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for EntryServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::EntryNotFound(entry_id) => Self::EntryNotFound(entry_id),
            other => Self::Storage(other),
        }
    }
}

/// Returns whether a key is reserved for internal host bookkeeping.
pub fn is_protected_key(key: &str) -> bool {
    key.starts_with('_')
}

/// Entry-addressed CRUD facade over a store implementation.
pub struct MetaEntryService<S: MetaStore, A: Authorizer> {
    store: S,
    authorizer: A,
}

impl<S: MetaStore, A: Authorizer> MetaEntryService<S, A> {
    pub fn new(store: S, authorizer: A) -> Self {
        Self { store, authorizer }
    }

    /// Lists the object's exposable entries.
    ///
    /// Protected keys and compound payloads are filtered out, mirroring the
    /// guards applied by `get_entry`.
    pub fn list_entries(&self, object: &ObjectRef) -> EntryServiceResult<Vec<MetaEntry>> {
        let entries = self.store.list_entries(object)?;
        Ok(entries
            .into_iter()
            .filter(|entry| !is_protected_key(&entry.key) && !is_compound_raw(&entry.raw_value))
            .collect())
    }

    /// Returns one entry after ownership and exposure guards.
    pub fn get_entry(&self, object: &ObjectRef, entry_id: EntryId) -> EntryServiceResult<MetaEntry> {
        let entry = self
            .store
            .get_entry(entry_id)?
            .filter(|entry| entry.object == *object)
            .ok_or(EntryServiceError::EntryNotFound(entry_id))?;

        if is_protected_key(&entry.key) {
            return Err(EntryServiceError::ProtectedKey(entry.key));
        }
        if is_compound_raw(&entry.raw_value) {
            return Err(EntryServiceError::NotScalar(entry_id));
        }
        Ok(entry)
    }

    /// Appends one entry and returns the stored record.
    pub fn create_entry(
        &mut self,
        object: &ObjectRef,
        key: &str,
        value: &Value,
    ) -> EntryServiceResult<MetaEntry> {
        if is_protected_key(key) {
            return Err(EntryServiceError::ProtectedKey(key.to_string()));
        }
        let raw = raw_from_value(value).ok_or_else(|| {
            EntryServiceError::InvalidValue("expected a scalar value".to_string())
        })?;
        self.authorize(MetaAction::Edit, object, key)?;

        let entry_id = self.store.add_entry(object, key, &raw)?;
        info!("event=meta_entry_create module=service status=ok object={object} entry_id={entry_id}");
        self.store
            .get_entry(entry_id)?
            .ok_or(EntryServiceError::EntryNotFound(entry_id))
    }

    /// Overwrites one entry's value in place.
    pub fn update_entry(
        &mut self,
        object: &ObjectRef,
        entry_id: EntryId,
        value: &Value,
    ) -> EntryServiceResult<MetaEntry> {
        let entry = self.get_entry(object, entry_id)?;
        let raw = raw_from_value(value).ok_or_else(|| {
            EntryServiceError::InvalidValue("expected a scalar value".to_string())
        })?;
        self.authorize(MetaAction::Edit, object, &entry.key)?;

        self.store.update_entry(entry_id, &raw)?;
        info!("event=meta_entry_update module=service status=ok object={object} entry_id={entry_id}");
        self.store
            .get_entry(entry_id)?
            .ok_or(EntryServiceError::EntryNotFound(entry_id))
    }

    /// Deletes one entry.
    pub fn delete_entry(&mut self, object: &ObjectRef, entry_id: EntryId) -> EntryServiceResult<()> {
        let entry = self.get_entry(object, entry_id)?;
        self.authorize(MetaAction::Delete, object, &entry.key)?;

        self.store.delete_entry(entry_id)?;
        info!("event=meta_entry_delete module=service status=ok object={object} entry_id={entry_id}");
        Ok(())
    }

    fn authorize(
        &self,
        action: MetaAction,
        object: &ObjectRef,
        key: &str,
    ) -> EntryServiceResult<()> {
        if self.authorizer.allows(action, object, key) {
            return Ok(());
        }
        Err(EntryServiceError::PermissionDenied {
            key: key.to_string(),
            action,
        })
    }
}

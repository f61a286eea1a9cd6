//! In-memory meta store.
//!
//! # Responsibility
//! - Provide a complete `MetaStore` implementation without external storage,
//!   for embedding hosts that keep metadata transient and for unit tests.
//!
//! # Invariants
//! - Entry ids are monotonically increasing and never reused.
//! - Insertion order is preserved across deletions of other entries.

use crate::model::entry::{EntryId, MetaEntry, ObjectRef};
use crate::store::{MetaStore, StoreError, StoreResult};

/// Ordered in-memory implementation of the storage primitives.
#[derive(Debug)]
pub struct MemoryMetaStore {
    entries: Vec<MetaEntry>,
    next_id: EntryId,
}

impl Default for MemoryMetaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMetaStore {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Total entry count across all objects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl MetaStore for MemoryMetaStore {
    fn fetch_all(&self, object: &ObjectRef, key: &str) -> StoreResult<Vec<MetaEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.object == *object && entry.key == key)
            .cloned()
            .collect())
    }

    fn add_entry(
        &mut self,
        object: &ObjectRef,
        key: &str,
        raw_value: &str,
    ) -> StoreResult<EntryId> {
        let entry_id = self.allocate_id();
        self.entries.push(MetaEntry {
            entry_id,
            object: *object,
            key: key.to_string(),
            raw_value: raw_value.to_string(),
        });
        Ok(entry_id)
    }

    fn delete_matching(
        &mut self,
        object: &ObjectRef,
        key: &str,
        raw_value: Option<&str>,
    ) -> StoreResult<bool> {
        let before = self.entries.len();
        self.entries.retain(|entry| {
            if entry.object != *object || entry.key != key {
                return true;
            }
            match raw_value {
                Some(value) => entry.raw_value != value,
                None => false,
            }
        });
        Ok(self.entries.len() != before)
    }

    fn replace_all(&mut self, object: &ObjectRef, key: &str, raw_value: &str) -> StoreResult<()> {
        let mut matches = self
            .entries
            .iter()
            .filter(|entry| entry.object == *object && entry.key == key);
        let first = matches.next().map(|entry| entry.entry_id);
        let has_duplicates = matches.next().is_some();
        drop(matches);

        match first {
            Some(entry_id) if !has_duplicates => self.update_entry(entry_id, raw_value),
            Some(_) => {
                self.delete_matching(object, key, None)?;
                self.add_entry(object, key, raw_value)?;
                Ok(())
            }
            None => {
                self.add_entry(object, key, raw_value)?;
                Ok(())
            }
        }
    }

    fn list_entries(&self, object: &ObjectRef) -> StoreResult<Vec<MetaEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.object == *object)
            .cloned()
            .collect())
    }

    fn get_entry(&self, entry_id: EntryId) -> StoreResult<Option<MetaEntry>> {
        Ok(self
            .entries
            .iter()
            .find(|entry| entry.entry_id == entry_id)
            .cloned())
    }

    fn update_entry(&mut self, entry_id: EntryId, raw_value: &str) -> StoreResult<()> {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.entry_id == entry_id)
        {
            Some(entry) => {
                entry.raw_value = raw_value.to_string();
                Ok(())
            }
            None => Err(StoreError::EntryNotFound(entry_id)),
        }
    }

    fn delete_entry(&mut self, entry_id: EntryId) -> StoreResult<()> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.entry_id != entry_id);
        if self.entries.len() == before {
            return Err(StoreError::EntryNotFound(entry_id));
        }
        Ok(())
    }
}

//! Typed read/write reconciliation over one object's metadata.
//!
//! # Responsibility
//! - `read`: project stored raw values into typed values per field schema.
//! - `write`: apply a partial desired mapping with least-change updates.
//!
//! # Invariants
//! - A single-cardinality field never retains more than one stored value.
//! - After a multi-value write the stored multiset equals the desired list.
//! - Unchanged multi values are never touched; their entry ids survive.
//! - Fields absent from the desired mapping are left untouched.

use crate::auth::{Authorizer, MetaAction};
use crate::model::entry::{EntryId, MetaEntry, ObjectRef};
use crate::model::field::Cardinality;
use crate::model::value::{coerce, coerce_raw, raw_from_value};
use crate::registry::field_registry::FieldRegistry;
use crate::store::{MetaStore, StoreError};
use crate::sync::schema::{field_schema, SchemaDocument};
use log::{info, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SyncResult<T> = Result<T, SyncError>;

/// Desired field mapping submitted by the host request layer.
///
/// `Null` means "reset to absent/default"; a list is only valid for
/// multi-cardinality fields.
pub type DesiredValues = serde_json::Map<String, Value>;

/// Synchronization errors, annotated with the offending field name.
#[derive(Debug)]
pub enum SyncError {
    /// Host capability check refused the mutation.
    PermissionDenied { field: String, action: MetaAction },
    /// Underlying fetch or mutation call failed.
    Storage { field: String, source: StoreError },
    /// Desired value does not fit the field's declared shape.
    InvalidField { field: String, reason: String },
}

impl SyncError {
    fn storage(field: &str, source: StoreError) -> Self {
        Self::Storage {
            field: field.to_string(),
            source,
        }
    }

    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied { field, action } => write!(
                f,
                "not allowed to {} the `{field}` meta field",
                action.as_str()
            ),
            Self::Storage { field, source } => {
                write!(f, "meta storage failure for `{field}`: {source}")
            }
            Self::InvalidField { field, reason } => {
                write!(f, "invalid value for `{field}`: {reason}")
            }
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Reconciles stored metadata with desired values for one object type.
///
/// Holds the registered field set, a storage implementation and the host
/// authorizer. Request-scoped: nothing is cached between calls.
pub struct MetaFieldSynchronizer<S: MetaStore, A: Authorizer> {
    registry: FieldRegistry,
    store: S,
    authorizer: A,
}

impl<S: MetaStore, A: Authorizer> MetaFieldSynchronizer<S, A> {
    pub fn new(registry: FieldRegistry, store: S, authorizer: A) -> Self {
        Self {
            registry,
            store,
            authorizer,
        }
    }

    /// Registered field set backing this synchronizer.
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Storage handle, for callers that also drive entry-level APIs.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Reads the typed value mapping for one object.
    ///
    /// Single fields yield the first stored value (or the registered
    /// default) cast to the declared type; multi fields yield every stored
    /// value in storage order. Fields without a usable declared type are
    /// not present in the result.
    pub fn read(&self, object: &ObjectRef) -> SyncResult<BTreeMap<String, Value>> {
        let mut response = BTreeMap::new();

        for (name, definition) in self.registry.rest_fields() {
            let entries = self
                .store
                .fetch_all(object, &name)
                .map_err(|source| SyncError::storage(&name, source))?;

            let value = match definition.cardinality {
                Cardinality::Single => {
                    let stored = entries
                        .first()
                        .map(|entry| Value::String(entry.raw_value.clone()));
                    coerce(
                        &stored.unwrap_or_else(|| definition.default.clone()),
                        definition.value_type,
                    )
                }
                Cardinality::Multi => Value::Array(
                    entries
                        .iter()
                        .map(|entry| coerce_raw(&entry.raw_value, definition.value_type))
                        .collect(),
                ),
            };

            response.insert(name, value);
        }

        Ok(response)
    }

    /// Applies a partial desired mapping to one object's metadata.
    ///
    /// Only registered field names present in `desired` are touched;
    /// unregistered names are ignored. The first failing field aborts the
    /// call; mutations already applied for earlier fields are kept.
    pub fn write(&mut self, object: &ObjectRef, desired: &DesiredValues) -> SyncResult<()> {
        let mut touched = 0usize;

        for (name, definition) in self.registry.rest_fields() {
            let Some(desired_value) = desired.get(&name) else {
                continue;
            };
            touched += 1;

            let result = if desired_value.is_null() {
                self.delete_field(object, &name)
            } else {
                match definition.cardinality {
                    Cardinality::Single => self.write_single(object, &name, desired_value),
                    Cardinality::Multi => self.write_multi(object, &name, desired_value),
                }
            };

            if let Err(err) = result {
                warn!(
                    "event=meta_write module=sync status=error object={object} field={name} error={err}"
                );
                return Err(err);
            }
        }

        info!("event=meta_write module=sync status=ok object={object} fields={touched}");
        Ok(())
    }

    /// Derives the discovery schema for the registered field set.
    pub fn schema(&self) -> SchemaDocument {
        field_schema(&self.registry)
    }

    fn authorize(&self, action: MetaAction, object: &ObjectRef, field: &str) -> SyncResult<()> {
        if self.authorizer.allows(action, object, field) {
            return Ok(());
        }
        Err(SyncError::PermissionDenied {
            field: field.to_string(),
            action,
        })
    }

    /// Removes all stored values, relying on the default for later reads.
    fn delete_field(&mut self, object: &ObjectRef, field: &str) -> SyncResult<()> {
        self.authorize(MetaAction::Delete, object, field)?;
        self.store
            .delete_matching(object, field, None)
            .map_err(|source| SyncError::storage(field, source))?;
        Ok(())
    }

    fn write_single(&mut self, object: &ObjectRef, field: &str, desired: &Value) -> SyncResult<()> {
        if desired.is_array() {
            return Err(SyncError::invalid(
                field,
                "received a list for a single-value field",
            ));
        }
        let raw = raw_from_value(desired)
            .ok_or_else(|| SyncError::invalid(field, "expected a scalar value"))?;

        self.authorize(MetaAction::Edit, object, field)?;
        self.store
            .replace_all(object, field, &raw)
            .map_err(|source| SyncError::storage(field, source))
    }

    /// Diff-reconciles a multi-value field against the desired list.
    ///
    /// Computes multiset differences so duplicate counts are respected, then
    /// applies all additions before any removal. Removals are addressed by
    /// entry id so only surplus copies of a duplicated value are dropped and
    /// unchanged entries keep their storage identity.
    fn write_multi(&mut self, object: &ObjectRef, field: &str, desired: &Value) -> SyncResult<()> {
        let Value::Array(items) = desired else {
            return Err(SyncError::invalid(field, "expected a list of values"));
        };

        let mut desired_raws = Vec::with_capacity(items.len());
        for item in items {
            let raw = raw_from_value(item)
                .ok_or_else(|| SyncError::invalid(field, "expected scalar list values"))?;
            desired_raws.push(raw);
        }

        self.authorize(MetaAction::Edit, object, field)?;

        let current = self
            .store
            .fetch_all(object, field)
            .map_err(|source| SyncError::storage(field, source))?;
        let current_raws: Vec<String> = current
            .iter()
            .map(|entry| entry.raw_value.clone())
            .collect();

        let to_add = multiset_diff(&desired_raws, &current_raws);
        let to_remove = surplus_entries(&current, &desired_raws);

        for raw in &to_add {
            self.store
                .add_entry(object, field, raw)
                .map_err(|source| SyncError::storage(field, source))?;
        }
        for entry_id in &to_remove {
            self.store
                .delete_entry(*entry_id)
                .map_err(|source| SyncError::storage(field, source))?;
        }

        Ok(())
    }
}

/// Returns the values of `a` not matched in `b`, by multiset difference.
///
/// Order and duplicate counts of `a` are preserved; each element of `b`
/// cancels at most one matching element of `a`.
fn multiset_diff(a: &[String], b: &[String]) -> Vec<String> {
    let mut remaining: HashMap<&str, usize> = HashMap::new();
    for value in b {
        *remaining.entry(value.as_str()).or_insert(0) += 1;
    }

    let mut difference = Vec::new();
    for value in a {
        match remaining.get_mut(value.as_str()) {
            Some(count) if *count > 0 => *count -= 1,
            _ => difference.push(value.clone()),
        }
    }
    difference
}

/// Selects stored entries exceeding the desired count for their value.
///
/// The earliest copies of each value are kept; later surplus copies are
/// returned for removal.
fn surplus_entries(current: &[MetaEntry], desired: &[String]) -> Vec<EntryId> {
    let mut wanted: HashMap<&str, usize> = HashMap::new();
    for value in desired {
        *wanted.entry(value.as_str()).or_insert(0) += 1;
    }

    let mut surplus = Vec::new();
    for entry in current {
        match wanted.get_mut(entry.raw_value.as_str()) {
            Some(count) if *count > 0 => *count -= 1,
            _ => surplus.push(entry.entry_id),
        }
    }
    surplus
}

#[cfg(test)]
mod tests {
    use super::{multiset_diff, surplus_entries};
    use crate::model::entry::{MetaEntry, ObjectRef, ObjectType};

    fn raws(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn entries(values: &[&str]) -> Vec<MetaEntry> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| MetaEntry {
                entry_id: index as i64 + 1,
                object: ObjectRef::new(ObjectType::Post, 1),
                key: "k".to_string(),
                raw_value: value.to_string(),
            })
            .collect()
    }

    #[test]
    fn multiset_diff_respects_duplicate_counts() {
        assert_eq!(
            multiset_diff(&raws(&["a", "a", "b"]), &raws(&["a"])),
            raws(&["a", "b"])
        );
        assert_eq!(multiset_diff(&raws(&["a"]), &raws(&["a", "a"])), raws(&[]));
    }

    #[test]
    fn multiset_diff_preserves_input_order() {
        assert_eq!(
            multiset_diff(&raws(&["c", "a", "c"]), &raws(&["a"])),
            raws(&["c", "c"])
        );
    }

    #[test]
    fn surplus_entries_keeps_earliest_copies() {
        // Two stored copies of "a", one wanted: the later copy is surplus.
        let current = entries(&["a", "b", "a"]);
        let surplus = surplus_entries(&current, &raws(&["a", "b"]));
        assert_eq!(surplus, vec![3]);
    }

    #[test]
    fn surplus_entries_flags_unwanted_values() {
        let current = entries(&["a", "b"]);
        let surplus = surplus_entries(&current, &raws(&["b", "c"]));
        assert_eq!(surplus, vec![1]);
    }
}

//! SQLite-backed meta store.
//!
//! # Responsibility
//! - Implement the storage primitives over the `meta` table, keeping SQL
//!   details inside the persistence boundary.
//!
//! # Invariants
//! - `try_new` rejects connections without the expected migrated schema.
//! - `meta_id` row identity is assigned by SQLite and never reused
//!   (AUTOINCREMENT), matching host meta-table behavior.
//! - Values are bound as parameters; no quoting is added or stripped.

use crate::db::migrations::latest_version;
use crate::model::entry::{EntryId, MetaEntry, ObjectRef, ObjectType};
use crate::store::{MetaStore, StoreError, StoreResult};
use rusqlite::{params, Connection, Row};

const META_SELECT_SQL: &str = "SELECT
    meta_id,
    object_type,
    object_id,
    meta_key,
    meta_value
FROM meta";

const REQUIRED_COLUMNS: &[&str] = &["meta_id", "object_type", "object_id", "meta_key", "meta_value"];

/// SQLite implementation of the storage primitives.
pub struct SqliteMetaStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMetaStore<'conn> {
    /// Wraps a migrated connection after validating its schema.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let mut stmt = conn.prepare("PRAGMA table_info(meta);")?;
        let mut rows = stmt.query([])?;
        let mut columns = Vec::new();
        while let Some(row) = rows.next()? {
            columns.push(row.get::<_, String>("name")?);
        }
        if columns.is_empty() {
            return Err(StoreError::MissingRequiredTable("meta"));
        }
        for required in REQUIRED_COLUMNS.iter().copied() {
            if !columns.iter().any(|column| column == required) {
                return Err(StoreError::MissingRequiredColumn {
                    table: "meta",
                    column: required,
                });
            }
        }

        Ok(Self { conn })
    }
}

impl MetaStore for SqliteMetaStore<'_> {
    fn fetch_all(&self, object: &ObjectRef, key: &str) -> StoreResult<Vec<MetaEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{META_SELECT_SQL}
             WHERE object_type = ?1 AND object_id = ?2 AND meta_key = ?3
             ORDER BY meta_id ASC;"
        ))?;
        let mut rows = stmt.query(params![
            object.object_type.as_str(),
            object.object_id as i64,
            key
        ])?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_meta_row(row)?);
        }
        Ok(entries)
    }

    fn add_entry(
        &mut self,
        object: &ObjectRef,
        key: &str,
        raw_value: &str,
    ) -> StoreResult<EntryId> {
        self.conn.execute(
            "INSERT INTO meta (object_type, object_id, meta_key, meta_value)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                object.object_type.as_str(),
                object.object_id as i64,
                key,
                raw_value
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn delete_matching(
        &mut self,
        object: &ObjectRef,
        key: &str,
        raw_value: Option<&str>,
    ) -> StoreResult<bool> {
        let changed = match raw_value {
            Some(value) => self.conn.execute(
                "DELETE FROM meta
                 WHERE object_type = ?1 AND object_id = ?2 AND meta_key = ?3
                   AND meta_value = ?4;",
                params![
                    object.object_type.as_str(),
                    object.object_id as i64,
                    key,
                    value
                ],
            )?,
            None => self.conn.execute(
                "DELETE FROM meta
                 WHERE object_type = ?1 AND object_id = ?2 AND meta_key = ?3;",
                params![object.object_type.as_str(), object.object_id as i64, key],
            )?,
        };
        Ok(changed > 0)
    }

    fn replace_all(&mut self, object: &ObjectRef, key: &str, raw_value: &str) -> StoreResult<()> {
        let existing = self.fetch_all(object, key)?;
        match existing.as_slice() {
            [sole] => self.update_entry(sole.entry_id, raw_value),
            [] => {
                self.add_entry(object, key, raw_value)?;
                Ok(())
            }
            _ => {
                // Duplicate rows for a single-value key collapse to one.
                self.delete_matching(object, key, None)?;
                self.add_entry(object, key, raw_value)?;
                Ok(())
            }
        }
    }

    fn list_entries(&self, object: &ObjectRef) -> StoreResult<Vec<MetaEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{META_SELECT_SQL}
             WHERE object_type = ?1 AND object_id = ?2
             ORDER BY meta_id ASC;"
        ))?;
        let mut rows = stmt.query(params![object.object_type.as_str(), object.object_id as i64])?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_meta_row(row)?);
        }
        Ok(entries)
    }

    fn get_entry(&self, entry_id: EntryId) -> StoreResult<Option<MetaEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{META_SELECT_SQL} WHERE meta_id = ?1;"))?;
        let mut rows = stmt.query(params![entry_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_meta_row(row)?));
        }
        Ok(None)
    }

    fn update_entry(&mut self, entry_id: EntryId, raw_value: &str) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE meta SET meta_value = ?1 WHERE meta_id = ?2;",
            params![raw_value, entry_id],
        )?;
        if changed == 0 {
            return Err(StoreError::EntryNotFound(entry_id));
        }
        Ok(())
    }

    fn delete_entry(&mut self, entry_id: EntryId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM meta WHERE meta_id = ?1;", params![entry_id])?;
        if changed == 0 {
            return Err(StoreError::EntryNotFound(entry_id));
        }
        Ok(())
    }
}

fn parse_meta_row(row: &Row<'_>) -> StoreResult<MetaEntry> {
    let type_text: String = row.get("object_type")?;
    let object_type = ObjectType::parse(&type_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid object type `{type_text}` in meta.object_type"
        ))
    })?;

    let object_id: i64 = row.get("object_id")?;
    let object_id = u64::try_from(object_id).map_err(|_| {
        StoreError::InvalidData(format!("negative object id `{object_id}` in meta.object_id"))
    })?;

    Ok(MetaEntry {
        entry_id: row.get("meta_id")?,
        object: ObjectRef::new(object_type, object_id),
        key: row.get("meta_key")?,
        raw_value: row.get("meta_value")?,
    })
}

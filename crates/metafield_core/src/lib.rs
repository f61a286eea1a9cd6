//! Typed meta-field synchronization core for CMS-style objects.
//!
//! Translates a registered field schema set plus a desired value mapping
//! into least-change updates against a key/value metadata store, and derives
//! the discovery schema host routing layers serve. Storage and authorization
//! stay behind narrow traits; this crate is the single source of truth for
//! cardinality, coercion and reconciliation invariants.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod registry;
pub mod service;
pub mod store;
pub mod sync;

pub use auth::{AllowAll, Authorizer, MetaAction};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{EntryId, MetaEntry, ObjectRef, ObjectType};
pub use model::field::{Cardinality, FieldDefinition, FieldRegistration, ValueType};
pub use registry::field_registry::{FieldRegistry, RegistryError};
pub use service::entry_service::{EntryServiceError, EntryServiceResult, MetaEntryService};
pub use store::{MemoryMetaStore, MetaStore, SqliteMetaStore, StoreError, StoreResult};
pub use sync::{
    field_schema, DesiredValues, MetaFieldSynchronizer, PropertySchema, SchemaDocument, SyncError,
    SyncResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Meta-field synchronization engine.
//!
//! # Responsibility
//! - Reconcile one object's stored metadata with a desired value mapping.
//! - Derive the JSON-Schema-like discovery document for registered fields.
//!
//! # Invariants
//! - No caching across calls; every operation re-fetches from storage.
//! - Mutations are individually authorized and individually fallible;
//!   there is no rollback of mutations already applied in the same call.

pub mod schema;
pub mod synchronizer;

pub use schema::{field_schema, PropertySchema, SchemaDocument};
pub use synchronizer::{DesiredValues, MetaFieldSynchronizer, SyncError, SyncResult};

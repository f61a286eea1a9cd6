//! In-process registration of meta fields per object type.
//!
//! # Responsibility
//! - Accept and validate field registrations from the embedding host.
//! - Project registrations into the REST-visible definition set.

pub mod field_registry;

//! Domain model for registered meta fields and stored meta entries.
//!
//! # Responsibility
//! - Define canonical data structures used by registry, store and sync layers.
//! - Keep raw storage values and typed response values clearly separated.
//!
//! # Invariants
//! - Raw values travel through storage verbatim; typing is re-imposed on read.
//! - Every stored entry is identified by a stable `EntryId`.

pub mod entry;
pub mod field;
pub mod value;

//! Entry-level use-case services.
//!
//! # Responsibility
//! - Orchestrate storage primitives into entry-addressed APIs for host
//!   routing layers.
//! - Keep callers decoupled from storage details.

pub mod entry_service;

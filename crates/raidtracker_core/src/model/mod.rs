//! Tracker domain model.
//!
//! # Responsibility
//! - Define the fixed activity catalog and the participant record shape.
//! - Reconcile stored records with the current catalog.
//!
//! # Invariants
//! - Every in-memory record has been migrated to the current catalog.
//! - Records are append-only; there is no delete path.

pub mod catalog;
pub mod migration;
pub mod record;

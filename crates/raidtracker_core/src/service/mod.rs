//! Application state services.
//!
//! # Responsibility
//! - Own mutable tracker state and expose the named mutation operations.
//! - Keep presentation layers decoupled from storage details.

pub mod record_store;

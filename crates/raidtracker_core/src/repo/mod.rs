//! Persistence adapter layer.
//!
//! # Responsibility
//! - Define the key-value contract consumed by the record store.
//! - Keep SQL details out of the store and model layers.

pub mod kv_store;

//! Core logic for the raid attendance tracker.
//!
//! Holds the activity catalog, participant records with their migration,
//! the weekly reset schedule, and the write-through record store.
//! Presentation layers depend on this crate and never touch storage
//! directly.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::catalog::{
    find_activity, resolve_activity, Activity, ParseActivityError, ParseTierError, Tier, CATALOG,
};
pub use model::migration::{migrate_record, MigrationError};
pub use model::record::{CompletionMap, ParticipantRecord, TierMarks};
pub use repo::kv_store::{KeyValueStore, KvError, KvResult, MemoryKvStore, SqliteKvStore};
pub use schedule::{ResetDecision, ResetSchedule};
pub use service::record_store::{
    RecordStore, StartupReport, StoreError, StoreResult, LAST_VISIT_KEY, RECORDS_KEY,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

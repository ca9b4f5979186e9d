//! Participant record store.
//!
//! # Responsibility
//! - Own the ordered participant list for one running instance.
//! - Funnel every mutation through named operations with write-through.
//! - Run the once-per-startup weekly reset check.
//!
//! # Invariants
//! - Single writer: all mutation goes through `&mut self`.
//! - Every successful mutation is followed by a whole-collection write of
//!   `RECORDS_KEY`. A failed write keeps the in-memory change and reports
//!   `StoreError::Persistence`.
//! - Rejected operations (bad index, unknown activity) touch neither memory
//!   nor the adapter.
//! - A stored payload that is not a JSON array loads as an empty store; a
//!   bad element drops only itself.

use crate::model::catalog::{find_activity, Tier};
use crate::model::migration::migrate_record;
use crate::model::record::ParticipantRecord;
use crate::repo::kv_store::{KeyValueStore, KvError};
use crate::schedule::{ResetDecision, ResetSchedule};
use chrono::{DateTime, TimeZone};
use log::{debug, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Adapter key holding the JSON record array.
pub const RECORDS_KEY: &str = "raidtracker-characters";
/// Adapter key holding the last startup instant in epoch milliseconds.
pub const LAST_VISIT_KEY: &str = "raidtracker-last-visit";

pub type StoreResult<T> = Result<T, StoreError>;

/// Record store operation error.
#[derive(Debug)]
pub enum StoreError {
    /// Index does not address an existing record.
    RecordNotFound { index: usize, len: usize },
    /// Activity id is not part of the current catalog.
    UnknownActivity(String),
    /// The persistence adapter rejected a read or write.
    Persistence(KvError),
    /// Records could not be encoded for persistence.
    Encode(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecordNotFound { index, len } => {
                write!(f, "no participant at index {index} (store has {len})")
            }
            Self::UnknownActivity(id) => write!(f, "unknown activity `{id}`"),
            Self::Persistence(err) => write!(f, "persistence failed: {err}"),
            Self::Encode(err) => write!(f, "failed to encode participants: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::RecordNotFound { .. } | Self::UnknownActivity(_) => None,
        }
    }
}

impl From<KvError> for StoreError {
    fn from(value: KvError) -> Self {
        Self::Persistence(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Result of the startup reset check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupReport {
    pub decision: ResetDecision,
    /// Boundary the last visit was compared against, epoch milliseconds.
    pub boundary_epoch_ms: i64,
    /// Marks cleared by the check; zero unless `decision` is `Due`.
    pub cleared_marks: usize,
}

/// Single-writer container for participant records.
pub struct RecordStore<S: KeyValueStore> {
    kv: S,
    records: Vec<ParticipantRecord>,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Loads and migrates records from `kv`.
    ///
    /// A missing payload, or one that is not a JSON array, yields an empty
    /// store. Array elements that are not objects are skipped; every other
    /// element is migrated.
    ///
    /// # Errors
    /// - `Persistence` when the adapter read itself fails.
    pub fn load(kv: S) -> StoreResult<Self> {
        let records = match kv.get(RECORDS_KEY)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<Value>>(&raw) {
                Ok(values) => migrate_all(&values),
                Err(err) => {
                    warn!(
                        "event=store_load module=store status=fallback reason=malformed_payload bytes={} error={err}",
                        raw.len()
                    );
                    Vec::new()
                }
            },
        };

        info!(
            "event=store_load module=store status=ok records={}",
            records.len()
        );
        Ok(Self { kv, records })
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[ParticipantRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ParticipantRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a participant with the trimmed `name`.
    ///
    /// Returns the new record index, or `None` when the trimmed name is
    /// empty (nothing is stored or written in that case).
    pub fn add(&mut self, name: &str) -> StoreResult<Option<usize>> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            debug!("event=record_add module=store status=skipped reason=empty_name");
            return Ok(None);
        }

        self.records.push(ParticipantRecord::new(trimmed));
        let index = self.records.len() - 1;
        debug!("event=record_add module=store status=ok index={index}");
        self.persist()?;
        Ok(Some(index))
    }

    /// Replaces the name at `index`. Empty values are accepted.
    pub fn update_name(&mut self, index: usize, value: impl Into<String>) -> StoreResult<()> {
        self.record_mut(index)?.name = value.into();
        debug!("event=record_update module=store status=ok field=name index={index}");
        self.persist()
    }

    /// Replaces the free-text gear score at `index`.
    pub fn update_score(&mut self, index: usize, value: impl Into<String>) -> StoreResult<()> {
        self.record_mut(index)?.gear_score = value.into();
        debug!("event=record_update module=store status=ok field=gear_score index={index}");
        self.persist()
    }

    /// Flips one completion mark and returns its new value.
    pub fn toggle_completion(
        &mut self,
        index: usize,
        activity_id: &str,
        tier: Tier,
    ) -> StoreResult<bool> {
        if find_activity(activity_id).is_none() {
            return Err(StoreError::UnknownActivity(activity_id.to_string()));
        }

        let marked = self
            .record_mut(index)?
            .completion
            .toggle(activity_id, tier)
            .ok_or_else(|| StoreError::UnknownActivity(activity_id.to_string()))?;
        debug!(
            "event=record_toggle module=store status=ok index={index} activity={activity_id} tier={tier} marked={marked}"
        );
        self.persist()?;
        Ok(marked)
    }

    /// Clears every completion mark on every record.
    ///
    /// Returns how many marks were set before the reset.
    pub fn reset_all(&mut self) -> StoreResult<usize> {
        let mut cleared = 0;
        for record in &mut self.records {
            cleared += record.completion.marked_count();
            record.reset_completion();
        }
        info!(
            "event=reset_all module=store status=ok records={} cleared_marks={cleared}",
            self.records.len()
        );
        self.persist()?;
        Ok(cleared)
    }

    /// Runs the weekly reset check for this startup.
    ///
    /// Clears all marks when the stored last visit predates the most recent
    /// boundary, then unconditionally records `now` as the last visit.
    /// Must run before any user-triggered mutation.
    pub fn run_startup_check<Tz: TimeZone>(
        &mut self,
        schedule: &ResetSchedule,
        now: &DateTime<Tz>,
    ) -> StoreResult<StartupReport> {
        let last_visit = self.kv.get(LAST_VISIT_KEY)?;
        let boundary_epoch_ms = schedule.last_boundary(now).timestamp_millis();
        let decision = schedule.decide(last_visit.as_deref(), now);

        let cleared_marks = if decision.is_due() {
            self.reset_all()?
        } else {
            0
        };

        self.kv
            .set(LAST_VISIT_KEY, &now.timestamp_millis().to_string())?;
        info!(
            "event=startup_check module=store status=ok decision={} boundary_ms={boundary_epoch_ms} cleared_marks={cleared_marks}",
            decision.as_str()
        );

        Ok(StartupReport {
            decision,
            boundary_epoch_ms,
            cleared_marks,
        })
    }

    fn record_mut(&mut self, index: usize) -> StoreResult<&mut ParticipantRecord> {
        let len = self.records.len();
        self.records
            .get_mut(index)
            .ok_or(StoreError::RecordNotFound { index, len })
    }

    fn persist(&self) -> StoreResult<()> {
        let payload = serde_json::to_string(&self.records)?;
        if let Err(err) = self.kv.set(RECORDS_KEY, &payload) {
            warn!(
                "event=store_persist module=store status=error records={} error={err}",
                self.records.len()
            );
            return Err(err.into());
        }
        Ok(())
    }
}

fn migrate_all(values: &[Value]) -> Vec<ParticipantRecord> {
    values
        .iter()
        .enumerate()
        .filter_map(|(position, value)| match migrate_record(value) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(
                    "event=store_load module=store status=skipped position={position} error={err}"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{RecordStore, StoreError, RECORDS_KEY};
    use crate::model::catalog::Tier;
    use crate::repo::kv_store::{KeyValueStore, KvError, KvResult, MemoryKvStore};
    use std::cell::Cell;

    /// Adapter whose writes fail once `fail_writes` is set.
    #[derive(Default)]
    struct FlakyKvStore {
        inner: MemoryKvStore,
        fail_writes: Cell<bool>,
    }

    impl KeyValueStore for FlakyKvStore {
        fn get(&self, key: &str) -> KvResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> KvResult<()> {
            if self.fail_writes.get() {
                return Err(KvError::Backend("disk full".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn failed_write_keeps_in_memory_change() {
        let kv = FlakyKvStore::default();
        let mut store = RecordStore::load(&kv).unwrap();
        store.add("Thrall").unwrap();

        kv.fail_writes.set(true);
        let err = store.update_score(0, "5600").unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
        assert_eq!(store.records()[0].gear_score, "5600");

        let persisted = kv.inner.get(RECORDS_KEY).unwrap().unwrap();
        assert!(!persisted.contains("5600"));
    }

    #[test]
    fn rejected_toggle_does_not_write() {
        let kv = MemoryKvStore::new();
        let mut store = RecordStore::load(&kv).unwrap();

        let err = store.toggle_completion(0, "ICC", Tier::Ten).unwrap_err();
        assert!(matches!(err, StoreError::RecordNotFound { index: 0, len: 0 }));
        assert_eq!(kv.get(RECORDS_KEY).unwrap(), None);
    }
}

//! Participant record and completion map.
//!
//! # Responsibility
//! - Define the in-memory shape of one tracked participant.
//! - Map that shape to the durable JSON wire format.
//!
//! # Invariants
//! - `CompletionMap` always holds exactly one entry per `CATALOG` activity.
//! - Completion data for activities outside the catalog is carried through
//!   unchanged and re-emitted inside `raids` on serialization, until the
//!   next completion reset drops it.
//! - Deserialization always goes through record migration.

use crate::model::catalog::{Activity, Tier, CATALOG};
use crate::model::migration::migrate_stored;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Completion marks for one activity, one flag per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierMarks {
    ten: bool,
    twenty_five: bool,
}

impl TierMarks {
    pub fn new(ten: bool, twenty_five: bool) -> Self {
        Self { ten, twenty_five }
    }

    pub fn get(self, tier: Tier) -> bool {
        match tier {
            Tier::Ten => self.ten,
            Tier::TwentyFive => self.twenty_five,
        }
    }

    pub fn set(&mut self, tier: Tier, value: bool) {
        match tier {
            Tier::Ten => self.ten = value,
            Tier::TwentyFive => self.twenty_five = value,
        }
    }

    /// Flips one tier and returns its new value.
    pub fn toggle(&mut self, tier: Tier) -> bool {
        let next = !self.get(tier);
        self.set(tier, next);
        next
    }

    fn to_value(self) -> Value {
        let mut tiers = Map::new();
        for tier in Tier::ALL {
            tiers.insert(tier.as_str().to_string(), Value::Bool(self.get(tier)));
        }
        Value::Object(tiers)
    }
}

/// Per-activity completion marks for the current catalog.
///
/// Entries are stored parallel to `CATALOG`, so a map can never be missing
/// an activity or hold one the catalog does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionMap {
    entries: Vec<TierMarks>,
}

impl Default for CompletionMap {
    fn default() -> Self {
        Self::fresh()
    }
}

impl CompletionMap {
    /// All activities, all tiers unmarked.
    pub fn fresh() -> Self {
        Self {
            entries: vec![TierMarks::default(); CATALOG.len()],
        }
    }

    /// Builds a map by asking `marks_for` about every catalog activity.
    pub(crate) fn from_fn(mut marks_for: impl FnMut(&'static Activity) -> TierMarks) -> Self {
        Self {
            entries: CATALOG.iter().map(|activity| marks_for(activity)).collect(),
        }
    }

    pub fn get(&self, activity_id: &str) -> Option<TierMarks> {
        position(activity_id).map(|index| self.entries[index])
    }

    pub fn is_marked(&self, activity_id: &str, tier: Tier) -> Option<bool> {
        self.get(activity_id).map(|marks| marks.get(tier))
    }

    /// Flips one mark. Returns the new value, or `None` for unknown ids.
    pub fn toggle(&mut self, activity_id: &str, tier: Tier) -> Option<bool> {
        let index = position(activity_id)?;
        Some(self.entries[index].toggle(tier))
    }

    /// Catalog activities paired with their marks, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static Activity, TierMarks)> + '_ {
        CATALOG.iter().zip(self.entries.iter().copied())
    }

    /// Number of set marks across all activities and tiers.
    pub fn marked_count(&self) -> usize {
        self.entries
            .iter()
            .map(|marks| Tier::ALL.iter().filter(|tier| marks.get(**tier)).count())
            .sum()
    }
}

fn position(activity_id: &str) -> Option<usize> {
    CATALOG
        .iter()
        .position(|activity| activity.id == activity_id)
}

/// Persisted state for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StoredRecord", from = "StoredRecord")]
pub struct ParticipantRecord {
    /// Display name. May be empty while being edited.
    pub name: String,
    /// Free-text readiness score; never validated as a number.
    pub gear_score: String,
    pub completion: CompletionMap,
    /// `raids` entries for activities no longer in the catalog.
    pub(crate) retired: Map<String, Value>,
    /// Unknown top-level fields from stored payloads.
    pub(crate) extra: Map<String, Value>,
}

impl ParticipantRecord {
    /// Creates a record with an empty score and no completion marks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gear_score: String::new(),
            completion: CompletionMap::fresh(),
            retired: Map::new(),
            extra: Map::new(),
        }
    }

    /// Replaces the completion data with a fresh map for the current
    /// catalog. Retired entries are dropped so no stale mark survives.
    pub fn reset_completion(&mut self) {
        self.completion = CompletionMap::fresh();
        self.retired.clear();
    }

    /// Activity ids carried from older catalogs.
    pub fn retired_activity_ids(&self) -> impl Iterator<Item = &str> {
        self.retired.keys().map(String::as_str)
    }

    /// Wire representation of this record.
    pub fn to_value(&self) -> Value {
        let mut object = self.extra.clone();
        object.insert("name".to_string(), Value::String(self.name.clone()));
        object.insert(
            "gearScore".to_string(),
            Value::String(self.gear_score.clone()),
        );
        object.insert("raids".to_string(), Value::Object(self.raids_object()));
        Value::Object(object)
    }

    fn raids_object(&self) -> Map<String, Value> {
        let mut raids = self.retired.clone();
        for (activity, marks) in self.completion.iter() {
            raids.insert(activity.id.to_string(), marks.to_value());
        }
        raids
    }
}

/// Durable JSON shape. Field values are kept loose so migration can repair
/// anything an older build (or a hand edit) left behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredRecord {
    #[serde(default)]
    pub(crate) name: Value,
    #[serde(rename = "gearScore", default)]
    pub(crate) gear_score: Value,
    #[serde(default)]
    pub(crate) raids: Value,
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

impl From<StoredRecord> for ParticipantRecord {
    fn from(value: StoredRecord) -> Self {
        migrate_stored(value)
    }
}

impl From<ParticipantRecord> for StoredRecord {
    fn from(value: ParticipantRecord) -> Self {
        let raids = Value::Object(value.raids_object());
        Self {
            name: Value::String(value.name),
            gear_score: Value::String(value.gear_score),
            raids,
            extra: value.extra,
        }
    }
}

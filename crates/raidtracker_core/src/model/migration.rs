//! Record migration against the current activity catalog.
//!
//! # Responsibility
//! - Repair stored records written by builds with an older or smaller
//!   catalog, or with malformed completion data.
//!
//! # Invariants
//! - Output completion maps cover every catalog activity with both tiers.
//! - Migration only adds: completion data for unknown activities is kept
//!   as retired entries, never dropped here.
//! - Migration is idempotent.
//! - Only a non-object record is an error; everything below it is repaired.

use crate::model::catalog::{find_activity, Tier};
use crate::model::record::{CompletionMap, ParticipantRecord, StoredRecord, TierMarks};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Record-level migration failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// The stored record is not a JSON object.
    NotAnObject { found: &'static str },
}

impl Display for MigrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject { found } => {
                write!(f, "stored record must be a JSON object, found {found}")
            }
        }
    }
}

impl Error for MigrationError {}

/// Migrates one raw stored record to the current catalog.
///
/// # Errors
/// - Returns `NotAnObject` when `raw` is not a JSON object.
pub fn migrate_record(raw: &Value) -> Result<ParticipantRecord, MigrationError> {
    let Value::Object(object) = raw else {
        return Err(MigrationError::NotAnObject {
            found: json_kind(raw),
        });
    };

    let mut extra = object.clone();
    let name = extra.remove("name").unwrap_or(Value::Null);
    let gear_score = extra.remove("gearScore").unwrap_or(Value::Null);
    let raids = extra.remove("raids").unwrap_or(Value::Null);

    Ok(migrate_stored(StoredRecord {
        name,
        gear_score,
        raids,
        extra,
    }))
}

pub(crate) fn migrate_stored(stored: StoredRecord) -> ParticipantRecord {
    let (completion, retired) = migrate_completion(&stored.raids);
    ParticipantRecord {
        name: coerce_text(stored.name),
        gear_score: coerce_text(stored.gear_score),
        completion,
        retired,
        extra: stored.extra,
    }
}

/// Splits raw `raids` data into catalog marks and retired entries.
fn migrate_completion(raids: &Value) -> (CompletionMap, Map<String, Value>) {
    let Value::Object(entries) = raids else {
        return (CompletionMap::fresh(), Map::new());
    };

    let completion = CompletionMap::from_fn(|activity| match entries.get(activity.id) {
        Some(Value::Object(tiers)) => {
            let mut marks = TierMarks::default();
            for tier in Tier::ALL {
                marks.set(tier, tiers.get(tier.as_str()).is_some_and(is_truthy));
            }
            marks
        }
        _ => TierMarks::default(),
    });

    let retired = entries
        .iter()
        .filter(|(id, _)| find_activity(id).is_none())
        .map(|(id, value)| (id.clone(), value.clone()))
        .collect();

    (completion, retired)
}

/// Loose truthiness: absent, `false`, `0`, `""` and `null` are unmarked.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn coerce_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! Build-time activity catalog.
//!
//! # Responsibility
//! - Define the fixed list of trackable activities and their display labels.
//! - Define the two difficulty tiers every activity is tracked at.
//!
//! # Invariants
//! - Activity ids are unique and stable; they are the durable JSON keys.
//! - Catalog order is display order.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One trackable recurring activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Activity {
    /// Stable identifier used as the `raids` key in stored payloads.
    pub id: &'static str,
    /// Column header shown by presentation layers.
    pub label: &'static str,
}

/// Current activity catalog, in display order.
pub const CATALOG: &[Activity] = &[
    Activity {
        id: "VOA",
        label: "VOA",
    },
    Activity {
        id: "RS",
        label: "RS",
    },
    Activity {
        id: "ICC",
        label: "ICC",
    },
    Activity {
        id: "TOC",
        label: "TOC",
    },
    Activity {
        id: "Naxx",
        label: "Naxx",
    },
    Activity {
        id: "Ulduar",
        label: "Ulduar",
    },
];

/// Returns the catalog entry for `id`, if any.
pub fn find_activity(id: &str) -> Option<&'static Activity> {
    CATALOG.iter().find(|activity| activity.id == id)
}

/// Looks up a catalog entry by id, ignoring ASCII case.
///
/// Used by text front ends where users type `icc` for `ICC`.
pub fn resolve_activity(input: &str) -> Result<&'static Activity, ParseActivityError> {
    let trimmed = input.trim();
    find_activity(trimmed)
        .or_else(|| {
            CATALOG
                .iter()
                .find(|activity| activity.id.eq_ignore_ascii_case(trimmed))
        })
        .ok_or_else(|| ParseActivityError(trimmed.to_string()))
}

/// Unknown activity id error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActivityError(pub String);

impl Display for ParseActivityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let known = CATALOG
            .iter()
            .map(|activity| activity.id)
            .collect::<Vec<_>>()
            .join("|");
        write!(f, "unknown activity `{}`; expected {known}", self.0)
    }
}

impl Error for ParseActivityError {}

/// Difficulty tier. Serialized as the raid size string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Ten,
    TwentyFive,
}

impl Tier {
    /// Both tiers, in display order.
    pub const ALL: [Tier; 2] = [Tier::Ten, Tier::TwentyFive];

    /// Stable wire key (`"10"` or `"25"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ten => "10",
            Self::TwentyFive => "25",
        }
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = ParseTierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "10" => Ok(Self::Ten),
            "25" => Ok(Self::TwentyFive),
            other => Err(ParseTierError(other.to_string())),
        }
    }
}

/// Unknown tier string error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTierError(pub String);

impl Display for ParseTierError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown tier `{}`; expected 10|25", self.0)
    }
}

impl Error for ParseTierError {}

//! Key-by-key comparison of two document snapshots.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The status of an item in a diff comparison.
///
/// - `Added`     -- present only in the incoming/new side.
/// - `Removed`   -- present only in the current/old side.
/// - `Changed`   -- present in both sides but with different values.
/// - `Unchanged` -- present in both sides with identical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl DiffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        }
    }

    fn of(old: Option<&Value>, new: Option<&Value>) -> Option<DiffStatus> {
        match (old, new) {
            (None, None) => None,
            (None, Some(_)) => Some(Self::Added),
            (Some(_), None) => Some(Self::Removed),
            (Some(a), Some(b)) if a == b => Some(Self::Unchanged),
            (Some(_), Some(_)) => Some(Self::Changed),
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One top-level key whose value differs between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionChange {
    pub section: String,
    pub status: DiffStatus,
}

/// Top-level keys of `new` in order, followed by keys only `old` has.
/// Unchanged keys are omitted. Non-object inputs are treated as empty.
pub fn changed_sections(old: &Value, new: &Value) -> Vec<SectionChange> {
    let empty = serde_json::Map::new();
    let old = old.as_object().unwrap_or(&empty);
    let new = new.as_object().unwrap_or(&empty);

    let removed = old.keys().filter(|key| !new.contains_key(*key));
    new.keys()
        .chain(removed)
        .filter_map(|key| {
            let status = DiffStatus::of(old.get(key), new.get(key))?;
            (status != DiffStatus::Unchanged).then(|| SectionChange {
                section: key.clone(),
                status,
            })
        })
        .collect()
}

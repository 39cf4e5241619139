//! Section order and visibility.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use super::reader::{self, Violations};
use super::SectionId;
use crate::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub sections: Vec<SectionEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionEntry {
    pub id: SectionId,
    pub visible: bool,
}

impl Layout {
    pub fn is_visible(&self, id: SectionId) -> bool {
        self.sections
            .iter()
            .find(|entry| entry.id == id)
            .is_some_and(|entry| entry.visible)
    }

    /// Visible sections in display order.
    pub fn visible_sections(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.sections
            .iter()
            .filter(|entry| entry.visible)
            .map(|entry| entry.id)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            sections: SectionId::ALL
                .into_iter()
                .map(|id| SectionEntry { id, visible: true })
                .collect(),
        }
    }
}

/// Normalize the layout block.
///
/// Entries are `{id, visible}` objects or bare id strings (the older shape,
/// meaning visible). Unknown ids are dropped, repeated ids keep their first
/// occurrence, and sections never mentioned are appended in canonical order
/// as visible.
pub(crate) fn normalize(raw: Option<&Value>, at: &Path, violations: &mut Violations) -> Layout {
    let obj = reader::section(raw, at, violations);
    let entries = reader::array(obj, "sections", at, violations).unwrap_or_default();
    let list_path = at.clone().field("sections");

    let mut seen = HashSet::new();
    let mut sections = Vec::with_capacity(SectionId::ALL.len());

    for (i, entry) in entries.iter().enumerate() {
        let item_path = list_path.clone().index(i);
        let parsed = match entry {
            Value::String(key) => Some((key.as_str(), true)),
            Value::Object(_) => {
                let obj = reader::element(entry, item_path.clone(), violations);
                let visible = reader::bool_or(obj, "visible", true, &item_path, violations);
                match obj.and_then(|o| o.get("id")) {
                    Some(Value::String(key)) => Some((key.as_str(), visible)),
                    Some(other) => {
                        violations.wrong_type(item_path.field("id"), "a string", other);
                        None
                    }
                    None => {
                        violations.required(item_path.field("id"), "a string");
                        None
                    }
                }
            }
            other => {
                violations.wrong_type(item_path, "a section id or an object", other);
                None
            }
        };

        let Some((key, visible)) = parsed else {
            continue;
        };
        let Some(id) = SectionId::parse(key) else {
            continue;
        };
        if seen.insert(id) {
            sections.push(SectionEntry { id, visible });
        }
    }

    for id in SectionId::ALL {
        if seen.insert(id) {
            sections.push(SectionEntry { id, visible: true });
        }
    }

    Layout { sections }
}

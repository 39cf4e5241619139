//! Directions section, including the migration from plain-string transit
//! lines to labeled, colored line records.
//!
//! Older documents stored `subway` and `bus` as lists of free text such as
//! `"간선버스: 101"`. The current shape is `subwayDetails` / `busDetails`,
//! a list of `{label, color}`. Migration runs only while the current list is
//! empty, and the legacy list is always kept as-is next to it.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::reader::{self, Violations};
use crate::path::Path;

pub const DEFAULT_LABEL: &str = "DIRECTIONS";

/// Seoul bus category colors.
pub mod bus_colors {
    pub const TRUNK: &str = "#3D5BAB";
    pub const BRANCH: &str = "#5BB025";
    pub const EXPRESS: &str = "#E60012";
    pub const DEFAULT: &str = "#888888";
}

/// Seoul metro line colors, lines 1 through 9.
const SUBWAY_LINE_COLORS: [&str; 9] = [
    "#0052A4", "#00A84D", "#EF7C1C", "#00A5DE", "#996CAC", "#CD7C2F", "#747F00", "#E6186C",
    "#BDB092",
];

static SUBWAY_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*호선").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transport {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subway: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus: Option<Vec<String>>,
    pub subway_details: Vec<TransitLine>,
    pub bus_details: Vec<TransitLine>,
    pub car: String,
    pub parking: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitLine {
    pub label: String,
    pub color: String,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            subway: None,
            bus: None,
            subway_details: Vec::new(),
            bus_details: Vec::new(),
            car: String::new(),
            parking: String::new(),
        }
    }
}

/// Tag a bus line by its category marker.
pub fn bus_color(label: &str) -> &'static str {
    if label.contains("간선") {
        bus_colors::TRUNK
    } else if label.contains("지선") {
        bus_colors::BRANCH
    } else if label.contains("광역") {
        bus_colors::EXPRESS
    } else {
        bus_colors::DEFAULT
    }
}

/// Tag a subway line by its `N호선` line number.
pub fn subway_color(label: &str) -> &'static str {
    SUBWAY_LINE_RE
        .captures(label)
        .and_then(|caps| caps[1].parse::<usize>().ok())
        .and_then(|line| line.checked_sub(1))
        .and_then(|idx| SUBWAY_LINE_COLORS.get(idx).copied())
        .unwrap_or(bus_colors::DEFAULT)
}

/// Canonical label spacing: `"간선버스: 101"` becomes `"간선버스 : 101"`.
pub fn normalize_line_label(raw: &str) -> String {
    match raw.split_once(':') {
        Some((kind, number)) => format!("{} : {}", kind.trim(), number.trim()),
        None => raw.trim().to_string(),
    }
}

/// Derive line records from legacy strings, unless current data exists.
pub fn migrate_lines(
    current: Vec<TransitLine>,
    legacy: Option<&[String]>,
    tag: fn(&str) -> &'static str,
) -> Vec<TransitLine> {
    if !current.is_empty() {
        return current;
    }
    legacy
        .unwrap_or_default()
        .iter()
        .map(|raw| {
            let label = normalize_line_label(raw);
            TransitLine {
                color: tag(&label).to_string(),
                label,
            }
        })
        .collect()
}

pub(crate) fn normalize(raw: Option<&Value>, at: &Path, violations: &mut Violations) -> Transport {
    let obj = reader::section(raw, at, violations);

    let subway = reader::string_list(obj, "subway", at, violations);
    let bus = reader::string_list(obj, "bus", at, violations);
    let subway_details = lines(obj, "subwayDetails", subway_color, at, violations);
    let bus_details = lines(obj, "busDetails", bus_color, at, violations);

    Transport {
        label: reader::string_or(obj, "label", DEFAULT_LABEL, at, violations),
        subway_details: migrate_lines(subway_details, subway.as_deref(), subway_color),
        bus_details: migrate_lines(bus_details, bus.as_deref(), bus_color),
        subway,
        bus,
        car: reader::string_or(obj, "car", "", at, violations),
        parking: reader::string_or(obj, "parking", "", at, violations),
    }
}

fn lines(
    obj: Option<&reader::Object>,
    key: &str,
    tag: fn(&str) -> &'static str,
    at: &Path,
    violations: &mut Violations,
) -> Vec<TransitLine> {
    let list_path = at.clone().field(key);
    reader::array(obj, key, at, violations)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let item_path = list_path.clone().index(i);
            let line = Some(reader::element(item, item_path.clone(), violations)?);
            let label = reader::required_string(line, "label", &item_path, violations);
            let color = reader::opt_string(line, "color", &item_path, violations)
                .unwrap_or_else(|| tag(&label).to_string());
            Some(TransitLine { label, color })
        })
        .collect()
}

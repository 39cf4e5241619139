use serde::Serialize;
use serde_json::Value;

use super::reader::{self, Violations};
use crate::path::Path;

pub const DEFAULT_LABEL: &str = "LOCATION";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub label: String,
    pub name: String,
    pub hall: String,
    pub address: String,
    pub phone: String,
    pub map_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Default for Venue {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            name: String::new(),
            hall: String::new(),
            address: String::new(),
            phone: String::new(),
            map_url: String::new(),
            latitude: None,
            longitude: None,
        }
    }
}

pub(crate) fn normalize(raw: Option<&Value>, at: &Path, violations: &mut Violations) -> Venue {
    let obj = reader::section(raw, at, violations);
    Venue {
        label: reader::string_or(obj, "label", DEFAULT_LABEL, at, violations),
        name: reader::string_or(obj, "name", "", at, violations),
        hall: reader::string_or(obj, "hall", "", at, violations),
        address: reader::string_or(obj, "address", "", at, violations),
        phone: reader::string_or(obj, "phone", "", at, violations),
        map_url: reader::string_or(obj, "mapUrl", "", at, violations),
        latitude: reader::opt_f64(obj, "latitude", at, violations),
        longitude: reader::opt_f64(obj, "longitude", at, violations),
    }
}

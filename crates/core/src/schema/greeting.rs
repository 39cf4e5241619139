use serde::Serialize;
use serde_json::Value;

use super::reader::{self, Violations};
use crate::path::Path;

pub const DEFAULT_LABEL: &str = "INVITATION";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Greeting {
    pub label: String,
    pub title: String,
    pub message: String,
}

impl Default for Greeting {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            title: String::new(),
            message: String::new(),
        }
    }
}

pub(crate) fn normalize(raw: Option<&Value>, at: &Path, violations: &mut Violations) -> Greeting {
    let obj = reader::section(raw, at, violations);
    Greeting {
        label: reader::string_or(obj, "label", DEFAULT_LABEL, at, violations),
        title: reader::string_or(obj, "title", "", at, violations),
        message: reader::string_or(obj, "message", "", at, violations),
    }
}

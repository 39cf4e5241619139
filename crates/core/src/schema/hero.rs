use serde::Serialize;
use serde_json::Value;

use super::reader::{self, Violations};
use crate::path::Path;

pub const DEFAULT_TITLE: &str = "We're getting married";

/// Main visual at the top of the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub image_url: String,
    pub image_alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,
    pub title: String,
    pub subtitle: String,
}

impl Default for Hero {
    fn default() -> Self {
        Self {
            image_url: String::new(),
            image_alt: String::new(),
            image_width: None,
            image_height: None,
            title: DEFAULT_TITLE.to_string(),
            subtitle: String::new(),
        }
    }
}

pub(crate) fn normalize(raw: Option<&Value>, at: &Path, violations: &mut Violations) -> Hero {
    let obj = reader::section(raw, at, violations);
    Hero {
        image_url: reader::string_or(obj, "imageUrl", "", at, violations),
        image_alt: reader::string_or(obj, "imageAlt", "", at, violations),
        image_width: reader::opt_dimension(obj, "imageWidth", at, violations),
        image_height: reader::opt_dimension(obj, "imageHeight", at, violations),
        title: reader::string_or(obj, "title", DEFAULT_TITLE, at, violations),
        subtitle: reader::string_or(obj, "subtitle", "", at, violations),
    }
}

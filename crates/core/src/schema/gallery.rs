//! Photo gallery section.

use serde::Serialize;
use serde_json::Value;

use super::reader::{self, Violations};
use crate::path::Path;

pub const DEFAULT_LABEL: &str = "GALLERY";

/// Images revealed per "load more" step when unset.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// The gallery renders in two columns, so a page is always a whole number
/// of rows.
pub const MIN_PAGE_SIZE: u32 = 2;
pub const MAX_PAGE_SIZE: u32 = 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    pub label: String,
    pub page_size: u32,
    pub images: Vec<GalleryImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryImage {
    pub url: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Default for Gallery {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            images: Vec::new(),
        }
    }
}

/// Floor to an even number, then clamp into `MIN_PAGE_SIZE..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(raw: i64) -> u32 {
    let even = raw - raw.rem_euclid(2);
    even.clamp(i64::from(MIN_PAGE_SIZE), i64::from(MAX_PAGE_SIZE)) as u32
}

pub(crate) fn normalize(raw: Option<&Value>, at: &Path, violations: &mut Violations) -> Gallery {
    let obj = reader::section(raw, at, violations);
    let page_size = reader::floored_int(obj, "pageSize", at, violations)
        .map_or(DEFAULT_PAGE_SIZE, clamp_page_size);

    let images_path = at.clone().field("images");
    let images = reader::array(obj, "images", at, violations)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter_map(|(i, item)| image(item, images_path.clone().index(i), violations))
        .collect();

    Gallery {
        label: reader::string_or(obj, "label", DEFAULT_LABEL, at, violations),
        page_size,
        images,
    }
}

/// A bare URL string is the older image shape.
fn image(item: &Value, at: Path, violations: &mut Violations) -> Option<GalleryImage> {
    if let Value::String(url) = item {
        return Some(GalleryImage {
            url: url.clone(),
            alt: String::new(),
            width: None,
            height: None,
        });
    }
    let obj = Some(reader::element(item, at.clone(), violations)?);
    Some(GalleryImage {
        url: reader::required_string(obj, "url", &at, violations),
        alt: reader::string_or(obj, "alt", "", &at, violations),
        width: reader::opt_dimension(obj, "width", &at, violations),
        height: reader::opt_dimension(obj, "height", &at, violations),
    })
}

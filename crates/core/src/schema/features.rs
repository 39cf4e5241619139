//! Toggles for the guest-facing interactive sections. The submissions
//! themselves live outside the versioned document.

use serde::Serialize;
use serde_json::Value;

use super::reader::{self, Violations};
use crate::path::Path;

pub const GUESTBOOK_LABEL: &str = "GUESTBOOK";
pub const RSVP_LABEL: &str = "RSVP";
pub const PHOTO_SUBMISSION_LABEL: &str = "SHARE YOUR PHOTOS";

pub const DEFAULT_MAX_FILES: u32 = 10;
pub const MIN_MAX_FILES: u32 = 1;
pub const MAX_MAX_FILES: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guestbook {
    pub label: String,
    pub enabled: bool,
}

impl Default for Guestbook {
    fn default() -> Self {
        Self {
            label: GUESTBOOK_LABEL.to_string(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rsvp {
    pub label: String,
    pub enabled: bool,
    pub deadline: String,
}

impl Default for Rsvp {
    fn default() -> Self {
        Self {
            label: RSVP_LABEL.to_string(),
            enabled: true,
            deadline: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSubmission {
    pub label: String,
    pub enabled: bool,
    pub message: String,
    pub max_files: u32,
}

impl Default for PhotoSubmission {
    fn default() -> Self {
        Self {
            label: PHOTO_SUBMISSION_LABEL.to_string(),
            enabled: false,
            message: String::new(),
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

pub(crate) fn normalize_guestbook(
    raw: Option<&Value>,
    at: &Path,
    violations: &mut Violations,
) -> Guestbook {
    let obj = reader::section(raw, at, violations);
    Guestbook {
        label: reader::string_or(obj, "label", GUESTBOOK_LABEL, at, violations),
        enabled: reader::bool_or(obj, "enabled", true, at, violations),
    }
}

pub(crate) fn normalize_rsvp(raw: Option<&Value>, at: &Path, violations: &mut Violations) -> Rsvp {
    let obj = reader::section(raw, at, violations);
    Rsvp {
        label: reader::string_or(obj, "label", RSVP_LABEL, at, violations),
        enabled: reader::bool_or(obj, "enabled", true, at, violations),
        deadline: reader::string_or(obj, "deadline", "", at, violations),
    }
}

pub(crate) fn normalize_photo_submission(
    raw: Option<&Value>,
    at: &Path,
    violations: &mut Violations,
) -> PhotoSubmission {
    let obj = reader::section(raw, at, violations);
    let max_files = reader::floored_int(obj, "maxFiles", at, violations).map_or(
        DEFAULT_MAX_FILES,
        |n| n.clamp(i64::from(MIN_MAX_FILES), i64::from(MAX_MAX_FILES)) as u32,
    );
    PhotoSubmission {
        label: reader::string_or(obj, "label", PHOTO_SUBMISSION_LABEL, at, violations),
        enabled: reader::bool_or(obj, "enabled", false, at, violations),
        message: reader::string_or(obj, "message", "", at, violations),
        max_files,
    }
}

//! Response bodies shared by content handlers.

use serde::Serialize;
use vowpage_core::types::Version;

/// `{ "success": true, "version": n }` returned by a committed write.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub version: Version,
}

impl SaveResponse {
    pub fn saved(version: Version) -> Self {
        Self {
            success: true,
            version,
        }
    }
}

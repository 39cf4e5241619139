use serde::Serialize;
use serde_json::Value;

use super::reader::{self, Violations};
use crate::path::Path;

/// Names of the couple. The only section a candidate document must carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Couple {
    pub groom_name: String,
    pub bride_name: String,
    pub groom_parents: String,
    pub bride_parents: String,
}

pub(crate) fn normalize(raw: Option<&Value>, at: &Path, violations: &mut Violations) -> Couple {
    if matches!(raw, None | Some(Value::Null)) {
        violations.required(at.clone(), "an object");
        return Couple::default();
    }
    let obj = reader::section(raw, at, violations);
    Couple {
        groom_name: reader::required_string(obj, "groomName", at, violations),
        bride_name: reader::required_string(obj, "brideName", at, violations),
        groom_parents: reader::string_or(obj, "groomParents", "", at, violations),
        bride_parents: reader::string_or(obj, "brideParents", "", at, violations),
    }
}

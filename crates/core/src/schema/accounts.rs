//! Gift account section.
//!
//! The current shape is a list of side-tagged groups. Older documents kept
//! two flat lists, `groomAccounts` and `brideAccounts`; those are kept as-is
//! and turned into groups only while `groups` is empty.

use serde::Serialize;
use serde_json::Value;

use super::reader::{self, Violations};
use super::Side;
use crate::path::Path;

pub const DEFAULT_LABEL: &str = "ACCOUNTS";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Accounts {
    pub label: String,
    pub groups: Vec<AccountGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groom_accounts: Option<Vec<AccountEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bride_accounts: Option<Vec<AccountEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountGroup {
    pub side: Side,
    pub title: String,
    pub entries: Vec<AccountEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountEntry {
    pub holder: String,
    pub bank: String,
    pub number: String,
}

impl Default for Accounts {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            groups: Vec::new(),
            groom_accounts: None,
            bride_accounts: None,
        }
    }
}

impl Accounts {
    pub fn groups_for(&self, side: Side) -> impl Iterator<Item = &AccountGroup> {
        self.groups.iter().filter(move |g| g.side == side)
    }
}

pub(crate) fn normalize(raw: Option<&Value>, at: &Path, violations: &mut Violations) -> Accounts {
    let obj = reader::section(raw, at, violations);

    let groups_path = at.clone().field("groups");
    let groups: Vec<AccountGroup> = reader::array(obj, "groups", at, violations)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let group_path = groups_path.clone().index(i);
            let group = Some(reader::element(item, group_path.clone(), violations)?);
            let side = reader::opt_string(group, "side", &group_path, violations)
                .and_then(|s| Side::parse(&s))
                .unwrap_or_else(|| Side::by_position(i));
            Some(AccountGroup {
                side,
                title: reader::string_or(group, "title", "", &group_path, violations),
                entries: entries(group, "entries", &group_path, violations).unwrap_or_default(),
            })
        })
        .collect();

    let groom_accounts = entries(obj, "groomAccounts", at, violations);
    let bride_accounts = entries(obj, "brideAccounts", at, violations);

    let groups = if groups.is_empty() {
        [
            (Side::Groom, groom_accounts.as_deref()),
            (Side::Bride, bride_accounts.as_deref()),
        ]
        .into_iter()
        .filter_map(|(side, legacy)| {
            let legacy = legacy.filter(|list| !list.is_empty())?;
            Some(AccountGroup {
                side,
                title: String::new(),
                entries: legacy.to_vec(),
            })
        })
        .collect()
    } else {
        groups
    };

    Accounts {
        label: reader::string_or(obj, "label", DEFAULT_LABEL, at, violations),
        groups,
        groom_accounts,
        bride_accounts,
    }
}

fn entries(
    obj: Option<&reader::Object>,
    key: &str,
    at: &Path,
    violations: &mut Violations,
) -> Option<Vec<AccountEntry>> {
    let items = reader::array(obj, key, at, violations)?;
    let list_path = at.clone().field(key);
    let entries = items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let entry_path = list_path.clone().index(i);
            let entry = Some(reader::element(item, entry_path.clone(), violations)?);
            Some(AccountEntry {
                holder: reader::string_or(entry, "holder", "", &entry_path, violations),
                bank: reader::string_or(entry, "bank", "", &entry_path, violations),
                number: reader::string_or(entry, "number", "", &entry_path, violations),
            })
        })
        .collect();
    Some(entries)
}

//! Q&A section. Every question carries exactly one groom answer and one
//! bride answer, in that order.

use serde::Serialize;
use serde_json::Value;

use super::reader::{self, Object, Violations};
use super::Side;
use crate::path::Path;

pub const DEFAULT_LABEL: &str = "Q&A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Qna {
    pub label: String,
    pub items: Vec<QnaItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QnaItem {
    pub question: String,
    pub answers: Vec<Answer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groom_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bride_answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub side: Side,
    pub content: String,
}

impl Default for Qna {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            items: Vec::new(),
        }
    }
}

impl QnaItem {
    /// A question with both answers empty.
    pub fn blank(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answers: [Side::Groom, Side::Bride]
                .into_iter()
                .map(|side| Answer {
                    side,
                    content: String::new(),
                })
                .collect(),
            groom_answer: None,
            bride_answer: None,
        }
    }

    pub fn answer(&self, side: Side) -> &str {
        self.answers
            .iter()
            .find(|a| a.side == side)
            .map_or("", |a| a.content.as_str())
    }
}

pub(crate) fn normalize(raw: Option<&Value>, at: &Path, violations: &mut Violations) -> Qna {
    let obj = reader::section(raw, at, violations);
    let items_path = at.clone().field("items");
    let items = reader::array(obj, "items", at, violations)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let item_path = items_path.clone().index(i);
            let obj = reader::element(item, item_path.clone(), violations)?;
            Some(normalize_item(obj, &item_path, violations))
        })
        .collect();

    Qna {
        label: reader::string_or(obj, "label", DEFAULT_LABEL, at, violations),
        items,
    }
}

/// A raw answer entry after type checks. `side` is `None` when the entry
/// names no side at all; an unrecognized side string matches neither.
struct RawAnswer {
    side: Option<Option<Side>>,
    content: String,
}

fn normalize_item(obj: &Object, at: &Path, violations: &mut Violations) -> QnaItem {
    let obj = Some(obj);
    let question = reader::string_or(obj, "question", "", at, violations);
    let groom_answer = reader::opt_string(obj, "groomAnswer", at, violations);
    let bride_answer = reader::opt_string(obj, "brideAnswer", at, violations);

    let answers_path = at.clone().field("answers");
    let raw: Vec<RawAnswer> = reader::array(obj, "answers", at, violations)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let entry_path = answers_path.clone().index(i);
            let entry = Some(reader::element(entry, entry_path.clone(), violations)?);
            let side = reader::opt_string(entry, "side", &entry_path, violations)
                .map(|s| Side::parse(&s));
            let content = reader::string_or(entry, "content", "", &entry_path, violations);
            Some(RawAnswer { side, content })
        })
        .collect();

    let answers = [
        (Side::Groom, 0, groom_answer.as_deref()),
        (Side::Bride, 1, bride_answer.as_deref()),
    ]
    .into_iter()
    .map(|(side, position, legacy)| Answer {
        side,
        content: pick_answer(&raw, side, position, legacy),
    })
    .collect();

    QnaItem {
        question,
        answers,
        groom_answer,
        bride_answer,
    }
}

/// Side match first, then a side-less entry at the side's position, then
/// the legacy flat field.
fn pick_answer(raw: &[RawAnswer], side: Side, position: usize, legacy: Option<&str>) -> String {
    if let Some(found) = raw.iter().find(|a| a.side == Some(Some(side))) {
        return found.content.clone();
    }
    if let Some(found) = raw.get(position).filter(|a| a.side.is_none()) {
        return found.content.clone();
    }
    legacy.unwrap_or_default().to_string()
}

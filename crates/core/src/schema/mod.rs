//! Canonical page-content schema and the normalizer that projects loosely
//! shaped (possibly legacy) input onto it.
//!
//! [`normalize`] is a projection: every accepted input maps to a fully
//! defaulted [`Document`], and normalizing that document's JSON again yields
//! an equal document. Each section module owns its canonical struct, its
//! defaults, and the one-directional migrations from older shapes.
//!
//! Unknown top-level keys are carried through verbatim in
//! [`Document::extra`] so sections added by a newer revision survive a
//! round-trip through an older one. Unknown keys *inside* a known section
//! are dropped.

pub mod accounts;
pub mod couple;
pub mod features;
pub mod gallery;
pub mod greeting;
pub mod hero;
pub mod layout;
pub mod qna;
pub mod transport;
pub mod venue;

mod reader;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::node::Node;
use crate::path::Path;

pub use accounts::{AccountEntry, AccountGroup, Accounts};
pub use couple::Couple;
pub use features::{Guestbook, PhotoSubmission, Rsvp};
pub use gallery::{Gallery, GalleryImage};
pub use greeting::Greeting;
pub use hero::Hero;
pub use layout::{Layout, SectionEntry};
pub use qna::{Answer, Qna, QnaItem};
pub use transport::{TransitLine, Transport};
pub use venue::Venue;

use reader::Violations;

// ---------------------------------------------------------------------------
// Section identifiers
// ---------------------------------------------------------------------------

/// Identifier of a displayable page section, in canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionId {
    Hero,
    Greeting,
    Couple,
    Gallery,
    Venue,
    Transport,
    Qna,
    Accounts,
    Guestbook,
    Rsvp,
    PhotoSubmission,
}

impl SectionId {
    /// Every section, in the order new sections are appended to a layout.
    pub const ALL: [SectionId; 11] = [
        SectionId::Hero,
        SectionId::Greeting,
        SectionId::Couple,
        SectionId::Gallery,
        SectionId::Venue,
        SectionId::Transport,
        SectionId::Qna,
        SectionId::Accounts,
        SectionId::Guestbook,
        SectionId::Rsvp,
        SectionId::PhotoSubmission,
    ];

    /// The document key of this section.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Greeting => "greeting",
            Self::Couple => "couple",
            Self::Gallery => "gallery",
            Self::Venue => "venue",
            Self::Transport => "transport",
            Self::Qna => "qna",
            Self::Accounts => "accounts",
            Self::Guestbook => "guestbook",
            Self::Rsvp => "rsvp",
            Self::PhotoSubmission => "photoSubmission",
        }
    }

    pub fn parse(key: &str) -> Option<SectionId> {
        Self::ALL.into_iter().find(|id| id.as_str() == key)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two people a Q&A answer or account group belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Groom,
    Bride,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groom => "groom",
            Self::Bride => "bride",
        }
    }

    pub fn parse(s: &str) -> Option<Side> {
        match s {
            "groom" => Some(Self::Groom),
            "bride" => Some(Self::Bride),
            _ => None,
        }
    }

    /// Side implied by list position when none is given: even is groom.
    pub fn by_position(index: usize) -> Side {
        if index % 2 == 0 {
            Self::Groom
        } else {
            Self::Bride
        }
    }
}

/// Key of the layout (section order and visibility) block.
pub const LAYOUT_KEY: &str = "layout";

/// Every top-level key the normalizer interprets. Anything else is passed
/// through untouched.
pub const KNOWN_KEYS: [&str; 12] = [
    LAYOUT_KEY,
    "hero",
    "greeting",
    "couple",
    "gallery",
    "venue",
    "transport",
    "qna",
    "accounts",
    "guestbook",
    "rsvp",
    "photoSubmission",
];

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// The kind of schema rule a field broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationRule {
    Required,
    WrongType,
}

/// A single field-level schema violation, addressable by path so a form can
/// highlight the offending input. Round-trips through the API's
/// `details` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaViolation {
    pub path: Path,
    pub rule: ViolationRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// A candidate document did not conform to the canonical schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Document failed schema validation with {} violation(s)", .violations.len())]
pub struct SchemaValidationError {
    pub violations: Vec<SchemaViolation>,
}

impl SchemaValidationError {
    /// Human-readable one-line summary: the first violation plus a count.
    pub fn summary(&self) -> String {
        match self.violations.as_slice() {
            [] => "Document failed schema validation".to_string(),
            [only] => only.message.clone(),
            [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The canonical, fully-defaulted page content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub layout: Layout,
    pub hero: Hero,
    pub greeting: Greeting,
    pub couple: Couple,
    pub gallery: Gallery,
    pub venue: Venue,
    pub transport: Transport,
    pub qna: Qna,
    pub accounts: Accounts,
    pub guestbook: Guestbook,
    pub rsvp: Rsvp,
    pub photo_submission: PhotoSubmission,
    /// Top-level keys this revision does not know, kept verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Document {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("document serializes to a JSON object")
    }

    pub fn to_node(&self) -> Node {
        Node::from(self.to_value())
    }
}

impl Default for Document {
    fn default() -> Self {
        fallback_document()
    }
}

/// The document served for a slug that has never been written, or whose
/// stored content can no longer be recovered.
pub fn fallback_document() -> Document {
    Document {
        layout: Layout::default(),
        hero: Hero::default(),
        greeting: Greeting::default(),
        couple: Couple::default(),
        gallery: Gallery::default(),
        venue: Venue::default(),
        transport: Transport::default(),
        qna: Qna::default(),
        accounts: Accounts::default(),
        guestbook: Guestbook::default(),
        rsvp: Rsvp::default(),
        photo_submission: PhotoSubmission::default(),
        extra: IndexMap::new(),
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Validate `candidate` and project it onto the canonical [`Document`].
///
/// All violations are collected before failing. Legacy shapes are migrated,
/// never rejected.
pub fn normalize(candidate: &Value) -> Result<Document, SchemaValidationError> {
    let mut violations = Violations::default();

    let Some(obj) = candidate.as_object() else {
        violations.wrong_type(Path::root(), "an object", candidate);
        return Err(SchemaValidationError {
            violations: violations.into_vec(),
        });
    };

    let at = |key: &str| Path::root().field(key);
    let v = &mut violations;

    let document = Document {
        layout: layout::normalize(obj.get(LAYOUT_KEY), &at(LAYOUT_KEY), v),
        hero: hero::normalize(obj.get("hero"), &at("hero"), v),
        greeting: greeting::normalize(obj.get("greeting"), &at("greeting"), v),
        couple: couple::normalize(obj.get("couple"), &at("couple"), v),
        gallery: gallery::normalize(obj.get("gallery"), &at("gallery"), v),
        venue: venue::normalize(obj.get("venue"), &at("venue"), v),
        transport: transport::normalize(obj.get("transport"), &at("transport"), v),
        qna: qna::normalize(obj.get("qna"), &at("qna"), v),
        accounts: accounts::normalize(obj.get("accounts"), &at("accounts"), v),
        guestbook: features::normalize_guestbook(obj.get("guestbook"), &at("guestbook"), v),
        rsvp: features::normalize_rsvp(obj.get("rsvp"), &at("rsvp"), v),
        photo_submission: features::normalize_photo_submission(
            obj.get("photoSubmission"),
            &at("photoSubmission"),
            v,
        ),
        extra: obj
            .iter()
            .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    };

    let violations = violations.into_vec();
    if violations.is_empty() {
        Ok(document)
    } else {
        Err(SchemaValidationError { violations })
    }
}

/// [`normalize`] for a draft tree.
pub fn normalize_node(candidate: &Node) -> Result<Document, SchemaValidationError> {
    normalize(&candidate.to_value())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

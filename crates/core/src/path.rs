//! Path-addressed, copy-on-write editing of a [`Node`] tree.
//!
//! Every mutating operation comes in two flavours:
//!
//! - `try_*` returns a [`PathError`] when the path cannot be followed.
//! - The plain form (`set`, `push`, ...) returns the input root unchanged on
//!   any addressing failure. The edit session applies these interactively,
//!   field by field, where a transient stale path must never abort the edit.
//!
//! Both flavours only rebuild the ancestors of the addressed node. Untouched
//! siblings keep pointing at the same storage as the input tree, and the
//! input tree itself is never modified.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeMap};

// ---------------------------------------------------------------------------
// Path types
// ---------------------------------------------------------------------------

/// One step of a [`Path`]: a field name for objects, an index for arrays.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Field(String),
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Field(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        PathSegment::Field(name)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{i}"),
            PathSegment::Field(name) => f.write_str(name),
        }
    }
}

/// An ordered list of segments locating a node inside a document tree.
///
/// Serializes as a JSON array of strings and integers, e.g.
/// `["qna", "items", 0, "question"]`. The textual form is dot-separated,
/// with all-digit segments read as indices: `qna.items.0.question`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// The empty path, addressing the root itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.0.push(PathSegment::Field(name.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first `len` segments of this path.
    pub fn prefix(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Split into the parent path and the final segment.
    pub fn split_last(&self) -> Option<(Path, &PathSegment)> {
        let (last, parent) = self.0.split_last()?;
        Some((Path(parent.to_vec()), last))
    }

    /// Parse the dotted textual form. An empty string is the root path.
    pub fn parse(text: &str) -> Result<Path, PathError> {
        if text.is_empty() {
            return Ok(Path::root());
        }
        text.split('.')
            .map(|part| {
                if part.is_empty() {
                    Err(PathError::InvalidSyntax(text.to_string()))
                } else if part.bytes().all(|b| b.is_ascii_digit()) {
                    part.parse::<usize>()
                        .map(PathSegment::Index)
                        .map_err(|_| PathError::InvalidSyntax(text.to_string()))
                } else {
                    Ok(PathSegment::Field(part.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Path)
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Path(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a path operation could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Path is empty")]
    EmptyPath,

    #[error("Invalid path syntax: '{0}'")]
    InvalidSyntax(String),

    #[error("No value at '{at}'")]
    Missing { at: Path },

    #[error("Cannot index {kind} at '{at}' with '{segment}'")]
    NotIndexable {
        at: Path,
        kind: &'static str,
        segment: PathSegment,
    },

    #[error("Index {index} out of bounds for array of length {len} at '{at}'")]
    IndexOutOfBounds { at: Path, index: usize, len: usize },

    #[error("Expected array at '{at}', found {kind}")]
    NotAnArray { at: Path, kind: &'static str },

    #[error("Expected object at '{at}', found {kind}")]
    NotAnObject { at: Path, kind: &'static str },
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// Walk `path` from `root`. Returns `None` when any step is missing or the
/// node reached so far cannot be indexed by the next segment.
pub fn get<'a>(root: &'a Node, path: &Path) -> Option<&'a Node> {
    path.segments()
        .iter()
        .try_fold(root, |node, segment| child(node, segment))
}

fn child<'a>(node: &'a Node, segment: &PathSegment) -> Option<&'a Node> {
    match (node, segment) {
        (Node::Object(map), PathSegment::Field(key)) => map.get(key),
        (Node::Array(items), PathSegment::Index(index)) => items.get(*index),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Strict mutations
// ---------------------------------------------------------------------------

/// Replace (or, for an object field, insert) the node addressed by `path`.
pub fn try_set(root: &Node, path: &Path, value: Node) -> Result<Node, PathError> {
    let (parent, last) = path.split_last().ok_or(PathError::EmptyPath)?;
    update_at(root, &parent, 0, |container| match (container, last) {
        (Node::Object(map), PathSegment::Field(key)) => {
            let mut next = map.as_ref().clone();
            next.insert(key.clone(), value);
            Ok(Node::object(next))
        }
        (Node::Array(items), PathSegment::Index(index)) => {
            if *index >= items.len() {
                return Err(PathError::IndexOutOfBounds {
                    at: parent.clone(),
                    index: *index,
                    len: items.len(),
                });
            }
            let mut next = items.as_ref().clone();
            next[*index] = value;
            Ok(Node::array(next))
        }
        (other, segment) => Err(PathError::NotIndexable {
            at: parent.clone(),
            kind: other.kind(),
            segment: segment.clone(),
        }),
    })
}

/// Append `item` to the array addressed by `path`.
pub fn try_push(root: &Node, path: &Path, item: Node) -> Result<Node, PathError> {
    update_at(root, path, 0, |target| {
        let items = expect_array(target, path)?;
        let mut next = items.to_vec();
        next.push(item);
        Ok(Node::array(next))
    })
}

/// Remove the element at `index` from the array addressed by `path`.
pub fn try_remove_at(root: &Node, path: &Path, index: usize) -> Result<Node, PathError> {
    update_at(root, path, 0, |target| {
        let items = expect_array(target, path)?;
        check_bounds(path, items, index)?;
        let mut next = items.to_vec();
        next.remove(index);
        Ok(Node::array(next))
    })
}

/// Relocate the element at `from` so that it ends up at index `to` of the
/// same array. Both indices must be in bounds of the current array.
pub fn try_move_within(
    root: &Node,
    path: &Path,
    from: usize,
    to: usize,
) -> Result<Node, PathError> {
    let items = match get(root, path) {
        Some(target) => expect_array(target, path)?,
        None => return Err(PathError::Missing { at: path.clone() }),
    };
    check_bounds(path, items, from)?;
    check_bounds(path, items, to)?;
    if from == to {
        return Ok(root.clone());
    }
    update_at(root, path, 0, |target| {
        let mut next = expect_array(target, path)?.to_vec();
        let moved = next.remove(from);
        next.insert(to, moved);
        Ok(Node::array(next))
    })
}

/// Shallow-merge `fields` into the object addressed by `path`.
///
/// Existing keys keep their position; new keys are appended in the order
/// they appear in `fields`.
pub fn try_patch(root: &Node, path: &Path, fields: &NodeMap) -> Result<Node, PathError> {
    update_at(root, path, 0, |target| {
        let map = target.as_object().ok_or_else(|| PathError::NotAnObject {
            at: path.clone(),
            kind: target.kind(),
        })?;
        let mut next = map.clone();
        for (key, value) in fields {
            next.insert(key.clone(), value.clone());
        }
        Ok(Node::object(next))
    })
}

/// Rebuild the ancestor chain of the node at `path`, replacing that node with
/// the result of `f`. Siblings along the way are shared, not copied.
fn update_at<F>(node: &Node, path: &Path, depth: usize, f: F) -> Result<Node, PathError>
where
    F: FnOnce(&Node) -> Result<Node, PathError>,
{
    let Some(segment) = path.segments().get(depth) else {
        return f(node);
    };

    match (node, segment) {
        (Node::Object(map), PathSegment::Field(key)) => {
            let current = map.get(key).ok_or_else(|| PathError::Missing {
                at: path.prefix(depth + 1),
            })?;
            let updated = update_at(current, path, depth + 1, f)?;
            let mut next = map.as_ref().clone();
            next.insert(key.clone(), updated);
            Ok(Node::object(next))
        }
        (Node::Array(items), PathSegment::Index(index)) => {
            let current = items.get(*index).ok_or_else(|| PathError::IndexOutOfBounds {
                at: path.prefix(depth),
                index: *index,
                len: items.len(),
            })?;
            let updated = update_at(current, path, depth + 1, f)?;
            let mut next = items.as_ref().clone();
            next[*index] = updated;
            Ok(Node::array(next))
        }
        (other, segment) => Err(PathError::NotIndexable {
            at: path.prefix(depth),
            kind: other.kind(),
            segment: segment.clone(),
        }),
    }
}

fn expect_array<'a>(node: &'a Node, at: &Path) -> Result<&'a [Node], PathError> {
    node.as_array().ok_or_else(|| PathError::NotAnArray {
        at: at.clone(),
        kind: node.kind(),
    })
}

fn check_bounds(at: &Path, items: &[Node], index: usize) -> Result<(), PathError> {
    if index < items.len() {
        Ok(())
    } else {
        Err(PathError::IndexOutOfBounds {
            at: at.clone(),
            index,
            len: items.len(),
        })
    }
}

// ---------------------------------------------------------------------------
// Lenient mutations
// ---------------------------------------------------------------------------

/// [`try_set`], returning `root` unchanged on failure.
pub fn set(root: &Node, path: &Path, value: Node) -> Node {
    or_unchanged(root, "set", try_set(root, path, value))
}

/// [`try_push`], returning `root` unchanged on failure.
pub fn push(root: &Node, path: &Path, item: Node) -> Node {
    or_unchanged(root, "push", try_push(root, path, item))
}

/// [`try_remove_at`], returning `root` unchanged on failure.
pub fn remove_at(root: &Node, path: &Path, index: usize) -> Node {
    or_unchanged(root, "remove_at", try_remove_at(root, path, index))
}

/// [`try_move_within`], returning `root` unchanged on failure.
pub fn move_within(root: &Node, path: &Path, from: usize, to: usize) -> Node {
    or_unchanged(root, "move_within", try_move_within(root, path, from, to))
}

/// [`try_patch`], returning `root` unchanged on failure.
pub fn patch(root: &Node, path: &Path, fields: &NodeMap) -> Node {
    or_unchanged(root, "patch", try_patch(root, path, fields))
}

fn or_unchanged(root: &Node, op: &'static str, result: Result<Node, PathError>) -> Node {
    result.unwrap_or_else(|error| {
        tracing::debug!(op, %error, "Path operation ignored");
        root.clone()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

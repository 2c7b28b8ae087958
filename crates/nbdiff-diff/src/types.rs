//! Core types: diff keys, value lists, diff entries and the structural error.
//!
//! Entries (de)serialize in the wire format used by the diff service:
//!
//! ```json
//! [{"op": "addrange", "key": 0, "valuelist": ["a\n"]},
//!  {"op": "patch", "key": "metadata", "diff": [{"op": "remove", "key": "tags"}]}]
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use nbdiff_util::char_len;

// ── Error ─────────────────────────────────────────────────────────────────

/// A diff entry that is inconsistent with the container it targets.
///
/// These are never retried: a malformed diff aborts the build of the subtree
/// it belongs to.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DiffError {
    #[error("invalid sequence op: key is not an index: {0}")]
    KeyNotIndex(DiffKey),
    #[error("invalid object op: key is not a name: {0}")]
    KeyNotName(DiffKey),
    #[error("invalid addrange op: key {key} out of range for length {len}")]
    AddRangeOutOfRange { key: usize, len: usize },
    #[error("invalid removerange op: key {key} out of range for length {len}")]
    RemoveRangeOutOfRange { key: usize, len: usize },
    #[error("invalid removerange op: range {key}+{length} too long for length {len}")]
    RemoveRangeTooLong { key: usize, length: usize, len: usize },
    #[error("invalid patch op: key {key} out of range for length {len}")]
    PatchOutOfRange { key: usize, len: usize },
    #[error("invalid add op: key already present: {0}")]
    KeyAlreadyPresent(String),
    #[error("invalid {op} op: missing key: {key}")]
    MissingKey { op: &'static str, key: String },
    #[error("invalid op on {container}: {op}")]
    InvalidOp {
        op: &'static str,
        container: &'static str,
    },
    #[error("cannot apply a diff to a {0} value")]
    InvalidTarget(&'static str),
    #[error("addrange value list at key {0} does not hold text")]
    NonTextValues(DiffKey),
}

// ── Keys ──────────────────────────────────────────────────────────────────

/// Key of a diff entry: an index into a sequence or a name in an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiffKey {
    Index(usize),
    Name(String),
}

impl DiffKey {
    pub fn as_index(&self) -> Option<usize> {
        match self {
            DiffKey::Index(i) => Some(*i),
            DiffKey::Name(_) => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            DiffKey::Index(_) => None,
            DiffKey::Name(name) => Some(name),
        }
    }

    /// Whether this key addresses the given path step (`"3"` matches index 3).
    pub fn matches_step(&self, step: &str) -> bool {
        match self {
            DiffKey::Index(i) => step.parse::<usize>().map_or(false, |s| s == *i),
            DiffKey::Name(name) => name == step,
        }
    }
}

impl fmt::Display for DiffKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffKey::Index(i) => write!(f, "{i}"),
            DiffKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for DiffKey {
    fn from(i: usize) -> Self {
        DiffKey::Index(i)
    }
}

impl From<&str> for DiffKey {
    fn from(name: &str) -> Self {
        DiffKey::Name(name.to_string())
    }
}

impl From<String> for DiffKey {
    fn from(name: String) -> Self {
        DiffKey::Name(name)
    }
}

impl PartialEq<str> for DiffKey {
    fn eq(&self, other: &str) -> bool {
        self.as_name() == Some(other)
    }
}

impl PartialEq<usize> for DiffKey {
    fn eq(&self, other: &usize) -> bool {
        self.as_index() == Some(*other)
    }
}

// ── Value lists ───────────────────────────────────────────────────────────

/// Values inserted by an `addrange` op.
///
/// Character-level ops over text carry the inserted characters as one
/// string; every other sequence carries a list of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueList {
    Text(String),
    Items(Vec<Value>),
}

impl ValueList {
    /// Number of sequence elements inserted (characters for text).
    pub fn len(&self) -> usize {
        match self {
            ValueList::Text(text) => char_len(text),
            ValueList::Items(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The inserted values, if this is a list of values.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            ValueList::Text(_) => None,
            ValueList::Items(items) => Some(items),
        }
    }

    /// Inserted text pieces: the whole string, or each item of a list of
    /// strings. `None` if a list item is not a string.
    pub fn text_items(&self) -> Option<Vec<&str>> {
        match self {
            ValueList::Text(text) => Some(vec![text.as_str()]),
            ValueList::Items(items) => items.iter().map(Value::as_str).collect(),
        }
    }

    /// All inserted text joined into one string.
    pub fn joined_text(&self) -> Option<String> {
        self.text_items().map(|parts| parts.concat())
    }
}

impl From<Vec<Value>> for ValueList {
    fn from(items: Vec<Value>) -> Self {
        ValueList::Items(items)
    }
}

impl From<String> for ValueList {
    fn from(text: String) -> Self {
        ValueList::Text(text)
    }
}

impl From<&str> for ValueList {
    fn from(text: &str) -> Self {
        ValueList::Text(text.to_string())
    }
}

// ── Entries ───────────────────────────────────────────────────────────────

/// An ordered list of diff entries, sorted ascending by key.
pub type Diff = Vec<DiffEntry>;

/// A single diff operation.
///
/// `source` is an opaque provenance annotation (which input contributed the
/// entry). It is carried along and never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum DiffEntry {
    AddRange {
        key: DiffKey,
        valuelist: ValueList,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<Value>,
    },
    RemoveRange {
        key: DiffKey,
        length: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<Value>,
    },
    Replace {
        key: DiffKey,
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<Value>,
    },
    Add {
        key: DiffKey,
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<Value>,
    },
    Remove {
        key: DiffKey,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<Value>,
    },
    Patch {
        key: DiffKey,
        #[serde(default, deserialize_with = "null_as_empty")]
        diff: Diff,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<Value>,
    },
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Diff, D::Error> {
    Ok(Option::<Diff>::deserialize(deserializer)?.unwrap_or_default())
}

impl DiffEntry {
    /// Wire name of the operation.
    pub fn op_name(&self) -> &'static str {
        match self {
            DiffEntry::AddRange { .. } => "addrange",
            DiffEntry::RemoveRange { .. } => "removerange",
            DiffEntry::Replace { .. } => "replace",
            DiffEntry::Add { .. } => "add",
            DiffEntry::Remove { .. } => "remove",
            DiffEntry::Patch { .. } => "patch",
        }
    }

    pub fn key(&self) -> &DiffKey {
        match self {
            DiffEntry::AddRange { key, .. }
            | DiffEntry::RemoveRange { key, .. }
            | DiffEntry::Replace { key, .. }
            | DiffEntry::Add { key, .. }
            | DiffEntry::Remove { key, .. }
            | DiffEntry::Patch { key, .. } => key,
        }
    }

    pub fn key_mut(&mut self) -> &mut DiffKey {
        match self {
            DiffEntry::AddRange { key, .. }
            | DiffEntry::RemoveRange { key, .. }
            | DiffEntry::Replace { key, .. }
            | DiffEntry::Add { key, .. }
            | DiffEntry::Remove { key, .. }
            | DiffEntry::Patch { key, .. } => key,
        }
    }

    pub fn source(&self) -> Option<&Value> {
        self.source_slot().as_ref()
    }

    pub fn source_mut(&mut self) -> &mut Option<Value> {
        match self {
            DiffEntry::AddRange { source, .. }
            | DiffEntry::RemoveRange { source, .. }
            | DiffEntry::Replace { source, .. }
            | DiffEntry::Add { source, .. }
            | DiffEntry::Remove { source, .. }
            | DiffEntry::Patch { source, .. } => source,
        }
    }

    fn source_slot(&self) -> &Option<Value> {
        match self {
            DiffEntry::AddRange { source, .. }
            | DiffEntry::RemoveRange { source, .. }
            | DiffEntry::Replace { source, .. }
            | DiffEntry::Add { source, .. }
            | DiffEntry::Remove { source, .. }
            | DiffEntry::Patch { source, .. } => source,
        }
    }

    /// Returns the entry with its provenance replaced.
    pub fn with_source(mut self, source: Option<Value>) -> Self {
        *self.source_mut() = source;
        self
    }

    /// Number of base elements a sequence op consumes: 0 for `addrange`,
    /// `length` for `removerange`, 1 for `patch`, 0 otherwise.
    pub fn op_length(&self) -> usize {
        match self {
            DiffEntry::RemoveRange { length, .. } => *length,
            DiffEntry::Patch { .. } => 1,
            _ => 0,
        }
    }
}

// ── Constructors ──────────────────────────────────────────────────────────

/// Create a replacement diff entry.
pub fn op_replace(key: impl Into<DiffKey>, value: Value) -> DiffEntry {
    DiffEntry::Replace {
        key: key.into(),
        value,
        source: None,
    }
}

/// Create an addition diff entry.
pub fn op_add(key: impl Into<DiffKey>, value: Value) -> DiffEntry {
    DiffEntry::Add {
        key: key.into(),
        value,
        source: None,
    }
}

/// Create a removal diff entry.
pub fn op_remove(key: impl Into<DiffKey>) -> DiffEntry {
    DiffEntry::Remove {
        key: key.into(),
        source: None,
    }
}

/// Create a range insertion diff entry.
pub fn op_add_range(key: impl Into<DiffKey>, valuelist: impl Into<ValueList>) -> DiffEntry {
    DiffEntry::AddRange {
        key: key.into(),
        valuelist: valuelist.into(),
        source: None,
    }
}

/// Create a range removal diff entry.
pub fn op_remove_range(key: impl Into<DiffKey>, length: usize) -> DiffEntry {
    DiffEntry::RemoveRange {
        key: key.into(),
        length,
        source: None,
    }
}

/// Create a patch diff entry carrying a nested diff.
pub fn op_patch(key: impl Into<DiffKey>, diff: Diff) -> DiffEntry {
    DiffEntry::Patch {
        key: key.into(),
        diff,
        source: None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

//! Diff model for atomic values such as a cell's execution count.
//!
//! `None` means the value is absent from that side; JSON `null` is a present
//! value.

use serde_json::Value;

use nbdiff_diff::DiffEntry;

use crate::types::{DiffModel, ModelError};

#[derive(Debug, Clone, PartialEq)]
pub struct ImmutableDiffModel {
    pub base: Option<Value>,
    pub remote: Option<Value>,
}

impl ImmutableDiffModel {
    pub fn new(base: Option<Value>, remote: Option<Value>) -> Self {
        Self { base, remote }
    }
}

impl DiffModel for ImmutableDiffModel {
    fn unchanged(&self) -> bool {
        self.base == self.remote
    }

    fn added(&self) -> bool {
        self.base.is_none()
    }

    fn deleted(&self) -> bool {
        self.remote.is_none()
    }
}

/// Build a model from `base`, `remote` and at most one diff entry.
///
/// Without an entry the pair is taken as given. With one, `remote` is
/// ignored and derived from the entry:
///
/// - `add`: base must be absent, remote is the added value;
/// - `remove`: base must be present, remote is absent;
/// - `replace`: base must be present, remote is the new value.
///
/// An add and a remove on the same key are expected to arrive pre-merged
/// into a `replace`.
pub fn create_immutable_model(
    base: Option<Value>,
    remote: Option<Value>,
    entry: Option<&DiffEntry>,
) -> Result<ImmutableDiffModel, ModelError> {
    let Some(entry) = entry else {
        return Ok(ImmutableDiffModel::new(base, remote));
    };
    let invalid = || ModelError::InvalidImmutableOp {
        op: entry.op_name(),
    };
    match entry {
        DiffEntry::Add { value, .. } => {
            if base.is_some() {
                return Err(invalid());
            }
            Ok(ImmutableDiffModel::new(None, Some(value.clone())))
        }
        DiffEntry::Remove { .. } => {
            if base.is_none() {
                return Err(invalid());
            }
            Ok(ImmutableDiffModel::new(base, None))
        }
        DiffEntry::Replace { value, .. } => {
            if base.is_none() {
                return Err(invalid());
            }
            Ok(ImmutableDiffModel::new(base, Some(value.clone())))
        }
        DiffEntry::AddRange { .. } | DiffEntry::RemoveRange { .. } | DiffEntry::Patch { .. } => {
            Err(invalid())
        }
    }
}

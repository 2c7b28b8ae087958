//! Shared model types: the [`DiffModel`] states, the build error, cell types
//! and collapsible display annotations.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use nbdiff_diff::DiffError;

// ── Error ─────────────────────────────────────────────────────────────────

/// Failure while building a model tree.
///
/// Every variant aborts the build of the subtree it was raised in; no
/// partial model is returned.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Structural(#[from] DiffError),
    #[error("invalid code cell, missing outputs")]
    MissingOutputs,
    #[error("invalid {op} op on immutable value")]
    InvalidImmutableOp { op: &'static str },
    #[error("unknown MIME type for key: {0}")]
    UnknownMimeType(String),
    #[error("either base or remote value needs to be given")]
    MissingValues,
    #[error("invalid arguments to {0}")]
    InvalidArguments(&'static str),
    #[error("invalid cell: {0}")]
    InvalidCell(String),
    #[error("invalid notebook: {0}")]
    InvalidNotebook(String),
    #[error("cannot stringify value: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ── Diff model states ─────────────────────────────────────────────────────

/// The states of a base/remote pair for one logical slot.
///
/// A pair that is neither unchanged, added nor deleted is patched.
pub trait DiffModel {
    fn unchanged(&self) -> bool;
    fn added(&self) -> bool;
    fn deleted(&self) -> bool;

    fn patched(&self) -> bool {
        !(self.unchanged() || self.added() || self.deleted())
    }
}

// ── Cells ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Code,
    Markdown,
    Raw,
}

impl CellType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "code" => Some(CellType::Code),
            "markdown" => Some(CellType::Markdown),
            "raw" => Some(CellType::Raw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CellType::Code => "code",
            CellType::Markdown => "markdown",
            CellType::Raw => "raw",
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display annotation for models a renderer may fold away behind a header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Collapsible {
    pub header: String,
    pub start_collapsed: bool,
}

impl Collapsible {
    pub fn new(header: impl Into<String>, start_collapsed: bool) -> Self {
        Self {
            header: header.into(),
            start_collapsed,
        }
    }
}

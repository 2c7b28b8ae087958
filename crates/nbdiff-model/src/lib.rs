//! Diff models for notebooks.
//!
//! Builds paired base/remote models from a base notebook and a diff
//! against it, in one top-down pass: a [`NotebookDiffModel`] holds one
//! [`CellDiffModel`] per cell, which in turn holds text models of its
//! source and metadata and, for code cells, [`OutputDiffModel`]s and an
//! execution count model. Cells and outputs are also grouped into display
//! chunks.
//!
//! # Example
//!
//! ```
//! use nbdiff_diff::{op_patch, op_remove_range};
//! use nbdiff_model::{DiffModel, NotebookDiffModel};
//! use serde_json::json;
//!
//! let cell = |s: &str| json!({"cell_type": "markdown", "metadata": {}, "source": s});
//! let base = json!({"cells": [cell("a"), cell("b"), cell("c")], "metadata": {}});
//! let diff = vec![op_patch("cells", vec![op_remove_range(1, 1)])];
//!
//! let model = NotebookDiffModel::new(&base, &diff).unwrap();
//! assert!(model.cells[1].deleted());
//! assert_eq!(model.chunked_cells().len(), 3);
//! ```

mod chunk;

pub mod cell;
pub mod immutable;
pub mod notebook;
pub mod options;
pub mod output;
pub mod renderable;
pub mod string;
pub mod types;

pub use cell::{
    create_added_cell_model, create_deleted_cell_model, create_patched_cell_model,
    create_unchanged_cell_model, CellDiffModel,
};
pub use immutable::{create_immutable_model, ImmutableDiffModel};
pub use notebook::{language_mimetype, NotebookDiffModel};
pub use options::ModelOptions;
pub use output::{make_output_models, OutputDiffModel, OutputType, TEXT_MIMETYPES};
pub use renderable::{Renderable, RenderableDiffModel};
pub use string::{
    create_direct_string_model, create_patch_string_model, stringify_value, LineRanges,
    StringDiffModel,
};
pub use types::{CellType, Collapsible, DiffModel, ModelError};

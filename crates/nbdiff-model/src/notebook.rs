//! Notebook diff model: the top of the model tree.

use std::ops::Range;

use serde_json::Value;

use nbdiff_diff::{get_sub_diff_by_key, validate_sequence_op, DiffEntry, DiffError};

use crate::cell::{
    create_added_cell_model, create_deleted_cell_model, create_patched_cell_model,
    create_unchanged_cell_model, CellDiffModel,
};
use crate::chunk::ChunkBuilder;
use crate::options::ModelOptions;
use crate::renderable::JSON_MIMETYPE;
use crate::string::{create_patch_string_model, StringDiffModel};
use crate::types::{Collapsible, ModelError};

#[derive(Debug)]
pub struct NotebookDiffModel {
    /// Notebook metadata, present only when the diff touches it.
    pub metadata: Option<StringDiffModel>,
    /// Source mimetype of code cells.
    pub mimetype: String,
    pub cells: Vec<CellDiffModel>,
    chunks: Vec<Range<usize>>,
}

/// The notebook's `metadata.language_info.mimetype`, if set.
pub fn language_mimetype(notebook: &Value) -> Option<&str> {
    notebook
        .get("metadata")?
        .get("language_info")?
        .get("mimetype")?
        .as_str()
}

impl NotebookDiffModel {
    /// Build the model of `base` changed by `diff` with default options.
    pub fn new(base: &Value, diff: &[DiffEntry]) -> Result<Self, ModelError> {
        Self::with_options(base, diff, &ModelOptions::default())
    }

    /// Build the model of `base` changed by `diff`.
    ///
    /// The `cells` diff is walked in key order: untouched cells become
    /// unchanged singleton chunks, added and removed cells at one index
    /// share a chunk, and every patched cell gets a chunk of its own.
    pub fn with_options(
        base: &Value,
        diff: &[DiffEntry],
        options: &ModelOptions,
    ) -> Result<Self, ModelError> {
        let base_cells = base
            .get("cells")
            .and_then(Value::as_array)
            .ok_or_else(|| ModelError::InvalidNotebook("missing cells list".into()))?;
        tracing::debug!(
            cells = base_cells.len(),
            entries = diff.len(),
            "building notebook diff model"
        );

        let metadata = match (base.get("metadata"), get_sub_diff_by_key(diff, "metadata")) {
            (Some(meta), Some(meta_diff)) => Some(
                create_patch_string_model(meta, meta_diff)?
                    .with_mimetype(JSON_MIMETYPE)
                    .with_collapsible(Collapsible::new(
                        options.notebook_metadata_header.clone(),
                        options.collapse_metadata,
                    )),
            ),
            _ => None,
        };

        let mimetype = match language_mimetype(base) {
            Some(mimetype) => mimetype.to_string(),
            None => {
                tracing::debug!(
                    fallback = %options.fallback_mimetype,
                    "notebook has no language mimetype"
                );
                options.fallback_mimetype.clone()
            }
        };

        let mut cells = Vec::with_capacity(base_cells.len());
        let mut chunks = ChunkBuilder::new();
        let mut take = 0;
        let mut previous_chunk_index = None;
        let cells_diff = get_sub_diff_by_key(diff, "cells").map_or(&[][..], Vec::as_slice);
        for entry in cells_diff {
            let index = validate_sequence_op(base_cells.len(), entry)?;
            tracing::trace!(op = entry.op_name(), index, "cell diff entry");
            for cell in base_cells.get(take..index).unwrap_or_default() {
                cells.push(create_unchanged_cell_model(cell, &mimetype, options)?);
                chunks.singleton(cells.len() - 1);
            }
            if previous_chunk_index != Some(index) {
                chunks.open(cells.len());
                previous_chunk_index = Some(index);
            }
            match entry {
                DiffEntry::AddRange { valuelist, .. } => {
                    let added = valuelist
                        .as_items()
                        .ok_or(DiffError::InvalidTarget("array"))?;
                    for cell in added {
                        cells.push(create_added_cell_model(cell, &mimetype, options)?);
                        chunks.push(cells.len() - 1);
                    }
                }
                DiffEntry::RemoveRange { length, .. } => {
                    for cell in &base_cells[index..index + length] {
                        cells.push(create_deleted_cell_model(cell, &mimetype, options)?);
                        chunks.push(cells.len() - 1);
                    }
                }
                DiffEntry::Patch { diff, .. } => {
                    if !chunks.current_is_empty() {
                        chunks.open(cells.len());
                    }
                    cells.push(create_patched_cell_model(
                        &base_cells[index],
                        diff,
                        &mimetype,
                        options,
                    )?);
                    chunks.push(cells.len() - 1);
                }
                // rejected by validate_sequence_op
                DiffEntry::Replace { .. } | DiffEntry::Add { .. } | DiffEntry::Remove { .. } => {}
            }
            // a remove and an add on one index must not move take backwards
            take = take.max(index + entry.op_length());
        }
        for cell in base_cells.get(take..).unwrap_or_default() {
            cells.push(create_unchanged_cell_model(cell, &mimetype, options)?);
            chunks.singleton(cells.len() - 1);
        }

        let chunks = chunks.finish();
        tracing::debug!(
            cells = cells.len(),
            chunks = chunks.len(),
            "built notebook diff model"
        );
        Ok(Self {
            metadata,
            mimetype,
            cells,
            chunks,
        })
    }

    /// Cells grouped for display. Concatenated in order the chunks are
    /// exactly `cells`.
    pub fn chunked_cells(&self) -> Vec<&[CellDiffModel]> {
        self.chunks.iter().map(|r| &self.cells[r.clone()]).collect()
    }

    /// Chunks as index ranges into `cells`.
    pub fn chunk_ranges(&self) -> &[Range<usize>] {
        &self.chunks
    }
}

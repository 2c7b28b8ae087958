//! Cell diff models.
//!
//! A cell model pairs the cell's source and metadata as text models and,
//! for code cells, its outputs and execution count.

use serde_json::{Map, Value};

use nbdiff_diff::{get_diff_entry_by_key, get_sub_diff_by_key, DiffEntry};

use crate::chunk::chunk_runs;
use crate::immutable::{create_immutable_model, ImmutableDiffModel};
use crate::options::ModelOptions;
use crate::output::{make_output_models, OutputDiffModel};
use crate::renderable::JSON_MIMETYPE;
use crate::string::{create_direct_string_model, create_patch_string_model, StringDiffModel};
use crate::types::{CellType, Collapsible, DiffModel, ModelError};

#[derive(Debug)]
pub struct CellDiffModel {
    pub source: StringDiffModel,
    pub metadata: StringDiffModel,
    /// Present for code cells only.
    pub outputs: Option<Vec<OutputDiffModel>>,
    /// Present for code cells only.
    pub execution_count: Option<ImmutableDiffModel>,
    pub cell_type: CellType,
}

/// The fields of a notebook cell the models are built from.
struct CellFields<'a> {
    cell_type: CellType,
    source: &'a Value,
    metadata: Value,
    outputs: Option<&'a [Value]>,
    execution_count: Option<&'a Value>,
}

impl<'a> CellFields<'a> {
    fn read(cell: &'a Value) -> Result<Self, ModelError> {
        let name = cell
            .get("cell_type")
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::InvalidCell("missing cell_type".into()))?;
        let cell_type = CellType::parse(name)
            .ok_or_else(|| ModelError::InvalidCell(format!("unknown cell_type: {name}")))?;
        let source = cell
            .get("source")
            .ok_or_else(|| ModelError::InvalidCell("missing source".into()))?;
        let fields = Self {
            cell_type,
            source,
            metadata: cell
                .get("metadata")
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
            outputs: cell
                .get("outputs")
                .and_then(Value::as_array)
                .map(Vec::as_slice),
            execution_count: cell.get("execution_count"),
        };
        if fields.cell_type == CellType::Code && fields.outputs.is_none() {
            return Err(ModelError::MissingOutputs);
        }
        Ok(fields)
    }

    /// Outputs of a code cell, `None` for other cell types.
    fn code_outputs(&self) -> Option<&'a [Value]> {
        match self.cell_type {
            CellType::Code => self.outputs,
            CellType::Markdown | CellType::Raw => None,
        }
    }

    fn source_mimetype(&self, nb_mimetype: &str) -> String {
        match self.cell_type {
            CellType::Code => nb_mimetype.to_string(),
            CellType::Markdown => "text/markdown".to_string(),
            CellType::Raw => "text/plain".to_string(),
        }
    }
}

fn annotate_metadata(metadata: StringDiffModel, options: &ModelOptions) -> StringDiffModel {
    metadata
        .with_mimetype(JSON_MIMETYPE)
        .with_collapsible(Collapsible::new(
            options.cell_metadata_header.clone(),
            options.collapse_metadata,
        ))
}

impl CellDiffModel {
    fn assemble(
        cell: &CellFields<'_>,
        source: StringDiffModel,
        metadata: StringDiffModel,
        outputs: Option<Vec<OutputDiffModel>>,
        execution_count: Option<ImmutableDiffModel>,
        nb_mimetype: &str,
        options: &ModelOptions,
    ) -> Self {
        Self {
            source: source.with_mimetype(cell.source_mimetype(nb_mimetype)),
            metadata: annotate_metadata(metadata, options),
            outputs,
            execution_count,
            cell_type: cell.cell_type,
        }
    }

    /// Outputs grouped for display, `None` for non-code cells.
    ///
    /// Runs of added and deleted outputs share a chunk; every other output
    /// is a chunk of its own. Outputs of a wholly added or deleted cell are
    /// never grouped.
    pub fn chunked_outputs(&self) -> Option<Vec<&[OutputDiffModel]>> {
        let outputs = self.outputs.as_deref()?;
        if self.added() || self.deleted() {
            return Some(outputs.chunks(1).collect());
        }
        Some(chunk_runs(outputs, |o| o.added() || o.deleted()))
    }
}

/// Model of a cell present, and equal, on both sides.
pub fn create_unchanged_cell_model(
    base: &Value,
    nb_mimetype: &str,
    options: &ModelOptions,
) -> Result<CellDiffModel, ModelError> {
    let cell = CellFields::read(base)?;
    let source = create_direct_string_model(Some(cell.source), Some(cell.source))?;
    let metadata = create_direct_string_model(Some(&cell.metadata), Some(&cell.metadata))?;
    let (outputs, execution_count) = match cell.code_outputs() {
        Some(outputs) => (
            Some(make_output_models(Some(outputs), Some(outputs), None)?),
            Some(create_immutable_model(
                cell.execution_count.cloned(),
                cell.execution_count.cloned(),
                None,
            )?),
        ),
        None => (None, None),
    };
    Ok(CellDiffModel::assemble(
        &cell,
        source,
        metadata,
        outputs,
        execution_count,
        nb_mimetype,
        options,
    ))
}

/// Model of a cell inserted in the remote.
pub fn create_added_cell_model(
    remote: &Value,
    nb_mimetype: &str,
    options: &ModelOptions,
) -> Result<CellDiffModel, ModelError> {
    let cell = CellFields::read(remote)?;
    let source = create_direct_string_model(None, Some(cell.source))?;
    let metadata = create_direct_string_model(None, Some(&cell.metadata))?;
    let (outputs, execution_count) = match cell.code_outputs() {
        Some(outputs) => (
            Some(make_output_models(None, Some(outputs), None)?),
            Some(create_immutable_model(None, cell.execution_count.cloned(), None)?),
        ),
        None => (None, None),
    };
    Ok(CellDiffModel::assemble(
        &cell,
        source,
        metadata,
        outputs,
        execution_count,
        nb_mimetype,
        options,
    ))
}

/// Model of a cell removed from the base.
pub fn create_deleted_cell_model(
    base: &Value,
    nb_mimetype: &str,
    options: &ModelOptions,
) -> Result<CellDiffModel, ModelError> {
    let cell = CellFields::read(base)?;
    let source = create_direct_string_model(Some(cell.source), None)?;
    let metadata = create_direct_string_model(Some(&cell.metadata), None)?;
    let (outputs, execution_count) = match cell.code_outputs() {
        Some(outputs) => (
            Some(make_output_models(Some(outputs), None, None)?),
            Some(create_immutable_model(cell.execution_count.cloned(), None, None)?),
        ),
        None => (None, None),
    };
    Ok(CellDiffModel::assemble(
        &cell,
        source,
        metadata,
        outputs,
        execution_count,
        nb_mimetype,
        options,
    ))
}

/// Model of a cell changed by `diff`, keyed by `source`, `metadata`,
/// `outputs` and `execution_count`. A missing key leaves that field
/// unchanged.
pub fn create_patched_cell_model(
    base: &Value,
    diff: &[DiffEntry],
    nb_mimetype: &str,
    options: &ModelOptions,
) -> Result<CellDiffModel, ModelError> {
    let cell = CellFields::read(base)?;
    let source = match get_sub_diff_by_key(diff, "source") {
        Some(sub) => create_patch_string_model(cell.source, sub)?,
        None => create_direct_string_model(Some(cell.source), Some(cell.source))?,
    };
    let metadata = match get_sub_diff_by_key(diff, "metadata") {
        Some(sub) => create_patch_string_model(&cell.metadata, sub)?,
        None => create_direct_string_model(Some(&cell.metadata), Some(&cell.metadata))?,
    };
    let (outputs, execution_count) = match cell.code_outputs() {
        Some(outputs) => {
            let outputs = match get_sub_diff_by_key(diff, "outputs") {
                Some(sub) => make_output_models(Some(outputs), None, Some(sub))?,
                None => make_output_models(Some(outputs), Some(outputs), None)?,
            };
            // the base doubles as remote when the count is not in the diff
            let execution_count = create_immutable_model(
                cell.execution_count.cloned(),
                cell.execution_count.cloned(),
                get_diff_entry_by_key(diff, "execution_count"),
            )?;
            (Some(outputs), Some(execution_count))
        }
        None => (None, None),
    };
    Ok(CellDiffModel::assemble(
        &cell,
        source,
        metadata,
        outputs,
        execution_count,
        nb_mimetype,
        options,
    ))
}

impl DiffModel for CellDiffModel {
    fn unchanged(&self) -> bool {
        self.source.unchanged()
            && self.metadata.unchanged()
            && self
                .outputs
                .iter()
                .flatten()
                .all(|o| o.unchanged())
            && self.execution_count.as_ref().map_or(true, |e| e.unchanged())
    }

    fn added(&self) -> bool {
        self.source.added()
    }

    fn deleted(&self) -> bool {
        self.source.deleted()
    }
}

//! Cell output models and the output list builder.

use std::sync::mpsc::Receiver;

use serde_json::Value;

use nbdiff_diff::{validate_sequence_op, Diff, DiffEntry, DiffError};

use crate::renderable::{Renderable, RenderableDiffModel};
use crate::types::{DiffModel, ModelError};

/// Mimetypes a stream output's text can be shown as.
pub const TEXT_MIMETYPES: [&str; 3] = [
    "text/plain",
    "application/vnd.jupyter.stdout",
    "application/vnd.jupyter.stderr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Stream,
    Error,
    ExecuteResult,
    DisplayData,
}

impl OutputType {
    /// Type named by an output's `output_type` field.
    pub fn of(output: &Value) -> Option<Self> {
        match output.get("output_type")?.as_str()? {
            "stream" => Some(OutputType::Stream),
            "error" => Some(OutputType::Error),
            "execute_result" => Some(OutputType::ExecuteResult),
            "display_data" => Some(OutputType::DisplayData),
            _ => None,
        }
    }

    fn has_mimebundle(self) -> bool {
        matches!(self, OutputType::ExecuteResult | OutputType::DisplayData)
    }
}

/// Diff model of one cell output.
#[derive(Debug)]
pub struct OutputDiffModel {
    inner: RenderableDiffModel,
}

impl OutputDiffModel {
    pub fn new(
        base: Option<Value>,
        remote: Option<Value>,
        diff: Option<Diff>,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            inner: RenderableDiffModel::new(base, remote, diff)?,
        })
    }

    pub fn base(&self) -> Option<&Value> {
        self.inner.base()
    }

    pub fn remote(&self) -> Option<&Value> {
        self.inner.remote()
    }

    pub fn diff(&self) -> Option<&[DiffEntry]> {
        self.inner.diff()
    }

    pub fn output_type(&self) -> Option<OutputType> {
        self.inner.value().and_then(OutputType::of)
    }

    pub fn trusted(&self) -> bool {
        self.inner.trusted()
    }

    pub fn set_trusted(&mut self, trusted: bool) {
        self.inner.set_trusted(trusted);
    }

    pub fn subscribe_trusted(&mut self) -> Receiver<bool> {
        self.inner.subscribe_trusted()
    }

    pub fn contents(&self) -> Vec<&Value> {
        self.inner.contents()
    }

    /// Path of the member holding `mimetype` content, if this output has it.
    ///
    /// Stream text for plain-text mimetypes, an error's traceback for any
    /// mimetype, or the matching entry of a mimebundle.
    pub fn has_mime_type(&self, mimetype: &str) -> Option<Vec<String>> {
        let output = self.inner.value()?;
        match OutputType::of(output)? {
            OutputType::Stream if TEXT_MIMETYPES.contains(&mimetype) => Some(vec!["text".into()]),
            OutputType::Error => Some(vec!["traceback".into()]),
            t if t.has_mimebundle() => {
                output.get("data")?.get(mimetype)?;
                Some(vec!["data".into(), mimetype.to_string()])
            }
            _ => None,
        }
    }
}

impl Renderable for OutputDiffModel {
    fn renderable(&self) -> &RenderableDiffModel {
        &self.inner
    }

    fn inner_mime_type(&self, path: &[String]) -> Result<String, ModelError> {
        let unknown = || ModelError::UnknownMimeType(path.join("/"));
        let output_type = self.output_type().ok_or_else(unknown)?;
        match (output_type, path) {
            (OutputType::Stream, [key]) if key == "text" => Ok("text/plain".to_string()),
            (OutputType::Error, [key]) if key == "traceback" => Ok("text/plain".to_string()),
            (t, [key, mimetype]) if t.has_mimebundle() && key == "data" => Ok(mimetype.clone()),
            _ => Err(unknown()),
        }
    }
}

impl DiffModel for OutputDiffModel {
    fn unchanged(&self) -> bool {
        self.inner.unchanged()
    }

    fn added(&self) -> bool {
        self.inner.added()
    }

    fn deleted(&self) -> bool {
        self.inner.deleted()
    }
}

/// Build the models of an output list.
///
/// Accepts exactly one of these shapes:
///
/// - base only: every output deleted;
/// - remote only: every output added;
/// - remote equal to base: every output unchanged;
/// - base and a diff over its indices: untouched outputs unchanged,
///   `addrange` values added, `removerange` outputs deleted, and one
///   patched model per `patch` entry.
pub fn make_output_models(
    base: Option<&[Value]>,
    remote: Option<&[Value]>,
    diff: Option<&[DiffEntry]>,
) -> Result<Vec<OutputDiffModel>, ModelError> {
    let model = |base: Option<&Value>, remote: Option<&Value>| {
        OutputDiffModel::new(base.cloned(), remote.cloned(), None)
    };
    match (base, remote, diff) {
        (None, None, _) => Err(ModelError::MissingValues),
        (Some(base), None, None) => base.iter().map(|o| model(Some(o), None)).collect(),
        (None, Some(remote), _) => remote.iter().map(|o| model(None, Some(o))).collect(),
        (Some(base), Some(remote), _) if base == remote => {
            base.iter().map(|o| model(Some(o), Some(o))).collect()
        }
        (Some(base), None, Some(diff)) => {
            let mut models = Vec::with_capacity(base.len());
            let mut consumed = 0;
            for entry in diff {
                let index = validate_sequence_op(base.len(), entry)?;
                tracing::trace!(op = entry.op_name(), index, "output diff entry");
                if index > consumed {
                    for o in &base[consumed..index] {
                        models.push(model(Some(o), Some(o))?);
                    }
                }
                match entry {
                    DiffEntry::AddRange { valuelist, .. } => {
                        let values = valuelist
                            .as_items()
                            .ok_or(DiffError::InvalidTarget("array"))?;
                        for o in values {
                            models.push(model(None, Some(o))?);
                        }
                    }
                    DiffEntry::RemoveRange { length, .. } => {
                        for o in &base[index..index + length] {
                            models.push(model(Some(o), None)?);
                        }
                    }
                    DiffEntry::Patch { diff, .. } => {
                        models.push(OutputDiffModel::new(
                            Some(base[index].clone()),
                            None,
                            Some(diff.clone()),
                        )?);
                    }
                    // rejected by validate_sequence_op
                    DiffEntry::Replace { .. } | DiffEntry::Add { .. } | DiffEntry::Remove { .. } => {}
                }
                consumed = consumed.max(index + entry.op_length());
            }
            for o in base.get(consumed..).unwrap_or_default() {
                models.push(model(Some(o), Some(o))?);
            }
            Ok(models)
        }
        _ => Err(ModelError::InvalidArguments("make_output_models")),
    }
}

//! Diff models for renderable values: objects carrying a mimebundle, such
//! as cell outputs.

use std::sync::mpsc::{channel, Receiver, Sender};

use serde_json::Value;

use nbdiff_diff::{get_member_by_path, get_sub_diff_by_path, patch, Diff, DiffEntry};

use crate::string::{
    create_direct_string_model, create_patch_string_model, whole_value_model, StringDiffModel,
};
use crate::types::{DiffModel, ModelError};

/// Mimetype of a renderable stringified as a whole.
pub const JSON_MIMETYPE: &str = "application/json";

/// A base/remote pair of renderable values with an optional diff.
///
/// When only a base and a diff are given the remote is materialised by
/// patching. The trust flag tells a renderer whether active content may be
/// shown; observers are notified on every change.
#[derive(Debug)]
pub struct RenderableDiffModel {
    base: Option<Value>,
    remote: Option<Value>,
    diff: Option<Diff>,
    trusted: bool,
    trust_observers: Vec<Sender<bool>>,
}

impl RenderableDiffModel {
    pub fn new(
        base: Option<Value>,
        remote: Option<Value>,
        diff: Option<Diff>,
    ) -> Result<Self, ModelError> {
        let remote = match (&base, remote, &diff) {
            (None, None, _) => return Err(ModelError::MissingValues),
            (Some(base), None, Some(diff)) => Some(patch(base, diff)?),
            (_, remote, _) => remote,
        };
        Ok(Self {
            base,
            remote,
            diff,
            trusted: false,
            trust_observers: Vec::new(),
        })
    }

    pub fn base(&self) -> Option<&Value> {
        self.base.as_ref()
    }

    pub fn remote(&self) -> Option<&Value> {
        self.remote.as_ref()
    }

    pub fn diff(&self) -> Option<&[DiffEntry]> {
        self.diff.as_deref()
    }

    /// Base when present, else remote.
    pub fn value(&self) -> Option<&Value> {
        self.base.as_ref().or(self.remote.as_ref())
    }

    pub fn trusted(&self) -> bool {
        self.trusted
    }

    /// Set the trust flag, notifying observers if it changed.
    ///
    /// Observers whose receiver was dropped are forgotten.
    pub fn set_trusted(&mut self, trusted: bool) {
        if self.trusted == trusted {
            return;
        }
        self.trusted = trusted;
        self.trust_observers.retain(|tx| tx.send(trusted).is_ok());
        tracing::trace!(trusted, observers = self.trust_observers.len(), "trust changed");
    }

    /// Receive every future change of the trust flag.
    pub fn subscribe_trusted(&mut self) -> Receiver<bool> {
        let (tx, rx) = channel();
        self.trust_observers.push(tx);
        rx
    }

    /// The present values: base, then remote unless it equals base.
    pub fn contents(&self) -> Vec<&Value> {
        let mut contents = Vec::with_capacity(2);
        contents.extend(self.base.as_ref());
        if let Some(remote) = &self.remote {
            if self.base.as_ref() != Some(remote) {
                contents.push(remote);
            }
        }
        contents
    }

    /// Text model of the whole value, or of the member at `path`.
    ///
    /// Uses the diff at `path` when the pair is patched. A member replaced
    /// outright is marked as wholly deleted and added; otherwise the two
    /// sides are compared directly.
    pub fn stringify_with(
        &self,
        path: Option<&[String]>,
        mimetype: impl Into<String>,
    ) -> Result<StringDiffModel, ModelError> {
        let base = member_at(self.base.as_ref(), path);
        let remote = member_at(self.remote.as_ref(), path);
        let diff = match (path, self.diff.as_deref()) {
            (Some(path), Some(diff)) => get_sub_diff_by_path(diff, path),
            (None, diff) => diff,
            (Some(_), None) => None,
        };
        let model = match (base, remote, diff) {
            (Some(base), _, Some(diff)) if self.patched() => create_patch_string_model(base, diff)?,
            // replaced in one step, so there is no diff to locate changes by
            (Some(base), Some(remote), None) if base != remote => whole_value_model(base, remote)?,
            _ => create_direct_string_model(base, remote)?,
        };
        Ok(model.with_mimetype(mimetype))
    }
}

fn member_at<'a>(value: Option<&'a Value>, path: Option<&[String]>) -> Option<&'a Value> {
    match path {
        Some(path) => value.and_then(|v| get_member_by_path(v, path)),
        None => value,
    }
}

impl DiffModel for RenderableDiffModel {
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

/// A model that can be shown as text, whole or per mimebundle member.
pub trait Renderable {
    fn renderable(&self) -> &RenderableDiffModel;

    /// Mimetype of the member at `path`.
    fn inner_mime_type(&self, path: &[String]) -> Result<String, ModelError>;

    /// Text model of the member at `path`, or of the whole value as JSON.
    fn stringify(&self, path: Option<&[String]>) -> Result<StringDiffModel, ModelError> {
        let mimetype = match path {
            Some(path) => self.inner_mime_type(path)?,
            None => JSON_MIMETYPE.to_string(),
        };
        self.renderable().stringify_with(path, mimetype)
    }
}

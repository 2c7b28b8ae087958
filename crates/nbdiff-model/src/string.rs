//! Text diff models.
//!
//! A [`StringDiffModel`] holds the base and remote texts of one slot plus the
//! character ranges added to the remote and deleted from the base. Values
//! that are not text are stringified first: a list of strings is joined and
//! anything else is pretty-printed JSON.

use serde_json::{Map, Value};

use nbdiff_diff::util::JSON_INDENT;
use nbdiff_diff::{
    flatten_lines_diff, flatten_text_diff, patch, raw_to_pos, DiffEntry, DiffRangePos, DiffRangeRaw,
};
use nbdiff_util::{char_len, insertion_sort_by_key};

use crate::types::{Collapsible, DiffModel, ModelError};

/// Mimetype of a freshly built model.
pub const DEFAULT_MIMETYPE: &str = "text/plain";

#[derive(Debug, Clone, PartialEq)]
pub struct StringDiffModel {
    pub base: Option<String>,
    pub remote: Option<String>,
    /// Ranges in the remote text.
    pub additions: Vec<DiffRangeRaw>,
    /// Ranges in the base text.
    pub deletions: Vec<DiffRangeRaw>,
    pub mimetype: String,
    pub collapsible: Option<Collapsible>,
}

/// Additions and deletions of a model as line/column ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRanges {
    pub additions: Vec<DiffRangePos>,
    pub deletions: Vec<DiffRangePos>,
}

impl StringDiffModel {
    pub fn new(
        base: Option<String>,
        remote: Option<String>,
        additions: Vec<DiffRangeRaw>,
        deletions: Vec<DiffRangeRaw>,
    ) -> Self {
        Self {
            base,
            remote,
            additions,
            deletions,
            mimetype: DEFAULT_MIMETYPE.to_string(),
            collapsible: None,
        }
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = mimetype.into();
        self
    }

    pub fn with_collapsible(mut self, collapsible: Collapsible) -> Self {
        self.collapsible = Some(collapsible);
        self
    }

    /// Additions located in the remote text, deletions in the base text.
    pub fn line_ranges(&self) -> LineRanges {
        LineRanges {
            additions: raw_to_pos(&self.additions, self.remote.as_deref().unwrap_or_default()),
            deletions: raw_to_pos(&self.deletions, self.base.as_deref().unwrap_or_default()),
        }
    }
}

impl DiffModel for StringDiffModel {
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

/// Text shown for a value.
pub fn stringify_value(value: &Value) -> Result<String, ModelError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Array(items) if items.iter().all(Value::is_string) => {
            Ok(items.iter().filter_map(Value::as_str).collect())
        }
        other => Ok(serde_json::to_string_pretty(other)?),
    }
}

/// Build a model from two whole values.
///
/// An absent base makes the whole remote an addition and an absent remote
/// makes the whole base a deletion. When both are present they must
/// stringify identically.
pub fn create_direct_string_model(
    base: Option<&Value>,
    remote: Option<&Value>,
) -> Result<StringDiffModel, ModelError> {
    let base = base.map(stringify_value).transpose()?;
    let remote = remote.map(stringify_value).transpose()?;
    let mut additions = Vec::new();
    let mut deletions = Vec::new();
    match (&base, &remote) {
        (None, None) => return Err(ModelError::MissingValues),
        (None, Some(remote)) => additions.push(DiffRangeRaw::new(0, char_len(remote), None)),
        (Some(base), None) => deletions.push(DiffRangeRaw::new(0, char_len(base), None)),
        (Some(base), Some(remote)) => {
            if base != remote {
                return Err(ModelError::InvalidArguments("create_direct_string_model"));
            }
        }
    }
    Ok(StringDiffModel::new(base, remote, additions, deletions))
}

/// Build a model from a base value and a diff against it.
///
/// Strings and lists of strings are diffed per line and carry
/// character-exact ranges. For objects every touched top-level key marks
/// its whole member in the pretty-printed text. Any other value is marked
/// as replaced wholesale when the diff changes it.
pub fn create_patch_string_model(
    base: &Value,
    diff: &[DiffEntry],
) -> Result<StringDiffModel, ModelError> {
    match base {
        Value::String(text) => {
            let flat = flatten_text_diff(text, diff)?;
            let remote = stringify_value(&patch(base, diff)?)?;
            Ok(text_model(text.clone(), remote, &flat))
        }
        Value::Array(items) if items.iter().all(Value::is_string) => {
            let lines: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            let flat = flatten_lines_diff(&lines, diff)?;
            let remote = stringify_value(&patch(base, diff)?)?;
            Ok(text_model(lines.concat(), remote, &flat))
        }
        Value::Object(map) => match patch(base, diff)? {
            Value::Object(remote) => object_model(map, &remote, diff),
            other => whole_value_model(base, &other),
        },
        _ => {
            let remote = patch(base, diff)?;
            whole_value_model(base, &remote)
        }
    }
}

/// Ranges of a flattened character diff. Additions are shifted into remote
/// coordinates by what was added and removed before them.
fn text_model(base: String, remote: String, flat: &[DiffEntry]) -> StringDiffModel {
    let mut additions = Vec::new();
    let mut deletions: Vec<DiffRangeRaw> = Vec::new();
    let mut added = 0;
    for entry in flat {
        let Some(from) = entry.key().as_index() else {
            continue;
        };
        match entry {
            DiffEntry::RemoveRange { length, source, .. } => {
                deletions.push(DiffRangeRaw::new(from, *length, source.clone()));
            }
            DiffEntry::AddRange {
                valuelist, source, ..
            } => {
                let removed: usize = deletions
                    .iter()
                    .map(|d| d.to.min(from).saturating_sub(d.from))
                    .sum();
                let length = valuelist.len();
                additions.push(DiffRangeRaw::new(from + added - removed, length, source.clone()));
                added += length;
            }
            _ => {}
        }
    }
    StringDiffModel::new(Some(base), Some(remote), additions, deletions)
}

pub(crate) fn whole_value_model(base: &Value, remote: &Value) -> Result<StringDiffModel, ModelError> {
    let base = stringify_value(base)?;
    let remote = stringify_value(remote)?;
    let (additions, deletions) = if base == remote {
        (Vec::new(), Vec::new())
    } else {
        (
            vec![DiffRangeRaw::new(0, char_len(&remote), None)],
            vec![DiffRangeRaw::new(0, char_len(&base), None)],
        )
    };
    Ok(StringDiffModel::new(Some(base), Some(remote), additions, deletions))
}

// ── Objects ───────────────────────────────────────────────────────────────

struct MemberSpan<'a> {
    key: &'a str,
    from: usize,
    length: usize,
}

/// Pretty-print `map` exactly as `serde_json::to_string_pretty` does,
/// recording the character span of each member including its line end.
fn layout_object(map: &Map<String, Value>) -> Result<(String, Vec<MemberSpan<'_>>), ModelError> {
    if map.is_empty() {
        return Ok(("{}".to_string(), Vec::new()));
    }
    let nested_break = format!("\n{JSON_INDENT}");
    let mut text = String::from("{\n");
    let mut offset = char_len(&text);
    let mut spans = Vec::with_capacity(map.len());
    for (i, (key, value)) in map.iter().enumerate() {
        let mut member = format!(
            "{JSON_INDENT}{}: {}",
            serde_json::to_string(key)?,
            serde_json::to_string_pretty(value)?.replace('\n', &nested_break)
        );
        member.push_str(if i + 1 < map.len() { ",\n" } else { "\n" });
        let length = char_len(&member);
        spans.push(MemberSpan {
            key,
            from: offset,
            length,
        });
        offset += length;
        text.push_str(&member);
    }
    text.push('}');
    Ok((text, spans))
}

fn span_range(spans: &[MemberSpan<'_>], key: &str, source: Option<&Value>) -> Option<DiffRangeRaw> {
    spans
        .iter()
        .find(|s| s.key == key)
        .map(|s| DiffRangeRaw::new(s.from, s.length, source.cloned()))
}

fn object_model(
    base: &Map<String, Value>,
    remote: &Map<String, Value>,
    diff: &[DiffEntry],
) -> Result<StringDiffModel, ModelError> {
    let (base_text, base_spans) = layout_object(base)?;
    let (remote_text, remote_spans) = layout_object(remote)?;
    let mut additions = Vec::new();
    let mut deletions = Vec::new();
    for entry in diff {
        let Some(key) = entry.key().as_name() else {
            continue;
        };
        let source = entry.source();
        let (deleted, added) = match entry {
            DiffEntry::Remove { .. } => (true, false),
            DiffEntry::Add { .. } => (false, true),
            DiffEntry::Replace { .. } | DiffEntry::Patch { .. } => (true, true),
            DiffEntry::AddRange { .. } | DiffEntry::RemoveRange { .. } => (false, false),
        };
        if deleted {
            deletions.extend(span_range(&base_spans, key, source));
        }
        if added {
            additions.extend(span_range(&remote_spans, key, source));
        }
    }
    insertion_sort_by_key(&mut additions, |r| r.from);
    insertion_sort_by_key(&mut deletions, |r| r.from);
    Ok(StringDiffModel::new(
        Some(base_text),
        Some(remote_text),
        additions,
        deletions,
    ))
}

//! Re-keying of line diffs into character diffs.
//!
//! The diff service diffs multi-line strings line by line, with `patch`
//! entries holding character diffs of single lines. Display code needs all
//! edits as absolute character offsets into the joined text instead.

use nbdiff_util::{accumulate_lengths, char_len, insertion_sort_by_key, split_lines};

use crate::types::{Diff, DiffEntry, DiffError, ValueList};
use crate::validate::validate_sequence_op;

/// Flatten a line diff of `text` into a diff over character offsets.
///
/// See [`flatten_lines_diff`].
pub fn flatten_text_diff(text: &str, diff: &[DiffEntry]) -> Result<Diff, DiffError> {
    flatten_lines_diff(&split_lines(text), diff)
}

/// Flatten a diff over `lines` into a diff over character offsets of the
/// joined lines.
///
/// - `patch` entries are replaced by their nested character ops, shifted by
///   the starting offset of their line;
/// - `addrange` becomes one character `addrange` inserting the joined lines;
/// - `removerange` becomes one character `removerange` spanning the removed
///   lines.
///
/// A line op's provenance is copied onto every op it emits; nested ops keep
/// their own provenance when they have one. The result is stably sorted by
/// key, since nested ops were only ordered within their line.
pub fn flatten_lines_diff<S: AsRef<str>>(lines: &[S], diff: &[DiffEntry]) -> Result<Diff, DiffError> {
    let mut line_to_char = Vec::with_capacity(lines.len() + 1);
    line_to_char.push(0);
    line_to_char.extend(accumulate_lengths(lines));

    let mut flattened = Vec::with_capacity(diff.len());
    for entry in diff {
        let index = validate_sequence_op(lines.len(), entry)?;
        let offset = line_to_char[index];
        match entry {
            DiffEntry::Patch {
                diff: nested,
                source,
                ..
            } => {
                let line_len = char_len(lines[index].as_ref());
                for op in nested {
                    let char_index = validate_sequence_op(line_len, op)?;
                    let mut op = op.clone();
                    *op.key_mut() = (char_index + offset).into();
                    if op.source().is_none() {
                        *op.source_mut() = source.clone();
                    }
                    flattened.push(op);
                }
            }
            DiffEntry::AddRange {
                key,
                valuelist,
                source,
            } => {
                let text = valuelist
                    .joined_text()
                    .ok_or_else(|| DiffError::NonTextValues(key.clone()))?;
                flattened.push(DiffEntry::AddRange {
                    key: offset.into(),
                    valuelist: ValueList::Text(text),
                    source: source.clone(),
                });
            }
            DiffEntry::RemoveRange { length, source, .. } => {
                flattened.push(DiffEntry::RemoveRange {
                    key: offset.into(),
                    length: line_to_char[index + length] - offset,
                    source: source.clone(),
                });
            }
            DiffEntry::Replace { .. } | DiffEntry::Add { .. } | DiffEntry::Remove { .. } => {
                return Err(DiffError::InvalidOp {
                    op: entry.op_name(),
                    container: "sequence",
                });
            }
        }
    }

    insertion_sort_by_key(&mut flattened, |e| e.key().as_index());
    Ok(flattened)
}

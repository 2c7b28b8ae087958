//! Diff application: materialises the remote value from a base and a diff.
//!
//! Objects take keyed ops, arrays take sequence ops. A string reached from an
//! object is patched as a sequence of lines. A string element of an array is
//! a line already, so like a line of a string it is patched as a sequence of
//! characters.

use serde_json::{Map, Value};

use nbdiff_util::split_lines;

use crate::types::{DiffEntry, DiffError, ValueList};
use crate::validate::{validate_object_op, validate_sequence_op};

/// Apply `diff` to `base`, returning the patched copy.
///
/// Every entry is validated against the container it targets before it is
/// applied.
pub fn patch(base: &Value, diff: &[DiffEntry]) -> Result<Value, DiffError> {
    match base {
        Value::Object(map) => patch_object(map, diff).map(Value::Object),
        Value::Array(items) => patch_sequence(
            items,
            diff,
            |values| {
                values
                    .as_items()
                    .map(<[Value]>::to_vec)
                    .ok_or_else(|| DiffError::InvalidTarget("array"))
            },
            patch_item,
        )
        .map(Value::Array),
        Value::String(text) => patch_lines(text, diff).map(Value::String),
        other => Err(DiffError::InvalidTarget(type_name(other))),
    }
}

fn patch_item(item: &Value, diff: &[DiffEntry]) -> Result<Value, DiffError> {
    match item {
        Value::String(line) => patch_chars(line, diff).map(Value::String),
        other => patch(other, diff),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Objects ───────────────────────────────────────────────────────────────

fn patch_object(base: &Map<String, Value>, diff: &[DiffEntry]) -> Result<Map<String, Value>, DiffError> {
    let mut out = base.clone();
    for entry in diff {
        let key = validate_object_op(entry, base.keys())?;
        match entry {
            DiffEntry::Add { value, .. } | DiffEntry::Replace { value, .. } => {
                out.insert(key.to_string(), value.clone());
            }
            DiffEntry::Remove { .. } => {
                out.shift_remove(key);
            }
            DiffEntry::Patch { diff, .. } => {
                if let Some(child) = base.get(key) {
                    out.insert(key.to_string(), patch(child, diff)?);
                }
            }
            DiffEntry::AddRange { .. } | DiffEntry::RemoveRange { .. } => {
                return Err(DiffError::InvalidOp {
                    op: entry.op_name(),
                    container: "object",
                });
            }
        }
    }
    Ok(out)
}

// ── Sequences ─────────────────────────────────────────────────────────────

/// Walk a sorted sequence diff over `base`, copying untouched elements,
/// inserting `addrange` values, skipping removed ranges and patching
/// single elements.
fn patch_sequence<T, I, P>(
    base: &[T],
    diff: &[DiffEntry],
    mut inserted: I,
    mut patch_item: P,
) -> Result<Vec<T>, DiffError>
where
    T: Clone,
    I: FnMut(&ValueList) -> Result<Vec<T>, DiffError>,
    P: FnMut(&T, &[DiffEntry]) -> Result<T, DiffError>,
{
    let mut out = Vec::with_capacity(base.len());
    let mut take = 0;
    for entry in diff {
        let index = validate_sequence_op(base.len(), entry)?;
        if index > take {
            out.extend_from_slice(&base[take..index]);
        }
        match entry {
            DiffEntry::AddRange { valuelist, .. } => out.extend(inserted(valuelist)?),
            DiffEntry::RemoveRange { .. } => {}
            DiffEntry::Patch { diff, .. } => out.push(patch_item(&base[index], diff)?),
            DiffEntry::Replace { .. } | DiffEntry::Add { .. } | DiffEntry::Remove { .. } => {
                return Err(DiffError::InvalidOp {
                    op: entry.op_name(),
                    container: "sequence",
                });
            }
        }
        // a remove followed by an add at the same index must not rewind
        take = take.max(index + entry.op_length());
    }
    if take < base.len() {
        out.extend_from_slice(&base[take..]);
    }
    Ok(out)
}

fn patch_lines(text: &str, diff: &[DiffEntry]) -> Result<String, DiffError> {
    let lines: Vec<String> = split_lines(text).into_iter().map(str::to_owned).collect();
    let patched = patch_sequence(
        &lines,
        diff,
        |values| {
            values
                .text_items()
                .map(|parts| parts.into_iter().map(str::to_owned).collect())
                .ok_or_else(|| DiffError::InvalidTarget("string"))
        },
        |line, line_diff| patch_chars(line, line_diff),
    )?;
    Ok(patched.concat())
}

fn patch_chars(text: &str, diff: &[DiffEntry]) -> Result<String, DiffError> {
    let chars: Vec<char> = text.chars().collect();
    let patched = patch_sequence(
        &chars,
        diff,
        |values| {
            values
                .joined_text()
                .map(|text| text.chars().collect())
                .ok_or_else(|| DiffError::InvalidTarget("string"))
        },
        |_, _| Err(DiffError::InvalidTarget("character")),
    )?;
    Ok(patched.into_iter().collect())
}

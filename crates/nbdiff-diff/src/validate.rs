//! Validation of single diff entries against the container they target.
//!
//! Sequence containers (lists, lines of a string, characters of a line) take
//! `addrange`, `removerange` and `patch`; keyed objects take `add`, `remove`,
//! `replace` and `patch`.

use crate::types::{DiffEntry, DiffError};

/// Validate that `entry` can be applied to a sequence of `base_len` elements.
///
/// Returns the entry's index on success.
pub fn validate_sequence_op(base_len: usize, entry: &DiffEntry) -> Result<usize, DiffError> {
    let index = entry
        .key()
        .as_index()
        .ok_or_else(|| DiffError::KeyNotIndex(entry.key().clone()))?;
    match entry {
        DiffEntry::AddRange { .. } => {
            if index > base_len {
                return Err(DiffError::AddRangeOutOfRange {
                    key: index,
                    len: base_len,
                });
            }
        }
        DiffEntry::RemoveRange { length, .. } => {
            if index >= base_len {
                return Err(DiffError::RemoveRangeOutOfRange {
                    key: index,
                    len: base_len,
                });
            }
            // index < base_len here, so the subtraction cannot underflow
            if *length > base_len - index {
                return Err(DiffError::RemoveRangeTooLong {
                    key: index,
                    length: *length,
                    len: base_len,
                });
            }
        }
        DiffEntry::Patch { .. } => {
            if index >= base_len {
                return Err(DiffError::PatchOutOfRange {
                    key: index,
                    len: base_len,
                });
            }
        }
        DiffEntry::Replace { .. } | DiffEntry::Add { .. } | DiffEntry::Remove { .. } => {
            return Err(DiffError::InvalidOp {
                op: entry.op_name(),
                container: "sequence",
            });
        }
    }
    Ok(index)
}

/// Validate that `entry` can be applied to an object holding `keys`.
///
/// Returns the entry's key name on success.
pub fn validate_object_op<'a, K>(entry: &'a DiffEntry, keys: K) -> Result<&'a str, DiffError>
where
    K: IntoIterator,
    K::Item: AsRef<str>,
{
    let key = entry
        .key()
        .as_name()
        .ok_or_else(|| DiffError::KeyNotName(entry.key().clone()))?;
    let present = keys.into_iter().any(|k| k.as_ref() == key);
    match entry {
        DiffEntry::Add { .. } => {
            if present {
                return Err(DiffError::KeyAlreadyPresent(key.to_string()));
            }
        }
        DiffEntry::Remove { .. } | DiffEntry::Replace { .. } | DiffEntry::Patch { .. } => {
            if !present {
                return Err(DiffError::MissingKey {
                    op: entry.op_name(),
                    key: key.to_string(),
                });
            }
        }
        DiffEntry::AddRange { .. } | DiffEntry::RemoveRange { .. } => {
            return Err(DiffError::InvalidOp {
                op: entry.op_name(),
                container: "object",
            });
        }
    }
    Ok(key)
}

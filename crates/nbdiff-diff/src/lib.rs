//! Diff entry algebra for notebook diffs.
//!
//! A diff is an ordered list of [`DiffEntry`] operations keyed either by a
//! sequence index or by an object key. This crate validates entries against
//! the shape of the container they target, re-keys line diffs of multi-line
//! strings into character diffs, applies diffs to JSON values and maps
//! absolute character ranges to line/column positions.
//!
//! # Example
//!
//! ```
//! use nbdiff_diff::{flatten_text_diff, op_add_range, op_patch, op_remove_range};
//!
//! let text = "one\ntwo\n";
//! // replace line 1 ("two\n") with "three\n"
//! let diff = vec![
//!     op_add_range(1, vec![serde_json::json!("three\n")]),
//!     op_remove_range(1, 1),
//! ];
//! let flat = flatten_text_diff(text, &diff).unwrap();
//! assert_eq!(flat[0].key().as_index(), Some(4));
//! assert_eq!(flat[1].key().as_index(), Some(4));
//! # let _ = op_patch(0, vec![]);
//! ```

pub mod flatten;
pub mod patch;
pub mod range;
pub mod types;
pub mod util;
pub mod validate;

pub use flatten::{flatten_lines_diff, flatten_text_diff};
pub use patch::patch;
pub use range::{raw_to_pos, DiffRangePos, DiffRangeRaw, Pos};
pub use types::{
    op_add, op_add_range, op_patch, op_remove, op_remove_range, op_replace, Diff, DiffEntry,
    DiffError, DiffKey, ValueList,
};
pub use util::{
    get_diff_entry_by_key, get_member_by_path, get_sub_diff_by_key, get_sub_diff_by_path,
    strip_source,
};
pub use validate::{validate_object_op, validate_sequence_op};

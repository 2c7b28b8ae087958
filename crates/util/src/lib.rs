//! nbdiff-util - helpers shared by the nbdiff crates.
//!
//! Line splitting with retained terminators, character-length prefix sums and
//! a stable insertion sort for the short, nearly-sorted lists diffs produce.

pub mod sort;
pub mod strings;

pub use sort::insertion_sort_by_key;
pub use strings::{accumulate_lengths, char_len, split_lines};

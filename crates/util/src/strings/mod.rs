//! String utilities for line-oriented diffs.

mod lines;

pub use lines::{accumulate_lengths, char_len, split_lines};

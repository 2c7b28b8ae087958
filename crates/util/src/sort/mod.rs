//! Sorting utilities.
//!
//! Insertion sort is stable, which the diff re-keying step relies on: entries
//! with equal keys must keep their relative order.

mod insertion;

pub use insertion::insertion_sort_by_key;

//! Grouping of a flat model list into display chunks.
//!
//! Chunks are contiguous index ranges into the flat list, so the chunked
//! view is always a partition of it.

use std::ops::Range;

#[derive(Debug, Default)]
pub(crate) struct ChunkBuilder {
    ranges: Vec<Range<usize>>,
    current: Option<Range<usize>>,
}

impl ChunkBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Close the current chunk and put the entry at `at` in a chunk of its own.
    pub(crate) fn singleton(&mut self, at: usize) {
        self.flush();
        self.ranges.push(at..at + 1);
    }

    /// Close the current chunk and open an empty one starting at `at`.
    pub(crate) fn open(&mut self, at: usize) {
        self.flush();
        self.current = Some(at..at);
    }

    /// Whether the open chunk already holds entries.
    pub(crate) fn current_is_empty(&self) -> bool {
        self.current.as_ref().map_or(true, |r| r.is_empty())
    }

    /// Add the entry at `at` to the open chunk, opening one if needed.
    pub(crate) fn push(&mut self, at: usize) {
        match &mut self.current {
            Some(range) => range.end = at + 1,
            None => self.current = Some(at..at + 1),
        }
    }

    fn flush(&mut self) {
        if let Some(range) = self.current.take() {
            if !range.is_empty() {
                self.ranges.push(range);
            }
        }
    }

    pub(crate) fn finish(mut self) -> Vec<Range<usize>> {
        self.flush();
        self.ranges
    }
}

/// Group `items` into maximal runs of entries matching `grouped`; every
/// other entry is a chunk of its own.
pub(crate) fn chunk_runs<T>(items: &[T], grouped: impl Fn(&T) -> bool) -> Vec<&[T]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    for (i, item) in items.iter().enumerate() {
        if !grouped(item) {
            if start < i {
                chunks.push(&items[start..i]);
            }
            chunks.push(&items[i..i + 1]);
            start = i + 1;
        }
    }
    if start < items.len() {
        chunks.push(&items[start..]);
    }
    chunks
}

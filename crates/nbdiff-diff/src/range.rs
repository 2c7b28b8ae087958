//! Character ranges and their line/column positions.

use serde_json::Value;

/// A line/column position. `ch` counts characters from the line start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Pos {
    pub line: usize,
    pub ch: usize,
}

impl Pos {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// A range of absolute character offsets `[from, to)` in a text.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRangeRaw {
    pub from: usize,
    pub to: usize,
    pub source: Option<Value>,
}

impl DiffRangeRaw {
    /// Create the range `[from, from + length)`.
    pub fn new(from: usize, length: usize, source: Option<Value>) -> Self {
        Self {
            from,
            to: from + length,
            source,
        }
    }

    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Shift both ends by `offset`.
    pub fn offset(&mut self, offset: usize) {
        self.from += offset;
        self.to += offset;
    }
}

/// A range in line/column form, with hints for chunking display lines.
///
/// `to.ch` is exclusive, like the end of a slice.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRangePos {
    pub from: Pos,
    pub to: Pos,
    /// The edit must start a fresh display chunk on its first line.
    pub chunk_start_line: bool,
    /// The range starts exactly on a newline character.
    pub starts_on_newline: bool,
    /// The last character of the range is a newline.
    pub ends_on_newline: bool,
    pub source: Option<Value>,
}

/// Index of the first newline at or after `offset`, i.e. the line holding
/// `offset`.
fn find_line_number(newlines: &[usize], offset: usize) -> usize {
    newlines.partition_point(|&nl| nl < offset)
}

fn line_start(newlines: &[usize], line: usize) -> usize {
    if line == 0 {
        0
    } else {
        newlines[line - 1] + 1
    }
}

/// Convert character ranges in `text` into line/column ranges.
pub fn raw_to_pos(ranges: &[DiffRangeRaw], text: &str) -> Vec<DiffRangePos> {
    let newlines: Vec<usize> = text
        .chars()
        .enumerate()
        .filter(|(_, c)| *c == '\n')
        .map(|(i, _)| i)
        .collect();
    let text_len = text.chars().count();
    let is_newline = |offset: usize| newlines.binary_search(&offset).is_ok();

    ranges
        .iter()
        .map(|r| {
            let line = find_line_number(&newlines, r.from);
            let from = Pos::new(line, r.from - line_start(&newlines, line));

            // `to` is exclusive, so its line is the one holding `to - 1`
            let line = match r.to.checked_sub(1) {
                Some(last) => find_line_number(&newlines, last),
                None => 0,
            };
            let to = Pos::new(line, r.to - line_start(&newlines, line));

            let starts_on_newline = is_newline(r.from);
            let ends_on_newline = r.to.checked_sub(1).map_or(false, is_newline);
            let first_line_new = from.ch == 0
                && (from.line != to.line || ends_on_newline || r.to == text_len);
            let preceded_by_newline = r.from.checked_sub(1).map_or(false, is_newline);
            let chunk_start_line = first_line_new
                || !starts_on_newline
                || (!preceded_by_newline && !is_newline(r.to));

            DiffRangePos {
                from,
                to,
                chunk_start_line,
                starts_on_newline,
                ends_on_newline,
                source: r.source.clone(),
            }
        })
        .collect()
}

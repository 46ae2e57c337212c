//! Byte ranges into catalogue source text.

use std::ops::Range;

/// A byte range in the catalogue source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a new span from a byte range
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end.max(range.start),
        }
    }

    /// Get the start offset of the span
    pub fn start(&self) -> usize {
        self.start
    }

    /// Get the end offset of the span
    pub fn end(&self) -> usize {
        self.end
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Span of one character at a 1-based `line`/`column` position, as
    /// reported by `serde_json`. Positions past the end clamp to the end.
    pub fn at_line_column(source: &str, line: usize, column: usize) -> Self {
        let line_start: usize = source
            .split_inclusive('\n')
            .take(line.saturating_sub(1))
            .map(str::len)
            .sum();
        let start = (line_start + column.saturating_sub(1)).min(source.len());
        let end = source[start..]
            .chars()
            .next()
            .map_or(start, |c| start + c.len_utf8());
        Self::new(start..end)
    }

    /// Span of the `occurrence`-th (0-based) appearance of `"text"` (quoted)
    /// in the source.
    pub fn of_quoted(source: &str, text: &str, occurrence: usize) -> Option<Self> {
        let needle = format!("\"{text}\"");
        source
            .match_indices(&needle)
            .nth(occurrence)
            .map(|(start, matched)| Self::new(start..start + matched.len()))
    }
}

//! Line lookup for spans.
//!
//! [`LineOffsetTable`] pre-computes line starts once per source so every
//! lookup is a binary search.

use dbspec_ir::Span;

/// Pre-computed line offset table for line lookup.
///
/// ```
/// use dbspec_diagnostic::span_utils::LineOffsetTable;
///
/// let source = "line1\nline2\nline3";
/// let table = LineOffsetTable::build(source);
///
/// assert_eq!(table.line_from_offset(0), 1);
/// assert_eq!(table.line_from_offset(6), 2);
/// assert_eq!(table.line_text(source, 3), Some("line3"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    /// Byte offset of each line start; `offsets[0] == 0`.
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineOffsetTable { offsets }
    }

    /// 1-based line number containing `offset`.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(line_idx).unwrap_or(u32::MAX - 1) + 1
    }

    /// Inclusive range of 1-based lines touched by `span`.
    ///
    /// A span ending exactly at a line start (after a newline) does not
    /// touch that next line.
    pub fn lines_of(&self, span: Span) -> (u32, u32) {
        let first = self.line_from_offset(span.start);
        let last_offset = if span.end > span.start {
            span.end - 1
        } else {
            span.start
        };
        (first, self.line_from_offset(last_offset).max(first))
    }

    /// Text of a 1-based line without its line terminator.
    pub fn line_text<'s>(&self, source: &'s str, line: u32) -> Option<&'s str> {
        let idx = usize::try_from(line.checked_sub(1)?).ok()?;
        let start = *self.offsets.get(idx)? as usize;
        let end = self
            .offsets
            .get(idx + 1)
            .map_or(source.len(), |&next| next as usize);
        let text = source.get(start..end)?;
        let text = text.strip_suffix('\n').unwrap_or(text);
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}

/// 1-based line number where `span` starts.
///
/// For repeated lookups, use [`LineOffsetTable`] instead.
pub fn line_number(source: &str, span: Span) -> u32 {
    LineOffsetTable::build(source).line_from_offset(span.start)
}

#[cfg(test)]
mod tests;

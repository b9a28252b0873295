//! Line table and in-line scanning.
//!
//! The grammar is line-oriented: a statement header occupies one line and
//! its block is the run of following lines indented deeper than the header.
//! The cursor tracks the next unconsumed line plus a scanning window inside
//! the line currently being parsed.

use dbspec_ir::Span;

/// Byte offsets of one source line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Line {
    /// First byte of the line.
    pub start: usize,
    /// First byte after the leading whitespace.
    pub indent_end: usize,
    /// End of the line content, excluding the line terminator.
    pub end: usize,
    /// First byte of the following line.
    pub next: usize,
}

impl Line {
    #[inline]
    pub fn indent(&self) -> usize {
        self.indent_end - self.start
    }

    #[inline]
    pub fn is_blank(&self) -> bool {
        self.indent_end == self.end
    }
}

pub(crate) fn split_lines(source: &str) -> Vec<Line> {
    let bytes = source.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    while start < bytes.len() {
        let newline = bytes[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| start + i);
        let (mut end, next) = match newline {
            Some(nl) => (nl, nl + 1),
            None => (bytes.len(), bytes.len()),
        };
        if end > start && bytes[end - 1] == b'\r' {
            end -= 1;
        }
        let indent_end = start
            + bytes[start..end]
                .iter()
                .take_while(|&&b| b == b' ' || b == b'\t')
                .count();
        lines.push(Line {
            start,
            indent_end,
            end,
            next,
        });
        start = next;
    }
    lines
}

#[inline]
pub(crate) fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

#[inline]
pub(crate) fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

pub(crate) struct Cursor<'a> {
    source: &'a str,
    lines: Vec<Line>,
    /// Next unconsumed line.
    line: usize,
    /// Scanning position inside the current window.
    pos: usize,
    /// End of the current window.
    limit: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Cursor {
            source,
            lines: split_lines(source),
            line: 0,
            pos: 0,
            limit: 0,
        }
    }

    // Line level

    pub fn line_index(&self) -> usize {
        self.line
    }

    pub fn set_line(&mut self, index: usize) {
        self.line = index;
    }

    pub fn line_at(&self, index: usize) -> Option<Line> {
        self.lines.get(index).copied()
    }

    pub fn current_line(&self) -> Option<Line> {
        self.line_at(self.line)
    }

    /// End of the line content without trailing whitespace.
    pub fn trimmed_end(&self, line: &Line) -> usize {
        let content = self.text(line.indent_end, line.end);
        line.indent_end + content.trim_end().len()
    }

    pub fn text(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or_default()
    }

    pub fn is_comment(&self, line: &Line) -> bool {
        self.source.as_bytes().get(line.indent_end) == Some(&b'#')
    }

    /// Skip lines that carry no statement.
    pub fn skip_blank_and_comment_lines(&mut self) {
        while let Some(line) = self.current_line() {
            if line.is_blank() || self.is_comment(&line) {
                self.line += 1;
            } else {
                break;
            }
        }
    }

    /// Resume after a failed header at `failed`, skipping its block.
    pub fn recover(&mut self, failed: usize, indent: usize) {
        self.line = failed + 1;
        while let Some(line) = self.current_line() {
            if line.is_blank() || line.indent() > indent {
                self.line += 1;
            } else {
                break;
            }
        }
    }

    /// Consume the current line and scan its content.
    pub fn enter_line(&mut self) -> Option<Line> {
        let line = self.current_line()?;
        self.line += 1;
        self.pos = line.indent_end;
        self.limit = line.end;
        Some(line)
    }

    /// Scan an arbitrary byte range, e.g. one line of a raw block.
    pub fn enter_range(&mut self, start: usize, end: usize) {
        self.pos = start;
        self.limit = end;
    }

    // In-line scanning

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn rest(&self) -> &'a str {
        self.source.get(self.pos..self.limit).unwrap_or_default()
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.limit
    }

    pub fn peek(&self) -> Option<u8> {
        if self.at_end() {
            None
        } else {
            self.source.as_bytes().get(self.pos).copied()
        }
    }

    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        let at = self.pos + offset;
        if at >= self.limit {
            None
        } else {
            self.source.as_bytes().get(at).copied()
        }
    }

    pub fn bump(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.limit);
    }

    /// Skip spaces and tabs; returns whether any were skipped.
    pub fn skip_ws(&mut self) -> bool {
        let before = self.pos;
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
        self.pos > before
    }

    /// Consume `text` if the window continues with it.
    pub fn eat(&mut self, text: &str) -> bool {
        if self.rest().starts_with(text) {
            self.pos += text.len();
            true
        } else {
            false
        }
    }

    /// Consume `keyword` if it appears as a whole word.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        if !self.rest().starts_with(keyword) {
            return false;
        }
        if self.peek_at(keyword.len()).is_some_and(is_ident_continue) {
            return false;
        }
        self.pos += keyword.len();
        true
    }

    /// Check for `keyword` as a whole word without consuming it.
    pub fn at_keyword(&self, keyword: &str) -> bool {
        self.rest().starts_with(keyword)
            && !self.peek_at(keyword.len()).is_some_and(is_ident_continue)
    }

    /// Consume an identifier and return its byte range.
    pub fn ident(&mut self) -> Option<(usize, usize)> {
        let start = self.pos;
        if !self.peek().is_some_and(is_ident_start) {
            return None;
        }
        while self.peek().is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        Some((start, self.pos))
    }

    /// Consume a property key: an identifier that may contain `.` and `-`.
    pub fn property_key(&mut self) -> Option<(usize, usize)> {
        let start = self.pos;
        if !self.peek().is_some_and(is_ident_start) {
            return None;
        }
        while self
            .peek()
            .is_some_and(|c| is_ident_continue(c) || c == b'.' || c == b'-')
        {
            self.pos += 1;
        }
        Some((start, self.pos))
    }

    /// Span of the rest of the window, or a point at its end.
    pub fn rest_span(&self) -> Span {
        span(self.pos, self.limit.max(self.pos))
    }

    pub fn point(&self) -> Span {
        span(self.pos, self.pos)
    }
}

/// Build a span from byte offsets.
#[inline]
pub(crate) fn span(start: usize, end: usize) -> Span {
    Span::try_from_range(start..end).unwrap_or(Span::DUMMY)
}

//! Plain-text diagnostic output.
//!
//! ```text
//! Semantic error: The variable 'x' has not been set.
//! 3:	Log x
//! ```

use std::io::{self, Write};

use crate::span_utils::LineOffsetTable;
use crate::Diagnostic;

/// Writes diagnostics for one source file.
pub struct Emitter<'s, W: Write> {
    source: &'s str,
    lines: LineOffsetTable,
    out: W,
}

impl<'s, W: Write> Emitter<'s, W> {
    pub fn new(source: &'s str, out: W) -> Self {
        Emitter {
            source,
            lines: LineOffsetTable::build(source),
            out,
        }
    }

    /// Write the headline, then every line the primary span touches.
    pub fn emit(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        writeln!(self.out, "{}", diagnostic.headline)?;
        if let Some(span) = diagnostic.span {
            let (first, last) = self.lines.lines_of(span);
            for line in first..=last {
                if let Some(text) = self.lines.line_text(self.source, line) {
                    writeln!(self.out, "{line}:\t{text}")?;
                }
            }
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests;

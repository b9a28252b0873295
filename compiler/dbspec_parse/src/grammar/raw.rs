//! Raw blocks: verbatim text with `${...}` and `$${...}` interpolations.
//!
//! A raw block is every line after the header that is blank or indented
//! deeper than the header, minus trailing blank lines. Lines are de-indented
//! by the indentation of the first non-blank line. Each line yields its
//! literal pieces (including the line terminator) and interpolations.

use dbspec_ir::{NodeId, NodeKind};

use super::block::unlabeled;
use crate::cursor::Line;
use crate::{Labeled, ParseError, Parser};

impl Parser<'_> {
    /// Parse the raw block following `header`. An absent block is empty.
    pub(super) fn raw_block(&mut self, header: Line) -> Result<NodeId, ParseError> {
        let first = self.cursor.line_index();
        let mut content = None;
        let mut index = first;
        while let Some(line) = self.cursor.line_at(index) {
            if !line.is_blank() {
                if line.indent() <= header.indent() {
                    break;
                }
                let (begin, _) = content.unwrap_or((index, index));
                content = Some((begin, index));
            }
            index += 1;
        }

        let Some((begin, last)) = content else {
            return Ok(self.leaf(NodeKind::Raw, header.next, header.next));
        };
        let block_indent = self
            .cursor
            .line_at(begin)
            .map_or(0, |line| line.indent());

        let mut children = Vec::new();
        for index in begin..=last {
            let Some(line) = self.cursor.line_at(index) else {
                break;
            };
            if line.is_blank() {
                children.push(unlabeled(self.leaf(NodeKind::RawContent, line.end, line.next)));
                continue;
            }
            let start = line.start + line.indent().min(block_indent);
            self.raw_line(start, line, &mut children)?;
        }
        self.cursor.set_line(last + 1);

        let start = children
            .first()
            .map_or(header.next, |(_, id)| self.builder.span(*id).start as usize);
        Ok(self.finish(NodeKind::Raw, start, start, children))
    }

    /// Split one line of a raw block into literal pieces and interpolations.
    fn raw_line(
        &mut self,
        start: usize,
        line: Line,
        children: &mut Vec<Labeled>,
    ) -> Result<(), ParseError> {
        self.cursor.enter_range(start, line.end);
        let mut literal = start;
        while !self.cursor.at_end() {
            let (kind, opener) = if self.cursor.rest().starts_with("$${") {
                (NodeKind::SafeInterpolation, 3)
            } else if self.cursor.rest().starts_with("${") {
                (NodeKind::Interpolation, 2)
            } else {
                self.cursor.bump(1);
                continue;
            };
            let here = self.cursor.pos();
            if here > literal {
                children.push(unlabeled(self.leaf(NodeKind::RawContent, literal, here)));
            }
            children.push(unlabeled(self.interpolation(kind, opener)?));
            literal = self.cursor.pos();
        }
        if line.next > literal {
            children.push(unlabeled(self.leaf(NodeKind::RawContent, literal, line.next)));
        }
        Ok(())
    }
}

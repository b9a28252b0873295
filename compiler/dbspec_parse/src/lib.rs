//! Parser for dbspec scripts.
//!
//! The surface syntax is line-oriented: one statement per line, with blocks
//! introduced by a trailing `:` and made of the following deeper-indented
//! lines. Raw blocks (SQL, scripts, log text) keep their text verbatim apart
//! from `${...}` and `$${...}` interpolations.
//!
//! Parsing never stops at the first error. A statement that fails to parse
//! is reported, its block is skipped, and parsing resumes with the next
//! statement at the same or a shallower indentation.

mod cursor;
mod error;
mod grammar;

use dbspec_ir::{Field, NodeId, NodeKind, TreeBuilder};
use tracing::debug;

use cursor::{span, Cursor};
pub use error::{ParseError, ParseOutput};

/// A child node with its optional field label.
pub(crate) type Labeled = (Option<Field>, NodeId);

/// Parser state.
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    builder: TreeBuilder,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Parser {
            cursor: Cursor::new(source),
            builder: TreeBuilder::new(),
            errors: Vec::new(),
        }
    }

    /// Add a terminal node covering `start..end`.
    fn leaf(&mut self, kind: NodeKind, start: usize, end: usize) -> NodeId {
        self.builder.leaf(kind, span(start, end))
    }

    /// Add a node spanning from `start` to the furthest of `end` and its
    /// children's ends.
    fn finish(
        &mut self,
        kind: NodeKind,
        start: usize,
        end: usize,
        children: Vec<Labeled>,
    ) -> NodeId {
        let end = children
            .iter()
            .map(|(_, id)| self.builder.span(*id).end as usize)
            .fold(end, usize::max);
        self.builder.node(kind, span(start, end), children)
    }
}

/// Parse a complete script.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse(source: &str) -> ParseOutput {
    let mut parser = Parser::new(source);
    let root = parser.source_file(source.len());
    let Parser {
        builder, errors, ..
    } = parser;
    let tree = builder.finish(source, root);
    debug!(nodes = tree.len(), errors = errors.len(), "parsed script");
    ParseOutput { tree, errors }
}

#[cfg(test)]
mod tests;

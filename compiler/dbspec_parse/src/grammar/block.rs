//! Indentation-delimited blocks.

use dbspec_ir::{NodeId, NodeKind};
use dbspec_stack::ensure_sufficient_stack;
use tracing::trace;

use crate::cursor::{span, Line};
use crate::{Labeled, ParseError, Parser};

/// What the lines of a block may contain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum BlockKind {
    /// Statements of the source file, where `Parameters:` is allowed.
    TopLevel,
    /// Statements of a nested block.
    Statements,
    /// `name "description"` lines.
    Parameters,
    /// `key = value` / `key:` lines of a connection.
    Properties,
    /// Body of `SIARD metadata for ...:`.
    SiardMetadata,
    /// Body of a declaration of the given kind.
    Declaration(NodeKind),
    /// Body of a `Command`.
    Command,
}

impl Parser<'_> {
    /// Parse the items of a block whose header is indented by `parent`
    /// (`None` for the whole file).
    pub(super) fn block_items(&mut self, parent: Option<usize>, kind: BlockKind) -> Vec<Labeled> {
        let mut items = Vec::new();
        let mut block_indent = None;
        loop {
            self.cursor.skip_blank_and_comment_lines();
            let Some(line) = self.cursor.current_line() else {
                break;
            };
            let indent = line.indent();
            if parent.is_some_and(|p| indent <= p) {
                break;
            }
            let expected = *block_indent.get_or_insert(indent);
            let start_line = self.cursor.line_index();
            let result = if indent == expected {
                ensure_sufficient_stack(|| self.block_item(kind))
            } else {
                Err(ParseError::new(
                    "inconsistent indentation",
                    span(line.start, line.end),
                ))
            };
            match result {
                Ok(item) => items.push(item),
                Err(error) => {
                    trace!(%error, "skipping statement");
                    self.errors.push(error);
                    self.cursor.recover(start_line, indent);
                }
            }
        }
        items
    }

    fn block_item(&mut self, kind: BlockKind) -> Result<Labeled, ParseError> {
        let Some(line) = self.cursor.enter_line() else {
            return Err(ParseError::new(
                "unexpected end of input",
                self.cursor.point(),
            ));
        };
        match kind {
            BlockKind::TopLevel => self.statement(line, true).map(unlabeled),
            BlockKind::Statements => self.statement(line, false).map(unlabeled),
            BlockKind::Parameters => self.parameter(line).map(unlabeled),
            BlockKind::Properties => self.key_value_pair(line).map(unlabeled),
            BlockKind::SiardMetadata => self.metadata_item(line),
            BlockKind::Declaration(owner) => self.declaration_item(line, owner),
            BlockKind::Command => self.command_item(line),
        }
    }

    /// Whether lines indented deeper than `header` follow.
    pub(super) fn has_block(&mut self, header: Line) -> bool {
        self.cursor.skip_blank_and_comment_lines();
        self.cursor
            .current_line()
            .is_some_and(|line| line.indent() > header.indent())
    }

    /// Parse the statement block following `header`.
    pub(super) fn statement_block(&mut self, header: Line) -> Result<NodeId, ParseError> {
        if !self.has_block(header) {
            return Err(ParseError::new(
                "expected an indented block",
                span(header.end, header.end),
            ));
        }
        let items = self.block_items(Some(header.indent()), BlockKind::Statements);
        let start = items
            .first()
            .map_or(header.next, |(_, id)| self.builder.span(*id).start as usize);
        Ok(self.finish(NodeKind::StatementBlock, start, start, items))
    }

    /// Report fields bound more than once among `items`.
    pub(super) fn check_unique_fields(&mut self, items: &[Labeled]) {
        for (i, (field, id)) in items.iter().enumerate() {
            let Some(field) = field else { continue };
            if items[..i].iter().any(|(earlier, _)| earlier == &Some(*field)) {
                self.errors.push(ParseError::new(
                    format!("'{field}' is given more than once"),
                    self.builder.span(*id),
                ));
            }
        }
    }
}

pub(super) fn unlabeled(id: NodeId) -> Labeled {
    (None, id)
}

//! Archive metadata: `SIARD metadata for ...:` blocks, their schema
//! declarations and command declarations.

use dbspec_ir::{Field, NodeId, NodeKind};

use super::block::{unlabeled, BlockKind};
use crate::cursor::{span, Line};
use crate::{Labeled, ParseError, Parser};

/// Declarations allowed directly inside a declaration of the given kind.
fn nested_declarations(owner: NodeKind) -> &'static [(&'static str, NodeKind)] {
    match owner {
        NodeKind::SiardSchema => &[
            ("Type", NodeKind::SiardType),
            ("Table", NodeKind::SiardTable),
            ("View", NodeKind::SiardView),
        ],
        NodeKind::SiardTable => &[
            ("Column", NodeKind::SiardColumn),
            ("Key", NodeKind::SiardKey),
            ("Check", NodeKind::SiardCheck),
        ],
        NodeKind::SiardView => &[("Column", NodeKind::SiardColumn)],
        NodeKind::SiardColumn | NodeKind::SiardField => &[("Field", NodeKind::SiardField)],
        _ => &[],
    }
}

impl Parser<'_> {
    pub(super) fn siard_metadata(
        &mut self,
        header: Line,
        start: usize,
        end: usize,
        connection: NodeId,
    ) -> Result<NodeId, ParseError> {
        if !self.has_block(header) {
            return Err(ParseError::new(
                "expected an indented metadata block",
                span(end, end),
            ));
        }
        let mut children = vec![(Some(Field::Connection), connection)];
        children.extend(self.block_items(Some(header.indent()), BlockKind::SiardMetadata));
        self.check_unique_fields(&children);
        Ok(self.finish(NodeKind::SiardMetadata, start, end, children))
    }

    pub(super) fn metadata_item(&mut self, line: Line) -> Result<Labeled, ParseError> {
        if self.cursor.eat_keyword("Schema") {
            return self
                .declaration(line, NodeKind::SiardSchema)
                .map(unlabeled);
        }
        if self.cursor.eat_keyword("Command") {
            return self.command_declaration(line).map(unlabeled);
        }
        let save = self.cursor.pos();
        if let Some((word_start, word_end)) = self.cursor.ident() {
            let word = self.cursor.text(word_start, word_end);
            if let Some(field) = Field::archive_info(word) {
                self.cursor.skip_ws();
                if self.cursor.eat(":") {
                    return Ok((Some(field), self.field_value(line)?));
                }
            }
        }
        self.cursor.reset(save);
        Err(ParseError::new(
            "expected 'Schema', 'Command' or an archive field such as 'dbname:'",
            self.cursor.rest_span(),
        ))
    }

    /// Value after `name:` on a field line: a basic expression on the same
    /// line, or a raw block below it.
    fn field_value(&mut self, line: Line) -> Result<NodeId, ParseError> {
        self.cursor.skip_ws();
        if self.cursor.at_end() {
            return self.raw_block(line);
        }
        let value = self.basic()?;
        self.expect_eol()?;
        Ok(value)
    }

    /// `<Keyword> name ["short description"][:]` with an optional block.
    /// The keyword has already been consumed.
    fn declaration(&mut self, line: Line, kind: NodeKind) -> Result<NodeId, ParseError> {
        let start = line.indent_end;
        let name = self.identifier("a name")?;
        let mut children = vec![(Some(Field::Name), name)];
        if let Some(description) = self.short_description()? {
            children.push((Some(Field::Description), description));
        }
        self.cursor.skip_ws();
        let end = self.cursor.pos();
        if self.cursor.eat(":") {
            self.expect_eol()?;
            if self.has_block(line) {
                children.extend(self.block_items(Some(line.indent()), BlockKind::Declaration(kind)));
            }
        } else {
            self.expect_eol()?;
        }
        self.check_unique_fields(&children);
        Ok(self.finish(kind, start, end, children))
    }

    pub(super) fn declaration_item(
        &mut self,
        line: Line,
        owner: NodeKind,
    ) -> Result<Labeled, ParseError> {
        if self.cursor.eat_keyword("description") {
            self.cursor.skip_ws();
            if !self.cursor.eat(":") {
                return Err(ParseError::new(
                    "expected ':' after 'description'",
                    self.cursor.point(),
                ));
            }
            return Ok((Some(Field::Description), self.field_value(line)?));
        }
        let allowed = nested_declarations(owner);
        for (keyword, kind) in allowed {
            if self.cursor.eat_keyword(keyword) {
                return self.declaration(line, *kind).map(unlabeled);
            }
        }
        let expected: Vec<_> = allowed.iter().map(|(keyword, _)| *keyword).collect();
        let message = if expected.is_empty() {
            format!("only 'description:' is allowed in a {}", owner.as_str())
        } else {
            format!(
                "expected 'description:' or one of {} in a {}",
                expected.join(", "),
                owner.as_str()
            )
        };
        Err(ParseError::new(message, self.cursor.rest_span()))
    }

    /// `Command [title]:` with `Title:`, `Parameters:` and `SQL:` items.
    fn command_declaration(&mut self, line: Line) -> Result<NodeId, ParseError> {
        let start = line.indent_end;
        let end = self.cursor.trimmed_end(&line);
        let mut children = Vec::new();
        self.cursor.skip_ws();
        if self.cursor.eat(":") {
            self.expect_eol()?;
        } else {
            children.push((Some(Field::Title), self.basic()?));
            self.expect_block_colon()?;
        }
        if !self.has_block(line) {
            return Err(ParseError::new(
                "expected an indented command block",
                span(end, end),
            ));
        }
        children.extend(self.block_items(Some(line.indent()), BlockKind::Command));
        self.check_unique_fields(&children);
        if !children.iter().any(|(field, _)| *field == Some(Field::Title)) {
            return Err(ParseError::new("a command needs a title", span(start, end)));
        }
        if !children.iter().any(|(field, _)| *field == Some(Field::Body)) {
            return Err(ParseError::new(
                "a command needs an 'SQL:' block",
                span(start, end),
            ));
        }
        Ok(self.finish(NodeKind::CommandDeclaration, start, end, children))
    }

    pub(super) fn command_item(&mut self, line: Line) -> Result<Labeled, ParseError> {
        if self.cursor.eat_keyword("Title") {
            self.cursor.skip_ws();
            if !self.cursor.eat(":") {
                return Err(ParseError::new("expected ':' after 'Title'", self.cursor.point()));
            }
            return Ok((Some(Field::Title), self.field_value(line)?));
        }
        if self.cursor.eat_keyword("Parameters") {
            self.expect_block_colon()?;
            return Ok((Some(Field::Parameters), self.parameters(line)?));
        }
        if self.cursor.eat_keyword("SQL") {
            self.expect_block_colon()?;
            return Ok((Some(Field::Body), self.raw_block(line)?));
        }
        Err(ParseError::new(
            "expected 'Title:', 'Parameters:' or 'SQL:'",
            self.cursor.rest_span(),
        ))
    }
}

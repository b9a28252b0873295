//! Statements.

use dbspec_ir::{Field, NodeId, NodeKind};
use tracing::trace;

use super::block::BlockKind;
use crate::cursor::{span, Line};
use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn source_file(&mut self, len: usize) -> NodeId {
        let items = self.block_items(None, BlockKind::TopLevel);
        self.finish(NodeKind::SourceFile, 0, len, items)
    }

    /// Parse the statement whose header is `line`, plus any block it owns.
    pub(super) fn statement(&mut self, line: Line, top_level: bool) -> Result<NodeId, ParseError> {
        let start = line.indent_end;
        let end = self.cursor.trimmed_end(&line);
        let keyword = self.cursor.rest().split(|c: char| !c.is_ascii_alphanumeric()).next();
        trace!(?keyword, line = start, "statement");

        if self.cursor.eat_keyword("Parameters") {
            if !top_level {
                return Err(ParseError::new(
                    "parameters can only be declared at the top level",
                    span(start, end),
                ));
            }
            self.expect_block_colon()?;
            return self.parameters(line);
        }
        if self.cursor.eat_keyword("Nop") {
            self.expect_eol()?;
            return Ok(self.leaf(NodeKind::Nop, start, end));
        }
        if self.cursor.eat_keyword("Set") {
            return self.set(line, start, end);
        }
        if self.cursor.eat_keyword("Execute") {
            return self.execute(line, start, end);
        }
        if self.cursor.eat_keyword("For") {
            return self.for_loop(line, start, end);
        }
        if self.cursor.eat_keyword("If") {
            return self.conditional(line, start, end);
        }
        if self.cursor.eat_keyword("Assert") {
            let condition = self.comparison()?;
            self.expect_eol()?;
            return Ok(self.finish(
                NodeKind::Assert,
                start,
                end,
                vec![(Some(Field::Condition), condition)],
            ));
        }
        if self.cursor.eat_keyword("Log") {
            return self.log(line, start, end);
        }
        if self.cursor.eat_keyword("SIARD") {
            return self.siard(line, start, end);
        }
        if self.cursor.at_keyword("Else") {
            return Err(ParseError::new(
                "'Else' without a matching 'If'",
                span(start, end),
            ));
        }
        Err(ParseError::new(
            format!("unknown statement '{}'", keyword.unwrap_or_default()),
            span(start, end),
        ))
    }

    /// `Parameters:` followed by `name "description"` lines.
    pub(super) fn parameters(&mut self, header: Line) -> Result<NodeId, ParseError> {
        let start = header.indent_end;
        let end = self.cursor.trimmed_end(&header);
        if !self.has_block(header) {
            return Err(ParseError::new(
                "expected an indented list of parameters",
                span(end, end),
            ));
        }
        let items = self.block_items(Some(header.indent()), BlockKind::Parameters);
        Ok(self.finish(NodeKind::Parameters, start, end, items))
    }

    pub(super) fn parameter(&mut self, line: Line) -> Result<NodeId, ParseError> {
        let name = self.identifier("a parameter name")?;
        let mut children = vec![(Some(Field::Name), name)];
        if let Some(description) = self.short_description()? {
            children.push((Some(Field::Description), description));
        }
        self.expect_eol()?;
        let end = self.cursor.trimmed_end(&line);
        Ok(self.finish(NodeKind::Parameter, line.indent_end, end, children))
    }

    fn set(&mut self, line: Line, start: usize, end: usize) -> Result<NodeId, ParseError> {
        let name = self.identifier("a variable name")?;
        self.cursor.skip_ws();
        let value = if self.cursor.eat("=") {
            self.expression(line)?
        } else if self.cursor.eat(":") {
            self.expect_eol()?;
            self.raw_block(line)?
        } else {
            return Err(ParseError::new(
                "expected '=' or ':' after the variable name",
                self.cursor.point(),
            ));
        };
        Ok(self.finish(
            NodeKind::Set,
            start,
            end,
            vec![(Some(Field::Name), name), (Some(Field::Value), value)],
        ))
    }

    fn execute(&mut self, line: Line, start: usize, end: usize) -> Result<NodeId, ParseError> {
        self.cursor.skip_ws();
        if self.cursor.eat_keyword("using") {
            let interpreter = self.basic()?;
            self.expect_block_colon()?;
            let script = self.raw_block(line)?;
            return Ok(self.finish(
                NodeKind::ExecuteUsing,
                start,
                end,
                vec![
                    (Some(Field::Interpreter), interpreter),
                    (Some(Field::Script), script),
                ],
            ));
        }
        if self.cursor.eat_keyword("SQL") {
            self.expect_keyword("on")?;
            let connection = self.identifier("a connection variable")?;
            self.expect_block_colon()?;
            let sql = self.raw_block(line)?;
            return Ok(self.finish(
                NodeKind::ExecuteSql,
                start,
                end,
                vec![
                    (Some(Field::Connection), connection),
                    (Some(Field::Sql), sql),
                ],
            ));
        }
        Err(ParseError::new(
            "expected 'using' or 'SQL' after 'Execute'",
            self.cursor.point(),
        ))
    }

    fn for_loop(&mut self, line: Line, start: usize, end: usize) -> Result<NodeId, ParseError> {
        let mut variables = vec![(None, self.identifier("a loop variable")?)];
        loop {
            self.cursor.skip_ws();
            if !self.cursor.eat(",") {
                break;
            }
            variables.push((None, self.identifier("a loop variable")?));
        }
        let first = self.builder.span(variables[0].1).start as usize;
        let variables = self.finish(NodeKind::ForVariables, first, first, variables);
        self.expect_keyword("in")?;
        let rows = self.basic()?;
        self.expect_block_colon()?;
        let body = self.statement_block(line)?;
        Ok(self.finish(
            NodeKind::ForLoop,
            start,
            end,
            vec![
                (Some(Field::Variables), variables),
                (Some(Field::Rows), rows),
                (Some(Field::Body), body),
            ],
        ))
    }

    fn conditional(&mut self, line: Line, start: usize, end: usize) -> Result<NodeId, ParseError> {
        let condition = self.comparison()?;
        self.expect_block_colon()?;
        let then = self.statement_block(line)?;
        let mut children = vec![
            (Some(Field::Condition), condition),
            (Some(Field::Then), then),
        ];

        self.cursor.skip_blank_and_comment_lines();
        let resume = self.cursor.line_index();
        if let Some(next) = self.cursor.current_line() {
            if next.indent() == line.indent() {
                self.cursor.enter_line();
                if self.cursor.eat_keyword("Else") {
                    self.expect_block_colon()?;
                    let otherwise = self.statement_block(next)?;
                    children.push((Some(Field::Else), otherwise));
                } else {
                    self.cursor.set_line(resume);
                }
            }
        }
        Ok(self.finish(NodeKind::Conditional, start, end, children))
    }

    fn log(&mut self, line: Line, start: usize, end: usize) -> Result<NodeId, ParseError> {
        let value = if self.cursor.eat(":") {
            self.expect_eol()?;
            self.raw_block(line)?
        } else {
            let value = self.basic()?;
            self.expect_eol()?;
            value
        };
        Ok(self.finish(
            NodeKind::Log,
            start,
            end,
            vec![(Some(Field::Value), value)],
        ))
    }

    fn siard(&mut self, line: Line, start: usize, end: usize) -> Result<NodeId, ParseError> {
        self.cursor.skip_ws();
        if self.cursor.eat_keyword("metadata") {
            self.expect_keyword("for")?;
            let connection = self.identifier("a connection variable")?;
            self.expect_block_colon()?;
            return self.siard_metadata(line, start, end, connection);
        }
        if self.cursor.eat_keyword("output") {
            let connection = self.identifier("a connection variable")?;
            self.expect_keyword("to")?;
            let file = self.basic()?;
            self.expect_eol()?;
            return Ok(self.finish(
                NodeKind::SiardOutput,
                start,
                end,
                vec![
                    (Some(Field::Connection), connection),
                    (Some(Field::File), file),
                ],
            ));
        }
        Err(ParseError::new(
            "expected 'metadata' or 'output' after 'SIARD'",
            self.cursor.point(),
        ))
    }
}

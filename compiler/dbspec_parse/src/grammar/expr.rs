//! Expressions, strings and comparisons.

use dbspec_ir::{Field, NodeId, NodeKind};

use super::block::{unlabeled, BlockKind};
use crate::cursor::{is_ident_start, span, Line};
use crate::{ParseError, Parser};

/// Comparison operators, longest first.
const COMPARISON_OPERATORS: [&str; 6] = ["==", "!=", "<=", ">=", "<", ">"];

impl Parser<'_> {
    /// Right-hand side of `Set name = ...`.
    ///
    /// `connection to`, `query(...)` and `execute using` may own a block;
    /// anything else is a basic expression ending the line.
    pub(super) fn expression(&mut self, header: Line) -> Result<NodeId, ParseError> {
        self.cursor.skip_ws();
        let start = self.cursor.pos();
        if self.cursor.eat_keyword("connection") {
            if self.cursor.skip_ws() && self.cursor.eat_keyword("to") {
                return self.connection(header, start);
            }
            self.cursor.reset(start);
        } else if self.cursor.eat_keyword("query") {
            self.cursor.skip_ws();
            if self.cursor.eat("(") {
                return self.query(header, start);
            }
            self.cursor.reset(start);
        } else if self.cursor.eat_keyword("execute") {
            if self.cursor.skip_ws() && self.cursor.eat_keyword("using") {
                return self.script_result(header, start);
            }
            self.cursor.reset(start);
        }
        let value = self.basic()?;
        self.expect_eol()?;
        Ok(value)
    }

    fn connection(&mut self, header: Line, start: usize) -> Result<NodeId, ParseError> {
        let url = self.basic()?;
        let mut children = vec![(Some(Field::Url), url)];
        self.cursor.skip_ws();
        let end = self.cursor.pos();
        if self.cursor.eat_keyword("with") {
            self.expect_block_colon()?;
            if !self.has_block(header) {
                return Err(ParseError::new(
                    "expected an indented list of properties",
                    span(end, end),
                ));
            }
            let items = self.block_items(Some(header.indent()), BlockKind::Properties);
            let first = items
                .first()
                .map_or(header.next, |(_, id)| self.builder.span(*id).start as usize);
            let properties = self.finish(NodeKind::KeyValuePairs, first, first, items);
            children.push((Some(Field::Properties), properties));
        } else {
            self.expect_eol()?;
        }
        Ok(self.finish(NodeKind::Connection, start, end, children))
    }

    /// `key = <basic>` or `key:` followed by a raw block.
    pub(super) fn key_value_pair(&mut self, line: Line) -> Result<NodeId, ParseError> {
        let Some((key_start, key_end)) = self.cursor.property_key() else {
            return Err(ParseError::new(
                "expected a property name",
                self.cursor.point(),
            ));
        };
        let key = self.leaf(NodeKind::Identifier, key_start, key_end);
        self.cursor.skip_ws();
        let value = if self.cursor.eat("=") {
            let value = self.basic()?;
            self.expect_eol()?;
            value
        } else if self.cursor.eat(":") {
            self.expect_eol()?;
            self.raw_block(line)?
        } else {
            return Err(ParseError::new(
                "expected '=' or ':' after the property name",
                self.cursor.point(),
            ));
        };
        let end = self.cursor.trimmed_end(&line);
        Ok(self.finish(
            NodeKind::KeyValuePair,
            key_start,
            end,
            vec![(Some(Field::Key), key), (Some(Field::Value), value)],
        ))
    }

    fn query(&mut self, header: Line, start: usize) -> Result<NodeId, ParseError> {
        let connection = self.identifier("a connection variable")?;
        self.cursor.skip_ws();
        if !self.cursor.eat(")") {
            return Err(ParseError::new("expected ')'", self.cursor.point()));
        }
        let end = self.cursor.pos();
        self.expect_block_colon()?;
        let sql = self.raw_block(header)?;
        Ok(self.finish(
            NodeKind::Query,
            start,
            end,
            vec![
                (Some(Field::Connection), connection),
                (Some(Field::Sql), sql),
            ],
        ))
    }

    fn script_result(&mut self, header: Line, start: usize) -> Result<NodeId, ParseError> {
        let interpreter = self.basic()?;
        let end = self.cursor.pos();
        self.expect_block_colon()?;
        let script = self.raw_block(header)?;
        Ok(self.finish(
            NodeKind::ScriptResult,
            start,
            end,
            vec![
                (Some(Field::Interpreter), interpreter),
                (Some(Field::Script), script),
            ],
        ))
    }

    /// `basic (== | != | < | > | <= | >=) basic`
    pub(super) fn comparison(&mut self) -> Result<NodeId, ParseError> {
        let left = self.basic()?;
        let start = self.builder.span(left).start as usize;
        self.cursor.skip_ws();
        let op_start = self.cursor.pos();
        let Some(op) = COMPARISON_OPERATORS
            .into_iter()
            .find(|op| self.cursor.rest().starts_with(op))
        else {
            return Err(ParseError::new(
                "expected a comparison operator",
                self.cursor.point(),
            ));
        };
        self.cursor.bump(op.len());
        let operator = self.leaf(NodeKind::ComparisonOperator, op_start, op_start + op.len());
        let right = self.basic()?;
        Ok(self.finish(
            NodeKind::Comparison,
            start,
            start,
            vec![
                (Some(Field::Left), left),
                (Some(Field::Operator), operator),
                (Some(Field::Right), right),
            ],
        ))
    }

    /// A string, integer or variable, followed by any number of `.operator`
    /// suffixes.
    pub(super) fn basic(&mut self) -> Result<NodeId, ParseError> {
        self.cursor.skip_ws();
        let start = self.cursor.pos();
        let mut left = self.primary()?;
        while self.cursor.peek() == Some(b'.') && self.cursor.peek_at(1).is_some_and(is_ident_start)
        {
            self.cursor.bump(1);
            let Some((op_start, op_end)) = self.cursor.ident() else {
                break;
            };
            let right = self.leaf(NodeKind::Identifier, op_start, op_end);
            left = self.finish(
                NodeKind::DotExpression,
                start,
                op_end,
                vec![(Some(Field::Left), left), (Some(Field::Right), right)],
            );
        }
        Ok(left)
    }

    fn primary(&mut self) -> Result<NodeId, ParseError> {
        match self.cursor.peek() {
            Some(b'"') => self.string(),
            Some(b'-' | b'0'..=b'9') => self.integer(),
            Some(c) if is_ident_start(c) => {
                let Some((start, end)) = self.cursor.ident() else {
                    return Err(ParseError::new("expected a name", self.cursor.point()));
                };
                let name = self.leaf(NodeKind::Identifier, start, end);
                Ok(self.finish(NodeKind::VariableInstance, start, end, vec![unlabeled(name)]))
            }
            _ => Err(ParseError::new(
                "expected a string, an integer or a variable",
                self.cursor.rest_span(),
            )),
        }
    }

    fn integer(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.pos();
        self.cursor.eat("-");
        let digits = self.cursor.pos();
        while self.cursor.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.cursor.bump(1);
        }
        if self.cursor.pos() == digits {
            return Err(ParseError::new("expected digits", self.cursor.point()));
        }
        Ok(self.leaf(NodeKind::Integer, start, self.cursor.pos()))
    }

    /// `"..."` with escapes and `${...}` interpolations.
    fn string(&mut self) -> Result<NodeId, ParseError> {
        let open = self.cursor.pos();
        self.cursor.bump(1);
        let mut children = Vec::new();
        loop {
            match self.cursor.peek() {
                None => {
                    return Err(ParseError::new(
                        "unterminated string",
                        span(open, self.cursor.limit()),
                    ));
                }
                Some(b'"') => {
                    self.cursor.bump(1);
                    break;
                }
                Some(b'\\') => children.push(unlabeled(self.escape_sequence()?)),
                Some(b'$') if self.cursor.peek_at(1) == Some(b'{') => {
                    children.push(unlabeled(self.interpolation(NodeKind::Interpolation, 2)?));
                }
                Some(_) => {
                    let start = self.cursor.pos();
                    while let Some(c) = self.cursor.peek() {
                        if c == b'"' || c == b'\\' || (c == b'$' && self.cursor.peek_at(1) == Some(b'{'))
                        {
                            break;
                        }
                        self.cursor.bump(1);
                    }
                    children.push(unlabeled(self.leaf(
                        NodeKind::StringContent,
                        start,
                        self.cursor.pos(),
                    )));
                }
            }
        }
        Ok(self.finish(NodeKind::String, open, self.cursor.pos(), children))
    }

    fn escape_sequence(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.pos();
        self.cursor.bump(1);
        match self.cursor.peek() {
            Some(b'n' | b't' | b'r' | b'b' | b'f' | b'0' | b'\\' | b'"' | b'\'' | b'$') => {
                self.cursor.bump(1);
            }
            Some(b'u') => {
                self.cursor.bump(1);
                if !self.cursor.eat("{") {
                    return Err(ParseError::new(
                        "expected '{' after '\\u'",
                        self.cursor.point(),
                    ));
                }
                let digits = self.cursor.pos();
                while self.cursor.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                    self.cursor.bump(1);
                }
                let count = self.cursor.pos() - digits;
                if count == 0 || count > 6 || !self.cursor.eat("}") {
                    return Err(ParseError::new(
                        "expected 1 to 6 hex digits and '}' in a unicode escape",
                        span(start, self.cursor.pos()),
                    ));
                }
            }
            _ => {
                return Err(ParseError::new(
                    "unknown escape sequence",
                    span(start, (start + 2).min(self.cursor.limit())),
                ));
            }
        }
        Ok(self.leaf(NodeKind::EscapeSequence, start, self.cursor.pos()))
    }

    /// `${expr}` or `$${expr}`; `opener` is the length of the opening text.
    pub(super) fn interpolation(
        &mut self,
        kind: NodeKind,
        opener: usize,
    ) -> Result<NodeId, ParseError> {
        let start = self.cursor.pos();
        self.cursor.bump(opener);
        let value = self.basic()?;
        self.cursor.skip_ws();
        if !self.cursor.eat("}") {
            return Err(ParseError::new(
                "expected '}' to close the interpolation",
                self.cursor.point(),
            ));
        }
        Ok(self.finish(kind, start, self.cursor.pos(), vec![unlabeled(value)]))
    }
}

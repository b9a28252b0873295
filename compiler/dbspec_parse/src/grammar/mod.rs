//! Grammar productions.
//!
//! - `block`: indentation-delimited blocks and their item kinds
//! - `statement`: statements and the source file
//! - `expr`: expressions, strings and comparisons
//! - `raw`: verbatim blocks with interpolations
//! - `siard`: archive metadata declarations and commands

mod block;
mod expr;
mod raw;
mod siard;
mod statement;

use dbspec_ir::{NodeId, NodeKind};

use crate::cursor::span;
use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Require that nothing but whitespace remains on the line.
    fn expect_eol(&mut self) -> Result<(), ParseError> {
        self.cursor.skip_ws();
        if self.cursor.at_end() {
            Ok(())
        } else {
            Err(ParseError::new(
                format!("unexpected '{}'", self.cursor.rest().trim_end()),
                self.cursor.rest_span(),
            ))
        }
    }

    /// Require `:` followed by the end of the line.
    fn expect_block_colon(&mut self) -> Result<(), ParseError> {
        self.cursor.skip_ws();
        if !self.cursor.eat(":") {
            return Err(ParseError::new("expected ':'", self.cursor.point()));
        }
        self.expect_eol()
    }

    /// Require a whole-word keyword, allowing leading whitespace.
    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        self.cursor.skip_ws();
        if self.cursor.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(ParseError::new(
                format!("expected '{keyword}'"),
                self.cursor.point(),
            ))
        }
    }

    /// Parse an identifier leaf, allowing leading whitespace.
    fn identifier(&mut self, what: &str) -> Result<NodeId, ParseError> {
        self.cursor.skip_ws();
        match self.cursor.ident() {
            Some((start, end)) => Ok(self.leaf(NodeKind::Identifier, start, end)),
            None => Err(ParseError::new(
                format!("expected {what}"),
                self.cursor.point(),
            )),
        }
    }

    /// Parse an optional `"..."` short description; the node covers the
    /// text between the quotes.
    fn short_description(&mut self) -> Result<Option<NodeId>, ParseError> {
        self.cursor.skip_ws();
        if self.cursor.peek() != Some(b'"') {
            return Ok(None);
        }
        let open = self.cursor.pos();
        self.cursor.bump(1);
        let start = self.cursor.pos();
        let Some(len) = self.cursor.rest().find('"') else {
            return Err(ParseError::new(
                "unterminated description",
                span(open, self.cursor.limit()),
            ));
        };
        self.cursor.bump(len + 1);
        Ok(Some(self.leaf(NodeKind::ShortDescription, start, start + len)))
    }
}

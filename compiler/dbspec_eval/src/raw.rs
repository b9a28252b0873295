//! Rendering of raw blocks.
//!
//! A raw block is a sequence of literal pieces and `${...}` / `$${...}`
//! interpolations. The evaluator resolves each interpolation and feeds the
//! pieces to a [`RawRenderer`], whose [`RenderMode`] decides what the safe
//! form means:
//!
//! | mode      | `${v}`            | `$${v}`                              |
//! |-----------|-------------------|--------------------------------------|
//! | `Text`    | value as text     | error                                |
//! | `Sql`     | value as text     | `?` placeholder plus a bound argument |
//! | `Command` | value as text     | `${name}` for parameters, else text  |
//!
//! Line terminators at the end of a literal are held back and only written
//! once more output follows, so a block never ends with a newline.

use std::fmt;

use crate::errors::{
    interpolation_not_scalar, parameter_in_sql, safe_interpolation_not_allowed, EvalResult,
};
use crate::value::{SqlArg, Value};

/// What a raw block is rendered for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Scripts, log messages, property values and other plain text.
    Text,
    /// SQL sent to a connection, with bound arguments.
    Sql,
    /// The stored body of a command declaration.
    Command,
}

/// Output of a rendered raw block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Arguments for the `?` placeholders, in order. Empty outside SQL.
    pub args: Vec<SqlArg>,
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)?;
        if !self.args.is_empty() {
            let args: Vec<_> = self.args.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", args.join(", "))?;
        }
        Ok(())
    }
}

pub struct RawRenderer {
    mode: RenderMode,
    out: String,
    /// Line terminators waiting for further output.
    pending: String,
    args: Vec<SqlArg>,
}

impl RawRenderer {
    pub fn new(mode: RenderMode) -> Self {
        RawRenderer {
            mode,
            out: String::new(),
            pending: String::new(),
            args: Vec::new(),
        }
    }

    pub fn push_literal(&mut self, literal: &str) {
        let literal = literal.replace("\r\n", "\n");
        let content = literal.trim_end_matches('\n');
        self.emit(content);
        self.pending.push_str(&literal[content.len()..]);
    }

    /// Append an interpolated value; `safe` selects the `$${...}` form.
    pub fn push_value(&mut self, value: Value, safe: bool) -> EvalResult<()> {
        if safe && self.mode == RenderMode::Text {
            return Err(safe_interpolation_not_allowed());
        }
        match value {
            Value::Rows(_) | Value::Connection(_) => Err(interpolation_not_scalar(value.kind())),
            Value::ParameterRef(name) if safe && self.mode == RenderMode::Sql => {
                Err(parameter_in_sql(&name))
            }
            Value::ParameterRef(name) => {
                self.emit(&format!("${{{name}}}"));
                Ok(())
            }
            Value::Text(text) if safe && self.mode == RenderMode::Sql => {
                self.emit("?");
                self.args.push(SqlArg::Text(text));
                Ok(())
            }
            Value::Integer(n) if safe && self.mode == RenderMode::Sql => {
                self.emit("?");
                self.args.push(SqlArg::Integer(n));
                Ok(())
            }
            Value::Text(text) => {
                self.emit(&text);
                Ok(())
            }
            Value::Integer(n) => {
                self.emit(&n.to_string());
                Ok(())
            }
        }
    }

    fn emit(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.out.push_str(&self.pending);
        self.pending.clear();
        self.out.push_str(text);
    }

    /// Finish the block, dropping any held-back line terminators.
    pub fn finish(self) -> Rendered {
        Rendered {
            text: self.out,
            args: self.args,
        }
    }
}

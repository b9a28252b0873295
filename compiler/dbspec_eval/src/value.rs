//! Runtime values.
//!
//! The language has a closed set of value kinds and no implicit
//! conversions: every operation states which kinds it accepts and rejects
//! anything else with a semantic error naming both sides.

use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;

use crate::errors::{wrong_kind, EvalResult};
use crate::host::ConnectionHandle;
use crate::rows::RowsHandle;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Text(String),
    Integer(BigInt),
    Rows(RowsHandle),
    Connection(ConnectionHandle),
    /// A command parameter, substituted when the command is run later.
    ParameterRef(String),
}

/// The kind of a [`Value`], used in type errors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Integer,
    Rows,
    Connection,
    ParameterRef,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::Rows => "rows",
            ValueKind::Connection => "connection",
            ValueKind::ParameterRef => "parameter reference",
        }
    }

    /// Join kind names for messages: `text`, `text or integer`,
    /// `text, integer or rows`.
    pub fn describe(kinds: &[ValueKind]) -> String {
        match kinds {
            [] => "nothing".to_owned(),
            [only] => only.name().to_owned(),
            [init @ .., last] => {
                let init: Vec<_> = init.iter().map(|kind| kind.name()).collect();
                format!("{} or {}", init.join(", "), last.name())
            }
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    pub fn integer(n: impl Into<BigInt>) -> Self {
        Value::Integer(n.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Text(_) => ValueKind::Text,
            Value::Integer(_) => ValueKind::Integer,
            Value::Rows(_) => ValueKind::Rows,
            Value::Connection(_) => ValueKind::Connection,
            Value::ParameterRef(_) => ValueKind::ParameterRef,
        }
    }

    /// Pass the value through if its kind is in `allowed`.
    ///
    /// `what` names the value's role for the error message, e.g. `"The URL"`.
    pub fn accept(self, allowed: &[ValueKind], what: &str) -> EvalResult<Value> {
        if allowed.contains(&self.kind()) {
            Ok(self)
        } else {
            Err(wrong_kind(what, allowed, self.kind()))
        }
    }

    pub fn expect_text(self, what: &str) -> EvalResult<String> {
        match self {
            Value::Text(text) => Ok(text),
            other => Err(wrong_kind(what, &[ValueKind::Text], other.kind())),
        }
    }

    pub fn expect_integer(self, what: &str) -> EvalResult<BigInt> {
        match self {
            Value::Integer(n) => Ok(n),
            other => Err(wrong_kind(what, &[ValueKind::Integer], other.kind())),
        }
    }

    pub fn expect_rows(self, what: &str) -> EvalResult<RowsHandle> {
        match self {
            Value::Rows(rows) => Ok(rows),
            other => Err(wrong_kind(what, &[ValueKind::Rows], other.kind())),
        }
    }

    pub fn expect_connection(self, what: &str) -> EvalResult<ConnectionHandle> {
        match self {
            Value::Connection(connection) => Ok(connection),
            other => Err(wrong_kind(what, &[ValueKind::Connection], other.kind())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Rows(_) => f.write_str("<rows>"),
            Value::Connection(connection) => write!(f, "<connection {}>", connection.url()),
            Value::ParameterRef(name) => write!(f, "${{{name}}}"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => write!(f, "Text({text:?})"),
            Value::Integer(n) => write!(f, "Integer({n})"),
            Value::Rows(_) => f.write_str("Rows(..)"),
            Value::Connection(connection) => write!(f, "Connection({})", connection.url()),
            Value::ParameterRef(name) => write!(f, "ParameterRef({name})"),
        }
    }
}

/// Handles compare by identity; everything else by content.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) | (Value::ParameterRef(a), Value::ParameterRef(b)) => {
                a == b
            }
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Rows(a), Value::Rows(b)) => a.same_handle(b),
            (Value::Connection(a), Value::Connection(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// An argument bound to a `?` placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SqlArg {
    Text(String),
    Integer(BigInt),
}

impl fmt::Display for SqlArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlArg::Text(text) => write!(f, "{text:?}"),
            SqlArg::Integer(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests;

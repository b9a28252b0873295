//! Expressions, strings, comparisons and raw blocks.

use dbspec_ir::{Field, Node, NodeKind};
use num_bigint::BigInt;
use tracing::debug;

use super::{field, identifier, Interpreter};
use crate::environment::Context;
use crate::errors::{
    cannot_compare, interpolation_not_scalar, invalid_literal, not_an_integer,
    operator_not_supported, sql_error, undefined_variable, unexpected_node, unknown_operation,
    EvalResult,
};
use crate::host::Properties;
use crate::raw::{RawRenderer, RenderMode, Rendered};
use crate::rows::{rows_equal, Rows, RowsHandle};
use crate::timing::TimingCategory;
use crate::value::{Value, ValueKind};

impl<'a> Interpreter<'a> {
    /// Right-hand side of `Set`: a connection, query, script result or
    /// basic expression.
    pub(super) fn eval_expression(&mut self, node: Node<'a>, ctx: &Context<'_>) -> EvalResult {
        match node.kind() {
            NodeKind::Connection => self.eval_connection(node, ctx),
            NodeKind::Query => self.eval_query(node, ctx),
            NodeKind::ScriptResult => {
                let output = self.run_script(node, ctx)?;
                Ok(Value::Text(strip_final_newline(output)))
            }
            _ => self.eval_basic(node, ctx),
        }
    }

    /// Strings, integers, variables and dot expressions.
    pub(super) fn eval_basic(&self, node: Node<'a>, ctx: &Context<'_>) -> EvalResult {
        let result = match node.kind() {
            NodeKind::String => self.eval_string(node, ctx).map(Value::Text),
            NodeKind::Integer => node
                .text()
                .parse::<BigInt>()
                .map(Value::Integer)
                .map_err(|_| invalid_literal("integer", node.text())),
            NodeKind::VariableInstance => {
                let name_node = node
                    .child(0)
                    .ok_or_else(|| unexpected_node(node.kind(), "an empty variable"))?;
                let name = identifier(name_node)?;
                ctx.resolve(name).ok_or_else(|| undefined_variable(name))
            }
            NodeKind::DotExpression => self.eval_dot(node, ctx),
            other => Err(unexpected_node(other, "a basic expression")),
        };
        result.map_err(|error| error.or_span(node.span()))
    }

    fn eval_string(&self, node: Node<'a>, ctx: &Context<'_>) -> EvalResult<String> {
        let mut out = String::new();
        for part in node.children() {
            match part.kind() {
                NodeKind::StringContent => out.push_str(part.text()),
                NodeKind::EscapeSequence => out.push(
                    decode_escape(part.text())
                        .ok_or_else(|| invalid_literal("escape sequence", part.text()))?,
                ),
                NodeKind::Interpolation => {
                    let value = self.eval_interpolated(part, ctx)?;
                    match value {
                        Value::Text(text) => out.push_str(&text),
                        Value::Integer(_) | Value::ParameterRef(_) => {
                            out.push_str(&value.to_string());
                        }
                        other => {
                            return Err(interpolation_not_scalar(other.kind()).with_span(part.span()))
                        }
                    }
                }
                other => return Err(unexpected_node(other, "a string")),
            }
        }
        Ok(out)
    }

    /// The value inside `${...}` or `$${...}`.
    fn eval_interpolated(&self, node: Node<'a>, ctx: &Context<'_>) -> EvalResult {
        let inner = node
            .child(0)
            .ok_or_else(|| unexpected_node(node.kind(), "an empty interpolation"))?;
        self.eval_basic(inner, ctx)
    }

    fn eval_dot(&self, node: Node<'a>, ctx: &Context<'_>) -> EvalResult {
        let left = self.eval_basic(field(node, Field::Left)?, ctx)?;
        let operation = identifier(field(node, Field::Right)?)?;
        debug!(operation, receiver = %left.kind(), "dot expression");
        match (left, operation) {
            (Value::Text(text), "stripped") => Ok(Value::Text(text.trim().to_owned())),
            (Value::Text(text), "as_integer") => text
                .parse::<BigInt>()
                .map(Value::Integer)
                .map_err(|_| not_an_integer(&text)),
            (Value::Text(text), "as_rows") => Ok(Value::Rows(RowsHandle::new(Rows::from_text(&text)))),
            (Value::Integer(n), "as_text") => Ok(Value::Text(n.to_string())),
            (Value::Rows(rows), "size") => Ok(Value::Integer(rows.size()?.into())),
            (value, operation) => Err(unknown_operation(operation, value.kind())),
        }
    }

    /// `left op right` for integers (all operators), text and rows
    /// (equality only).
    pub(super) fn eval_comparison(&self, node: Node<'a>, ctx: &Context<'_>) -> EvalResult<bool> {
        let left = self.eval_basic(field(node, Field::Left)?, ctx)?;
        let operator = field(node, Field::Operator)?.text();
        let right = self.eval_basic(field(node, Field::Right)?, ctx)?;
        let equal = match (&left, &right) {
            (Value::Integer(a), Value::Integer(b)) => {
                return match operator {
                    "==" => Ok(a == b),
                    "!=" => Ok(a != b),
                    "<" => Ok(a < b),
                    ">" => Ok(a > b),
                    "<=" => Ok(a <= b),
                    ">=" => Ok(a >= b),
                    other => Err(invalid_literal("comparison operator", other)),
                };
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Rows(a), Value::Rows(b)) => {
                if !matches!(operator, "==" | "!=") {
                    return Err(operator_not_supported(operator, ValueKind::Rows));
                }
                rows_equal(a, b)?
            }
            _ => return Err(cannot_compare(left.kind(), right.kind())),
        };
        match operator {
            "==" => Ok(equal),
            "!=" => Ok(!equal),
            other => Err(operator_not_supported(other, left.kind())),
        }
    }

    fn eval_connection(&mut self, node: Node<'a>, ctx: &Context<'_>) -> EvalResult {
        let url_node = field(node, Field::Url)?;
        let url = self
            .eval_basic(url_node, ctx)?
            .expect_text("The URL")
            .map_err(|error| error.or_span(url_node.span()))?;

        // Properties live in their own scope; they never see or shadow
        // script variables.
        let mut properties = Context::root();
        if let Some(pairs) = node.field(Field::Properties) {
            for pair in pairs.children() {
                let key = identifier(field(pair, Field::Key)?)?;
                let value_node = field(pair, Field::Value)?;
                let value = self
                    .eval_text(value_node, ctx, &format!("The property '{key}'"))
                    .map_err(|error| error.or_span(pair.span()))?;
                properties.bind(key, Value::Text(value))?;
            }
        }
        let properties: Properties = properties
            .local_bindings()
            .map(|(key, value)| (key.to_owned(), value.to_string()))
            .collect();

        debug!(url, properties = properties.len(), "connecting");
        let connection = self.host.dbms.connect(&url, &properties).map_err(sql_error)?;
        Ok(Value::Connection(connection))
    }

    fn eval_query(&mut self, node: Node<'a>, ctx: &Context<'_>) -> EvalResult {
        let connection = self.connection_variable(node, ctx)?;
        let sql = self.eval_raw(field(node, Field::Sql)?, ctx, RenderMode::Sql)?;
        debug!(url = connection.url(), sql = %sql, "running query");
        let cursor = self
            .timings
            .time(TimingCategory::Sql, || {
                connection.execute_query(&sql.text, &sql.args)
            })
            .map_err(sql_error)?;
        Ok(Value::Rows(RowsHandle::new(Rows::live(cursor))))
    }

    /// A text-valued slot: a raw block rendered as text, or a basic
    /// expression that must produce text.
    pub(super) fn eval_text(&self, node: Node<'a>, ctx: &Context<'_>, what: &str) -> EvalResult<String> {
        if node.kind() == NodeKind::Raw {
            return Ok(self.eval_raw(node, ctx, RenderMode::Text)?.text);
        }
        self.eval_basic(node, ctx)?
            .expect_text(what)
            .map_err(|error| error.or_span(node.span()))
    }

    pub(super) fn eval_raw(
        &self,
        node: Node<'a>,
        ctx: &Context<'_>,
        mode: RenderMode,
    ) -> EvalResult<Rendered> {
        if node.kind() != NodeKind::Raw {
            return Err(unexpected_node(node.kind(), "place of a raw block").with_span(node.span()));
        }
        let mut renderer = RawRenderer::new(mode);
        for part in node.children() {
            let safe = match part.kind() {
                NodeKind::RawContent => {
                    renderer.push_literal(part.text());
                    continue;
                }
                NodeKind::Interpolation => false,
                NodeKind::SafeInterpolation => true,
                other => return Err(unexpected_node(other, "a raw block").with_span(part.span())),
            };
            let value = self.eval_interpolated(part, ctx)?;
            renderer
                .push_value(value, safe)
                .map_err(|error| error.with_span(part.span()))?;
        }
        Ok(renderer.finish())
    }
}

/// Decode one escape sequence such as `\n` or `\u{1F600}`.
fn decode_escape(escape: &str) -> Option<char> {
    let body = escape.strip_prefix('\\')?;
    if let Some(hex) = body.strip_prefix("u{").and_then(|rest| rest.strip_suffix('}')) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    match body {
        "n" => Some('\n'),
        "t" => Some('\t'),
        "r" => Some('\r'),
        "b" => Some('\u{8}'),
        "f" => Some('\u{c}'),
        "0" => Some('\0'),
        "\\" => Some('\\'),
        "\"" => Some('"'),
        "'" => Some('\''),
        "$" => Some('$'),
        _ => None,
    }
}

/// Drop at most one final line terminator from script output.
fn strip_final_newline(mut output: String) -> String {
    if output.ends_with("\r\n") {
        output.truncate(output.len() - 2);
    } else if output.ends_with('\n') {
        output.truncate(output.len() - 1);
    }
    output
}

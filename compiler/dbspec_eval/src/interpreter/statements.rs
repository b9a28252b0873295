//! Statements.

use dbspec_ir::{Field, Node, NodeKind};
use dbspec_stack::ensure_sufficient_stack;
use tracing::debug;

use super::{field, identifier, Interpreter};
use crate::environment::Context;
use crate::errors::{
    assertion_failed, script_error, sql_error, undefined_variable, unexpected_node, EvalResult,
};
use crate::host::ConnectionHandle;
use crate::metadata::{CommandKind, MdNode};
use crate::raw::RenderMode;
use crate::timing::TimingCategory;
use crate::value::{Value, ValueKind};

impl<'a> Interpreter<'a> {
    /// Evaluate every statement of a block in order.
    pub(super) fn eval_block(&mut self, block: Node<'a>, ctx: &mut Context<'_>) -> EvalResult<()> {
        ensure_sufficient_stack(|| {
            for statement in block.children() {
                self.eval_statement(statement, ctx)?;
            }
            Ok(())
        })
    }

    fn eval_statement(&mut self, node: Node<'a>, ctx: &mut Context<'_>) -> EvalResult<()> {
        debug!(kind = %node.kind(), span = %node.span(), "statement");
        let result = match node.kind() {
            NodeKind::Nop => Ok(()),
            NodeKind::Parameters => self.eval_parameters(node, ctx, None),
            NodeKind::Set => self.eval_set(node, ctx),
            NodeKind::ExecuteUsing => self.eval_execute_using(node, ctx),
            NodeKind::ExecuteSql => self.eval_execute_sql(node, ctx),
            NodeKind::SiardMetadata => self.eval_siard_metadata(node, ctx),
            NodeKind::SiardOutput => self.eval_siard_output(node, ctx),
            NodeKind::ForLoop => self.eval_for(node, ctx),
            NodeKind::Log => self.eval_log(node, ctx),
            NodeKind::Assert => self.eval_assert(node, ctx),
            NodeKind::Conditional => self.eval_conditional(node, ctx),
            other => Err(unexpected_node(other, "a statement block")),
        };
        result.map_err(|error| error.or_span(node.span()))
    }

    /// Bind each declared parameter to its configured default, or unbind it
    /// when there is none. Inside a command each parameter is also recorded.
    pub(super) fn eval_parameters(
        &mut self,
        node: Node<'a>,
        ctx: &mut Context<'_>,
        mut command: Option<&mut MdNode<CommandKind>>,
    ) -> EvalResult<()> {
        for parameter in node.children() {
            if parameter.kind() != NodeKind::Parameter {
                return Err(unexpected_node(parameter.kind(), "a parameter list")
                    .with_span(parameter.span()));
            }
            let name = identifier(field(parameter, Field::Name)?)?;
            let description = parameter
                .field(Field::Description)
                .map_or("", |description| description.text());
            match self.parameters.get(name) {
                Some(default) => ctx.bind(name, Value::text(default.clone()))?,
                None => ctx.unbind(name)?,
            }
            debug!(name, description, "parameter");
            if let Some(command) = command.as_deref_mut() {
                command.push(MdNode::new(CommandKind::Parameter, name, description));
            }
        }
        Ok(())
    }

    fn eval_set(&mut self, node: Node<'a>, ctx: &mut Context<'_>) -> EvalResult<()> {
        let name = identifier(field(node, Field::Name)?)?;
        let value_node = field(node, Field::Value)?;
        let value = if value_node.kind() == NodeKind::Raw {
            Value::Text(self.eval_raw(value_node, ctx, RenderMode::Text)?.text)
        } else {
            self.eval_expression(value_node, ctx)?
        };
        debug!(name, value = %value, "set");
        ctx.bind(name, value)?;
        Ok(())
    }

    fn eval_execute_using(&mut self, node: Node<'a>, ctx: &mut Context<'_>) -> EvalResult<()> {
        let output = self.run_script(node, ctx)?;
        debug!(output_len = output.len(), "script finished");
        Ok(())
    }

    /// Run the `interpreter`/`script` pair of `node` and return its output.
    pub(super) fn run_script(&mut self, node: Node<'a>, ctx: &Context<'_>) -> EvalResult<String> {
        let interpreter_node = field(node, Field::Interpreter)?;
        let interpreter = self
            .eval_basic(interpreter_node, ctx)?
            .expect_text("The interpreter")
            .map_err(|error| error.or_span(interpreter_node.span()))?;
        let script = self.eval_raw(field(node, Field::Script)?, ctx, RenderMode::Text)?;
        debug!(interpreter = %interpreter, script = %script.text, "running script");
        let scripts = self.host.scripts;
        let dir = &self.dir;
        self.timings
            .time(TimingCategory::Shell, || {
                scripts.run(&interpreter, &script.text, dir)
            })
            .map_err(script_error)
    }

    fn eval_execute_sql(&mut self, node: Node<'a>, ctx: &mut Context<'_>) -> EvalResult<()> {
        let connection = self.connection_variable(node, ctx)?;
        let sql = self.eval_raw(field(node, Field::Sql)?, ctx, RenderMode::Sql)?;
        debug!(url = connection.url(), sql = %sql, "executing SQL");
        let updated = self
            .timings
            .time(TimingCategory::Sql, || {
                connection.execute_update(&sql.text, &sql.args)
            })
            .map_err(sql_error)?;
        debug!(updated, "SQL executed");
        Ok(())
    }

    /// The connection named by the `connection` field of `node`.
    pub(super) fn connection_variable(
        &self,
        node: Node<'a>,
        ctx: &Context<'_>,
    ) -> EvalResult<ConnectionHandle> {
        let name_node = field(node, Field::Connection)?;
        let name = identifier(name_node)?;
        ctx.resolve(name)
            .ok_or_else(|| undefined_variable(name))?
            .expect_connection(&format!("The variable '{name}'"))
            .map_err(|error| error.with_span(name_node.span()))
    }

    fn eval_for(&mut self, node: Node<'a>, ctx: &mut Context<'_>) -> EvalResult<()> {
        let variables = field(node, Field::Variables)?
            .children()
            .map(identifier)
            .collect::<EvalResult<Vec<_>>>()?;
        let rows_node = field(node, Field::Rows)?;
        let rows = self
            .eval_basic(rows_node, ctx)?
            .expect_rows("The loop source")
            .map_err(|error| error.or_span(rows_node.span()))?;
        let body = field(node, Field::Body)?;
        debug!(?variables, "for loop");

        let mut traversal = rows.traverse()?;
        while let Some(row) = traversal.next_row()? {
            for (index, name) in variables.iter().enumerate() {
                match row.get(index).cloned().flatten() {
                    Some(cell) => ctx.bind(*name, Value::Text(cell))?,
                    None => ctx.unbind(name)?,
                }
            }
            self.eval_block(body, ctx)?;
        }
        Ok(())
    }

    fn eval_conditional(&mut self, node: Node<'a>, ctx: &mut Context<'_>) -> EvalResult<()> {
        let holds = self.eval_comparison(field(node, Field::Condition)?, ctx)?;
        debug!(holds, "conditional");
        if holds {
            self.eval_block(field(node, Field::Then)?, ctx)
        } else if let Some(otherwise) = node.field(Field::Else) {
            self.eval_block(otherwise, ctx)
        } else {
            Ok(())
        }
    }

    fn eval_assert(&mut self, node: Node<'a>, ctx: &mut Context<'_>) -> EvalResult<()> {
        let holds = self.eval_comparison(field(node, Field::Condition)?, ctx)?;
        debug!(holds, "assertion");
        if holds {
            Ok(())
        } else {
            Err(assertion_failed().with_span(node.span()))
        }
    }

    fn eval_log(&mut self, node: Node<'a>, ctx: &mut Context<'_>) -> EvalResult<()> {
        let value_node = field(node, Field::Value)?;
        let message = if value_node.kind() == NodeKind::Raw {
            self.eval_raw(value_node, ctx, RenderMode::Text)?.text
        } else {
            self.eval_basic(value_node, ctx)?
                .accept(&[ValueKind::Text, ValueKind::Integer], "A log message")
                .map_err(|error| error.or_span(value_node.span()))?
                .to_string()
        };
        self.print_handler.println(&message);
        Ok(())
    }
}

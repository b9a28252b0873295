//! Archive metadata, command declarations and archive output.

use dbspec_ir::{Field, Node, NodeKind};
use dbspec_stack::ensure_sufficient_stack;
use tracing::{debug, info, warn};

use super::{field, identifier, Interpreter};
use crate::environment::Context;
use crate::errors::{archive_error, unexpected_node, EvalError, EvalResult};
use crate::metadata::{ArchiveKind, CommandKind, MdNode};
use crate::raw::RenderMode;
use crate::timing::TimingCategory;

/// Archive node kind declared by a syntax node, if it is a declaration.
fn declaration_kind(kind: NodeKind) -> Option<ArchiveKind> {
    Some(match kind {
        NodeKind::SiardSchema => ArchiveKind::Schema,
        NodeKind::SiardType => ArchiveKind::Type,
        NodeKind::SiardTable => ArchiveKind::Table,
        NodeKind::SiardColumn => ArchiveKind::Column,
        NodeKind::SiardField => ArchiveKind::Field,
        NodeKind::SiardKey => ArchiveKind::Key,
        NodeKind::SiardCheck => ArchiveKind::Check,
        NodeKind::SiardView => ArchiveKind::View,
        _ => return None,
    })
}

impl<'a> Interpreter<'a> {
    /// `SIARD metadata for <conn>:`
    pub(super) fn eval_siard_metadata(
        &mut self,
        node: Node<'a>,
        ctx: &mut Context<'_>,
    ) -> EvalResult<()> {
        let connection = identifier(field(node, Field::Connection)?)?;
        debug!(connection, "SIARD metadata");
        self.metadata.touch(connection);

        for info in Field::ARCHIVE_INFO {
            let Some(value_node) = node.field(info) else {
                continue;
            };
            let value = self.eval_text(value_node, ctx, &format!("The {info} field"))?;
            debug!(field = info.as_str(), value, "archive info");
            self.metadata
                .declare(connection, MdNode::new(ArchiveKind::Info, info.as_str(), value));
        }

        for child in node.children() {
            match child.kind() {
                NodeKind::SiardSchema => {
                    let schema = self.eval_declaration(child, ctx)?;
                    self.metadata.declare(connection, schema);
                }
                NodeKind::CommandDeclaration => {
                    let command = self.eval_command(child, ctx)?;
                    self.metadata.declare_command(connection, command);
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// A schema, table, column or other declaration with its nested
    /// declarations.
    fn eval_declaration(
        &self,
        node: Node<'a>,
        ctx: &Context<'_>,
    ) -> EvalResult<MdNode<ArchiveKind>> {
        let Some(kind) = declaration_kind(node.kind()) else {
            return Err(unexpected_node(node.kind(), "archive metadata").with_span(node.span()));
        };
        let name = identifier(field(node, Field::Name)?)?;
        let description = match node.field(Field::Description) {
            Some(short) if short.kind() == NodeKind::ShortDescription => short.text().to_owned(),
            Some(value) => self.eval_text(value, ctx, "A description")?,
            None => String::new(),
        };
        debug!(%kind, name, description, "declaration");
        let mut declaration = MdNode::new(kind, name, description);
        ensure_sufficient_stack(|| {
            for child in node.children() {
                if declaration_kind(child.kind()).is_some() {
                    declaration.push(self.eval_declaration(child, ctx)?);
                }
            }
            Ok(())
        })
        .map_err(|error: EvalError| error.or_span(node.span()))?;
        Ok(declaration)
    }

    /// `Command <title>:` with parameters and an SQL body.
    ///
    /// Parameters are bound like top-level parameters. The body is rendered
    /// in a command scope so each parameter stays a `${name}` placeholder.
    fn eval_command(
        &mut self,
        node: Node<'a>,
        ctx: &mut Context<'_>,
    ) -> EvalResult<MdNode<CommandKind>> {
        let title = self.eval_text(field(node, Field::Title)?, ctx, "The command title")?;
        debug!(title, "command declaration");
        let mut command = MdNode::new(CommandKind::Command, "", title);
        if let Some(parameters) = node.field(Field::Parameters) {
            self.eval_parameters(parameters, ctx, Some(&mut command))?;
        }
        let names: Vec<String> = command
            .children_of(CommandKind::Parameter)
            .map(|parameter| parameter.name.clone())
            .collect();

        let scope = Context::command(&*ctx, names);
        let body = self.eval_raw(field(node, Field::Body)?, &scope, RenderMode::Command)?;
        debug!(sql = %body.text, "command body");
        command.push(MdNode::new(CommandKind::Sql, "", body.text));
        Ok(command)
    }

    /// `SIARD output <conn> to <file>`: extract the archive, adjust its
    /// metadata and write or remove the command report next to it.
    pub(super) fn eval_siard_output(
        &mut self,
        node: Node<'a>,
        ctx: &mut Context<'_>,
    ) -> EvalResult<()> {
        let connection_name = identifier(field(node, Field::Connection)?)?;
        let connection = self.connection_variable(node, ctx)?;
        let file = self.eval_text(field(node, Field::File)?, ctx, "The file name")?;
        let path = self.dir.join(&file);
        let report = path.with_extension("roae");
        debug!(connection = connection_name, path = %path.display(), "SIARD output");

        let extractor = self.host.extractor;
        self.timings
            .time(TimingCategory::Siard, || extractor.extract(&connection, &path))
            .map_err(archive_error)?;

        match self.metadata.archive(connection_name) {
            Some(metadata) => {
                debug!(metadata = %metadata, "adjusting archive metadata");
                self.host
                    .adjuster
                    .adjust(&path, metadata, &connection)
                    .map_err(archive_error)?;
            }
            None => warn!(connection = connection_name, "no SIARD metadata declared"),
        }

        let commands = self.metadata.commands(connection_name);
        if commands.is_empty() {
            let removed = self.host.reports.remove(&report).map_err(archive_error)?;
            info!(
                report = %report.display(),
                removed,
                "no commands declared; no report written"
            );
        } else {
            debug!(report = %report.display(), commands = commands.len(), "writing report");
            self.host
                .reports
                .generate(&report, commands)
                .map_err(archive_error)?;
        }
        Ok(())
    }
}

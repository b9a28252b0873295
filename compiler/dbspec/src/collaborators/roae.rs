//! ROAE command reports.
//!
//! One block per declared command: the title line, a `name - description`
//! line per parameter, then the SQL text.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

use dbspec_eval::{CommandKind, HostError, MdNode, ReportProducer};
use tracing::debug;

#[derive(Debug, Default)]
pub struct RoaeWriter;

impl RoaeWriter {
    pub fn new() -> Self {
        RoaeWriter
    }
}

/// Report text for `commands`.
pub fn render_report(commands: &[MdNode<CommandKind>]) -> String {
    let mut out = String::new();
    for command in commands {
        let _ = writeln!(out, "{}", command.data);
        for parameter in command.children_of(CommandKind::Parameter) {
            let _ = writeln!(out, "{} - {}", parameter.name, parameter.data);
        }
        for sql in command.children_of(CommandKind::Sql) {
            let _ = writeln!(out, "{}", sql.data);
        }
    }
    out
}

fn io_failure(what: &str, path: &Path, error: &io::Error) -> HostError {
    HostError::new(format!("Cannot {what} {}: {error}", path.display()))
}

impl ReportProducer for RoaeWriter {
    fn generate(&self, path: &Path, commands: &[MdNode<CommandKind>]) -> Result<(), HostError> {
        debug!(path = %path.display(), commands = commands.len(), "writing report");
        std::fs::write(path, render_report(commands))
            .map_err(|error| io_failure("write", path, &error))
    }

    fn remove(&self, path: &Path) -> Result<bool, HostError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(io_failure("delete", path, &error)),
        }
    }
}

#[cfg(test)]
mod tests;

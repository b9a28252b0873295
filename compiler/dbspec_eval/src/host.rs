//! Collaborator interfaces.
//!
//! The evaluator reaches databases, subprocesses, archive tools and report
//! files only through these traits. The driver crate supplies the real
//! implementations; [`crate::testing`] supplies recording fakes.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use crate::metadata::{ArchiveKind, CommandKind, MdNode};
use crate::rows::QueryCursor;
use crate::value::SqlArg;

/// Failure reported by a collaborator.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
    /// Exit status of a failed subprocess, if one was run.
    pub exit_status: Option<i32>,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        HostError {
            message: message.into(),
            exit_status: None,
        }
    }

    #[must_use]
    pub fn with_exit_status(mut self, status: i32) -> Self {
        self.exit_status = Some(status);
        self
    }
}

/// Connection properties (`user`, `password`, driver options).
pub type Properties = BTreeMap<String, String>;

/// Shared handle to an open database connection.
pub type ConnectionHandle = Rc<dyn DbConnection>;

/// Opens database connections.
pub trait Dbms {
    fn connect(&self, url: &str, properties: &Properties) -> Result<ConnectionHandle, HostError>;
}

/// An open database connection.
pub trait DbConnection {
    fn url(&self) -> &str;

    fn properties(&self) -> &Properties;

    /// Run a statement, returning the number of affected rows.
    fn execute_update(&self, sql: &str, args: &[SqlArg]) -> Result<u64, HostError>;

    /// Run a query and return a scrollable cursor over its result.
    fn execute_query(&self, sql: &str, args: &[SqlArg]) -> Result<Box<dyn QueryCursor>, HostError>;
}

impl fmt::Debug for dyn DbConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<connection {}>", self.url())
    }
}

/// Runs a script with an external interpreter.
pub trait ScriptRunner {
    /// Run `script` with `interpreter` in `dir` and return its standard
    /// output.
    fn run(&self, interpreter: &str, script: &str, dir: &Path) -> Result<String, HostError>;
}

/// Extracts a database into an archive file.
pub trait SiardExtractor {
    fn extract(&self, connection: &ConnectionHandle, path: &Path) -> Result<(), HostError>;
}

/// Rewrites the metadata inside an extracted archive.
pub trait MetadataAdjuster {
    fn adjust(
        &self,
        path: &Path,
        metadata: &MdNode<ArchiveKind>,
        connection: &ConnectionHandle,
    ) -> Result<(), HostError>;
}

/// Writes the command report that accompanies an archive.
pub trait ReportProducer {
    fn generate(&self, path: &Path, commands: &[MdNode<CommandKind>]) -> Result<(), HostError>;

    /// Delete a stale report; returns whether a file was removed.
    fn remove(&self, path: &Path) -> Result<bool, HostError>;
}

/// The collaborators one run talks to.
#[derive(Copy, Clone)]
pub struct Host<'a> {
    pub dbms: &'a dyn Dbms,
    pub scripts: &'a dyn ScriptRunner,
    pub extractor: &'a dyn SiardExtractor,
    pub adjuster: &'a dyn MetadataAdjuster,
    pub reports: &'a dyn ReportProducer,
}

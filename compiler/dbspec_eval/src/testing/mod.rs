//! In-memory collaborators for exercising the interpreter.
//!
//! [`TestHost`] bundles a fake database, a script runner with canned output
//! and an archive fake that records what it was asked to do. Every fake
//! remembers its calls so tests can assert on the exact SQL, arguments and
//! files involved.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::host::{
    ConnectionHandle, DbConnection, Dbms, Host, HostError, MetadataAdjuster, Properties,
    ReportProducer, ScriptRunner, SiardExtractor,
};
use crate::metadata::{ArchiveKind, CommandKind, MdNode};
use crate::rows::{QueryCursor, Row, VecCursor};
use crate::value::SqlArg;

/// A statement the fake database received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Executed {
    pub url: String,
    pub sql: String,
    pub args: Vec<SqlArg>,
    /// `true` for queries, `false` for updates.
    pub query: bool,
}

#[derive(Default)]
struct MockState {
    /// Canned query results keyed by trimmed SQL text.
    results: RefCell<FxHashMap<String, (usize, Vec<Row>)>>,
    /// Statements that fail, keyed by trimmed SQL text.
    failures: RefCell<FxHashMap<String, String>>,
    executed: RefCell<Vec<Executed>>,
    connections: RefCell<Vec<(String, Properties)>>,
    refuse: Cell<bool>,
}

impl MockState {
    fn record(&self, url: &str, sql: &str, args: &[SqlArg], query: bool) -> Result<(), HostError> {
        self.executed.borrow_mut().push(Executed {
            url: url.to_owned(),
            sql: sql.to_owned(),
            args: args.to_vec(),
            query,
        });
        match self.failures.borrow().get(sql.trim()) {
            Some(message) => Err(HostError::new(message.clone())),
            None => Ok(()),
        }
    }
}

/// Fake database: accepts every URL and answers queries from canned
/// results. Unknown queries return an empty single-column result.
#[derive(Clone, Default)]
pub struct MockDbms {
    state: Rc<MockState>,
}

impl MockDbms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `sql` with `rows` of `columns` cells each.
    #[must_use]
    pub fn with_result(self, sql: &str, columns: usize, rows: Vec<Row>) -> Self {
        self.state
            .results
            .borrow_mut()
            .insert(sql.trim().to_owned(), (columns, rows));
        self
    }

    /// Answer `sql` with non-null text cells.
    #[must_use]
    pub fn with_rows(self, sql: &str, rows: &[&[&str]]) -> Self {
        let columns = rows.iter().map(|row| row.len()).max().unwrap_or(1);
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| Some((*cell).to_owned())).collect())
            .collect();
        self.with_result(sql, columns, rows)
    }

    /// Fail `sql` with `message`.
    #[must_use]
    pub fn with_failure(self, sql: &str, message: &str) -> Self {
        self.state
            .failures
            .borrow_mut()
            .insert(sql.trim().to_owned(), message.to_owned());
        self
    }

    /// Make every `connect` fail.
    #[must_use]
    pub fn refuse_connections(self) -> Self {
        self.state.refuse.set(true);
        self
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.state.executed.borrow().clone()
    }

    /// URLs and properties of every connection opened so far.
    pub fn connections(&self) -> Vec<(String, Properties)> {
        self.state.connections.borrow().clone()
    }
}

impl Dbms for MockDbms {
    fn connect(&self, url: &str, properties: &Properties) -> Result<ConnectionHandle, HostError> {
        if self.state.refuse.get() {
            return Err(HostError::new(format!("cannot connect to {url}")));
        }
        self.state
            .connections
            .borrow_mut()
            .push((url.to_owned(), properties.clone()));
        Ok(Rc::new(MockConnection {
            url: url.to_owned(),
            properties: properties.clone(),
            state: Rc::clone(&self.state),
        }))
    }
}

struct MockConnection {
    url: String,
    properties: Properties,
    state: Rc<MockState>,
}

impl DbConnection for MockConnection {
    fn url(&self) -> &str {
        &self.url
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn execute_update(&self, sql: &str, args: &[SqlArg]) -> Result<u64, HostError> {
        self.state.record(&self.url, sql, args, false)?;
        Ok(0)
    }

    fn execute_query(&self, sql: &str, args: &[SqlArg]) -> Result<Box<dyn QueryCursor>, HostError> {
        self.state.record(&self.url, sql, args, true)?;
        let (columns, rows) = self
            .state
            .results
            .borrow()
            .get(sql.trim())
            .cloned()
            .unwrap_or((1, Vec::new()));
        Ok(Box::new(VecCursor::new(columns, rows)))
    }
}

/// A script the fake runner was asked to run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptCall {
    pub interpreter: String,
    pub script: String,
    pub dir: PathBuf,
}

/// Script runner answering from canned output keyed by trimmed script
/// text. Unknown scripts produce no output.
#[derive(Default)]
pub struct RecordingScriptRunner {
    outputs: FxHashMap<String, Result<String, HostError>>,
    calls: RefCell<Vec<ScriptCall>>,
}

impl RecordingScriptRunner {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_output(mut self, script: &str, output: &str) -> Self {
        self.outputs
            .insert(script.trim().to_owned(), Ok(output.to_owned()));
        self
    }

    /// Fail `script` as if it exited with `status`.
    #[must_use]
    pub fn with_failure(mut self, script: &str, status: i32, stderr: &str) -> Self {
        let error = HostError::new(format!("Exit value: {status}\n{stderr}").trim().to_owned())
            .with_exit_status(status);
        self.outputs.insert(script.trim().to_owned(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<ScriptCall> {
        self.calls.borrow().clone()
    }
}

impl ScriptRunner for RecordingScriptRunner {
    fn run(&self, interpreter: &str, script: &str, dir: &Path) -> Result<String, HostError> {
        self.calls.borrow_mut().push(ScriptCall {
            interpreter: interpreter.to_owned(),
            script: script.to_owned(),
            dir: dir.to_path_buf(),
        });
        self.outputs
            .get(script.trim())
            .cloned()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

/// What the archive fake was asked to do, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArchiveEvent {
    Extract { url: String, path: PathBuf },
    /// The metadata tree in its printed form.
    Adjust { path: PathBuf, metadata: String },
    Generate {
        path: PathBuf,
        commands: Vec<MdNode<CommandKind>>,
    },
    Remove { path: PathBuf, removed: bool },
}

/// Extractor, metadata adjuster and report producer in one, recording
/// every call. Reports "exist" once generated or when seeded with
/// [`RecordingArchive::with_existing_report`].
#[derive(Default)]
pub struct RecordingArchive {
    events: RefCell<Vec<ArchiveEvent>>,
    reports: RefCell<FxHashSet<PathBuf>>,
    extract_failure: Option<String>,
}

impl RecordingArchive {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_existing_report(self, path: impl Into<PathBuf>) -> Self {
        self.reports.borrow_mut().insert(path.into());
        self
    }

    #[must_use]
    pub fn with_extract_failure(mut self, message: &str) -> Self {
        self.extract_failure = Some(message.to_owned());
        self
    }

    pub fn events(&self) -> Vec<ArchiveEvent> {
        self.events.borrow().clone()
    }

    pub fn report_exists(&self, path: &Path) -> bool {
        self.reports.borrow().contains(path)
    }
}

impl SiardExtractor for RecordingArchive {
    fn extract(&self, connection: &ConnectionHandle, path: &Path) -> Result<(), HostError> {
        if let Some(message) = &self.extract_failure {
            return Err(HostError::new(message.clone()).with_exit_status(1));
        }
        self.events.borrow_mut().push(ArchiveEvent::Extract {
            url: connection.url().to_owned(),
            path: path.to_path_buf(),
        });
        Ok(())
    }
}

impl MetadataAdjuster for RecordingArchive {
    fn adjust(
        &self,
        path: &Path,
        metadata: &MdNode<ArchiveKind>,
        _connection: &ConnectionHandle,
    ) -> Result<(), HostError> {
        self.events.borrow_mut().push(ArchiveEvent::Adjust {
            path: path.to_path_buf(),
            metadata: metadata.to_string(),
        });
        Ok(())
    }
}

impl ReportProducer for RecordingArchive {
    fn generate(&self, path: &Path, commands: &[MdNode<CommandKind>]) -> Result<(), HostError> {
        self.reports.borrow_mut().insert(path.to_path_buf());
        self.events.borrow_mut().push(ArchiveEvent::Generate {
            path: path.to_path_buf(),
            commands: commands.to_vec(),
        });
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<bool, HostError> {
        let removed = self.reports.borrow_mut().remove(path);
        self.events.borrow_mut().push(ArchiveEvent::Remove {
            path: path.to_path_buf(),
            removed,
        });
        Ok(removed)
    }
}

/// All fakes together.
#[derive(Default)]
pub struct TestHost {
    pub dbms: MockDbms,
    pub scripts: RecordingScriptRunner,
    pub archive: RecordingArchive,
}

impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dbms(mut self, dbms: MockDbms) -> Self {
        self.dbms = dbms;
        self
    }

    #[must_use]
    pub fn with_scripts(mut self, scripts: RecordingScriptRunner) -> Self {
        self.scripts = scripts;
        self
    }

    #[must_use]
    pub fn with_archive(mut self, archive: RecordingArchive) -> Self {
        self.archive = archive;
        self
    }

    pub fn host(&self) -> Host<'_> {
        Host {
            dbms: &self.dbms,
            scripts: &self.scripts,
            extractor: &self.archive,
            adjuster: &self.archive,
            reports: &self.archive,
        }
    }
}

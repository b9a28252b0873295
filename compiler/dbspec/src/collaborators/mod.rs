//! Concrete collaborators for command-line runs.

pub mod roae;
pub mod script;
pub mod siard;
pub mod sqlite;

use std::path::Path;

use dbspec_eval::Host;

use crate::config::SiardConfig;
use roae::RoaeWriter;
use script::ProcessScriptRunner;
use siard::SiardTools;
use sqlite::SqliteDbms;

/// Everything a run talks to, rooted at one working directory.
pub struct Collaborators {
    dbms: SqliteDbms,
    scripts: ProcessScriptRunner,
    siard: SiardTools,
    reports: RoaeWriter,
}

impl Collaborators {
    pub fn new(dir: &Path, siard: &SiardConfig) -> Self {
        Collaborators {
            dbms: SqliteDbms::new(dir),
            scripts: ProcessScriptRunner::new(),
            siard: SiardTools::new(siard, dir),
            reports: RoaeWriter::new(),
        }
    }

    pub fn host(&self) -> Host<'_> {
        Host {
            dbms: &self.dbms,
            scripts: &self.scripts,
            extractor: &self.siard,
            adjuster: &self.siard,
            reports: &self.reports,
        }
    }
}

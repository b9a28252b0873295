//! `InterpreterBuilder` for creating Interpreter instances.

use std::collections::BTreeMap;
use std::path::PathBuf;

use dbspec_ir::SyntaxTree;

use super::Interpreter;
use crate::host::Host;
use crate::metadata::MetadataStore;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::timing::Timings;

/// Builder for [`Interpreter`].
///
/// Only the tree and the collaborators are required. The working directory
/// defaults to `.`, output goes to stdout and timing is off.
pub struct InterpreterBuilder<'a> {
    tree: &'a SyntaxTree,
    host: Host<'a>,
    parameters: BTreeMap<String, String>,
    dir: Option<PathBuf>,
    print_handler: Option<SharedPrintHandler>,
    timing: bool,
}

impl<'a> InterpreterBuilder<'a> {
    pub fn new(tree: &'a SyntaxTree, host: Host<'a>) -> Self {
        Self {
            tree,
            host,
            parameters: BTreeMap::new(),
            dir: None,
            print_handler: None,
            timing: false,
        }
    }

    /// Set the configured parameter defaults.
    #[must_use]
    pub fn parameters(mut self, parameters: BTreeMap<String, String>) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Set where `Log` statements write.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Record time spent in collaborators.
    #[must_use]
    pub fn timing(mut self, enabled: bool) -> Self {
        self.timing = enabled;
        self
    }

    pub fn build(self) -> Interpreter<'a> {
        Interpreter {
            tree: self.tree,
            host: self.host,
            parameters: self.parameters,
            dir: self.dir.unwrap_or_else(|| PathBuf::from(".")),
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
            metadata: MetadataStore::new(),
            timings: Timings::new(self.timing),
        }
    }
}

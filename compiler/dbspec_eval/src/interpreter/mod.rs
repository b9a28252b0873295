//! Tree-walking evaluator for dbspec scripts.
//!
//! One [`Interpreter`] evaluates one parsed script. Statements run in
//! source order against a chain of [`Context`] scopes; everything that
//! leaves the process goes through the [`Host`] collaborators.
//!
//! - `statements`: statement dispatch, loops, conditionals, SQL and scripts
//! - `expressions`: basic expressions, strings, comparisons, raw blocks
//! - `siard`: archive metadata, command declarations and archive output

mod builder;
mod expressions;
mod siard;
mod statements;

use std::collections::BTreeMap;
use std::path::PathBuf;

use dbspec_ir::{Field, Node, NodeKind, SyntaxTree};
use tracing::debug;

use crate::environment::Context;
use crate::errors::{missing_field, unexpected_node, EvalResult};
use crate::host::Host;
use crate::metadata::MetadataStore;
use crate::print_handler::SharedPrintHandler;
use crate::timing::Timings;

pub use builder::InterpreterBuilder;

pub struct Interpreter<'a> {
    tree: &'a SyntaxTree,
    host: Host<'a>,
    /// Configured defaults for declared parameters.
    parameters: BTreeMap<String, String>,
    /// Working directory for scripts and archive files.
    dir: PathBuf,
    print_handler: SharedPrintHandler,
    metadata: MetadataStore,
    timings: Timings,
}

impl<'a> Interpreter<'a> {
    /// Evaluate the whole script in a fresh top-level scope.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self) -> EvalResult<()> {
        let mut ctx = Context::root();
        self.run_in(&mut ctx)
    }

    /// Evaluate the whole script in `ctx`, leaving its bindings there.
    pub fn run_in(&mut self, ctx: &mut Context<'_>) -> EvalResult<()> {
        let root = self.tree.root();
        if root.kind() != NodeKind::SourceFile {
            return Err(unexpected_node(root.kind(), "the script root").with_span(root.span()));
        }
        debug!(statements = root.child_count(), "interpreting");
        self.eval_block(root, ctx)
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }
}

/// The child bound to `field`, which the grammar guarantees is present.
fn field(node: Node<'_>, field: Field) -> EvalResult<Node<'_>> {
    node.field(field)
        .ok_or_else(|| missing_field(node.kind(), field).with_span(node.span()))
}

fn identifier(node: Node<'_>) -> EvalResult<&str> {
    if node.kind() == NodeKind::Identifier {
        Ok(node.text())
    } else {
        Err(unexpected_node(node.kind(), "place of an identifier").with_span(node.span()))
    }
}

#[cfg(test)]
mod tests;

//! Parser tests.
//!
//! - `statements`: statement and expression shapes
//! - `raw`: raw block extent, de-indentation and interpolation splitting
//! - `siard`: archive metadata and command declarations
//! - `recovery`: error reporting and resynchronization

mod raw;

use crate::{parse, ParseOutput};
use dbspec_ir::{Node, NodeKind, SyntaxTree};

/// Parse `source`, failing the test on any syntax error.
fn parse_ok(source: &str) -> SyntaxTree {
    let ParseOutput { tree, errors } = parse(source);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    tree
}

fn sexp(source: &str) -> String {
    parse_ok(source).root().to_sexp()
}

/// Depth-first search for the first node of `kind`.
fn find(node: Node<'_>, kind: NodeKind) -> Option<Node<'_>> {
    if node.kind() == kind {
        return Some(node);
    }
    node.children().find_map(|child| find(child, kind))
}

//! Dbspec IR - syntax tree types shared by the parser and the interpreter.
//!
//! - [`Span`]: compact byte range into the script source
//! - [`SyntaxTree`]: flat arena of labeled nodes produced by `dbspec_parse`
//! - [`Node`]: borrowed view used by the interpreter to walk the tree
//!
//! Nodes are addressed by [`NodeId`] indices rather than boxed children.
//! Every node knows its [`NodeKind`], its span, its ordered children and
//! which of those children are bound to a named [`Field`].

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod span;
mod tree;

pub use span::{Span, SpanError};
pub use tree::{Field, Node, NodeId, NodeKind, SyntaxTree, TreeBuilder};

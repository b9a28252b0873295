//! Error reporting for dbspec scripts.
//!
//! A [`Diagnostic`] is a headline plus an optional primary span. The
//! [`emitter`] prints the headline followed by every source line the span
//! touches, each prefixed with its 1-based line number.

mod diagnostic;
pub mod emitter;
pub mod span_utils;

pub use diagnostic::Diagnostic;

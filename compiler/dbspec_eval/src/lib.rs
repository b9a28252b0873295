//! Dbspec Eval - interpreter for dbspec scripts.
//!
//! This crate evaluates a parsed script (see `dbspec_parse`) statement by
//! statement.
//!
//! # Architecture
//!
//! - `Interpreter`: tree walker over a `dbspec_ir::SyntaxTree`
//! - `Context`: chain of variable scopes, including read-only command scopes
//! - `Value`: text, arbitrary-precision integers, rows, connections and
//!   command parameter references
//! - `Rows`: query results and text tables with single-traversal locking
//! - `RawRenderer`: turns raw blocks into plain text or parameterized SQL
//! - `MetadataStore`: archive metadata and commands declared per connection
//! - `Host`: database, script, archive and report collaborators
//!
//! Errors carry a kind that maps onto a process [`StatusCode`].

mod environment;
pub mod errors;
mod host;
mod interpreter;
mod metadata;
mod print_handler;
mod raw;
mod rows;
mod status;
pub mod testing;
mod timing;
mod value;

pub use environment::{Context, ScopeError};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use host::{
    ConnectionHandle, DbConnection, Dbms, Host, HostError, MetadataAdjuster, Properties,
    ReportProducer, ScriptRunner, SiardExtractor,
};
pub use interpreter::{Interpreter, InterpreterBuilder};
pub use metadata::{ArchiveKind, CommandKind, ConnectionMetadata, MdNode, MetadataStore};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler, StdoutPrintHandler,
};
pub use raw::{RawRenderer, RenderMode, Rendered};
pub use rows::{rows_equal, QueryCursor, Row, Rows, RowsError, RowsHandle, RowsTraversal, VecCursor};
pub use status::StatusCode;
pub use timing::{TimingCategory, Timings};
pub use value::{SqlArg, Value, ValueKind};

//! Dbspec - command-line interpreter for database archival scripts.
//!
//! This crate wires the parser and evaluator to real collaborators:
//!
//! - `cli`: command-line options and verbosity
//! - `config`: `dbspec.toml` (parameter defaults, SIARD tool commands)
//! - `collaborators`: SQLite access, subprocess scripts, SIARD tools and the
//!   ROAE report writer
//! - `driver`: [`interpret`] runs one script and maps the outcome to a
//!   [`StatusCode`]
//!
//! Tests can drive [`interpret_with`] with the fakes from
//! `dbspec_eval::testing`.

pub mod cli;
pub mod collaborators;
pub mod config;
mod driver;
mod tracing_setup;

pub use cli::{parse_args, usage, CliError, Options, Verbosity};
pub use config::{Config, ConfigError, SiardConfig, CONFIG_FILE};
pub use dbspec_eval::StatusCode;
pub use driver::{interpret, interpret_with, run, Session};
pub use tracing_setup::init_tracing;

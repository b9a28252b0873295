//! Command-line options.
//!
//! ```text
//! dbspec [-q|--quiet] [-v|--verbose] [--debug] [-t|--timing]
//!        [-d|--directory DIR] [-c|--config FILE] FILE
//! ```
//!
//! Options and the script file may appear in any order. Values follow their
//! option either as the next argument or after `=`.

use std::path::PathBuf;

use dbspec_eval::StatusCode;

/// How much the run reports besides `Log` output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// No diagnostics and no `Log` output.
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    /// `tracing` filter used unless `RUST_LOG` is set.
    pub fn filter_directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "off",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::Debug => "debug",
        }
    }

    pub fn is_quiet(self) -> bool {
        self == Verbosity::Quiet
    }
}

/// Parsed command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub verbosity: Verbosity,
    pub timing: bool,
    /// Working directory; scripts, archives and the config file are
    /// resolved against it.
    pub directory: Option<PathBuf>,
    /// Config file overriding `dbspec.toml` in the working directory.
    pub config: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub help: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CliError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("option '{0}' requires a value")]
    MissingValue(String),
    #[error("unexpected argument '{0}'; only one script file can be given")]
    ExtraArgument(String),
}

impl CliError {
    pub fn status(&self) -> StatusCode {
        StatusCode::CouldNotParseOptions
    }
}

/// Parse arguments, excluding the program name.
///
/// `--quiet` wins over `--debug`, which wins over `--verbose`.
pub fn parse_args<I>(args: I) -> Result<Options, CliError>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut options = Options::default();
    let (mut quiet, mut verbose, mut debug) = (false, false, false);
    let mut args = args.into_iter().map(Into::into);

    while let Some(arg) = args.next() {
        let (name, inline) = match arg.split_once('=') {
            Some((name, value)) if arg.starts_with('-') => {
                (name.to_owned(), Some(value.to_owned()))
            }
            _ => (arg.clone(), None),
        };
        match name.as_str() {
            "-q" | "--quiet" => quiet = true,
            "-v" | "--verbose" => verbose = true,
            "--debug" => debug = true,
            "-t" | "--timing" => options.timing = true,
            "-h" | "--help" => options.help = true,
            "-d" | "--directory" => {
                let value = inline
                    .or_else(|| args.next())
                    .ok_or_else(|| CliError::MissingValue(name.clone()))?;
                options.directory = Some(PathBuf::from(value));
            }
            "-c" | "--config" => {
                let value = inline
                    .or_else(|| args.next())
                    .ok_or_else(|| CliError::MissingValue(name.clone()))?;
                options.config = Some(PathBuf::from(value));
            }
            _ if arg.starts_with('-') && arg != "-" => return Err(CliError::UnknownOption(arg)),
            _ => {
                if options.file.is_some() {
                    return Err(CliError::ExtraArgument(arg));
                }
                options.file = Some(PathBuf::from(arg));
            }
        }
    }

    options.verbosity = if quiet {
        Verbosity::Quiet
    } else if debug {
        Verbosity::Debug
    } else if verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    Ok(options)
}

pub fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [options] <file>

Runs a dbspec script.

Options:
  -d, --directory DIR  Working directory (default: current directory)
  -c, --config FILE    Config file (default: dbspec.toml in the working directory)
  -q, --quiet          Produce no output, even when failing
  -v, --verbose        Log progress
      --debug          Log debugging detail
  -t, --timing         Report time spent in shell, SQL and SIARD commands
  -h, --help           Show this help

Exit codes:
  0 ok, 1 script unreadable, 2 semantic error, 3 SQL error, 4 script error,
  5 assertion failure, 6 AST error, 7 internal error, 8 SIARD error,
  9 syntax error, 100 bad options, 101 no such directory, 102 no script file,
  103 script file not found, 104 config file unreadable"
    )
}

//! One run of a script: read, parse, evaluate, report.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use dbspec_diagnostic::emitter::Emitter;
use dbspec_diagnostic::Diagnostic;
use dbspec_eval::{
    silent_handler, stdout_handler, Host, InterpreterBuilder, SharedPrintHandler, StatusCode,
};
use tracing::{debug, error, info};

use crate::cli::{Options, Verbosity};
use crate::collaborators::Collaborators;
use crate::config::{Config, CONFIG_FILE};

/// Settings shared by everything in one run.
#[derive(Clone, Debug)]
pub struct Session {
    /// Working directory for scripts, archives and reports.
    pub dir: PathBuf,
    pub config: Config,
    pub verbosity: Verbosity,
    pub timing: bool,
}

impl Session {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Session {
            dir: dir.into(),
            config: Config::default(),
            verbosity: Verbosity::Normal,
            timing: false,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_timing(mut self, timing: bool) -> Self {
        self.timing = timing;
        self
    }

    fn print_handler(&self) -> SharedPrintHandler {
        if self.verbosity.is_quiet() {
            silent_handler()
        } else {
            stdout_handler()
        }
    }
}

/// Run the script at `path` against SQLite, subprocesses and the configured
/// SIARD tools. Diagnostics go to stderr unless the session is quiet.
pub fn interpret(path: &Path, session: &Session) -> StatusCode {
    let collaborators = Collaborators::new(&session.dir, &session.config.siard);
    let print_handler = session.print_handler();
    if session.verbosity.is_quiet() {
        interpret_with(path, session, collaborators.host(), print_handler, &mut io::sink())
    } else {
        interpret_with(
            path,
            session,
            collaborators.host(),
            print_handler,
            &mut io::stderr().lock(),
        )
    }
}

/// Run the script at `path` with the given collaborators, writing `Log`
/// output to `print_handler` and diagnostics to `diagnostics`.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn interpret_with(
    path: &Path,
    session: &Session,
    host: Host<'_>,
    print_handler: SharedPrintHandler,
    diagnostics: &mut dyn Write,
) -> StatusCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            report(diagnostics, &format!("Unable to read {}: {error}", path.display()));
            return StatusCode::SpecUnreadable;
        }
    };

    let parsed = dbspec_parse::parse(&source);
    let mut emitter = Emitter::new(&source, diagnostics);
    if parsed.has_errors() {
        for parse_error in &parsed.errors {
            let diagnostic = Diagnostic::error(format!("Syntax error: {}", parse_error.message))
                .with_span(parse_error.span);
            emit(&mut emitter, &diagnostic);
        }
        return StatusCode::SyntaxError;
    }
    debug!(nodes = parsed.tree.len(), "parsed");

    let mut interpreter = InterpreterBuilder::new(&parsed.tree, host)
        .parameters(session.config.parameters.clone())
        .directory(&session.dir)
        .print_handler(print_handler)
        .timing(session.timing)
        .build();
    let result = interpreter.run();

    let status = match result {
        Ok(()) => StatusCode::Ok,
        Err(eval_error) => {
            if eval_error.is_internal() {
                error!(error = ?eval_error, "internal failure");
            }
            let diagnostic =
                Diagnostic::error(eval_error.to_string()).with_optional_span(eval_error.span);
            emit(&mut emitter, &diagnostic);
            eval_error.status()
        }
    };
    if let Some(timing) = interpreter.timings().report() {
        report(emitter.into_inner(), &timing);
    }
    info!(%status, "finished");
    status
}

fn emit<W: Write>(emitter: &mut Emitter<'_, W>, diagnostic: &Diagnostic) {
    if let Err(error) = emitter.emit(diagnostic) {
        error!(%error, "cannot write diagnostic");
    }
}

fn report(out: &mut dyn Write, message: &str) {
    if let Err(error) = writeln!(out, "{message}") {
        error!(%error, "cannot write diagnostic");
    }
}

/// Validate the command line, load the config and run the script.
pub fn run(options: &Options) -> StatusCode {
    let quiet = options.verbosity.is_quiet();
    let complain = |message: String| {
        if !quiet {
            eprintln!("{message}");
        }
    };

    let dir = options
        .directory
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    if !dir.is_dir() {
        complain(format!("Not a directory: {}", dir.display()));
        return StatusCode::DirectoryDoesNotExist;
    }
    let Some(file) = &options.file else {
        complain("No dbspec file specified".to_owned());
        return StatusCode::DbspecFileNotSpecified;
    };
    let path = dir.join(file);
    if !path.exists() {
        complain(format!("File not found: {}", path.display()));
        return StatusCode::DbspecFileNotFound;
    }

    let loaded = match &options.config {
        Some(config) => {
            let config_path = dir.join(config);
            Config::load(&config_path).map_err(|error| (config_path, error))
        }
        None => {
            let config_path = dir.join(CONFIG_FILE);
            Config::load_or_default(&config_path).map_err(|error| (config_path, error))
        }
    };
    let config = match loaded {
        Ok(config) => config,
        Err((config_path, error)) => {
            complain(format!(
                "Unable to read configuration file: {}\n{error}",
                config_path.display()
            ));
            return StatusCode::ConfigFileUnreadable;
        }
    };

    let session = Session::new(dir)
        .with_config(config)
        .with_verbosity(options.verbosity)
        .with_timing(options.timing);
    interpret(&path, &session)
}

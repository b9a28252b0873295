//! Runs `execute using` scripts as subprocesses.
//!
//! The script is written to a temporary file headed by `#!<interpreter>`,
//! made executable and run from the working directory. On platforms without
//! shebang support the interpreter command is run with the file as its last
//! argument.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use dbspec_eval::{HostError, ScriptRunner};
use tracing::debug;

#[derive(Debug, Default)]
pub struct ProcessScriptRunner;

impl ProcessScriptRunner {
    pub fn new() -> Self {
        ProcessScriptRunner
    }
}

fn io_failure(what: &str, error: &std::io::Error) -> HostError {
    HostError::new(format!("{what}: {error}"))
}

#[cfg(unix)]
fn spawn(_interpreter: &str, script: &Path, dir: &Path) -> std::io::Result<Output> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(script, std::fs::Permissions::from_mode(0o700))?;
    Command::new(script).current_dir(dir).output()
}

#[cfg(not(unix))]
fn spawn(interpreter: &str, script: &Path, dir: &Path) -> std::io::Result<Output> {
    let mut words = interpreter.split_whitespace();
    let program = words.next().unwrap_or(interpreter);
    Command::new(program)
        .args(words)
        .arg(script)
        .current_dir(dir)
        .output()
}

/// `Exit value: N` followed by the error output, trimmed.
fn exit_failure(output: &Output) -> HostError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    match output.status.code() {
        Some(status) => {
            HostError::new(format!("Exit value: {status}\n{stderr}").trim().to_owned())
                .with_exit_status(status)
        }
        None => HostError::new(format!("Terminated by a signal\n{stderr}").trim().to_owned()),
    }
}

impl ScriptRunner for ProcessScriptRunner {
    fn run(&self, interpreter: &str, script: &str, dir: &Path) -> Result<String, HostError> {
        let mut file = tempfile::Builder::new()
            .prefix("dbspec-script-")
            .tempfile()
            .map_err(|error| io_failure("Cannot create script file", &error))?;
        write!(file, "#!{interpreter}\n{script}")
            .and_then(|()| file.flush())
            .map_err(|error| io_failure("Cannot write script file", &error))?;
        // Close the handle so the file can be executed.
        let path = file.into_temp_path();
        debug!(interpreter, path = %path.display(), dir = %dir.display(), "running script");

        let output = spawn(interpreter, &path, dir)
            .map_err(|error| io_failure(&format!("Cannot run {interpreter}"), &error))?;
        if !output.status.success() {
            return Err(exit_failure(&output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(all(test, unix))]
mod tests;

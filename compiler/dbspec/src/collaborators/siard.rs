//! External SIARD tools.
//!
//! Extraction runs
//! `<extract_command> -o -j=<url> -u=<user> -p=<password> -s=<archive>`;
//! metadata adjustment runs `<adjust_command> <archive> <metadata.json>`
//! with the declared archive tree serialized to a temporary JSON file.
//! Both run in the working directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use dbspec_eval::{
    ArchiveKind, ConnectionHandle, HostError, MdNode, MetadataAdjuster, SiardExtractor,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SiardConfig;

/// Width of the rule framing tool output in error messages.
const RULE_WIDTH: usize = 72;

pub struct SiardTools {
    extract_command: String,
    adjust_command: String,
    dir: PathBuf,
}

/// Document handed to the adjustment tool.
#[derive(Serialize)]
struct AdjustRequest<'a> {
    /// Connection URL, for tools that fill in defaults such as `dbname`.
    url: &'a str,
    metadata: &'a MdNode<ArchiveKind>,
}

impl SiardTools {
    pub fn new(config: &SiardConfig, dir: impl Into<PathBuf>) -> Self {
        SiardTools {
            extract_command: config.extract_command.clone(),
            adjust_command: config.adjust_command.clone(),
            dir: dir.into(),
        }
    }

    fn run(&self, mut command: Command, program: &str) -> Result<(), HostError> {
        let output = command
            .current_dir(&self.dir)
            .output()
            .map_err(|error| HostError::new(format!("Cannot run {program}: {error}")))?;
        if output.status.success() {
            return Ok(());
        }
        Err(tool_failure(&output))
    }
}

/// `Exit value N. Output:` followed by the tool's combined output between
/// rules.
fn tool_failure(output: &Output) -> HostError {
    let rule = "-".repeat(RULE_WIDTH);
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    let status = output.status.code();
    let value = status.map_or_else(
        || "unknown (terminated by a signal)".to_owned(),
        |code| code.to_string(),
    );
    let error = HostError::new(format!(
        "Exit value {value}. Output:\n{rule}\n{}\n{rule}",
        text.trim_end()
    ));
    match status {
        Some(code) => error.with_exit_status(code),
        None => error,
    }
}

impl SiardExtractor for SiardTools {
    fn extract(&self, connection: &ConnectionHandle, path: &Path) -> Result<(), HostError> {
        info!("Creating/replacing {}...", path.display());
        let property = |name: &str| {
            connection
                .properties()
                .get(name)
                .cloned()
                .unwrap_or_default()
        };
        let mut command = Command::new(&self.extract_command);
        command
            .arg("-o")
            .arg(format!("-j={}", connection.url()))
            .arg(format!("-u={}", property("user")))
            .arg(format!("-p={}", property("password")))
            .arg(format!("-s={}", path.display()));
        debug!(program = %self.extract_command, url = connection.url(), "extracting archive");
        self.run(command, &self.extract_command)
    }
}

impl MetadataAdjuster for SiardTools {
    fn adjust(
        &self,
        path: &Path,
        metadata: &MdNode<ArchiveKind>,
        connection: &ConnectionHandle,
    ) -> Result<(), HostError> {
        let request = AdjustRequest {
            url: connection.url(),
            metadata,
        };
        let json = serde_json::to_string_pretty(&request)
            .map_err(|error| HostError::new(format!("Cannot serialize metadata: {error}")))?;
        let mut file = tempfile::Builder::new()
            .prefix("dbspec-metadata-")
            .suffix(".json")
            .tempfile()
            .map_err(|error| HostError::new(format!("Cannot create metadata file: {error}")))?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|error| HostError::new(format!("Cannot write metadata file: {error}")))?;

        let mut command = Command::new(&self.adjust_command);
        command.arg(path).arg(file.path());
        debug!(program = %self.adjust_command, archive = %path.display(), "adjusting metadata");
        self.run(command, &self.adjust_command)
    }
}

#[cfg(all(test, unix))]
mod tests;

use std::os::unix::fs::PermissionsExt;

use super::*;
use crate::collaborators::sqlite::SqliteDbms;
use dbspec_eval::{Dbms, Properties};
use pretty_assertions::assert_eq;

/// Write an executable shell script named `name` into `dir`.
fn tool(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    let written = std::fs::write(&path, format!("#!/bin/sh\n{body}")).and_then(|()| {
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o700))
    });
    if let Err(error) = written {
        panic!("cannot write {name}: {error}");
    }
    path.display().to_string()
}

fn connection(properties: &[(&str, &str)]) -> ConnectionHandle {
    let properties: Properties = properties
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    match SqliteDbms::new(".").connect("sqlite::memory:", &properties) {
        Ok(connection) => connection,
        Err(error) => panic!("{error}"),
    }
}

fn temp_dir() -> tempfile::TempDir {
    match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(error) => panic!("cannot create temp dir: {error}"),
    }
}

fn read(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) => panic!("cannot read {}: {error}", path.display()),
    }
}

#[test]
fn extract_passes_connection_details() {
    let dir = temp_dir();
    let extract = tool(dir.path(), "extract", "printf '%s\\n' \"$@\" > args.txt\n");
    let tools = SiardTools::new(
        &SiardConfig {
            extract_command: extract,
            ..SiardConfig::default()
        },
        dir.path(),
    );
    let archive = dir.path().join("out.siard");
    let result = tools.extract(
        &connection(&[("user", "scott"), ("password", "tiger")]),
        &archive,
    );
    assert_eq!(result, Ok(()));
    assert_eq!(
        read(&dir.path().join("args.txt")),
        format!(
            "-o\n-j=sqlite::memory:\n-u=scott\n-p=tiger\n-s={}\n",
            archive.display()
        )
    );
}

#[test]
fn extract_failure_includes_output() {
    let dir = temp_dir();
    let extract = tool(dir.path(), "extract", "echo 'cannot reach db'\nexit 2\n");
    let tools = SiardTools::new(
        &SiardConfig {
            extract_command: extract,
            ..SiardConfig::default()
        },
        dir.path(),
    );
    let Err(error) = tools.extract(&connection(&[]), &dir.path().join("x.siard")) else {
        panic!("extraction should fail");
    };
    let rule = "-".repeat(72);
    assert_eq!(
        error.message,
        format!("Exit value 2. Output:\n{rule}\ncannot reach db\n{rule}")
    );
    assert_eq!(error.exit_status, Some(2));
}

#[test]
fn missing_tool() {
    let dir = temp_dir();
    let tools = SiardTools::new(
        &SiardConfig {
            extract_command: "/no/such/siard-tool".to_owned(),
            ..SiardConfig::default()
        },
        dir.path(),
    );
    let Err(error) = tools.extract(&connection(&[]), &dir.path().join("x.siard")) else {
        panic!("a missing tool should fail");
    };
    assert!(
        error.message.starts_with("Cannot run /no/such/siard-tool"),
        "{}",
        error.message
    );
}

#[test]
fn adjust_hands_over_metadata_as_json() {
    let dir = temp_dir();
    let adjust = tool(
        dir.path(),
        "adjust",
        "echo \"$1\" > archive.txt\ncp \"$2\" metadata.json\n",
    );
    let tools = SiardTools::new(
        &SiardConfig {
            adjust_command: adjust,
            ..SiardConfig::default()
        },
        dir.path(),
    );
    let mut metadata = MdNode::new(ArchiveKind::Metadata, "", "");
    metadata.push(MdNode::new(ArchiveKind::Info, "dbname", "Sales"));
    let archive = dir.path().join("sales.siard");

    assert_eq!(tools.adjust(&archive, &metadata, &connection(&[])), Ok(()));
    assert_eq!(
        read(&dir.path().join("archive.txt")),
        format!("{}\n", archive.display())
    );
    let text = read(&dir.path().join("metadata.json"));
    let json: serde_json::Value = match serde_json::from_str(&text) {
        Ok(json) => json,
        Err(error) => panic!("metadata should be JSON: {error}"),
    };
    assert_eq!(json["url"], "sqlite::memory:");
    assert_eq!(json["metadata"]["kind"], "metadata");
    assert_eq!(json["metadata"]["children"][0]["kind"], "info");
    assert_eq!(json["metadata"]["children"][0]["name"], "dbname");
    assert_eq!(json["metadata"]["children"][0]["data"], "Sales");
}

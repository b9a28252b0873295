//! End-to-end runs of script files.
//!
//! Most tests use the recording fakes from `dbspec_eval::testing`; the
//! tests built on `Collaborators` run against real SQLite databases,
//! subprocesses and report files in a temporary working directory.

use std::path::{Path, PathBuf};

use dbspec::collaborators::Collaborators;
use dbspec::{interpret_with, run, Config, Options, Session, StatusCode, Verbosity};
use dbspec_eval::testing::{Executed, MockDbms, TestHost};
use dbspec_eval::{buffer_handler, Host, SqlArg};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        match tempfile::tempdir() {
            Ok(dir) => Workspace { dir },
            Err(error) => panic!("cannot create temp dir: {error}"),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        if let Err(error) = std::fs::write(&path, contents) {
            panic!("cannot write {name}: {error}");
        }
        path
    }

    fn read(&self, name: &str) -> String {
        match std::fs::read_to_string(self.path().join(name)) {
            Ok(text) => text,
            Err(error) => panic!("cannot read {name}: {error}"),
        }
    }

    fn session(&self) -> Session {
        Session::new(self.path())
    }
}

/// Status, `Log` output and diagnostics of one run.
struct Run {
    status: StatusCode,
    output: String,
    diagnostics: String,
}

fn run_script(session: &Session, host: Host<'_>, path: &Path) -> Run {
    let print_handler = buffer_handler();
    let mut diagnostics = Vec::new();
    let status = interpret_with(path, session, host, print_handler.clone(), &mut diagnostics);
    Run {
        status,
        output: print_handler.get_output(),
        diagnostics: String::from_utf8_lossy(&diagnostics).into_owned(),
    }
}

fn run_source(workspace: &Workspace, host: &TestHost, source: &str) -> Run {
    let path = workspace.write("main.dbspec", source);
    run_script(&workspace.session(), host.host(), &path)
}

#[test]
fn successful_run() {
    let workspace = Workspace::new();
    let host = TestHost::new();
    let run = run_source(&workspace, &host, "Set x = \"hello\"\nLog x\n");
    assert_eq!(run.status, StatusCode::Ok);
    assert_eq!(run.output, "hello\n");
    assert_eq!(run.diagnostics, "");
}

#[test]
fn unreadable_script() {
    let workspace = Workspace::new();
    let host = TestHost::new();
    let missing = workspace.path().join("missing.dbspec");
    let run = run_script(&workspace.session(), host.host(), &missing);
    assert_eq!(run.status, StatusCode::SpecUnreadable);
    assert!(run.diagnostics.starts_with("Unable to read"), "{}", run.diagnostics);

    let path = workspace.path().join("binary.dbspec");
    if let Err(error) = std::fs::write(&path, [0xff, 0xfe, 0x00]) {
        panic!("{error}");
    }
    let run = run_script(&workspace.session(), host.host(), &path);
    assert_eq!(run.status, StatusCode::SpecUnreadable);
}

#[test]
fn syntax_errors_stop_before_evaluation() {
    let workspace = Workspace::new();
    let host = TestHost::new();
    let run = run_source(&workspace, &host, "Log \"before\"\nFrobnicate the database\n");
    assert_eq!(run.status, StatusCode::SyntaxError);
    assert_eq!(run.output, "");
    assert!(run.diagnostics.starts_with("Syntax error: "), "{}", run.diagnostics);
    assert!(
        run.diagnostics.contains("2:\tFrobnicate the database"),
        "{}",
        run.diagnostics
    );
}

#[test]
fn evaluation_errors_show_the_offending_line() {
    let workspace = Workspace::new();
    let host = TestHost::new();
    let run = run_source(&workspace, &host, "Log \"start\"\nLog x\n");
    assert_eq!(run.status, StatusCode::SemanticError);
    assert_eq!(run.output, "start\n");
    assert_eq!(
        run.diagnostics,
        "Semantic error: The variable 'x' has not been set.\n2:\tLog x\n"
    );
}

#[test]
fn assertion_failure() {
    let workspace = Workspace::new();
    let host = TestHost::new();
    let run = run_source(&workspace, &host, "Set n = 2\nAssert n == 3\n");
    assert_eq!(run.status, StatusCode::AssertionFailure);
    assert_eq!(run.diagnostics, "Assertion failed\n2:\tAssert n == 3\n");
}

#[test]
fn configured_parameters_reach_sql() {
    let workspace = Workspace::new();
    let host = TestHost::new();
    let config = match Config::from_toml("[parameters]\nyear = 2024\n") {
        Ok(config) => config,
        Err(error) => panic!("{error}"),
    };
    let session = workspace.session().with_config(config);
    let path = workspace.write(
        "main.dbspec",
        "\
Parameters:
    year \"Archive year\"
Set db = connection to \"mock:db\"
Execute SQL on db:
    DELETE FROM orders WHERE year <> $${year}
",
    );
    let run = run_script(&session, host.host(), &path);
    assert_eq!(run.status, StatusCode::Ok, "{}", run.diagnostics);
    assert_eq!(
        host.dbms.executed(),
        vec![Executed {
            url: "mock:db".to_owned(),
            sql: "DELETE FROM orders WHERE year <> ?".to_owned(),
            args: vec![SqlArg::Text("2024".to_owned())],
            query: false,
        }]
    );
}

#[test]
fn sql_failures_map_to_sql_error() {
    let workspace = Workspace::new();
    let host = TestHost::new().with_dbms(MockDbms::new().with_failure("SELECT 1", "boom"));
    let run = run_source(
        &workspace,
        &host,
        "Set db = connection to \"mock:db\"\nSet r = query(db):\n    SELECT 1\n",
    );
    assert_eq!(run.status, StatusCode::SqlError);
    assert!(run.diagnostics.starts_with("SQL error - boom\n2:\t"), "{}", run.diagnostics);
}

#[test]
fn timing_report_goes_to_diagnostics() {
    let workspace = Workspace::new();
    let host = TestHost::new();
    let path = workspace.write("main.dbspec", "Execute using \"sh\":\n    true\n");
    let session = workspace.session().with_timing(true);
    let run = run_script(&session, host.host(), &path);
    assert_eq!(run.status, StatusCode::Ok);
    assert!(run.diagnostics.contains("Timing Report:"), "{}", run.diagnostics);
    assert!(run.diagnostics.contains("Shell command time:"), "{}", run.diagnostics);
}

#[test]
fn sqlite_round_trip() {
    let workspace = Workspace::new();
    let session = workspace.session();
    let collaborators = Collaborators::new(workspace.path(), &session.config.siard);
    let path = workspace.write(
        "main.dbspec",
        "\
Set db = connection to \"sqlite:sales.db\"
Execute SQL on db:
    CREATE TABLE orders (id INTEGER, region TEXT)
Set region = \"north\"
Execute SQL on db:
    INSERT INTO orders VALUES (1, $${region})
Execute SQL on db:
    INSERT INTO orders VALUES (2, 'south')
Set r = query(db):
    SELECT id, region FROM orders ORDER BY id
For id, place in r:
    Log \"${id}=${place}\"
Assert r.size == 2
",
    );
    let run = run_script(&session, collaborators.host(), &path);
    assert_eq!(run.status, StatusCode::Ok, "{}", run.diagnostics);
    assert_eq!(run.output, "1=north\n2=south\n");
    assert!(workspace.path().join("sales.db").exists());
}

#[cfg(unix)]
#[test]
fn scripts_run_in_the_working_directory() {
    let workspace = Workspace::new();
    workspace.write("greeting.txt", "hello from disk\n");
    let session = workspace.session();
    let collaborators = Collaborators::new(workspace.path(), &session.config.siard);
    let path = workspace.write(
        "main.dbspec",
        "\
Set text = execute using \"/bin/sh\":
    cat greeting.txt
Log \"[${text}]\"
Execute using \"/bin/sh\":
    exit 4
",
    );
    let run = run_script(&session, collaborators.host(), &path);
    assert_eq!(run.output, "[hello from disk]\n");
    assert_eq!(run.status, StatusCode::ScriptError);
    assert!(
        run.diagnostics.starts_with("Error in script - Exit value: 4\n"),
        "{}",
        run.diagnostics
    );
}

#[cfg(unix)]
#[test]
fn archive_output_runs_tools_and_writes_report() {
    use std::os::unix::fs::PermissionsExt;

    let workspace = Workspace::new();
    let tools = [
        ("extract.sh", "#!/bin/sh\ntouch \"${5#-s=}\"\n"),
        ("adjust.sh", "#!/bin/sh\ncp \"$2\" metadata.json\n"),
    ];
    for (name, body) in tools {
        let path = workspace.write(name, body);
        if let Err(error) = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o700)) {
            panic!("{error}");
        }
    }
    let toml = format!(
        "[siard]\nextract_command = \"{}\"\nadjust_command = \"{}\"\n",
        workspace.path().join("extract.sh").display(),
        workspace.path().join("adjust.sh").display()
    );
    let config = match Config::from_toml(&toml) {
        Ok(config) => config,
        Err(error) => panic!("{error}"),
    };
    let session = workspace.session().with_config(config);
    let collaborators = Collaborators::new(workspace.path(), &session.config.siard);
    let path = workspace.write(
        "main.dbspec",
        "\
Set db = connection to \"sqlite:sales.db\"
SIARD metadata for db:
    dbname: \"Sales\"
    Command \"All orders\":
        Parameters:
            year \"Order year\"
        SQL:
            SELECT * FROM orders WHERE year = $${year}
SIARD output db to \"sales.siard\"
",
    );
    let run = run_script(&session, collaborators.host(), &path);
    assert_eq!(run.status, StatusCode::Ok, "{}", run.diagnostics);
    assert!(workspace.path().join("sales.siard").exists());
    assert_eq!(
        workspace.read("sales.roae"),
        "All orders\nyear - Order year\nSELECT * FROM orders WHERE year = ${year}\n"
    );
    assert!(workspace.read("metadata.json").contains("\"dbname\""));
}

fn options(workspace: &Workspace, file: Option<&str>) -> Options {
    Options {
        verbosity: Verbosity::Quiet,
        directory: Some(workspace.path().to_path_buf()),
        file: file.map(PathBuf::from),
        ..Options::default()
    }
}

#[test]
fn command_line_checks() {
    let workspace = Workspace::new();
    let missing_dir = Options {
        directory: Some(workspace.path().join("nowhere")),
        ..options(&workspace, Some("main.dbspec"))
    };
    assert_eq!(run(&missing_dir), StatusCode::DirectoryDoesNotExist);
    assert_eq!(run(&options(&workspace, None)), StatusCode::DbspecFileNotSpecified);
    assert_eq!(
        run(&options(&workspace, Some("main.dbspec"))),
        StatusCode::DbspecFileNotFound
    );

    workspace.write("main.dbspec", "Log \"quiet\"\n");
    assert_eq!(run(&options(&workspace, Some("main.dbspec"))), StatusCode::Ok);

    workspace.write("dbspec.toml", "[parameters\n");
    assert_eq!(
        run(&options(&workspace, Some("main.dbspec"))),
        StatusCode::ConfigFileUnreadable
    );
    let explicit = Options {
        config: Some(PathBuf::from("other.toml")),
        ..options(&workspace, Some("main.dbspec"))
    };
    assert_eq!(run(&explicit), StatusCode::ConfigFileUnreadable);
}

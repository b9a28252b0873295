use super::*;
use pretty_assertions::assert_eq;

fn temp_dir() -> tempfile::TempDir {
    match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(error) => panic!("cannot create temp dir: {error}"),
    }
}

#[test]
fn returns_standard_output() {
    let dir = temp_dir();
    let output = ProcessScriptRunner::new().run("/bin/sh", "echo one\necho two\n", dir.path());
    assert_eq!(output, Ok("one\ntwo\n".to_owned()));
}

#[test]
fn runs_in_the_working_directory() {
    let dir = temp_dir();
    if let Err(error) = std::fs::write(dir.path().join("marker.txt"), "here") {
        panic!("cannot write marker: {error}");
    }
    let output = ProcessScriptRunner::new().run("/bin/sh", "cat marker.txt", dir.path());
    assert_eq!(output, Ok("here".to_owned()));
}

#[test]
fn failure_reports_exit_value_and_stderr() {
    let dir = temp_dir();
    let result = ProcessScriptRunner::new().run(
        "/bin/sh",
        "echo partial\necho 'went wrong' >&2\nexit 3\n",
        dir.path(),
    );
    let Err(error) = result else {
        panic!("the script should fail");
    };
    assert_eq!(error.message, "Exit value: 3\nwent wrong");
    assert_eq!(error.exit_status, Some(3));
}

#[test]
fn missing_interpreter() {
    let dir = temp_dir();
    let result = ProcessScriptRunner::new().run("/no/such/interpreter", "true", dir.path());
    let Err(error) = result else {
        panic!("a missing interpreter should fail");
    };
    assert!(
        error.message.starts_with("Cannot run /no/such/interpreter"),
        "{}",
        error.message
    );
}

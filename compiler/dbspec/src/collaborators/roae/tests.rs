use super::*;
use pretty_assertions::assert_eq;

fn command(title: &str, parameters: &[(&str, &str)], sql: &str) -> MdNode<CommandKind> {
    let mut command = MdNode::new(CommandKind::Command, "", title);
    for (name, description) in parameters {
        command.push(MdNode::new(CommandKind::Parameter, *name, *description));
    }
    command.push(MdNode::new(CommandKind::Sql, "", sql));
    command
}

fn temp_dir() -> tempfile::TempDir {
    match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(error) => panic!("cannot create temp dir: {error}"),
    }
}

#[test]
fn report_layout() {
    let commands = [
        command(
            "Orders per year",
            &[("year", "Order year"), ("region", "Sales region")],
            "SELECT * FROM orders\nWHERE year = ${year}",
        ),
        command("All customers", &[], "SELECT * FROM customers"),
    ];
    assert_eq!(
        render_report(&commands),
        "Orders per year\n\
         year - Order year\n\
         region - Sales region\n\
         SELECT * FROM orders\n\
         WHERE year = ${year}\n\
         All customers\n\
         SELECT * FROM customers\n"
    );
}

#[test]
fn generate_and_remove() {
    let dir = temp_dir();
    let path = dir.path().join("sales.roae");
    let writer = RoaeWriter::new();

    assert_eq!(writer.remove(&path), Ok(false));
    assert_eq!(
        writer.generate(&path, &[command("Everything", &[], "SELECT 1")]),
        Ok(())
    );
    assert_eq!(
        std::fs::read_to_string(&path).ok().as_deref(),
        Some("Everything\nSELECT 1\n")
    );
    assert_eq!(writer.remove(&path), Ok(true));
    assert!(!path.exists());
}

#[test]
fn generate_into_missing_directory_fails() {
    let dir = temp_dir();
    let path = dir.path().join("missing").join("sales.roae");
    let Err(error) = RoaeWriter::new().generate(&path, &[]) else {
        panic!("writing into a missing directory should fail");
    };
    assert!(error.message.starts_with("Cannot write"), "{}", error.message);
}

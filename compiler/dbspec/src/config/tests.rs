use super::*;
use pretty_assertions::assert_eq;

fn config(text: &str) -> Config {
    match Config::from_toml(text) {
        Ok(config) => config,
        Err(error) => panic!("config should load: {error}"),
    }
}

#[test]
fn empty_config_has_defaults() {
    assert_eq!(config(""), Config::default());
    assert_eq!(Config::default().siard.extract_command, "siard-from-db");
}

#[test]
fn scalar_parameters_become_text() {
    let config = config(
        r#"
[parameters]
year = 2024
region = "north"
strict = true
ratio = 0.5
"#,
    );
    let expected: BTreeMap<String, String> = [
        ("ratio", "0.5"),
        ("region", "north"),
        ("strict", "true"),
        ("year", "2024"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_owned(), value.to_owned()))
    .collect();
    assert_eq!(config.parameters, expected);
}

#[test]
fn siard_commands() {
    let config = config(
        r#"
[siard]
extract_command = "/opt/siard/extract"
"#,
    );
    assert_eq!(config.siard.extract_command, "/opt/siard/extract");
    assert_eq!(config.siard.adjust_command, "siard-adjust");
}

#[test]
fn rejects_structured_parameters() {
    let error = Config::from_toml("[parameters]\nyears = [2023, 2024]\n");
    assert!(matches!(error, Err(ConfigError::NotScalar { name }) if name == "years"));
}

#[test]
fn rejects_unknown_sections_and_bad_syntax() {
    assert!(matches!(
        Config::from_toml("[database]\nurl = \"x\"\n"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        Config::from_toml("[parameters\n"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn missing_file() {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("cannot create temp dir");
    };
    let path = dir.path().join(CONFIG_FILE);
    assert!(matches!(Config::load(&path), Err(ConfigError::Read { .. })));
    assert!(matches!(Config::load_or_default(&path), Ok(config) if config == Config::default()));
}

#[test]
fn loads_from_disk() {
    let Ok(dir) = tempfile::tempdir() else {
        panic!("cannot create temp dir");
    };
    let path = dir.path().join(CONFIG_FILE);
    if let Err(error) = std::fs::write(&path, "[parameters]\nyear = 1999\n") {
        panic!("cannot write config: {error}");
    }
    let Ok(config) = Config::load_or_default(&path) else {
        panic!("config should load");
    };
    assert_eq!(config.parameters.get("year").map(String::as_str), Some("1999"));
}

// tests/config_errors.rs

use std::io::Write;
use tempfile::NamedTempFile;
use plandag::config::{load_and_validate, load_from_path, load_or_default};
use plandag::errors::PlanError;
use plandag::ops::DEFAULT_TASK_DURATION;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn expect_config_error(contents: &str, needle: &str) {
    let file = config_file(contents);

    match load_and_validate(file.path()) {
        Err(PlanError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "expected {needle:?} in {msg:?}");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_empty_file_uses_defaults() {
    let file = config_file("");

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.simulation.loops, 100);
    assert_eq!(cfg.simulation.seed, None);
    assert_eq!(cfg.simulation.precision, 2);
    assert_eq!(cfg.slack.precision, 0);
    assert_eq!(cfg.edit.default_task_duration, DEFAULT_TASK_DURATION);
    assert_eq!(cfg.edit.history_limit, 0);
}

#[test]
fn test_values_are_read_from_every_section() {
    let file = config_file(
        r#"
[simulation]
loops = 250
seed = 42
precision = 1

[slack]
precision = 3

[edit]
default_task_duration = 5
history_limit = 20
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.simulation.loops, 250);
    assert_eq!(cfg.simulation.seed, Some(42));
    assert_eq!(cfg.simulation.precision, 1);
    assert_eq!(cfg.slack.precision, 3);
    assert_eq!(cfg.edit.default_task_duration, 5.0);
    assert_eq!(cfg.edit.history_limit, 20);
}

#[test]
fn test_zero_loops_is_rejected() {
    expect_config_error(
        "[simulation]\nloops = 0\n",
        "[simulation].loops must be >= 1 (got 0)",
    );
}

#[test]
fn test_excessive_precision_is_rejected() {
    expect_config_error(
        "[simulation]\nprecision = 11\n",
        "[simulation].precision must be <= 10 (got 11)",
    );
    expect_config_error("[slack]\nprecision = 12\n", "[slack].precision must be <= 10");
}

#[test]
fn test_negative_default_duration_is_rejected() {
    expect_config_error(
        "[edit]\ndefault_task_duration = -1.0\n",
        "[edit].default_task_duration must be a finite number >= 0",
    );
    expect_config_error("[edit]\ndefault_task_duration = nan\n", "finite");
}

#[test]
fn test_raw_load_skips_range_checks() {
    let file = config_file("[simulation]\nloops = 0\n");

    let raw = load_from_path(file.path()).unwrap();

    assert_eq!(raw.simulation.loops, 0);
}

#[test]
fn test_bad_toml_returns_toml_error() {
    let file = config_file("[simulation\nloops = ");

    match load_and_validate(file.path()) {
        Err(PlanError::TomlError(_)) => {}
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_wrong_type_returns_toml_error() {
    let file = config_file("[simulation]\nloops = \"many\"\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(PlanError::TomlError(_))
    ));
}

#[test]
fn test_missing_explicit_file_returns_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Plandag.toml");

    match load_or_default(Some(&path)) {
        Err(PlanError::IoError(_)) => {}
        Err(e) => panic!("Expected IoError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

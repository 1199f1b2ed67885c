use serial_test::serial;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use supctl_cli::config_discovery::{
    discover_config, discover_config_with_source, ConfigSource, CONFIG_ENV,
};

/// Run `f` with `SUPCTL_CONFIG` set to `value` (or removed), restoring it afterwards.
fn with_config_env<T>(value: Option<&std::path::Path>, f: impl FnOnce() -> T) -> T {
    let previous = std::env::var_os(CONFIG_ENV);
    match value {
        Some(path) => std::env::set_var(CONFIG_ENV, path),
        None => std::env::remove_var(CONFIG_ENV),
    }

    let result = f();

    match previous {
        Some(val) => std::env::set_var(CONFIG_ENV, val),
        None => std::env::remove_var(CONFIG_ENV),
    }
    result
}

#[test]
#[serial]
fn cli_argument_with_existing_file_returns_ok() {
    let tmp = NamedTempFile::new().expect("failed to create temp file");
    let path = tmp.path().to_path_buf();

    let result = with_config_env(None, || discover_config_with_source(Some(path.clone())));
    let (found, source) = result.expect("expected Ok");
    assert_eq!(found, path);
    assert_eq!(source, ConfigSource::Argument);
}

#[test]
#[serial]
fn cli_argument_with_nonexistent_file_returns_err() {
    let bogus = PathBuf::from("/tmp/supctl_test_does_not_exist_12345.yaml");
    assert!(!bogus.exists());

    let result = discover_config(Some(bogus));
    let msg = result.expect_err("expected Err for non-existent path").to_string();
    assert!(msg.contains("not found"), "got: {}", msg);
    assert!(msg.contains("--config"), "got: {}", msg);
}

#[test]
#[serial]
fn env_var_points_to_existing_file() {
    let tmp = NamedTempFile::new().expect("failed to create temp file");
    let path = tmp.path().to_path_buf();

    let result = with_config_env(Some(&path), || discover_config_with_source(None));
    let (found, source) = result.expect("expected Ok");
    assert_eq!(found, path);
    assert_eq!(source, ConfigSource::Environment);
}

#[test]
#[serial]
fn env_var_points_to_nonexistent_file() {
    let bogus = PathBuf::from("/tmp/supctl_env_nonexistent_98765.yaml");
    assert!(!bogus.exists());

    let result = with_config_env(Some(&bogus), || discover_config(None));
    let msg = result
        .expect_err("expected Err for non-existent env path")
        .to_string();
    assert!(msg.contains(CONFIG_ENV), "got: {}", msg);
}

#[test]
#[serial]
fn cli_argument_takes_priority_over_env_var() {
    let cli_tmp = NamedTempFile::new().expect("failed to create temp file");
    let env_tmp = NamedTempFile::new().expect("failed to create temp file");
    let cli_path = cli_tmp.path().to_path_buf();

    let result = with_config_env(Some(env_tmp.path()), || {
        discover_config(Some(cli_path.clone()))
    });
    assert_eq!(result.expect("expected Ok"), cli_path);
}

#[test]
#[serial]
fn no_config_anywhere_lists_tried_locations() {
    let result = with_config_env(None, || discover_config(None));

    // A supctl.yaml in the working or home directory makes this Ok; only
    // check the message when nothing was found.
    if let Err(e) = result {
        let msg = e.to_string();
        assert!(msg.contains("Configuration file not found"), "got: {}", msg);
        assert!(msg.contains("supctl.yaml"), "got: {}", msg);
        assert!(msg.contains(CONFIG_ENV), "got: {}", msg);
    }
}

//! Integration tests for configuration resolution and graceful degradation
//!
//! Tests that manipulate TMT_CONFIG are marked with #[serial] so they do not
//! race each other on the process environment.

use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tmt_common::config::{load_config_file, ConfigResolver, ConfigSource, TomlConfig, CONFIG_ENV_VAR};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Should create temp file");
    file.write_all(contents.as_bytes()).expect("Should write config");
    file
}

#[test]
fn test_load_full_config_file() {
    let file = write_config(
        r#"
bind_address = "0.0.0.0"
port = 8080
max_upload_bytes = 1048576

[models]
disease_endpoint = "http://models.internal:8501"
disease_model = "leaf_cnn"
request_timeout_secs = 5
suitability_model = "/srv/models/forest.json"

[logging]
level = "debug"
"#,
    );

    let config = load_config_file(file.path()).unwrap();
    assert_eq!(config.bind_address, "0.0.0.0");
    assert_eq!(config.port, 8080);
    assert_eq!(config.max_upload_bytes, 1_048_576);
    assert_eq!(config.models.disease_endpoint, "http://models.internal:8501");
    assert_eq!(config.models.disease_model, "leaf_cnn");
    assert_eq!(config.models.request_timeout_secs, 5);
    assert_eq!(config.models.suitability_model, PathBuf::from("/srv/models/forest.json"));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_malformed_config_is_error() {
    let file = write_config("port = \"not a number\"");
    let err = load_config_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
#[serial]
fn test_env_var_selects_config() {
    let file = write_config("port = 7001");
    env::set_var(CONFIG_ENV_VAR, file.path());

    let resolver = ConfigResolver::new();
    assert_eq!(
        resolver.resolve_path(),
        ConfigSource::Explicit(file.path().to_path_buf())
    );
    let config = resolver.load().unwrap();
    assert_eq!(config.port, 7001);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_path_overrides_env_var() {
    let env_file = write_config("port = 7001");
    let cli_file = write_config("port = 7002");
    env::set_var(CONFIG_ENV_VAR, env_file.path());

    let config = ConfigResolver::new()
        .with_cli_path(Some(cli_file.path().to_path_buf()))
        .load()
        .unwrap();
    assert_eq!(config.port, 7002);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_explicit_config_is_error() {
    env::remove_var(CONFIG_ENV_VAR);

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = ConfigResolver::new()
        .with_cli_path(Some(missing))
        .load()
        .unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
#[serial]
fn test_no_overrides_never_fails_on_missing_files() {
    env::remove_var(CONFIG_ENV_VAR);

    let resolver = ConfigResolver::new();
    match resolver.resolve_path() {
        ConfigSource::Defaults => {
            assert_eq!(resolver.load().unwrap(), TomlConfig::default());
        }
        ConfigSource::Discovered(path) => assert!(path.exists()),
        ConfigSource::Explicit(path) => panic!("unexpected explicit config {:?}", path),
    }
}

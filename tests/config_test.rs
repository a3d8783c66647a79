//! Integration tests for Settings config loading with layered merge semantics.
//!
//! Note: These tests run without a global config (temp directories only),
//! so they effectively test local config merging with defaults.

use std::fs;

use tempfile::TempDir;

use wordtree::application::ApplicationError;
use wordtree::config::{local_config_path, Settings};

#[test]
fn given_no_local_config_when_load_then_uses_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.nest_threshold, 50.0);
    assert_eq!(settings.export_indent, 4);
}

#[test]
fn given_local_config_when_load_then_overrides_given_keys_only() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
nest_threshold = 30.0
export_file = "words.json"
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.nest_threshold, 30.0);
    assert_eq!(settings.export_file, "words.json");
    assert_eq!(settings.export_indent, Settings::default().export_indent);
}

#[test]
fn given_tilde_data_dir_in_local_config_when_load_then_expanded() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "data_dir = \"~/wordtree-data\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    let home = std::env::var("HOME").expect("HOME should be set");
    assert_eq!(
        settings.data_dir,
        std::path::PathBuf::from(home).join("wordtree-data")
    );
}

#[test]
fn given_invalid_toml_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "nest_threshold = [").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_negative_threshold_in_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "nest_threshold = -5.0\n").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_template_when_parsed_then_is_valid_toml() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), Settings::template()).unwrap();

    let settings = Settings::load(Some(dir.path())).expect("template should load");

    assert_eq!(settings.export_file, "data.json");
}

//! Integration tests for Settings loading with layered merge semantics.
//!
//! Merge semantics:
//! - Defaults → Global → Local: values specified in a layer replace the layer below
//! - Any → Env vars: REPLACE (explicit user override)
//!
//! These tests only use explicit local files in temp directories; env var
//! overrides are exercised by a single test to avoid cross-test interference.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use treeselect::application::{ApplicationError, FieldMapping};
use treeselect::config::{RawSettings, Settings, TreeSettings};

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("treeselect.toml");
    fs::write(&path, content).expect("write config");
    path
}

#[test]
fn given_partial_local_config_when_loading_file_then_defaults_fill_gaps() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[tree]
max_depth = 4

[fields]
label_field = "title"
parent_field = "parent"
"#,
    );

    let settings = Settings::load_file(&path).expect("load settings");

    assert_eq!(settings.tree.max_depth, Some(4));
    assert_eq!(settings.tree.expanded_level, Some(1));
    assert!(settings.tree.sortable);
    assert_eq!(
        settings.fields,
        FieldMapping {
            id_field: "id".into(),
            label_field: "title".into(),
            parent_field: Some("parent".into()),
        }
    );
}

#[test]
fn given_empty_field_name_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[fields]\nid_field = \"\"\n");

    let result = Settings::load_file(&path);

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_non_string_field_name_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[fields]\nlabel_field = 42\n");

    assert!(matches!(Settings::load_file(&path), Err(ApplicationError::Config { .. })));
}

#[test]
fn given_missing_local_file_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let result = Settings::load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_template_when_parsed_then_yields_defaults() {
    let raw: RawSettings = toml::from_str(&Settings::template()).expect("template is valid TOML");

    assert!(raw.tree.expanded_level.is_none());
    assert!(raw.fields.parent_field.is_none());
}

#[test]
fn given_settings_when_rendered_as_toml_then_reloadable() {
    let dir = TempDir::new().unwrap();
    let original = Settings {
        tree: TreeSettings {
            max_depth: Some(3),
            expanded_level: Some(2),
            sortable: false,
        },
        fields: FieldMapping {
            parent_field: Some("parent".into()),
            ..FieldMapping::default()
        },
    };
    let path = write_config(&dir, &original.to_toml().unwrap());

    let reloaded = Settings::load_file(&path).unwrap();

    assert_eq!(reloaded, original);
}

#[test]
fn given_disabled_expansion_when_rendered_as_toml_then_reloads_disabled() {
    let dir = TempDir::new().unwrap();
    let original = Settings {
        tree: TreeSettings {
            expanded_level: None,
            ..TreeSettings::default()
        },
        ..Settings::default()
    };
    let text = original.to_toml().unwrap();
    assert!(text.contains("expanded_level = 0"));
    let path = write_config(&dir, &text);

    let reloaded = Settings::load_file(&path).unwrap();

    assert_eq!(reloaded.tree.expanded_level, None);
    assert_eq!(reloaded, original);
}

#[test]
fn given_env_override_when_loading_then_env_wins_over_local_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[tree]\nexpanded_level = 3\n");

    std::env::set_var("TREESELECT_TREE__EXPANDED_LEVEL", "5");
    std::env::set_var("TREESELECT_FIELDS__PARENT_FIELD", "owner");
    let result = Settings::load(Some(&path));
    std::env::remove_var("TREESELECT_TREE__EXPANDED_LEVEL");
    std::env::remove_var("TREESELECT_FIELDS__PARENT_FIELD");

    let settings = result.expect("load settings");
    assert_eq!(settings.tree.expanded_level, Some(5));
    assert_eq!(settings.fields.parent_field.as_deref(), Some("owner"));
}

//! Tests for ServiceContainer wiring, the presentation payload and selection
//! binding over file-backed sources.

use std::fs;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use treeselect::application::{QueryOptions, TreeDataProvider, TreeView};
use treeselect::config::Settings;
use treeselect::infrastructure::di::ServiceContainer;
use treeselect::infrastructure::source::{load_store, read_records};
use treeselect::util::testing;

fn store_settings() -> Settings {
    let mut settings = Settings::default();
    settings.fields.parent_field = Some("parent".into());
    settings
}

fn store_container(dir: &TempDir) -> ServiceContainer {
    let path = dir.path().join("store.json");
    fs::write(
        &path,
        json!({
            "category": [
                {"id": 1, "name": "Electronics", "parent": null},
                {"id": 2, "name": "Phones", "parent": {"id": 1}},
                {"id": "x", "name": "Misc", "parent": null}
            ]
        })
        .to_string(),
    )
    .unwrap();
    ServiceContainer::with_store(store_settings(), Arc::new(load_store(&path).unwrap()))
}

#[test]
fn given_record_file_when_building_array_provider_then_uses_settings() {
    testing::init_test_setup();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.json");
    fs::write(
        &path,
        r#"[{"id": 1, "label": "Root"}, {"id": 2, "label": "Child", "parent_id": 1}]"#,
    )
    .unwrap();
    let mut settings = Settings::default();
    settings.tree.expanded_level = Some(2);
    let container = ServiceContainer::new(settings);

    let provider = container.array_provider(read_records(&path).unwrap());
    let forest = provider.get_tree_data(&QueryOptions::default()).unwrap();

    assert!(forest[0].is_expanded());
    assert!(forest[0].children()[0].is_expanded());
}

#[test]
fn given_store_container_when_viewing_then_payload_has_tree_choices_and_settings() {
    testing::init_test_setup();
    let dir = TempDir::new().unwrap();
    let container = store_container(&dir);
    let provider = container.entity_provider("category").unwrap();

    let view = TreeView::from_provider(&provider, &QueryOptions::default()).unwrap();
    let payload = serde_json::to_value(&view).unwrap();

    assert_eq!(payload["tree_data"][0]["label"], json!("Electronics"));
    assert_eq!(payload["tree_data"][0]["children"][0]["parent_id"], json!(1));
    assert_eq!(payload["tree_data"][0]["children"][0]["is_leaf"], json!(true));
    assert_eq!(payload["tree_data"][1]["id"], json!("x"));
    assert_eq!(payload["choices"], json!({"Electronics": 1, "Phones": 2, "Misc": "x"}));
    assert_eq!(payload["expanded_level"], json!(1));
    assert_eq!(payload["max_depth"], Value::Null);
}

#[test]
fn given_store_container_when_binding_selection_then_round_trips_ids() {
    testing::init_test_setup();
    let dir = TempDir::new().unwrap();
    let container = store_container(&dir);
    let binder = container.selection_binder("category").unwrap();

    let entities = binder.to_entities(&[json!("x"), json!(null), json!(2)]).unwrap();
    let names: Vec<&Value> = entities.iter().map(|e| &e["name"]).collect();
    assert_eq!(names, vec![&json!("Misc"), &json!("Phones")]);

    let ids = binder.to_ids(&entities);
    assert_eq!(ids.iter().map(ToString::to_string).collect::<Vec<_>>(), vec!["x", "2"]);
}

#[test]
fn given_empty_entity_name_when_building_provider_then_error() {
    let container = ServiceContainer::new(store_settings());
    assert!(container.entity_provider("  ").is_err());
}

//! Tests for the JSON export document and import

use std::sync::Arc;

use tempfile::TempDir;

use wordtree::application::services::WorkspaceService;
use wordtree::application::ApplicationError;
use wordtree::cli::CliError;
use wordtree::config::Settings;
use wordtree::domain::{ExportDocument, WordItem};
use wordtree::infrastructure::traits::{RealFileSystem, SystemClock};
use wordtree::util::testing;

fn service(temp: &TempDir, export_indent: usize) -> WorkspaceService {
    testing::init_test_setup();
    let settings = Settings {
        data_dir: temp.path().to_path_buf(),
        export_indent,
        export_file: temp.path().join("data.json").to_string_lossy().into_owned(),
        ..Settings::default()
    };
    WorkspaceService::new(
        Arc::new(RealFileSystem),
        Arc::new(SystemClock),
        Arc::new(settings),
    )
}

fn seed(service: &WorkspaceService) {
    for (name, parent) in [
        ("animal", None),
        ("mammal", Some("animal")),
        ("dog", Some("animal/mammal")),
        ("bird", Some("animal")),
        ("plant", None),
    ] {
        assert!(service.add_word(name, parent).unwrap().is_applied());
    }
}

#[test]
fn given_forest_when_exporting_then_document_has_names_and_items_only() {
    let temp = TempDir::new().unwrap();
    let service = service(&temp, 4);
    assert!(service.add_word("animal", None).unwrap().is_applied());
    assert!(service.add_word("dog", Some("animal")).unwrap().is_applied());

    let json = service.export_json().unwrap();

    let expected = r#"{
    "data": [
        {
            "name": "animal",
            "items": [
                {
                    "name": "dog",
                    "items": []
                }
            ]
        }
    ]
}"#;
    assert_eq!(json, expected);
}

#[test]
fn given_indent_setting_when_exporting_then_uses_it() {
    let temp = TempDir::new().unwrap();
    let service = service(&temp, 2);
    assert!(service.add_word("animal", None).unwrap().is_applied());

    let json = service.export_json().unwrap();

    assert!(json.starts_with("{\n  \"data\": [\n    {"));
}

#[test]
fn given_export_when_importing_elsewhere_then_same_shape_new_ids() {
    let source_dir = TempDir::new().unwrap();
    let source = service(&source_dir, 4);
    seed(&source);
    let json = source.export_json().unwrap();

    let target_dir = TempDir::new().unwrap();
    let target = service(&target_dir, 4);
    assert_eq!(target.import_json(&json).unwrap(), 5);

    let before = source.load().unwrap().to_session().items;
    let after = target.load().unwrap().to_session().items;
    let strip = |items: &[WordItem]| ExportDocument::from_snapshot(items);
    assert_eq!(strip(&before), strip(&after));
    assert_ne!(before[0].id, after[0].id);
}

#[test]
fn given_document_with_ids_when_importing_then_ids_are_replaced() {
    let temp = TempDir::new().unwrap();
    let service = service(&temp, 4);
    let id = "6f1c1e4e-93a5-4c1f-8a38-0c5bd1a0f3a1";
    let json = format!(r#"{{ "data": [ {{ "id": "{id}", "name": "a" }}, {{ "id": "{id}", "name": "b" }} ] }}"#);

    service.import_json(&json).unwrap();

    let items = service.load().unwrap().to_session().items;
    assert_eq!(items.len(), 2);
    assert_ne!(items[0].id.map(|k| k.to_string()).as_deref(), Some(id));
    assert_ne!(items[0].id, items[1].id);
}

#[test]
fn given_invalid_document_when_importing_then_serialization_error_and_forest_kept() {
    let temp = TempDir::new().unwrap();
    let service = service(&temp, 4);
    assert!(service.add_word("keep", None).unwrap().is_applied());

    let result = service.import_json(r#"{ "items": [] }"#);

    assert!(matches!(result, Err(ApplicationError::Serialization { .. })));
    let items = service.load().unwrap().to_session().items;
    assert_eq!(items[0].name, "keep");
}

#[test]
fn given_current_hierarchy_when_importing_then_detached_from_it() {
    let temp = TempDir::new().unwrap();
    let service = service(&temp, 4);
    seed(&service);
    let (saved, _) = service.save_hierarchy().unwrap();

    service.import_json(r#"{ "data": [ { "name": "x" } ] }"#).unwrap();
    let (next, _) = service.save_hierarchy().unwrap();

    assert_ne!(saved, next);
    assert_eq!(service.load().unwrap().catalog.len(), 2);
}

// ============================================================
// Export and import files
// ============================================================

#[test]
fn given_no_output_when_exporting_to_file_then_writes_configured_file() {
    let temp = TempDir::new().unwrap();
    let service = service(&temp, 4);
    seed(&service);

    let written = service.export_to(None).unwrap();

    assert_eq!(written, temp.path().join("data.json"));
    let content = std::fs::read_to_string(&written).unwrap();
    assert_eq!(content, format!("{}\n", service.export_json().unwrap()));
}

#[test]
fn given_output_path_when_exporting_then_file_round_trips_through_import() {
    let temp = TempDir::new().unwrap();
    let service = service(&temp, 4);
    seed(&service);
    let output = temp.path().join("words.json");

    assert_eq!(service.export_to(Some(&output)).unwrap(), output);
    assert!(!temp.path().join("data.json").exists());

    let other_dir = TempDir::new().unwrap();
    let other = self::service(&other_dir, 4);
    assert_eq!(other.import_file(&output).unwrap(), 5);
    assert_eq!(other.export_json().unwrap(), service.export_json().unwrap());
}

#[test]
fn given_unwritable_destination_when_exporting_then_cannot_create_exit_code() {
    let temp = TempDir::new().unwrap();
    let service = service(&temp, 4);
    seed(&service);
    let output = temp.path().join("missing").join("out.json");

    let err = service.export_to(Some(&output)).unwrap_err();

    assert!(matches!(err, ApplicationError::Write { ref path, .. } if path == &output));
    assert_eq!(CliError::from(err).exit_code(), wordtree::exitcode::CANTCREAT);
}

#[test]
fn given_missing_file_when_importing_then_no_input_exit_code() {
    let temp = TempDir::new().unwrap();
    let service = service(&temp, 4);

    let err = service.import_file(&temp.path().join("absent.json")).unwrap_err();

    assert!(matches!(err, ApplicationError::Read { .. }));
    assert_eq!(CliError::from(err).exit_code(), wordtree::exitcode::NOINPUT);
}

#[test]
fn given_deeply_nested_document_when_importing_then_whole_chain_is_kept() {
    let temp = TempDir::new().unwrap();
    let service = service(&temp, 4);
    let depth = 150;
    let mut chain = WordItem {
        id: None,
        name: format!("w{}", depth - 1),
        items: vec![],
    };
    for level in (0..depth - 1).rev() {
        chain = WordItem {
            id: None,
            name: format!("w{level}"),
            items: vec![chain],
        };
    }
    let json = serde_json::to_string(&ExportDocument { data: vec![chain] }).unwrap();

    assert_eq!(service.import_json(&json).unwrap(), depth);

    let ws = service.load().unwrap();
    assert_eq!(ws.forest().depth(), depth);
}

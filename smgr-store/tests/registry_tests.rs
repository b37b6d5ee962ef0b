//! Type registry persistence and mutation tests

mod common;

use common::TestProject;
use smgr_common::{Error, SceneEvent};
use smgr_store::TypeRegistry;
use std::fs;
use tempfile::TempDir;

fn registry_file(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("Editor").join(".scenemanager").join(".scenetypes.json")
}

#[test]
fn test_add_then_contains() {
    let dir = TempDir::new().unwrap();
    let mut registry = TypeRegistry::open(registry_file(&dir)).unwrap();

    assert!(registry.add("UI").unwrap());
    assert!(registry.contains("UI"));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_add_twice_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut registry = TypeRegistry::open(registry_file(&dir)).unwrap();

    assert!(registry.add("UI").unwrap());
    assert!(!registry.add("UI").unwrap());
    assert_eq!(registry.types(), ["Level".to_string(), "UI".to_string()]);
}

#[test]
fn test_export_import_preserves_order() {
    let dir = TempDir::new().unwrap();
    let path = registry_file(&dir);
    let mut registry = TypeRegistry::open(&path).unwrap();
    registry.add("UI").unwrap();
    registry.add("Test").unwrap();
    registry.export().unwrap();

    let reloaded = TypeRegistry::open(&path).unwrap();
    assert_eq!(reloaded.types(), registry.types());
    assert_eq!(fs::read_to_string(&path).unwrap(), r#"["Level","UI","Test"]"#);
}

#[test]
fn test_import_replaces_memory_and_drops_duplicates() {
    let dir = TempDir::new().unwrap();
    let path = registry_file(&dir);
    let mut registry = TypeRegistry::open(&path).unwrap();
    registry.add("Stale").unwrap();

    fs::write(&path, r#"["UI","Level","UI",""," "]"#).unwrap();
    registry.import().unwrap();

    assert_eq!(registry.types(), ["UI".to_string(), "Level".to_string()]);
    assert!(!registry.contains("Stale"));
    assert_eq!(registry.default_type(), "UI");
}

#[test]
fn test_corrupt_registry_is_regenerated() {
    let dir = TempDir::new().unwrap();
    let path = registry_file(&dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{\"not\": \"a list\"").unwrap();

    let registry = TypeRegistry::open(&path).unwrap();
    assert_eq!(registry.types(), ["Level".to_string()]);
    assert_eq!(fs::read_to_string(&path).unwrap(), r#"["Level"]"#);
}

#[test]
fn test_empty_list_is_reseeded() {
    let dir = TempDir::new().unwrap();
    let path = registry_file(&dir);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "[]").unwrap();

    let registry = TypeRegistry::open(&path).unwrap();
    assert_eq!(registry.types(), ["Level".to_string()]);
    assert_eq!(fs::read_to_string(&path).unwrap(), r#"["Level"]"#);
}

#[test]
fn test_remove_persists_and_absent_is_false() {
    let dir = TempDir::new().unwrap();
    let path = registry_file(&dir);
    let mut registry = TypeRegistry::open(&path).unwrap();
    registry.add("UI").unwrap();

    assert!(registry.remove("UI").unwrap());
    assert!(!registry.remove("UI").unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), r#"["Level"]"#);
}

#[test]
fn test_remove_last_type_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut registry = TypeRegistry::open(registry_file(&dir)).unwrap();
    registry.add("UI").unwrap();
    registry.remove("Level").unwrap();

    let result = registry.remove("UI");
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert_eq!(registry.types(), ["UI".to_string()]);
}

#[test]
fn test_by_index_out_of_range_is_empty() {
    let dir = TempDir::new().unwrap();
    let registry = TypeRegistry::open(registry_file(&dir)).unwrap();

    assert_eq!(registry.by_index(0), "Level");
    assert_eq!(registry.by_index(1), "");
    assert_eq!(registry.by_index(usize::MAX), "");
}

#[test]
fn test_store_registry_lives_at_configured_path() {
    let project = TestProject::new();

    assert!(project
        .path("Assets/Editor/.scenemanager/.scenetypes.json")
        .is_file());
    assert_eq!(project.store.registry().types(), ["Level".to_string()]);
}

#[test]
fn test_mutations_broadcast_types_changed() {
    let mut project = TestProject::new();
    let mut rx = project.store.events().subscribe();

    project.store.registry_mut().add("UI").unwrap();
    project.store.registry_mut().add("UI").unwrap();
    project.store.registry_mut().remove("UI").unwrap();

    match rx.try_recv().unwrap() {
        SceneEvent::TypesChanged { types, .. } => {
            assert_eq!(types, vec!["Level".to_string(), "UI".to_string()])
        }
        other => panic!("unexpected event {:?}", other),
    }
    match rx.try_recv().unwrap() {
        SceneEvent::TypesChanged { types, .. } => assert_eq!(types, vec!["Level".to_string()]),
        other => panic!("unexpected event {:?}", other),
    }
    // The no-op add emitted nothing
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_blank_type_names_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = registry_file(&dir);
    let mut registry = TypeRegistry::open(&path).unwrap();

    for blank in ["", " ", "\t\n"] {
        assert!(matches!(registry.add(blank), Err(Error::InvalidInput(_))));
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), r#"["Level"]"#);
}

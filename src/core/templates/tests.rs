//! Template module tests.

use std::sync::Arc;

use super::validation::{TemplateEntry, TemplatesFile, validate_and_convert};
use super::*;

fn entry(id: &str, name: &str, prompt: &str) -> TemplateEntry {
    TemplateEntry {
        id: id.to_string(),
        name: name.to_string(),
        prompt: prompt.to_string(),
    }
}

fn custom(id: &str, name: &str) -> Template {
    Template {
        id: id.to_string(),
        name: name.to_string(),
        prompt: format!("{} prompt", name),
        is_builtin: false,
    }
}

/// Store whose saves always fail, to exercise rollback.
struct ReadOnlyStore;

impl TemplateStore for ReadOnlyStore {
    fn load(&self) -> Result<Vec<Template>, TemplatesError> {
        Ok(vec![custom("custom-1", "Kept")])
    }

    fn save(&self, _templates: &[Template]) -> Result<(), TemplatesError> {
        Err(TemplatesError::Io(std::io::Error::other("read-only")))
    }
}

fn memory_catalog() -> (TemplateCatalog, Arc<MemoryTemplateStore>) {
    let store = Arc::new(MemoryTemplateStore::default());
    (TemplateCatalog::open(Box::new(store.clone())), store)
}

#[test]
fn builtins_are_flagged_and_non_empty() {
    let builtins = builtin_templates();
    assert!(!builtins.is_empty());
    assert!(builtins.iter().all(|t| t.is_builtin));
    assert!(is_builtin_id("flowchart"));
    assert!(!is_builtin_id("custom-1"));
}

#[test]
fn validate_rejects_duplicate_ids() {
    let file = TemplatesFile {
        templates: vec![entry("custom-1", "A", "x"), entry("custom-1", "B", "y")],
    };
    let err = validate_and_convert(file).unwrap_err();
    assert!(err.to_string().contains("Duplicate"));
}

#[test]
fn validate_rejects_builtin_collision() {
    let file = TemplatesFile {
        templates: vec![entry("flowchart", "Mine", "x")],
    };
    let err = validate_and_convert(file).unwrap_err();
    assert!(err.to_string().contains("built-in"));
}

#[test]
fn validate_rejects_empty_id() {
    let file = TemplatesFile {
        templates: vec![entry(" ", "A", "x")],
    };
    let err = validate_and_convert(file).unwrap_err();
    assert!(err.to_string().contains("cannot be empty"));
}

#[test]
fn validate_keeps_order_and_allows_empty_name() {
    let file = TemplatesFile {
        templates: vec![entry("custom-2", "", "x"), entry("custom-1", "B", "")],
    };
    let out = validate_and_convert(file).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].id, "custom-2");
    assert_eq!(out[1].id, "custom-1");
    assert!(out.iter().all(|t| !t.is_builtin));
}

#[test]
fn json_store_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonTemplateStore::in_dir(&dir.path().join("cfg"));
    assert!(store.load().unwrap().is_empty());

    let templates = vec![custom("custom-1", "One"), custom("custom-2", "Two")];
    store.save(&templates).unwrap();
    assert_eq!(store.load().unwrap(), templates);
}

#[test]
fn json_store_rejects_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonTemplateStore::in_dir(dir.path());
    std::fs::write(store.path(), "{not json").unwrap();
    let err = store.load().unwrap_err();
    assert!(matches!(err, TemplatesError::Json(_)));
    assert!(err.safe_mode_message().contains("invalid JSON"));
}

#[test]
fn catalog_falls_back_to_builtins_on_broken_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonTemplateStore::in_dir(dir.path());
    std::fs::write(store.path(), "not json").unwrap();
    let catalog = TemplateCatalog::open(Box::new(store));
    assert_eq!(catalog.list_all().len(), builtin_templates().len());
}

#[test]
fn list_all_puts_builtins_first_then_customs_in_creation_order() {
    let (mut catalog, _) = memory_catalog();
    let a = catalog.add("Zebra", "z").unwrap();
    let b = catalog.add("Alpha", "a").unwrap();

    let all = catalog.list_all();
    let builtin_count = builtin_templates().len();
    assert_eq!(all.len(), builtin_count + 2);
    assert_eq!(&all[..builtin_count], builtin_templates());
    assert_eq!(all[builtin_count].id, a.id);
    assert_eq!(all[builtin_count + 1].id, b.id);
}

#[test]
fn add_then_get_returns_custom_record() {
    let (mut catalog, store) = memory_catalog();
    let created = catalog.add("Network", "network topology diagram").unwrap();
    let found = catalog.get(&created.id).unwrap();
    assert_eq!(found.name, "Network");
    assert_eq!(found.prompt, "network topology diagram");
    assert!(!found.is_builtin);
    assert_eq!(store.snapshot(), vec![created]);
}

#[test]
fn add_allocates_distinct_ids() {
    let (mut catalog, _) = memory_catalog();
    let a = catalog.add("A", "a").unwrap();
    let b = catalog.add("B", "b").unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn add_permits_empty_strings() {
    let (mut catalog, _) = memory_catalog();
    let t = catalog.add("", "").unwrap();
    assert_eq!(catalog.get(&t.id).unwrap().name, "");
}

#[test]
fn get_resolves_builtins_and_customs_uniformly() {
    let (mut catalog, _) = memory_catalog();
    let t = catalog.add("Mine", "m").unwrap();
    assert!(catalog.get("flowchart").is_some());
    assert!(catalog.get(&t.id).is_some());
    assert!(catalog.get("nope").is_none());
}

#[test]
fn update_preserves_id_and_position() {
    let (mut catalog, store) = memory_catalog();
    let first = catalog.add("First", "1").unwrap();
    let second = catalog.add("Second", "2").unwrap();

    let updated = catalog.update(&first.id, "Renamed", "one").unwrap();
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.name, "Renamed");

    let saved = store.snapshot();
    assert_eq!(saved[0].id, first.id);
    assert_eq!(saved[0].prompt, "one");
    assert_eq!(saved[1].id, second.id);
}

#[test]
fn update_rejects_builtin_and_unknown() {
    let (mut catalog, _) = memory_catalog();
    let err = catalog.update("flowchart", "x", "y").unwrap_err();
    assert!(matches!(err, CatalogError::NotEditable(_)));
    let err = catalog.update("missing", "x", "y").unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
    assert_eq!(catalog.get("flowchart").unwrap(), &builtin_templates()[0]);
}

#[test]
fn delete_returns_false_for_builtin_and_unknown() {
    let (mut catalog, _) = memory_catalog();
    let before = catalog.list_all();
    assert!(!catalog.delete("flowchart").unwrap());
    assert!(!catalog.delete("missing").unwrap());
    assert_eq!(catalog.list_all(), before);
}

#[test]
fn delete_removes_custom() {
    let (mut catalog, store) = memory_catalog();
    let t = catalog.add("Temp", "t").unwrap();
    assert!(catalog.delete(&t.id).unwrap());
    assert!(catalog.get(&t.id).is_none());
    assert!(store.snapshot().is_empty());
    assert!(!catalog.delete(&t.id).unwrap());
}

#[test]
fn interleaved_mutations_keep_counts_and_builtins() {
    let (mut catalog, _) = memory_catalog();
    let builtin_count = builtin_templates().len();
    let a = catalog.add("A", "a").unwrap();
    let b = catalog.add("B", "b").unwrap();
    catalog.update(&a.id, "A2", "a2").unwrap();
    catalog.delete(&b.id).unwrap();
    catalog.add("C", "c").unwrap();
    catalog.delete("flowchart").unwrap();
    let _ = catalog.update("sequence", "x", "y");

    let all = catalog.list_all();
    assert_eq!(all.len(), builtin_count + 2);
    assert_eq!(&all[..builtin_count], builtin_templates());
}

#[test]
fn failed_save_rolls_back() {
    let mut catalog = TemplateCatalog::open(Box::new(ReadOnlyStore));
    let before = catalog.list_all();

    assert!(matches!(catalog.add("New", "n"), Err(CatalogError::Store(_))));
    assert!(matches!(
        catalog.update("custom-1", "Changed", "c"),
        Err(CatalogError::Store(_))
    ));
    assert!(matches!(catalog.delete("custom-1"), Err(CatalogError::Store(_))));
    assert_eq!(catalog.list_all(), before);
}

#[test]
fn template_serializes_with_wire_names() {
    let json = serde_json::to_value(custom("custom-1", "One")).unwrap();
    assert_eq!(json["id"], "custom-1");
    assert_eq!(json["prompt"], "One prompt");
    assert_eq!(json["isBuiltIn"], false);
}

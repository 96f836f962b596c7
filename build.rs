//! Build script: validates builtin-templates.json at compile time.

use std::collections::HashSet;
use std::path::PathBuf;

fn main() {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR set by Cargo");
    let config_path: PathBuf = [&manifest_dir, "config", "builtin-templates.json"]
        .iter()
        .collect();
    println!("cargo:rerun-if-changed={}", config_path.display());
    let json = std::fs::read_to_string(&config_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read {}: {}. builtin-templates.json must exist and be valid.",
            config_path.display(),
            e
        )
    });
    #[derive(serde::Deserialize)]
    struct BuiltinTemplateEntry {
        id: String,
        name: String,
        prompt: String,
    }
    let entries: Vec<BuiltinTemplateEntry> = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!(
            "builtin-templates.json is invalid JSON: {}. Fix the file and rebuild.",
            e
        )
    });
    let mut seen = HashSet::new();
    for entry in &entries {
        if entry.id.is_empty() || entry.name.is_empty() || entry.prompt.is_empty() {
            panic!("builtin-templates.json: every entry needs a non-empty id, name and prompt");
        }
        if !seen.insert(entry.id.as_str()) {
            panic!("builtin-templates.json: duplicate id '{}'", entry.id);
        }
    }
}

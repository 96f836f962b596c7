//! Built-in templates, loaded from `config/builtin-templates.json` (embedded at compile time).

use std::sync::OnceLock;

use serde::Deserialize;

use super::Template;

#[derive(Debug, Deserialize)]
struct BuiltinTemplateEntry {
    id: String,
    name: String,
    prompt: String,
}

fn load_builtin_templates() -> Vec<Template> {
    let json = include_str!("../../../config/builtin-templates.json");
    // build.rs rejects an invalid file, so parsing cannot fail at runtime.
    let entries: Vec<BuiltinTemplateEntry> = serde_json::from_str(json).unwrap_or_default();
    entries
        .into_iter()
        .map(|e| Template {
            id: e.id,
            name: e.name,
            prompt: e.prompt,
            is_builtin: true,
        })
        .collect()
}

static BUILTIN_TEMPLATES: OnceLock<Vec<Template>> = OnceLock::new();

/// All built-in templates in their fixed order, loading on first access.
pub fn builtin_templates() -> &'static [Template] {
    BUILTIN_TEMPLATES.get_or_init(load_builtin_templates)
}

/// Returns true if the id belongs to a built-in template.
pub fn is_builtin_id(id: &str) -> bool {
    builtin_templates().iter().any(|t| t.id == id)
}

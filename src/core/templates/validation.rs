//! Template validation: disk format and conversion to Template.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Template, TemplatesError, builtin};

/// JSON structure on disk.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TemplatesFile {
    pub(super) templates: Vec<TemplateEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TemplateEntry {
    pub id: String,
    pub name: String,
    pub prompt: String,
}

impl TemplatesFile {
    pub(super) fn from_templates(templates: &[Template]) -> Self {
        Self {
            templates: templates
                .iter()
                .map(|t| TemplateEntry {
                    id: t.id.clone(),
                    name: t.name.clone(),
                    prompt: t.prompt.clone(),
                })
                .collect(),
        }
    }
}

/// Validate file entries and convert to a custom Template list, preserving order.
pub(crate) fn validate_and_convert(file: TemplatesFile) -> Result<Vec<Template>, TemplatesError> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(file.templates.len());

    for (i, entry) in file.templates.into_iter().enumerate() {
        if entry.id.trim().is_empty() {
            return Err(TemplatesError::Validation(format!(
                "Template at index {}: id cannot be empty",
                i
            )));
        }
        if builtin::is_builtin_id(&entry.id) {
            return Err(TemplatesError::Validation(format!(
                "Template '{}': id collides with a built-in template",
                entry.id
            )));
        }
        if !seen.insert(entry.id.clone()) {
            return Err(TemplatesError::Validation(format!(
                "Duplicate template id '{}'",
                entry.id
            )));
        }
        result.push(Template {
            id: entry.id,
            name: entry.name,
            prompt: entry.prompt,
            is_builtin: false,
        });
    }

    Ok(result)
}

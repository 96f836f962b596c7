//! Diagram templates: built-in table, user-defined templates, and their persistence.
//!
//! Built-in templates are embedded at compile time from `config/builtin-templates.json`.
//! Custom templates live in a caller-supplied [`TemplateStore`] as an ordered list.

mod builtin;
mod catalog;
mod validation;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::core::paths;

pub use builtin::{builtin_templates, is_builtin_id};
pub use catalog::{CatalogError, TemplateCatalog};

/// A named prompt fragment describing a diagram style.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    /// Fragment placed before the user content in the final prompt.
    pub prompt: String,
    #[serde(rename = "isBuiltIn")]
    pub is_builtin: bool,
}

/// Error loading or saving templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplatesError {
    #[error("Failed to access templates file: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl TemplatesError {
    /// User-friendly message when falling back to built-in templates only (safe mode).
    pub fn safe_mode_message(&self) -> String {
        let detail = match self {
            TemplatesError::Io(_) => "could not read file".to_string(),
            TemplatesError::Json(_) => "invalid JSON".to_string(),
            TemplatesError::Validation(msg) => format!("validation error: {}", msg),
        };
        format!("templates.json: {} (using built-in templates only)", detail)
    }
}

/// Durable slot holding the ordered list of custom templates.
pub trait TemplateStore: Send + Sync {
    fn load(&self) -> Result<Vec<Template>, TemplatesError>;

    fn save(&self, templates: &[Template]) -> Result<(), TemplatesError>;
}

/// Custom templates in a pretty-printed JSON file (`<config dir>/templates.json`).
#[derive(Debug, Clone)]
pub struct JsonTemplateStore {
    path: PathBuf,
}

impl JsonTemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(paths::TEMPLATES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemplateStore for JsonTemplateStore {
    /// Returns an empty list if the file is absent. Errors on invalid content.
    fn load(&self) -> Result<Vec<Template>, TemplatesError> {
        if !self.path.exists() {
            return Ok(vec![]);
        }
        let content = fs::read_to_string(&self.path)?;
        let file: validation::TemplatesFile = serde_json::from_str(&content)?;
        validation::validate_and_convert(file)
    }

    /// Creates the parent directory if needed.
    fn save(&self, templates: &[Template]) -> Result<(), TemplatesError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = validation::TemplatesFile::from_templates(templates);
        let content = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// In-memory slot for tests and sessions without a config directory.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: Mutex<Vec<Template>>,
}

impl MemoryTemplateStore {
    pub fn snapshot(&self) -> Vec<Template> {
        self.templates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn load(&self) -> Result<Vec<Template>, TemplatesError> {
        Ok(self.snapshot())
    }

    fn save(&self, templates: &[Template]) -> Result<(), TemplatesError> {
        *self
            .templates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = templates.to_vec();
        Ok(())
    }
}

impl<S: TemplateStore + ?Sized> TemplateStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Vec<Template>, TemplatesError> {
        (**self).load()
    }

    fn save(&self, templates: &[Template]) -> Result<(), TemplatesError> {
        (**self).save(templates)
    }
}

#[cfg(test)]
mod tests;

//! Uniform catalog over built-in and custom templates.

use super::{Template, TemplateStore, TemplatesError, builtin_templates, is_builtin_id};

/// Errors from catalog mutations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Diagram type not found.")]
    NotFound(String),
    #[error("Default diagram types cannot be modified.")]
    NotEditable(String),
    #[error(transparent)]
    Store(#[from] TemplatesError),
}

/// Built-in templates followed by custom templates in creation order.
///
/// Reads never distinguish built-in from custom; mutations reject built-ins.
pub struct TemplateCatalog {
    custom: Vec<Template>,
    store: Box<dyn TemplateStore>,
}

impl TemplateCatalog {
    /// Load custom templates from the store. An unreadable or invalid slot falls back
    /// to built-in templates only.
    pub fn open(store: Box<dyn TemplateStore>) -> Self {
        let custom = store.load().unwrap_or_else(|e| {
            log::warn!("{}", e.safe_mode_message());
            vec![]
        });
        Self { custom, store }
    }

    pub fn list_all(&self) -> Vec<Template> {
        builtin_templates()
            .iter()
            .chain(self.custom.iter())
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        builtin_templates()
            .iter()
            .chain(self.custom.iter())
            .find(|t| t.id == id)
    }

    /// Create a custom template with a fresh id and persist it.
    pub fn add(&mut self, name: &str, prompt: &str) -> Result<Template, CatalogError> {
        let template = Template {
            id: self.allocate_id(),
            name: name.to_string(),
            prompt: prompt.to_string(),
            is_builtin: false,
        };
        self.custom.push(template.clone());
        if let Err(e) = self.store.save(&self.custom) {
            self.custom.pop();
            return Err(e.into());
        }
        log::debug!("added template {}", template.id);
        Ok(template)
    }

    /// Replace name and prompt of a custom template, keeping its id and position.
    pub fn update(&mut self, id: &str, name: &str, prompt: &str) -> Result<Template, CatalogError> {
        if is_builtin_id(id) {
            return Err(CatalogError::NotEditable(id.to_string()));
        }
        let index = self
            .custom
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        let previous = self.custom[index].clone();
        self.custom[index].name = name.to_string();
        self.custom[index].prompt = prompt.to_string();
        if let Err(e) = self.store.save(&self.custom) {
            self.custom[index] = previous;
            return Err(e.into());
        }
        Ok(self.custom[index].clone())
    }

    /// Remove a custom template. Returns false, without mutating anything, for
    /// built-in or unknown ids.
    pub fn delete(&mut self, id: &str) -> Result<bool, CatalogError> {
        if is_builtin_id(id) {
            return Ok(false);
        }
        let Some(index) = self.custom.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        let removed = self.custom.remove(index);
        if let Err(e) = self.store.save(&self.custom) {
            self.custom.insert(index, removed);
            return Err(e.into());
        }
        Ok(true)
    }

    /// Time-derived id; bumped on the rare collision.
    fn allocate_id(&self) -> String {
        let mut stamp = chrono::Utc::now().timestamp_millis();
        loop {
            let id = format!("custom-{}", stamp);
            if self.get(&id).is_none() {
                return id;
            }
            stamp += 1;
        }
    }
}

//! CLI-only commands: config info, API key management, diagram type listing.
//!
//! These run without the session loop and produce plain text output.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::core::api_key::{FileSecretStore, SecretStore};
use crate::core::config::{self, EnvSettings, SettingsSource};
use crate::core::paths;
use crate::core::templates::{JsonTemplateStore, Template, TemplateCatalog};

/// Config directory from `--config-dir` or the platform default; exits when neither exists.
pub fn require_config_dir(override_dir: Option<&Path>) -> PathBuf {
    paths::resolve_config_dir(override_dir).unwrap_or_else(|| {
        eprintln!("Error: no config directory available (use --config-dir)");
        std::process::exit(1);
    })
}

/// Run the `config` command: display paths, settings, and API key status.
pub async fn run_config(config_dir: &Path) {
    let cache_dir = paths::cache_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    let store = FileSecretStore::in_dir(config_dir);
    let api_key_status = if store.has().await { "set ✓" } else { "not set" };
    let settings = EnvSettings.load();
    let template_store = JsonTemplateStore::in_dir(config_dir);
    let templates_path = template_store.path().display().to_string();
    let custom_count = TemplateCatalog::open(Box::new(template_store))
        .list_all()
        .iter()
        .filter(|t| !t.is_builtin)
        .count();

    println!("Config:       {}", config_dir.display());
    println!("Cache:        {}", cache_dir);
    println!("Model:        {}", settings.model);
    println!("Aspect ratio: {}", settings.aspect_ratio);
    println!("API base:     {}", config::api_base());
    println!("Templates:    {} ({} custom)", templates_path, custom_count);
    println!("API key:      {}", api_key_status);
}

/// Run the `config set-api-key` command: store the key in the config directory.
pub async fn run_config_set_api_key(config_dir: &Path, api_key: Option<String>) {
    let key = match api_key {
        Some(k) if !k.trim().is_empty() => k.trim().to_string(),
        _ => {
            let mut buf = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buf) {
                eprintln!("Error reading from stdin: {}", e);
                std::process::exit(1);
            }
            let trimmed = buf.trim().to_string();
            if trimmed.is_empty() {
                eprintln!("Error: no API key provided");
                std::process::exit(1);
            }
            trimmed
        }
    };

    let store = FileSecretStore::in_dir(config_dir);
    match store.set(&key).await {
        Ok(()) => println!("API key saved to {}", store.path().display()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the `config delete-api-key` command.
pub async fn run_config_delete_api_key(config_dir: &Path) {
    let store = FileSecretStore::in_dir(config_dir);
    if let Err(e) = store.delete().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    println!("API key deleted.");
}

/// Templates whose id or name contains `query` (case-insensitive).
pub fn filter_templates<'a>(templates: &'a [Template], query: &str) -> Vec<&'a Template> {
    let q = query.to_lowercase();
    templates
        .iter()
        .filter(|t| t.id.to_lowercase().contains(&q) || t.name.to_lowercase().contains(&q))
        .collect()
}

/// Run the `templates` command: list built-in and custom diagram types.
pub fn run_templates(config_dir: &Path, query: Option<&str>) {
    let catalog = TemplateCatalog::open(Box::new(JsonTemplateStore::in_dir(config_dir)));
    let all = catalog.list_all();
    let filtered: Vec<_> = match query {
        Some(q) => filter_templates(&all, q),
        None => all.iter().collect(),
    };

    if filtered.is_empty() {
        println!("No diagram types found.");
        return;
    }

    let id_w = filtered.iter().map(|t| t.id.len()).max().unwrap_or(20).max(20);
    println!("   {:<id_w$}  Name", "ID");
    println!("   {}  ----", "-".repeat(id_w));
    for t in &filtered {
        let marker = if t.is_builtin { ' ' } else { '*' };
        println!(" {} {:<id_w$}  {}", marker, t.id, t.name);
    }
    println!("\n{} diagram type(s) listed (* = custom)", filtered.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::templates::builtin_templates;

    #[test]
    fn filter_matches_id_or_name_case_insensitively() {
        let all = builtin_templates();
        let hits = filter_templates(all, "FLOW");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "flowchart");
        assert_eq!(filter_templates(all, "").len(), all.len());
        assert!(filter_templates(all, "zzz").is_empty());
    }
}

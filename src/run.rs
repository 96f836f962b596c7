//! Application run modes: logger init, stdio session, one-shot generation.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bridge::{self, StdioHost};
use crate::cli::Args;
use crate::core::api_key::{FileSecretStore, MemorySecretStore, SecretStore};
use crate::core::config::{AspectRatio, EnvSettings, SettingsSource};
use crate::core::image::{GenerateConfig, HttpTransport, ImageClient};
use crate::core::session::Services;
use crate::core::templates::{JsonTemplateStore, MemoryTemplateStore, TemplateCatalog, TemplateStore};

/// Initialize env_logger. Logs go to stderr unless `--log-file` is given, since
/// stdout carries protocol messages and generated output.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));

    if let Some(path) = &args.log_file
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
    {
        logger.target(env_logger::Target::Pipe(Box::new(file)));
    }
    let _ = logger.try_init();
}

/// File-backed stores in the config directory; without one, the key and custom
/// templates last only for this process.
fn session_stores(config_dir: Option<&Path>) -> (Arc<dyn SecretStore>, Box<dyn TemplateStore>) {
    match config_dir {
        Some(dir) => {
            log::info!("config directory {}", dir.display());
            (
                Arc::new(FileSecretStore::in_dir(dir)),
                Box::new(JsonTemplateStore::in_dir(dir)),
            )
        }
        None => {
            log::warn!("no config directory available; API key and custom types will not persist");
            (
                Arc::new(MemorySecretStore::default()),
                Box::new(MemoryTemplateStore::default()),
            )
        }
    }
}

/// Serve the session protocol on stdin/stdout.
pub async fn run_serve(config_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let save_dir = std::env::current_dir()?;
    let (secrets, templates) = session_stores(config_dir);
    log::info!("serving on stdio, saving images to {}", save_dir.display());
    let services = Services {
        secrets,
        templates,
        transport: Arc::new(HttpTransport::from_env()),
        settings: Arc::new(EnvSettings),
        host: Arc::new(StdioHost::new(save_dir)),
    };
    bridge::serve_stdio(services).await?;
    Ok(())
}

/// Options for the `generate` command.
pub struct GenerateOptions {
    pub prompt: String,
    pub template: String,
    pub output: Option<PathBuf>,
    pub model: Option<String>,
    pub aspect_ratio: Option<String>,
}

/// Generate one diagram and write the decoded image to a file.
pub async fn run_generate(
    config_dir: &Path,
    opts: GenerateOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = if opts.prompt == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        opts.prompt
    };
    let content = content.trim();
    if content.is_empty() {
        eprintln!("Error: empty prompt");
        std::process::exit(1);
    }

    let Some(api_key) = FileSecretStore::in_dir(config_dir)
        .get()
        .await?
        .filter(|k| !k.is_empty())
    else {
        eprintln!(
            "Error: no API key set. Run `{} config set-api-key` first.",
            crate::core::app::NAME
        );
        std::process::exit(1);
    };

    let catalog = TemplateCatalog::open(Box::new(JsonTemplateStore::in_dir(config_dir)));
    let Some(template) = catalog.get(&opts.template) else {
        eprintln!(
            "Error: unknown diagram type '{}' (see `{} templates`)",
            opts.template,
            crate::core::app::NAME
        );
        std::process::exit(1);
    };

    let mut settings = EnvSettings.load();
    if let Some(model) = opts.model.filter(|m| !m.trim().is_empty()) {
        settings.model = model.trim().to_string();
    }
    if let Some(raw) = opts.aspect_ratio {
        settings.aspect_ratio = raw.parse::<AspectRatio>()?;
    }

    let mut client = ImageClient::new(Arc::new(HttpTransport::from_env()));
    client.initialize(&api_key);
    let image = client
        .generate_diagram(&template.prompt, content, &GenerateConfig::from(&settings))
        .await?;

    let path = opts.output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "diagram-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            image.extension()
        ))
    });
    tokio::fs::write(&path, image.decode()?).await?;
    println!("{}", path.display());
    Ok(())
}

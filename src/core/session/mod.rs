//! Session orchestrator: dispatches UI commands and host events to the template
//! catalog, the API key store, and the image client, and reports results back.
//!
//! Events are processed one at a time. A generation request runs as a spawned task
//! whose outcome is fed back into the loop, so other events (selection changes,
//! key updates) keep flowing while the request is pending. At most one generation
//! is in flight; further `generate` commands are rejected until it completes.

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::core::api_key::SecretStore;
use crate::core::config::SettingsSource;
use crate::core::host::Host;
use crate::core::image::{
    self, ContentTransport, GenerateConfig, GeneratedImage, GenerationError, ImageClient,
};
use crate::core::protocol::{HostEvent, Inbound, Outbound};
use crate::core::selection::SelectionSnapshot;
use crate::core::templates::{CatalogError, TemplateCatalog, TemplateStore, is_builtin_id};

pub use error::SessionError;

/// Anything the session reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Ui(Inbound),
    Host(HostEvent),
}

impl From<Inbound> for SessionEvent {
    fn from(msg: Inbound) -> Self {
        SessionEvent::Ui(msg)
    }
}

impl From<HostEvent> for SessionEvent {
    fn from(ev: HostEvent) -> Self {
        SessionEvent::Host(ev)
    }
}

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// The UI has not sent `ready` yet.
    Uninitialized,
    AwaitingCredential,
    Ready,
    Generating,
}

/// Collaborators injected into a session.
pub struct Services {
    pub secrets: Arc<dyn SecretStore>,
    pub templates: Box<dyn TemplateStore>,
    pub transport: Arc<dyn ContentTransport>,
    pub settings: Arc<dyn SettingsSource>,
    pub host: Arc<dyn Host>,
}

type GenerationOutcome = Result<GeneratedImage, GenerationError>;

const GENERIC_FAILURE: &str = "Failed to generate diagram.";

pub struct Session {
    catalog: TemplateCatalog,
    secrets: Arc<dyn SecretStore>,
    client: ImageClient,
    settings: Arc<dyn SettingsSource>,
    host: Arc<dyn Host>,
    outbox: mpsc::UnboundedSender<Outbound>,
    state: SessionState,
    /// Last raw selection reported by the host; snapshots are recomputed from it.
    selection_text: String,
    last_image: Option<GeneratedImage>,
    temp_dir: PathBuf,
    finished_tx: mpsc::UnboundedSender<GenerationOutcome>,
    finished_rx: mpsc::UnboundedReceiver<GenerationOutcome>,
}

impl Session {
    pub fn new(services: Services, outbox: mpsc::UnboundedSender<Outbound>) -> Self {
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();
        Self {
            catalog: TemplateCatalog::open(services.templates),
            secrets: services.secrets,
            client: ImageClient::new(services.transport),
            settings: services.settings,
            host: services.host,
            outbox,
            state: SessionState::Uninitialized,
            selection_text: String::new(),
            last_image: None,
            temp_dir: std::env::temp_dir(),
            finished_tx,
            finished_rx,
        }
    }

    /// Directory for files handed to the OS viewer.
    #[cfg(test)]
    pub fn with_temp_dir(mut self, dir: PathBuf) -> Self {
        self.temp_dir = dir;
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Process events until the channel closes, then wait for any pending generation.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle(event).await,
                    None => break,
                },
                Some(outcome) = self.finished_rx.recv() => self.finish_generation(outcome),
            }
        }
        self.settle().await;
        log::debug!("session closed");
    }

    /// Handle one event. Failures are reported as `error` messages, never returned.
    pub async fn handle(&mut self, event: SessionEvent) {
        let result = match event {
            SessionEvent::Ui(msg) => self.dispatch(msg).await,
            SessionEvent::Host(HostEvent::SelectionChanged { text }) => {
                self.selection_text = text;
                self.send(Outbound::SelectionChanged {
                    selection: self.selection(),
                });
                Ok(())
            }
        };
        if let Err(e) = result {
            log::warn!("{}", e);
            self.send(Outbound::error(user_message(&e)));
        }
    }

    /// Wait for the in-flight generation, if any, and report its outcome.
    pub async fn settle(&mut self) {
        if self.state != SessionState::Generating {
            return;
        }
        if let Some(outcome) = self.finished_rx.recv().await {
            self.finish_generation(outcome);
        }
    }

    async fn dispatch(&mut self, msg: Inbound) -> Result<(), SessionError> {
        match msg {
            Inbound::Ready => self.on_ready().await,
            Inbound::Generate {
                prompt,
                pre_prompt_id,
                use_selection,
            } => self.on_generate(prompt, &pre_prompt_id, use_selection).await,
            Inbound::SaveApiKey { api_key } => self.on_save_api_key(&api_key).await,
            Inbound::DeleteApiKey => self.on_delete_api_key().await,
            Inbound::DownloadImage { base64, filename } => {
                self.on_download_image(&base64, filename).await
            }
            Inbound::OpenInOs { base64 } => self.on_open_in_os(&base64).await,
            Inbound::AddPrePrompt { name, prompt } => self.on_add_template(&name, &prompt),
            Inbound::UpdatePrePrompt { id, name, prompt } => {
                self.on_update_template(&id, &name, &prompt)
            }
            Inbound::DeletePrePrompt { id } => self.on_delete_template(&id),
            Inbound::ConfirmDeletePrePrompt { id } => self.on_confirm_delete_template(&id).await,
            Inbound::GetSelection => {
                self.send(Outbound::SelectionChanged {
                    selection: self.selection(),
                });
                Ok(())
            }
        }
    }

    async fn on_ready(&mut self) -> Result<(), SessionError> {
        let api_key = self.secrets.get().await.unwrap_or_else(|e| {
            log::warn!("{}", e);
            None
        });
        let has_api_key = match api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => {
                self.client.initialize(key);
                true
            }
            None => {
                self.client.reset();
                false
            }
        };
        self.settle_state();

        self.send(Outbound::Init {
            has_api_key,
            pre_prompts: self.catalog.list_all(),
            selection: self.selection(),
            config: self.settings.load().into(),
        });
        Ok(())
    }

    async fn on_generate(
        &mut self,
        prompt: String,
        template_id: &str,
        use_selection: bool,
    ) -> Result<(), SessionError> {
        if self.state == SessionState::Generating {
            return Err(SessionError::Busy);
        }
        self.send(Outbound::Generating);

        if !self.client.is_initialized() {
            let api_key = self
                .secrets
                .get()
                .await?
                .filter(|k| !k.is_empty())
                .ok_or(SessionError::MissingApiKey)?;
            self.client.initialize(&api_key);
        }

        let template = self
            .catalog
            .get(template_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownTemplate(template_id.to_string()))?;

        let content = match self.selection() {
            Some(selection) if use_selection => selection.text,
            _ => prompt,
        };
        if content.trim().is_empty() {
            return Err(SessionError::EmptyContent);
        }

        let config = GenerateConfig::from(&self.settings.load());
        let client = self.client.clone();
        let finished = self.finished_tx.clone();
        self.state = SessionState::Generating;
        log::info!("generating '{}' diagram", template.id);
        tokio::spawn(async move {
            let request = async move {
                client
                    .generate_diagram(&template.prompt, &content, &config)
                    .await
            };
            let outcome = tokio::spawn(request)
                .await
                .unwrap_or_else(|e| Err(GenerationError::Unexpected(e.to_string())));
            let _ = finished.send(outcome);
        });
        Ok(())
    }

    fn finish_generation(&mut self, outcome: GenerationOutcome) {
        self.state = SessionState::Ready;
        self.settle_state();
        match outcome {
            Ok(image) => {
                self.last_image = Some(image.clone());
                self.send(Outbound::Generated { image });
            }
            Err(e) => {
                let e = SessionError::from(e);
                log::warn!("generation failed: {}", e);
                self.send(Outbound::error(user_message(&e)));
            }
        }
    }

    async fn on_save_api_key(&mut self, api_key: &str) -> Result<(), SessionError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(SessionError::EmptyApiKey);
        }
        self.secrets.set(api_key).await?;
        self.client.initialize(api_key);
        self.settle_state();
        self.host.notify("API key saved.");
        self.send(Outbound::ApiKeyUpdated { has_api_key: true });
        Ok(())
    }

    async fn on_delete_api_key(&mut self) -> Result<(), SessionError> {
        self.secrets.delete().await?;
        self.client.reset();
        self.settle_state();
        self.host.notify("API key deleted.");
        self.send(Outbound::ApiKeyUpdated { has_api_key: false });
        Ok(())
    }

    fn on_add_template(&mut self, name: &str, prompt: &str) -> Result<(), SessionError> {
        let (name, prompt) = required_fields(name, prompt)?;
        self.catalog.add(name, prompt)?;
        self.send_templates();
        Ok(())
    }

    fn on_update_template(&mut self, id: &str, name: &str, prompt: &str) -> Result<(), SessionError> {
        let (name, prompt) = required_fields(name, prompt)?;
        self.catalog
            .update(id, name, prompt)
            .map_err(|e| match e {
                CatalogError::NotEditable(_) => SessionError::BuiltinEdit,
                other => other.into(),
            })?;
        self.send_templates();
        Ok(())
    }

    fn on_delete_template(&mut self, id: &str) -> Result<(), SessionError> {
        if is_builtin_id(id) {
            return Err(SessionError::BuiltinDelete);
        }
        if !self.catalog.delete(id)? {
            return Err(SessionError::UnknownTemplate(id.to_string()));
        }
        self.send_templates();
        Ok(())
    }

    async fn on_confirm_delete_template(&mut self, id: &str) -> Result<(), SessionError> {
        if is_builtin_id(id) {
            return Err(SessionError::BuiltinDelete);
        }
        let name = self
            .catalog
            .get(id)
            .map(|t| t.name.clone())
            .ok_or_else(|| SessionError::UnknownTemplate(id.to_string()))?;
        let question = format!("Delete diagram type \"{}\"?", name);
        if self.host.confirm(&question).await {
            self.send(Outbound::ConfirmDelete { id: id.to_string() });
        }
        Ok(())
    }

    async fn on_download_image(
        &mut self,
        base64: &str,
        filename: Option<String>,
    ) -> Result<(), SessionError> {
        let (bytes, mime_type) = self.resolve_image(base64)?;
        let suggested = filename.filter(|f| !f.trim().is_empty()).unwrap_or_else(|| {
            format!(
                "diagram-{}.{}",
                timestamp_millis(),
                image::extension_for_mime(&mime_type)
            )
        });

        let Some(path) = self.host.choose_save_path(&suggested).await else {
            log::debug!("save cancelled");
            return Ok(());
        };
        tokio::fs::write(&path, bytes)
            .await
            .map_err(SessionError::Save)?;
        log::info!("saved image to {}", path.display());
        self.host.notify(&format!("Image saved to {}", path.display()));
        Ok(())
    }

    async fn on_open_in_os(&mut self, base64: &str) -> Result<(), SessionError> {
        let (bytes, mime_type) = self.resolve_image(base64)?;
        let path = self.temp_dir.join(format!(
            "diagram-{}.{}",
            timestamp_millis(),
            image::extension_for_mime(&mime_type)
        ));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(SessionError::Open)?;
        self.host.open_in_os(&path).map_err(SessionError::Open)
    }

    /// Decoded bytes and mime type of the message payload, or of the last generated
    /// image when the payload is empty. Payload types come from the bytes themselves.
    fn resolve_image(&self, base64: &str) -> Result<(Vec<u8>, String), SessionError> {
        if base64.trim().is_empty() {
            let image = self.last_image.as_ref().ok_or(SessionError::NoImage)?;
            return Ok((image.decode()?, image.mime_type.clone()));
        }
        let bytes = image::decode_base64(base64)?;
        let mime_type = image::sniff_mime_type(&bytes)
            .map(str::to_string)
            .or_else(|| {
                self.last_image
                    .as_ref()
                    .filter(|img| img.base64 == base64)
                    .map(|img| img.mime_type.clone())
            })
            .unwrap_or_else(|| image::DEFAULT_MIME_TYPE.to_string());
        Ok((bytes, mime_type))
    }

    fn selection(&self) -> Option<SelectionSnapshot> {
        SelectionSnapshot::capture(&self.selection_text)
    }

    /// Recompute the idle state from whether a credential is bound.
    fn settle_state(&mut self) {
        if self.state == SessionState::Generating {
            return;
        }
        self.state = if self.client.is_initialized() {
            SessionState::Ready
        } else {
            SessionState::AwaitingCredential
        };
    }

    fn send_templates(&self) {
        self.send(Outbound::PrePromptsUpdated {
            pre_prompts: self.catalog.list_all(),
        });
    }

    fn send(&self, msg: Outbound) {
        if self.outbox.send(msg).is_err() {
            log::debug!("outbound channel closed; dropping message");
        }
    }
}

fn required_fields<'a>(name: &'a str, prompt: &'a str) -> Result<(&'a str, &'a str), SessionError> {
    let (name, prompt) = (name.trim(), prompt.trim());
    if name.is_empty() || prompt.is_empty() {
        return Err(SessionError::IncompleteTemplate);
    }
    Ok((name, prompt))
}

/// Message shown in the UI; errors without text get a generic one.
fn user_message(e: &SessionError) -> String {
    let message = e.to_string();
    if message.trim().is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        message
    }
}

fn timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

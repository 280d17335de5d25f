//! Application state: prompts, credential resolver, model backend.
//!
//! Everything here is read-only after startup. Learner progress lives in
//! `session::LearnerSession`, one per WebSocket connection, never here.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{load_agent_config_from_env, Prompts};
use crate::credentials::CredentialResolver;
use crate::gemini::{GeminiBackend, GeminiSettings};
use crate::model::{ModelBackend, ModelError};

#[derive(Clone)]
pub struct AppState {
  pub prompts: Prompts,
  pub credentials: CredentialResolver,
  pub backend: Arc<dyn ModelBackend>,
  pub model: String,
}

impl AppState {
  /// Build state from env: load config, set up the Gemini backend.
  /// The API key is not read here; it is resolved on every model call.
  #[instrument(level = "info", skip_all)]
  pub fn from_env() -> Result<Self, ModelError> {
    let prompts = load_agent_config_from_env()
      .map(|c| c.prompts)
      .unwrap_or_default();

    let settings = GeminiSettings::from_env();
    let backend = GeminiBackend::new(&settings)?;
    let credentials = CredentialResolver::from_env();

    let found = credentials.status();
    if found.is_empty() {
      warn!(target: "gerund_master", "No API key visible yet; quiz and tutor will report a missing key until one is set.");
    } else {
      info!(target: "gerund_master", sources = ?found, "API key source(s) present");
    }
    info!(target: "gerund_master", backend = backend.name(), base_url = %settings.base_url, model = %settings.model, timeout = ?settings.timeout, "Model backend configured");

    Ok(Self::with_parts(prompts, credentials, Arc::new(backend), settings.model))
  }

  pub fn with_parts(
    prompts: Prompts,
    credentials: CredentialResolver,
    backend: Arc<dyn ModelBackend>,
    model: impl Into<String>,
  ) -> Self {
    Self { prompts, credentials, backend, model: model.into() }
  }
}

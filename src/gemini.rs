//! Minimal Gemini client for our use-cases.
//!
//! We only call `models/{model}:generateContent` and request either plain text
//! or JSON constrained by a response schema. Calls are instrumented and log the
//! model name, latency and response sizes (not contents).
//!
//! NOTE: the API key is supplied per call and sent in a header, never in the
//! URL, so it cannot leak into request logs.

use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::credentials::Credential;
use crate::domain::ChatTurn;
use crate::model::{ModelBackend, ModelError, ModelFuture, ModelRequest, ModelResponse};
use crate::util::trunc_for_log;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone, Debug)]
pub struct GeminiSettings {
  pub base_url: String,
  pub model: String,
  pub timeout: Duration,
}

impl Default for GeminiSettings {
  fn default() -> Self {
    Self {
      base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
      model: "gemini-2.5-flash".into(),
      timeout: Duration::from_secs(30),
    }
  }
}

impl GeminiSettings {
  /// GEMINI_BASE_URL, GEMINI_MODEL and GEMINI_TIMEOUT_SECS override the defaults.
  pub fn from_env() -> Self {
    let defaults = Self::default();
    let base_url = std::env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url);
    let model = std::env::var("GEMINI_MODEL").unwrap_or(defaults.model);
    let timeout = std::env::var("GEMINI_TIMEOUT_SECS")
      .ok()
      .and_then(|s| s.parse::<u64>().ok())
      .map(Duration::from_secs)
      .unwrap_or(defaults.timeout);
    Self { base_url: base_url.trim_end_matches('/').to_string(), model, timeout }
  }
}

/// HTTP backend. Holds only the connection pool; the key arrives with each call.
#[derive(Clone)]
pub struct GeminiBackend {
  client: reqwest::Client,
  base_url: String,
}

impl GeminiBackend {
  pub fn new(settings: &GeminiSettings) -> Result<Self, ModelError> {
    let client = reqwest::Client::builder()
      .timeout(settings.timeout)
      .build()
      .map_err(|e| ModelError::transport(e.to_string()))?;
    Ok(Self { client, base_url: settings.base_url.clone() })
  }

  #[instrument(level = "info", skip(self, credential, request), fields(model = %request.model, history = request.history.len(), schema = request.response_schema.is_some()))]
  async fn generate_content(
    &self,
    credential: &Credential,
    request: ModelRequest,
  ) -> Result<ModelResponse, ModelError> {
    let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
    let body = build_body(&request);

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "gerund-master-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(API_KEY_HEADER, credential.expose())
      .json(&body).send().await.map_err(|e| ModelError::transport(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_gemini_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      error!(elapsed = ?start.elapsed(), %status, "Gemini call failed");
      return Err(ModelError::status(status.as_u16(), msg));
    }

    let body: GenerateContentResponse = res.json().await.map_err(|e| ModelError::decode(e.to_string()))?;
    if let Some(usage) = &body.usage_metadata {
      info!(prompt_tokens = ?usage.prompt_token_count, candidates_tokens = ?usage.candidates_token_count, total_tokens = ?usage.total_token_count, "Gemini usage");
    }
    let text = first_candidate_text(&body);
    info!(elapsed = ?start.elapsed(), response_chars = text.chars().count(), "Gemini response received");
    Ok(ModelResponse { text })
  }
}

impl ModelBackend for GeminiBackend {
  fn name(&self) -> &'static str {
    "gemini"
  }

  fn generate<'a>(
    &'a self,
    credential: &'a Credential,
    request: ModelRequest,
  ) -> ModelFuture<'a, Result<ModelResponse, ModelError>> {
    Box::pin(self.generate_content(credential, request))
  }
}

// --- Wire DTOs ---

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
  contents: Vec<Content>,
  #[serde(skip_serializing_if = "Option::is_none")]
  system_instruction: Option<Content>,
  #[serde(skip_serializing_if = "Option::is_none")]
  generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct Content {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  role: Option<String>,
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug)]
struct Part {
  #[serde(default)]
  text: Option<String>,
}

#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  #[serde(skip_serializing_if = "Option::is_none")]
  temperature: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_mime_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_schema: Option<Value>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  #[serde(default)]
  usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
  #[serde(default)]
  content: Option<Content>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)] prompt_token_count: Option<u32>,
  #[serde(default)] candidates_token_count: Option<u32>,
  #[serde(default)] total_token_count: Option<u32>,
}

fn text_content(role: Option<&str>, text: &str) -> Content {
  Content {
    role: role.map(str::to_string),
    parts: vec![Part { text: Some(text.to_string()) }],
  }
}

fn turn_content(turn: &ChatTurn) -> Content {
  text_content(Some(turn.role.as_str()), &turn.text)
}

/// History first, then the new prompt as the final user turn.
fn build_body(request: &ModelRequest) -> GenerateContentRequest {
  let mut contents: Vec<Content> = request.history.iter().map(turn_content).collect();
  contents.push(text_content(Some("user"), &request.prompt));

  let generation_config = if request.temperature.is_some() || request.response_schema.is_some() {
    Some(GenerationConfig {
      temperature: request.temperature,
      response_mime_type: request.response_schema.as_ref().map(|_| "application/json".to_string()),
      response_schema: request.response_schema.clone(),
    })
  } else {
    None
  };

  GenerateContentRequest {
    contents,
    system_instruction: request.system_instruction.as_deref().map(|s| text_content(None, s)),
    generation_config,
  }
}

fn first_candidate_text(body: &GenerateContentResponse) -> String {
  body.candidates
    .first()
    .and_then(|c| c.content.as_ref())
    .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect::<String>())
    .unwrap_or_default()
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
    #[serde(default)] status: Option<String>,
  }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(match w.error.status {
      Some(s) => format!("{} ({})", w.error.message, s),
      None => w.error.message,
    }),
    Err(_) => None,
  }
}

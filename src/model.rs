//! Vendor-neutral contract for the remote generative model.
//!
//! A request carries the model id, the prompt, an optional system instruction,
//! an optional output schema and the prior conversation. The response is plain
//! text. The credential is passed per call and never stored by a backend.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::credentials::Credential;
use crate::domain::ChatTurn;

pub type ModelFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Clone, Debug, PartialEq)]
pub struct ModelRequest {
  pub model: String,
  pub prompt: String,
  pub system_instruction: Option<String>,
  pub response_schema: Option<Value>,
  pub history: Vec<ChatTurn>,
  pub temperature: Option<f32>,
}

impl ModelRequest {
  pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
    Self {
      model: model.into(),
      prompt: prompt.into(),
      system_instruction: None,
      response_schema: None,
      history: Vec::new(),
      temperature: None,
    }
  }

  pub fn with_system_instruction(mut self, system: impl Into<String>) -> Self {
    self.system_instruction = Some(system.into());
    self
  }

  pub fn with_response_schema(mut self, schema: Value) -> Self {
    self.response_schema = Some(schema);
    self
  }

  pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
    self.history = history;
    self
  }

  pub fn with_temperature(mut self, temperature: f32) -> Self {
    self.temperature = Some(temperature);
    self
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelResponse {
  /// Concatenated text of the first candidate; empty if the model said nothing.
  pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelErrorKind {
  Transport,
  Status,
  Decode,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelError {
  pub kind: ModelErrorKind,
  pub message: String,
}

impl ModelError {
  pub fn transport(message: impl Into<String>) -> Self {
    Self { kind: ModelErrorKind::Transport, message: message.into() }
  }

  pub fn status(code: u16, message: impl Into<String>) -> Self {
    Self { kind: ModelErrorKind::Status, message: format!("HTTP {}: {}", code, message.into()) }
  }

  pub fn decode(message: impl Into<String>) -> Self {
    Self { kind: ModelErrorKind::Decode, message: message.into() }
  }
}

impl std::fmt::Display for ModelError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}: {}", self.kind, self.message)
  }
}

impl std::error::Error for ModelError {}

pub trait ModelBackend: Send + Sync {
  fn name(&self) -> &'static str;

  fn generate<'a>(
    &'a self,
    credential: &'a Credential,
    request: ModelRequest,
  ) -> ModelFuture<'a, Result<ModelResponse, ModelError>>;
}

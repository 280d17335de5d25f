//! GerundBot tutor replies.
//!
//! Stateless: the caller passes the whole prior conversation on every call.
//! `reply` always returns text. A missing key gets its own message; every
//! other failure becomes a generic in-character apology.

use tracing::{debug, error, instrument, warn};

use crate::domain::ChatTurn;
use crate::error::ServiceError;
use crate::model::ModelRequest;
use crate::state::AppState;

const TUTOR_TEMPERATURE: f32 = 0.7;

#[instrument(level = "info", skip(state, history, message), fields(history = history.len(), message_len = message.len()))]
pub async fn reply(state: &AppState, history: &[ChatTurn], message: &str) -> String {
  match try_reply(state, history, message).await {
    Ok(text) if text.trim().is_empty() => {
      warn!(target: "tutor", "Empty tutor reply; using fallback line");
      state.prompts.tutor_empty_reply.clone()
    }
    Ok(text) => text,
    Err(e) if e.is_credential_missing() => state.prompts.tutor_missing_key_reply.clone(),
    Err(e) => {
      error!(target: "tutor", error = %e, "Tutor reply failed; apologising");
      state.prompts.tutor_unavailable_reply.clone()
    }
  }
}

async fn try_reply(state: &AppState, history: &[ChatTurn], message: &str) -> Result<String, ServiceError> {
  let credential = state.credentials.resolve()?;

  let request = ModelRequest::new(state.model.clone(), message)
    .with_system_instruction(state.prompts.tutor_system.clone())
    .with_history(history.to_vec())
    .with_temperature(TUTOR_TEMPERATURE);

  let response = state
    .backend
    .generate(&credential, request)
    .await
    .map_err(|e| ServiceError::TutorUnavailable(e.to_string()))?;

  debug!(target: "tutor", reply_chars = response.text.chars().count(), "Tutor reply received");
  Ok(response.text.trim().to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ChatRole;
  use crate::model::ModelError;
  use crate::testing::{test_state, FakeBackend};
  use std::sync::Arc;

  #[tokio::test]
  async fn passes_history_and_persona_through() {
    let backend = Arc::new(FakeBackend::with_replies(vec![Ok("동명사는 -ing 명사야! 😊".into())]));
    let state = test_state(backend.clone(), Some("k"));
    let history = vec![
      ChatTurn::new(ChatRole::Model, "안녕!"),
      ChatTurn::new(ChatRole::User, "hi"),
      ChatTurn::new(ChatRole::Model, "hello"),
    ];

    let text = reply(&state, &history, "동명사가 뭐야?").await;
    assert_eq!(text, "동명사는 -ing 명사야! 😊");

    let sent = backend.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].history, history);
    assert_eq!(sent[0].prompt, "동명사가 뭐야?");
    assert!(sent[0].system_instruction.as_deref().unwrap_or("").contains("GerundBot"));
    assert!(sent[0].response_schema.is_none());
  }

  #[tokio::test]
  async fn transport_failure_returns_apology_instead_of_error() {
    let backend = Arc::new(FakeBackend::with_replies(vec![Err(ModelError::transport("dns failure"))]));
    let state = test_state(backend, Some("k"));

    let text = reply(&state, &[], "hello").await;
    assert_eq!(text, state.prompts.tutor_unavailable_reply);
    assert!(!text.contains("dns"));
  }

  #[tokio::test]
  async fn http_error_also_returns_apology() {
    let backend = Arc::new(FakeBackend::with_replies(vec![Err(ModelError::status(500, "internal"))]));
    let state = test_state(backend, Some("k"));
    assert_eq!(reply(&state, &[], "hello").await, state.prompts.tutor_unavailable_reply);
  }

  #[tokio::test]
  async fn missing_key_has_its_own_message() {
    let backend = Arc::new(FakeBackend::with_replies(vec![]));
    let state = test_state(backend.clone(), None);

    let text = reply(&state, &[], "hello").await;
    assert_eq!(text, state.prompts.tutor_missing_key_reply);
    assert_ne!(text, state.prompts.tutor_unavailable_reply);
    assert!(backend.requests().is_empty());
  }

  #[tokio::test]
  async fn empty_reply_uses_friendly_fallback() {
    let backend = Arc::new(FakeBackend::with_replies(vec![Ok("   ".into())]));
    let state = test_state(backend, Some("k"));
    assert_eq!(reply(&state, &[], "hello").await, state.prompts.tutor_empty_reply);
  }
}

//! Test doubles shared by unit tests: a scripted model backend and fixtures.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::config::Prompts;
use crate::credentials::{Credential, CredentialResolver, CredentialSource, DEFAULT_SOURCES};
use crate::model::{ModelBackend, ModelError, ModelFuture, ModelRequest, ModelResponse};
use crate::state::AppState;

/// Replies are handed out in order; running out is a transport error.
pub struct FakeBackend {
  replies: Mutex<VecDeque<Result<String, ModelError>>>,
  requests: Mutex<Vec<ModelRequest>>,
  keys: Mutex<Vec<String>>,
}

impl FakeBackend {
  pub fn with_replies(replies: Vec<Result<String, ModelError>>) -> Self {
    Self {
      replies: Mutex::new(replies.into()),
      requests: Mutex::new(Vec::new()),
      keys: Mutex::new(Vec::new()),
    }
  }

  pub fn requests(&self) -> Vec<ModelRequest> {
    self.requests.lock().expect("requests lock").clone()
  }

  pub fn keys_seen(&self) -> Vec<String> {
    self.keys.lock().expect("keys lock").clone()
  }
}

impl ModelBackend for FakeBackend {
  fn name(&self) -> &'static str {
    "fake"
  }

  fn generate<'a>(
    &'a self,
    credential: &'a Credential,
    request: ModelRequest,
  ) -> ModelFuture<'a, Result<ModelResponse, ModelError>> {
    Box::pin(async move {
      self.keys.lock().expect("keys lock").push(credential.expose().to_string());
      self.requests.lock().expect("requests lock").push(request);
      let next = self.replies.lock().expect("replies lock").pop_front();
      match next {
        Some(Ok(text)) => Ok(ModelResponse { text }),
        Some(Err(e)) => Err(e),
        None => Err(ModelError::transport("no scripted reply left")),
      }
    })
  }
}

/// AppState over a fake backend; `key` feeds the runtime API_KEY source.
pub fn test_state(backend: Arc<FakeBackend>, key: Option<&str>) -> AppState {
  let key = key.map(str::to_string);
  let resolver = CredentialResolver::new(
    DEFAULT_SOURCES.to_vec(),
    Arc::new(move |s: &CredentialSource| if s.name == "API_KEY" { key.clone() } else { None }),
  );
  AppState::with_parts(Prompts::default(), resolver, backend, "test-model")
}

/// Five well-formed questions as the model would return them.
pub fn sample_quiz_json() -> String {
  json!([
    {
      "question": "I enjoy ___ soccer with my friends.",
      "options": ["play", "playing", "to play", "played"],
      "correctAnswerIndex": 1,
      "explanation": "enjoy는 동명사만 목적어로 취해요."
    },
    {
      "question": "___ English is fun.",
      "options": ["Learn", "Learned", "Learning", "Learns"],
      "correctAnswerIndex": 2,
      "explanation": "주어 자리에는 동명사가 올 수 있어요."
    },
    {
      "question": "My hobby is ___ pictures.",
      "options": ["taking", "take", "took", "takes"],
      "correctAnswerIndex": 0,
      "explanation": "보어 자리의 동명사예요."
    },
    {
      "question": "Which one is a gerund? a ___ bag",
      "options": ["sleeping (침낭)", "sleeping (자고 있는)", "slept", "sleeps"],
      "correctAnswerIndex": 0,
      "explanation": "용도를 나타내면 동명사예요."
    },
    {
      "question": "Please stop ___ so loudly.",
      "options": ["to talk", "talk", "talked", "talking"],
      "correctAnswerIndex": 3,
      "explanation": "stop + 동명사는 '~하는 것을 멈추다'예요."
    }
  ])
  .to_string()
}

//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::error::ServiceError;
use crate::logic::health;
use crate::protocol::*;
use crate::quiz;
use crate::seeds::{concept_cards, CHAT_SUGGESTIONS};
use crate::state::AppState;
use crate::tutor;

fn status_for(e: &ServiceError) -> StatusCode {
  match e {
    ServiceError::CredentialMissing { .. } => StatusCode::SERVICE_UNAVAILABLE,
    ServiceError::QuizGenerationFailed(_) | ServiceError::TutorUnavailable(_) => StatusCode::BAD_GATEWAY,
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(health(&state))
}

#[instrument(level = "info")]
pub async fn http_get_concepts() -> impl IntoResponse {
  Json(ConceptsOut { cards: concept_cards() })
}

#[instrument(level = "info")]
pub async fn http_get_suggestions() -> impl IntoResponse {
  Json(SuggestionsOut { suggestions: CHAT_SUGGESTIONS.iter().map(|s| s.to_string()).collect() })
}

/// 200 with questions; 204 when the model produced none; 503 for a missing
/// key (with remediation); 502 for any other generation failure.
#[instrument(level = "info", skip(state), fields(difficulty = ?q.difficulty))]
pub async fn http_get_quiz(
  State(state): State<Arc<AppState>>,
  Query(q): Query<QuizQuery>,
) -> Result<axum::response::Response, (StatusCode, Json<ErrorOut>)> {
  let difficulty = q.difficulty.unwrap_or_default();
  match quiz::generate(&state, difficulty).await {
    Ok(questions) if questions.is_empty() => {
      info!(target: "quiz", %difficulty, "HTTP quiz empty");
      Ok(StatusCode::NO_CONTENT.into_response())
    }
    Ok(questions) => {
      info!(target: "quiz", %difficulty, count = questions.len(), "HTTP quiz served");
      Ok(Json(QuizOut { difficulty, questions }).into_response())
    }
    Err(e) => Err((status_for(&e), Json(ErrorOut::from(&e)))),
  }
}

/// 400 for a blank message; otherwise always 200, since the tutor converts
/// failures into an in-character reply.
#[instrument(level = "info", skip(state, body), fields(history = body.history.len(), message_len = body.message.len()))]
pub async fn http_post_tutor(
  State(state): State<Arc<AppState>>,
  Json(body): Json<TutorIn>,
) -> Result<Json<TutorOut>, (StatusCode, Json<ErrorOut>)> {
  let message = body.message.trim();
  if message.is_empty() {
    return Err((
      StatusCode::BAD_REQUEST,
      Json(ErrorOut::plain("INVALID_INPUT", "message must not be empty")),
    ));
  }
  let text = tutor::reply(&state, &body.history, message).await;
  Ok(Json(TutorOut { text }))
}

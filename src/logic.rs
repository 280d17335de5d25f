//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Starting a quiz and driving it (answer, next, restart)
//!   - Sending chat turns and resetting the transcript
//!   - Health / key status reporting

use tracing::{info, instrument, warn};

use crate::domain::{AppView, Difficulty};
use crate::protocol::{quiz_state_out, ErrorOut, HealthOut, ServerWsMessage};
use crate::quiz;
use crate::session::{LearnerSession, QuizMode, SessionError};
use crate::state::AppState;
use crate::tutor;

const QUIZ_UNAVAILABLE: &str = "문제를 불러오는데 실패했습니다. 잠시 후 다시 시도해주세요.";

fn session_error(e: SessionError) -> ServerWsMessage {
  ServerWsMessage::Error { error: ErrorOut::plain("INVALID_ACTION", e.to_string()) }
}

#[instrument(level = "info", skip(state, session), fields(%difficulty))]
pub async fn start_quiz(state: &AppState, session: &mut LearnerSession, difficulty: Difficulty) -> ServerWsMessage {
  session.navigate(AppView::Quiz);
  match quiz::generate(state, difficulty).await {
    Ok(questions) => {
      if session.quiz.begin(difficulty, questions) {
        info!(target: "quiz", %difficulty, total = session.quiz.total(), "Quiz started");
        ServerWsMessage::QuizState { quiz: quiz_state_out(&session.quiz) }
      } else {
        warn!(target: "quiz", %difficulty, "Model returned no questions");
        ServerWsMessage::QuizUnavailable { message: QUIZ_UNAVAILABLE.into() }
      }
    }
    Err(e) => ServerWsMessage::Error { error: ErrorOut::from(&e) },
  }
}

pub fn submit_answer(session: &mut LearnerSession, option: usize) -> ServerWsMessage {
  match session.quiz.answer(option) {
    Ok(outcome) => {
      info!(target: "quiz", correct = outcome.correct, score = outcome.score, streak = outcome.streak, "Answer recorded");
      ServerWsMessage::AnswerResult { outcome }
    }
    Err(e) => session_error(e),
  }
}

pub fn next_question(session: &mut LearnerSession) -> ServerWsMessage {
  match session.quiz.advance() {
    Ok(QuizMode::Result) => {
      let q = &session.quiz;
      info!(target: "quiz", score = q.score(), total = q.total(), "Quiz completed");
      ServerWsMessage::QuizResult {
        score: q.score(),
        total: q.total(),
        percentage: q.percentage(),
        verdict: q.verdict(),
      }
    }
    Ok(_) => ServerWsMessage::QuizState { quiz: quiz_state_out(&session.quiz) },
    Err(e) => session_error(e),
  }
}

pub fn restart_quiz(session: &mut LearnerSession) -> ServerWsMessage {
  session.quiz.restart();
  ServerWsMessage::QuizState { quiz: quiz_state_out(&session.quiz) }
}

/// Append the user's turn, ask the tutor with the prior history, append the reply.
#[instrument(level = "info", skip(state, session, text), fields(text_len = text.len()))]
pub async fn chat_send(state: &AppState, session: &mut LearnerSession, text: &str) -> ServerWsMessage {
  let text = text.trim();
  if text.is_empty() {
    return ServerWsMessage::Error { error: ErrorOut::plain("INVALID_INPUT", "message must not be empty") };
  }
  session.navigate(AppView::Chat);

  let history = session.chat.history();
  let user = session.chat.push_user(text).clone();
  let answer = tutor::reply(state, &history, text).await;
  let reply = session.chat.push_model(answer).clone();

  ServerWsMessage::ChatReply { user, reply }
}

pub fn chat_reset(session: &mut LearnerSession) -> ServerWsMessage {
  session.chat.reset();
  ServerWsMessage::ChatTranscript { messages: session.chat.messages().to_vec() }
}

pub fn health(state: &AppState) -> HealthOut {
  let found = state.credentials.status();
  HealthOut { ok: true, api_key_configured: !found.is_empty(), key_sources_found: found }
}

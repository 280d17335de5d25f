//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{AppView, ChatMessage, ChatTurn, Difficulty, LearningCard};
use crate::error::ServiceError;
use crate::session::{AnswerOutcome, QuizMode, QuizSession, Verdict};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
  Ping,
  Navigate {
    view: AppView,
  },
  Concepts,
  StartQuiz {
    difficulty: Difficulty,
  },
  Answer {
    option: usize,
  },
  NextQuestion,
  RestartQuiz,
  QuizState,
  ChatSend {
    text: String,
  },
  ChatReset,
  ChatTranscript,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
  Pong,
  View {
    view: AppView,
  },
  Concepts {
    cards: Vec<LearningCard>,
  },
  QuizState {
    quiz: QuizStateOut,
  },
  QuizUnavailable {
    message: String,
  },
  AnswerResult {
    outcome: AnswerOutcome,
  },
  QuizResult {
    score: u32,
    total: usize,
    percentage: u32,
    verdict: Verdict,
  },
  ChatTranscript {
    messages: Vec<ChatMessage>,
  },
  ChatReply {
    user: ChatMessage,
    reply: ChatMessage,
  },
  Error {
    error: ErrorOut,
  },
}

/// The current question as shown to the learner (answer index withheld).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOut {
  pub id: i64,
  pub question: String,
  pub options: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStateOut {
  pub mode: QuizMode,
  pub difficulty: Difficulty,
  pub current_index: usize,
  pub total: usize,
  pub score: u32,
  pub streak: u32,
  pub selected_option: Option<usize>,
  pub question: Option<QuestionOut>,
}

pub fn quiz_state_out(s: &QuizSession) -> QuizStateOut {
  QuizStateOut {
    mode: s.mode(),
    difficulty: s.difficulty(),
    current_index: s.current_index(),
    total: s.total(),
    score: s.score(),
    streak: s.streak(),
    selected_option: s.selected_option(),
    question: s.current_question().map(|q| QuestionOut {
      id: q.id,
      question: q.question.clone(),
      options: q.options.clone(),
    }),
  }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorOut {
  pub code: String,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub remediation: Option<String>,
}

impl ErrorOut {
  pub fn plain(code: &str, message: impl Into<String>) -> Self {
    Self { code: code.into(), message: message.into(), remediation: None }
  }
}

impl From<&ServiceError> for ErrorOut {
  fn from(e: &ServiceError) -> Self {
    Self { code: e.code().into(), message: e.to_string(), remediation: Some(e.remediation()) }
  }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct QuizQuery {
  pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizOut {
  pub difficulty: Difficulty,
  pub questions: Vec<crate::domain::QuizQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct TutorIn {
  #[serde(default)]
  pub history: Vec<ChatTurn>,
  pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TutorOut {
  pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ConceptsOut {
  pub cards: Vec<LearningCard>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsOut {
  pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthOut {
  pub ok: bool,
  pub api_key_configured: bool,
  pub key_sources_found: Vec<String>,
}

//! Domain models: difficulty, quiz questions, chat messages, concept cards.

use serde::{Deserialize, Serialize};

/// Number of options every quiz question must carry.
pub const OPTION_COUNT: usize = 4;

/// Quiz level chosen on the intro screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  /// Subject/object/complement usage and verbs taking only gerunds.
  #[default]
  Basic,
  /// Gerund vs participle and verbs whose meaning changes.
  Advanced,
}

impl Difficulty {
  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Basic => "basic",
      Difficulty::Advanced => "advanced",
    }
  }
}

impl std::fmt::Display for Difficulty {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for Difficulty {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "basic" => Ok(Difficulty::Basic),
      "advanced" => Ok(Difficulty::Advanced),
      other => Err(format!("unknown difficulty '{}'", other)),
    }
  }
}

/// One multiple-choice question. Built only through `quiz::parse_quiz_response`,
/// which guarantees exactly four options and an in-range answer index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
  pub id: i64,
  pub question: String,
  pub options: Vec<String>,
  pub correct_answer_index: usize,
  pub explanation: String,
}

/// Who authored a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
  User,
  Model,
}

impl ChatRole {
  pub fn as_str(&self) -> &'static str {
    match self {
      ChatRole::User => "user",
      ChatRole::Model => "model",
    }
  }
}

/// A visible chat bubble.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
  pub id: String,
  pub role: ChatRole,
  pub text: String,
  pub timestamp: i64,
}

/// The slice of a chat message that is replayed to the model as history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
  pub role: ChatRole,
  pub text: String,
}

impl ChatTurn {
  pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
    Self { role, text: text.into() }
  }
}

impl From<&ChatMessage> for ChatTurn {
  fn from(m: &ChatMessage) -> Self {
    Self { role: m.role, text: m.text.clone() }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
  Concept,
  Usage,
  Tip,
}

/// Static concept reference card.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LearningCard {
  pub title: String,
  pub kind: CardKind,
  pub content: String,
  pub examples: Vec<String>,
}

/// Which mode the learner is looking at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppView {
  #[default]
  Home,
  Learn,
  Quiz,
  Chat,
}

/// Milliseconds since the Unix epoch; 0 if the clock is before it.
pub fn now_millis() -> i64 {
  std::time::SystemTime::now()
    .duration_since(std::time::UNIX_EPOCH)
    .map(|d| d.as_millis() as i64)
    .unwrap_or(0)
}

//! Per-connection learner state: active view, quiz progress, chat transcript.
//!
//! Nothing here is persisted. A new connection starts from scratch, and
//! navigating between views resets the quiz and the chat.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{now_millis, AppView, ChatMessage, ChatRole, ChatTurn, Difficulty, QuizQuestion};
use crate::seeds::{WELCOME_MESSAGE_ID, WELCOME_TEXT};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
  #[default]
  Intro,
  Active,
  Result,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionError {
  NotActive,
  AlreadyAnswered,
  NotAnswered,
  OptionOutOfRange(usize),
}

impl std::fmt::Display for SessionError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SessionError::NotActive => f.write_str("no quiz in progress"),
      SessionError::AlreadyAnswered => f.write_str("this question was already answered"),
      SessionError::NotAnswered => f.write_str("answer the current question first"),
      SessionError::OptionOutOfRange(i) => write!(f, "option {} does not exist", i),
    }
  }
}

impl std::error::Error for SessionError {}

/// What the learner sees right after picking an option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
  pub correct: bool,
  pub selected: usize,
  pub correct_answer_index: usize,
  pub explanation: String,
  pub score: u32,
  pub streak: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  Perfect,
  Great,
  KeepGoing,
}

#[derive(Clone, Debug, Default)]
pub struct QuizSession {
  questions: Vec<QuizQuestion>,
  current_index: usize,
  score: u32,
  streak: u32,
  selected_option: Option<usize>,
  mode: QuizMode,
  difficulty: Difficulty,
}

impl QuizSession {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start a fresh attempt. With no questions the session stays on the intro
  /// screen and `false` is returned.
  pub fn begin(&mut self, difficulty: Difficulty, questions: Vec<QuizQuestion>) -> bool {
    *self = Self { difficulty, ..Self::default() };
    if questions.is_empty() {
      return false;
    }
    self.questions = questions;
    self.mode = QuizMode::Active;
    true
  }

  /// Lock in an option for the current question. One answer per question.
  pub fn answer(&mut self, option: usize) -> Result<AnswerOutcome, SessionError> {
    if self.mode != QuizMode::Active {
      return Err(SessionError::NotActive);
    }
    if self.selected_option.is_some() {
      return Err(SessionError::AlreadyAnswered);
    }
    let question = self.questions.get(self.current_index).ok_or(SessionError::NotActive)?;
    if option >= question.options.len() {
      return Err(SessionError::OptionOutOfRange(option));
    }

    let correct = option == question.correct_answer_index;
    let outcome_index = question.correct_answer_index;
    let explanation = question.explanation.clone();

    self.selected_option = Some(option);
    if correct {
      self.score += 1;
      self.streak += 1;
    } else {
      self.streak = 0;
    }

    Ok(AnswerOutcome {
      correct,
      selected: option,
      correct_answer_index: outcome_index,
      explanation,
      score: self.score,
      streak: self.streak,
    })
  }

  /// Move to the next question, or to the result screen after the last one.
  pub fn advance(&mut self) -> Result<QuizMode, SessionError> {
    if self.mode != QuizMode::Active {
      return Err(SessionError::NotActive);
    }
    if self.selected_option.is_none() {
      return Err(SessionError::NotAnswered);
    }
    if self.current_index + 1 < self.questions.len() {
      self.current_index += 1;
      self.selected_option = None;
    } else {
      self.mode = QuizMode::Result;
    }
    Ok(self.mode)
  }

  /// Back to the intro screen; the difficulty choice is kept.
  pub fn restart(&mut self) {
    let difficulty = self.difficulty;
    *self = Self { difficulty, ..Self::default() };
  }

  pub fn mode(&self) -> QuizMode {
    self.mode
  }

  pub fn difficulty(&self) -> Difficulty {
    self.difficulty
  }

  pub fn score(&self) -> u32 {
    self.score
  }

  pub fn streak(&self) -> u32 {
    self.streak
  }

  pub fn current_index(&self) -> usize {
    self.current_index
  }

  pub fn selected_option(&self) -> Option<usize> {
    self.selected_option
  }

  pub fn total(&self) -> usize {
    self.questions.len()
  }

  pub fn current_question(&self) -> Option<&QuizQuestion> {
    match self.mode {
      QuizMode::Active => self.questions.get(self.current_index),
      _ => None,
    }
  }

  /// Rounded score percentage; 0 for an empty session.
  pub fn percentage(&self) -> u32 {
    if self.questions.is_empty() {
      return 0;
    }
    ((self.score as f64 / self.questions.len() as f64) * 100.0).round() as u32
  }

  pub fn verdict(&self) -> Verdict {
    match self.percentage() {
      100 => Verdict::Perfect,
      p if p >= 60 => Verdict::Great,
      _ => Verdict::KeepGoing,
    }
  }
}

/// Append-only chat log that always starts with the welcome message.
#[derive(Clone, Debug)]
pub struct ChatTranscript {
  messages: Vec<ChatMessage>,
}

impl Default for ChatTranscript {
  fn default() -> Self {
    Self::new()
  }
}

impl ChatTranscript {
  pub fn new() -> Self {
    Self { messages: vec![welcome_message()] }
  }

  pub fn messages(&self) -> &[ChatMessage] {
    &self.messages
  }

  /// Turns to replay to the model, welcome message included.
  pub fn history(&self) -> Vec<ChatTurn> {
    self.messages.iter().map(ChatTurn::from).collect()
  }

  pub fn push_user(&mut self, text: impl Into<String>) -> &ChatMessage {
    self.push(ChatRole::User, text.into())
  }

  pub fn push_model(&mut self, text: impl Into<String>) -> &ChatMessage {
    self.push(ChatRole::Model, text.into())
  }

  pub fn reset(&mut self) {
    self.messages = vec![welcome_message()];
  }

  fn push(&mut self, role: ChatRole, text: String) -> &ChatMessage {
    self.messages.push(ChatMessage {
      id: Uuid::new_v4().to_string(),
      role,
      text,
      timestamp: now_millis(),
    });
    &self.messages[self.messages.len() - 1]
  }
}

fn welcome_message() -> ChatMessage {
  ChatMessage {
    id: WELCOME_MESSAGE_ID.into(),
    role: ChatRole::Model,
    text: WELCOME_TEXT.into(),
    timestamp: now_millis(),
  }
}

/// Everything one connected learner has on screen.
#[derive(Clone, Debug, Default)]
pub struct LearnerSession {
  pub view: AppView,
  pub quiz: QuizSession,
  pub chat: ChatTranscript,
}

impl LearnerSession {
  pub fn new() -> Self {
    Self::default()
  }

  /// Switch views. Leaving a view drops its state, as a page unmount would.
  pub fn navigate(&mut self, view: AppView) {
    if view != self.view {
      self.quiz = QuizSession::new();
      self.chat.reset();
      self.view = view;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::quiz::parse_quiz_response;
  use crate::testing::sample_quiz_json;

  fn active_session() -> QuizSession {
    let questions = parse_quiz_response(&sample_quiz_json(), 1).expect("fixture");
    let mut s = QuizSession::new();
    assert!(s.begin(Difficulty::Basic, questions));
    s
  }

  fn wrong_option(q: &QuizQuestion) -> usize {
    (q.correct_answer_index + 1) % q.options.len()
  }

  #[test]
  fn scoring_and_streak_over_alternating_answers() {
    let mut s = active_session();
    let mut streaks = Vec::new();

    for n in 0..5 {
      let q = s.current_question().expect("active").clone();
      let pick = if n % 2 == 0 { q.correct_answer_index } else { wrong_option(&q) };
      let outcome = s.answer(pick).expect("answer");
      assert_eq!(outcome.correct, n % 2 == 0);
      streaks.push(outcome.streak);
      s.advance().expect("advance");
    }

    assert_eq!(s.score(), 3);
    assert_eq!(streaks, vec![1, 0, 1, 0, 1]);
    assert_eq!(s.mode(), QuizMode::Result);
    assert_eq!(s.percentage(), 60);
    assert_eq!(s.verdict(), Verdict::Great);
  }

  #[test]
  fn empty_retry_after_finished_quiz_clears_progress() {
    let mut s = active_session();
    for _ in 0..5 {
      let q = s.current_question().expect("active").clone();
      s.answer(q.correct_answer_index).expect("answer");
      s.advance().expect("advance");
    }
    assert_eq!(s.mode(), QuizMode::Result);
    assert_eq!(s.score(), 5);

    assert!(!s.begin(Difficulty::Advanced, vec![]));
    assert_eq!(s.mode(), QuizMode::Intro);
    assert_eq!(s.score(), 0);
    assert_eq!(s.streak(), 0);
    assert_eq!(s.current_index(), 0);
    assert_eq!(s.total(), 0);
    assert_eq!(s.difficulty(), Difficulty::Advanced);
    assert!(s.current_question().is_none());
  }

  #[test]
  fn second_answer_to_same_question_is_refused() {
    let mut s = active_session();
    let q = s.current_question().expect("active").clone();
    s.answer(q.correct_answer_index).expect("first");
    assert_eq!(s.answer(q.correct_answer_index), Err(SessionError::AlreadyAnswered));
    assert_eq!(s.score(), 1);
  }

  #[test]
  fn advance_requires_an_answer() {
    let mut s = active_session();
    assert_eq!(s.advance(), Err(SessionError::NotAnswered));
  }

  #[test]
  fn out_of_range_option_does_not_count() {
    let mut s = active_session();
    assert_eq!(s.answer(4), Err(SessionError::OptionOutOfRange(4)));
    assert_eq!(s.selected_option(), None);
  }

  #[test]
  fn empty_quiz_stays_on_intro() {
    let mut s = QuizSession::new();
    assert!(!s.begin(Difficulty::Advanced, Vec::new()));
    assert_eq!(s.mode(), QuizMode::Intro);
    assert_eq!(s.answer(0), Err(SessionError::NotActive));
  }

  #[test]
  fn restart_returns_to_intro_and_clears_score() {
    let mut s = active_session();
    let q = s.current_question().expect("active").clone();
    s.answer(q.correct_answer_index).expect("answer");
    s.restart();
    assert_eq!(s.mode(), QuizMode::Intro);
    assert_eq!(s.score(), 0);
    assert_eq!(s.total(), 0);
  }

  #[test]
  fn verdict_thresholds() {
    let mut s = active_session();
    for _ in 0..5 {
      let q = s.current_question().expect("active").clone();
      s.answer(q.correct_answer_index).expect("answer");
      s.advance().expect("advance");
    }
    assert_eq!(s.verdict(), Verdict::Perfect);

    let mut s = active_session();
    for _ in 0..5 {
      let q = s.current_question().expect("active").clone();
      s.answer(wrong_option(&q)).expect("answer");
      s.advance().expect("advance");
    }
    assert_eq!(s.verdict(), Verdict::KeepGoing);
    assert_eq!(s.streak(), 0);
  }

  #[test]
  fn transcript_keeps_call_order_after_welcome() {
    let mut t = ChatTranscript::new();
    t.push_user("A");
    t.push_model("a");
    t.push_user("B");
    t.push_model("b");

    let rest: Vec<(ChatRole, &str)> = t.messages()[1..].iter().map(|m| (m.role, m.text.as_str())).collect();
    assert_eq!(
      rest,
      vec![(ChatRole::User, "A"), (ChatRole::Model, "a"), (ChatRole::User, "B"), (ChatRole::Model, "b")]
    );
    assert_eq!(t.messages()[0].id, WELCOME_MESSAGE_ID);
  }

  #[test]
  fn reset_leaves_only_the_welcome_message() {
    let mut t = ChatTranscript::new();
    t.push_user("A");
    t.push_model("a");
    t.reset();
    assert_eq!(t.messages().len(), 1);
    assert_eq!(t.messages()[0].id, WELCOME_MESSAGE_ID);
    assert_eq!(t.messages()[0].text, WELCOME_TEXT);
  }

  #[test]
  fn message_ids_are_unique() {
    let mut t = ChatTranscript::new();
    let a = t.push_user("x").id.clone();
    let b = t.push_user("x").id.clone();
    assert_ne!(a, b);
  }

  #[test]
  fn navigating_away_resets_quiz_and_chat() {
    let mut l = LearnerSession::new();
    l.navigate(AppView::Chat);
    l.chat.push_user("hello");
    l.navigate(AppView::Chat);
    assert_eq!(l.chat.messages().len(), 2);

    l.navigate(AppView::Quiz);
    assert_eq!(l.chat.messages().len(), 1);
    assert_eq!(l.quiz.mode(), QuizMode::Intro);
  }
}

//! Quiz generation: prompt + schema, one remote call, two-stage parse.
//!
//! Flow:
//! 1) Pick the topic block for the difficulty and fill the prompt template.
//! 2) Call the model once with the response schema attached.
//! 3) Parse strictly; if that fails, salvage the outermost `[...]` and retry.
//! 4) Validate every element against the schema and stamp local ids.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::{now_millis, Difficulty, QuizQuestion, OPTION_COUNT};
use crate::error::ServiceError;
use crate::model::ModelRequest;
use crate::state::AppState;
use crate::util::{fill_template, trunc_for_log};

/// Questions per quiz session.
pub const QUIZ_LENGTH: usize = 5;

/// Output schema sent with the request so the model constrains its own shape.
pub fn quiz_schema() -> Value {
  json!({
    "type": "ARRAY",
    "items": {
      "type": "OBJECT",
      "properties": {
        "question": { "type": "STRING", "description": "The quiz question text." },
        "options": {
          "type": "ARRAY",
          "items": { "type": "STRING" },
          "description": "An array of 4 multiple choice options."
        },
        "correctAnswerIndex": { "type": "INTEGER", "description": "The zero-based index of the correct answer (0-3)." },
        "explanation": { "type": "STRING", "description": "A helpful explanation in Korean." }
      },
      "required": ["question", "options", "correctAnswerIndex", "explanation"],
      "propertyOrdering": ["question", "options", "correctAnswerIndex", "explanation"]
    }
  })
}

pub fn build_quiz_prompt(state: &AppState, difficulty: Difficulty) -> String {
  let count = QUIZ_LENGTH.to_string();
  fill_template(
    &state.prompts.quiz_user_template,
    &[("count", count.as_str()), ("topic", state.prompts.quiz_topic(difficulty))],
  )
}

/// Generate a fresh quiz. Exactly one remote call, no retry.
///
/// `Ok(vec![])` means the model returned nothing; callers present that as
/// "could not load" rather than as an error.
#[instrument(level = "info", skip(state), fields(%difficulty, model = %state.model))]
pub async fn generate(state: &AppState, difficulty: Difficulty) -> Result<Vec<QuizQuestion>, ServiceError> {
  let credential = state.credentials.resolve()?;
  debug!(target: "quiz", source = %credential.source().label(), "Using API key");

  let request = ModelRequest::new(state.model.clone(), build_quiz_prompt(state, difficulty))
    .with_system_instruction(state.prompts.quiz_system.clone())
    .with_response_schema(quiz_schema());

  let response = state.backend.generate(&credential, request).await.map_err(|e| {
    error!(target: "quiz", %difficulty, error = %e, "Model call failed during quiz generation");
    ServiceError::QuizGenerationFailed(e.to_string())
  })?;

  if response.text.trim().is_empty() {
    warn!(target: "quiz", %difficulty, "Empty response from model");
    return Ok(Vec::new());
  }

  let questions = parse_quiz_response(&response.text, now_millis()).map_err(|e| {
    error!(target: "quiz", %difficulty, error = %e, raw = %trunc_for_log(&response.text, 160), "Rejected quiz payload");
    e
  })?;

  info!(target: "quiz", %difficulty, count = questions.len(), "Quiz generated");
  Ok(questions)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
  question: String,
  options: Vec<String>,
  correct_answer_index: i64,
  explanation: String,
}

/// Parse the model's text into questions, assigning ids `id_base + index`.
///
/// An empty array (or blank text) is a successful empty quiz. Anything else
/// must be exactly `QUIZ_LENGTH` fully valid questions.
pub fn parse_quiz_response(raw: &str, id_base: i64) -> Result<Vec<QuizQuestion>, ServiceError> {
  if raw.trim().is_empty() {
    return Ok(Vec::new());
  }

  let value = match serde_json::from_str::<Value>(raw) {
    Ok(v) => v,
    Err(strict_err) => {
      debug!(target: "quiz", error = %strict_err, "Strict JSON parse failed; salvaging bracketed array");
      let candidate = salvage_array(raw).ok_or_else(|| {
        ServiceError::QuizGenerationFailed(format!("Failed to parse JSON response: {}", strict_err))
      })?;
      serde_json::from_str::<Value>(candidate).map_err(|e| {
        ServiceError::QuizGenerationFailed(format!("Failed to parse salvaged JSON: {}", e))
      })?
    }
  };

  let Value::Array(items) = value else {
    return Err(ServiceError::QuizGenerationFailed("Response is not an array".into()));
  };

  if items.is_empty() {
    return Ok(Vec::new());
  }
  if items.len() != QUIZ_LENGTH {
    return Err(ServiceError::QuizGenerationFailed(format!(
      "Expected {} questions, got {}",
      QUIZ_LENGTH,
      items.len()
    )));
  }

  items
    .into_iter()
    .enumerate()
    .map(|(index, item)| validate_question(item, index, id_base))
    .collect()
}

fn validate_question(item: Value, index: usize, id_base: i64) -> Result<QuizQuestion, ServiceError> {
  let fail = |why: String| ServiceError::QuizGenerationFailed(format!("question {}: {}", index, why));

  let raw: RawQuestion = serde_json::from_value(item).map_err(|e| fail(e.to_string()))?;
  if raw.question.trim().is_empty() {
    return Err(fail("empty question text".into()));
  }
  if raw.options.len() != OPTION_COUNT {
    return Err(fail(format!("expected {} options, got {}", OPTION_COUNT, raw.options.len())));
  }
  let correct_answer_index = usize::try_from(raw.correct_answer_index)
    .ok()
    .filter(|i| *i < OPTION_COUNT)
    .ok_or_else(|| fail(format!("correctAnswerIndex {} out of range", raw.correct_answer_index)))?;

  Ok(QuizQuestion {
    id: id_base + index as i64,
    question: raw.question,
    options: raw.options,
    correct_answer_index,
    explanation: raw.explanation,
  })
}

/// First `[` through last `]`, spanning newlines.
fn salvage_array(raw: &str) -> Option<&str> {
  static ARRAY_RE: OnceLock<Option<Regex>> = OnceLock::new();
  let re = ARRAY_RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").ok()).as_ref()?;
  re.find(raw).map(|m| m.as_str())
}

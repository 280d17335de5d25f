//! Error taxonomy surfaced to handlers.
//!
//! - `CredentialMissing`: configuration problem, shown with remediation.
//! - `QuizGenerationFailed`: transient or malformed output, shown with a retry.
//! - `TutorUnavailable`: produced inside the tutor and converted to an apology;
//!   it never leaves `tutor::reply`.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
  CredentialMissing { checked: Vec<String> },
  QuizGenerationFailed(String),
  TutorUnavailable(String),
}

impl ServiceError {
  /// Stable code shared with the frontend.
  pub fn code(&self) -> &'static str {
    match self {
      ServiceError::CredentialMissing { .. } => "API_KEY_MISSING",
      ServiceError::QuizGenerationFailed(_) => "QUIZ_GENERATION_FAILED",
      ServiceError::TutorUnavailable(_) => "TUTOR_UNAVAILABLE",
    }
  }

  pub fn is_credential_missing(&self) -> bool {
    matches!(self, ServiceError::CredentialMissing { .. })
  }

  /// What the learner (or operator) can do about it.
  pub fn remediation(&self) -> String {
    match self {
      ServiceError::CredentialMissing { checked } => format!(
        "Set one of {} in the server environment and restart (or redeploy).",
        checked.join(", ")
      ),
      ServiceError::QuizGenerationFailed(_) => "문제를 불러오는데 실패했습니다. 잠시 후 다시 시도해주세요.".into(),
      ServiceError::TutorUnavailable(_) => "잠시 후에 다시 시도해줘!".into(),
    }
  }
}

impl Display for ServiceError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      ServiceError::CredentialMissing { checked } => {
        write!(f, "no API key found (checked: {})", checked.join(", "))
      }
      ServiceError::QuizGenerationFailed(reason) => write!(f, "quiz generation failed: {}", reason),
      ServiceError::TutorUnavailable(reason) => write!(f, "tutor unavailable: {}", reason),
    }
  }
}

impl Error for ServiceError {}
